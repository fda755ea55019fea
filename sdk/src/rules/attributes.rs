// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use authlint_crypto::oids;

use super::{RuleDescriptor, RuleResult, SignatureRule};
use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    signature::{Graph, MalformedBranch, Signature, SignatureKind},
};

const TRUSTED_UNSIGNED_ATTRIBUTES: [&str; 3] = [
    oids::AUTHENTICODE_COUNTER_SIGNATURE,
    oids::RFC3161_COUNTER_SIGNATURE,
    oids::NESTED_SIGNATURE,
];

fn attribute_display_name(oid: &str) -> &'static str {
    oids::friendly_name(oid).unwrap_or("<no friendly name>")
}

/// Rule 10009: unsigned attributes are limited to countersignatures and
/// nested signatures, and every one of them decodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUnknownUnsignedAttributeRule;

impl NoUnknownUnsignedAttributeRule {
    fn report_malformed(
        owner: &Signature,
        branches: &[MalformedBranch],
        logger: &mut dyn SignatureLogger,
    ) -> bool {
        for branch in branches {
            logger.log_signature_message(
                owner,
                &format!(
                    "Signature contains malformed {} attribute ({}): {}.",
                    attribute_display_name(&branch.attribute),
                    branch.attribute,
                    branch.reason
                ),
            );
        }
        branches.is_empty()
    }
}

impl RuleDescriptor for NoUnknownUnsignedAttributeRule {
    fn rule_id(&self) -> u32 {
        10009
    }

    fn rule_name(&self) -> &'static str {
        "No Unknown Unsigned Attributes"
    }

    fn short_description(&self) -> &'static str {
        "Checks for the presence of unsigned attributes with an unknown OID."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for NoUnknownUnsignedAttributeRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY_SIGNATURE, true) {
            for counter_signature in signature
                .counter_signatures()
                .visit_all(SignatureKind::ANY_COUNTER_SIGNATURE, true)
            {
                for attribute in counter_signature.unsigned_attributes().iter() {
                    if !TRUSTED_UNSIGNED_ATTRIBUTES.contains(&attribute.oid.as_str()) {
                        logger.log_signature_message(
                            signature,
                            &format!(
                                "Signature contains counter signer with unknown unsigned attribute {} ({}).",
                                attribute_display_name(&attribute.oid),
                                attribute.oid
                            ),
                        );
                        result = RuleResult::Fail;
                    }
                }

                if !Self::report_malformed(
                    signature,
                    counter_signature.counter_signatures().malformed(),
                    logger,
                ) {
                    result = RuleResult::Fail;
                }
            }

            for attribute in signature.unsigned_attributes().iter() {
                if !TRUSTED_UNSIGNED_ATTRIBUTES.contains(&attribute.oid.as_str()) {
                    logger.log_signature_message(
                        signature,
                        &format!(
                            "Signature contains unknown unsigned attribute {} ({}).",
                            attribute_display_name(&attribute.oid),
                            attribute.oid
                        ),
                    );
                    result = RuleResult::Fail;
                }
            }

            let nested_ok =
                Self::report_malformed(signature, signature.nested().malformed(), logger);
            let counters_ok = Self::report_malformed(
                signature,
                signature.counter_signatures().malformed(),
                logger,
            );
            if !nested_ok || !counters_ok {
                result = RuleResult::Fail;
            }
        }

        result
    }
}
