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

use authlint_crypto::digest_strength::{digest_strength, UNKNOWN_STRENGTH};

use super::{RuleDescriptor, RuleResult, SignatureRule};
use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    signature::{Graph, SignatureKind},
};

/// Rule 10003: every signature carries a countersignature at least as strong
/// as its own digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestampedRule;

impl RuleDescriptor for TimestampedRule {
    fn rule_id(&self) -> u32 {
        10003
    }

    fn rule_name(&self) -> &'static str {
        "Timestamped Rule"
    }

    fn short_description(&self) -> &'static str {
        "Signatures should have a timestamp counter signer."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for TimestampedRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY_SIGNATURE, true) {
            let required = digest_strength(signature.digest_algorithm());

            let mut timestamped = false;
            let mut strong = false;
            for counter_signature in signature
                .counter_signatures()
                .visit_all(SignatureKind::ANY_COUNTER_SIGNATURE, true)
            {
                timestamped = true;
                let strength = digest_strength(counter_signature.digest_algorithm());
                if strength != UNKNOWN_STRENGTH && strength >= required {
                    strong = true;
                    break;
                }
            }

            if !timestamped {
                logger.log_signature_message(signature, "Signature is not timestamped.");
                result = RuleResult::Fail;
            } else if !strong {
                logger.log_signature_message(
                    signature,
                    &format!(
                        "Signature is not timestamped with the expected hash algorithm {}.",
                        signature.digest_algorithm_name()
                    ),
                );
                result = RuleResult::Fail;
            }
        }

        result
    }
}
