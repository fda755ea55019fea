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

//! Rules about the digest algorithms signatures use.

use authlint_crypto::{
    digest_strength::{is_md_digest, is_sha2_digest},
    oids,
};

use super::{RuleDescriptor, RuleResult, SignatureRule};
use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    signature::{Graph, SignatureKind},
};

/// Rule 10000: the primary signature uses SHA-1 so older Windows versions
/// can verify it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha1PrimarySignatureRule;

impl RuleDescriptor for Sha1PrimarySignatureRule {
    fn rule_id(&self) -> u32 {
        10000
    }

    fn rule_name(&self) -> &'static str {
        "Primary SHA1"
    }

    fn short_description(&self) -> &'static str {
        "Primary signature should be SHA1."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::COMPAT
    }
}

impl SignatureRule for Sha1PrimarySignatureRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let Some(primary) = graph.primary() else {
            return RuleResult::Fail;
        };

        if primary.digest_algorithm() != oids::SHA1 {
            logger.log_signature_message(
                primary,
                &format!(
                    "Expected SHA1 digest algorithm but is {}.",
                    primary.digest_algorithm_name()
                ),
            );
            return RuleResult::Fail;
        }

        RuleResult::Pass
    }
}

/// Rule 10016: the primary signature uses a SHA-2 digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha2PrimarySignatureRule;

impl RuleDescriptor for Sha2PrimarySignatureRule {
    fn rule_id(&self) -> u32 {
        10016
    }

    fn rule_name(&self) -> &'static str {
        "Primary SHA2"
    }

    fn short_description(&self) -> &'static str {
        "Primary signature should be SHA2."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::MODERN
    }
}

impl SignatureRule for Sha2PrimarySignatureRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let Some(primary) = graph.primary() else {
            return RuleResult::Fail;
        };

        if !is_sha2_digest(primary.digest_algorithm()) {
            logger.log_signature_message(
                primary,
                &format!(
                    "Expected SHA2 digest algorithm but is {}.",
                    primary.digest_algorithm_name()
                ),
            );
            return RuleResult::Fail;
        }

        RuleResult::Pass
    }
}

/// Rule 10001: at least one signature anywhere in the file uses SHA-2.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha2SignatureExistsRule;

impl RuleDescriptor for Sha2SignatureExistsRule {
    fn rule_id(&self) -> u32 {
        10001
    }

    fn rule_name(&self) -> &'static str {
        "SHA2 Signed"
    }

    fn short_description(&self) -> &'static str {
        "A SHA2 signature should exist."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for Sha2SignatureExistsRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        if graph
            .visit_all(SignatureKind::ANY_SIGNATURE, true)
            .any(|signature| is_sha2_digest(signature.digest_algorithm()))
        {
            return RuleResult::Pass;
        }

        logger.log_message("No signature uses a SHA2 digest algorithm.");
        RuleResult::Fail
    }
}

/// Rule 10002: no signature uses MD2, MD4 or MD5.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoWeakFileDigestAlgorithmsRule;

impl RuleDescriptor for NoWeakFileDigestAlgorithmsRule {
    fn rule_id(&self) -> u32 {
        10002
    }

    fn rule_name(&self) -> &'static str {
        "No Weak File Digests"
    }

    fn short_description(&self) -> &'static str {
        "Checks for weak file digest algorithms."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for NoWeakFileDigestAlgorithmsRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY_SIGNATURE, true) {
            if is_md_digest(signature.digest_algorithm()) {
                logger.log_signature_message(
                    signature,
                    &format!(
                        "Uses the {} digest algorithm.",
                        signature.digest_algorithm_name()
                    ),
                );
                result = RuleResult::Fail;
            }
        }

        result
    }
}

/// Rule 10015: no signature uses SHA-1.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSha1Rule;

impl RuleDescriptor for NoSha1Rule {
    fn rule_id(&self) -> u32 {
        10015
    }

    fn rule_name(&self) -> &'static str {
        "No SHA1 File Digests"
    }

    fn short_description(&self) -> &'static str {
        "Checks for SHA1 file digest algorithms."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::MODERN
    }
}

impl SignatureRule for NoSha1Rule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY_SIGNATURE, true) {
            if signature.digest_algorithm() == oids::SHA1 {
                logger.log_signature_message(signature, "Uses the SHA1 digest algorithm.");
                result = RuleResult::Fail;
            }
        }

        result
    }
}
