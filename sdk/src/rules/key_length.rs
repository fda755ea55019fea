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

//! Rules about signing key algorithms and sizes.

use std::sync::Arc;

use authlint_crypto::bit_strength::{BitStrengthCalculator, PublicKeyAlgorithm};

use super::{RuleDescriptor, RuleResult, SignatureRule};
use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    signature::{Graph, SignatureKind},
};

const MIN_RSA_KEY_SIZE: u32 = 2048;
const MIN_DSA_KEY_SIZE: u32 = 2048;
const MIN_COMPAT_DSA_KEY_SIZE: u32 = 1024;
const MIN_ECDSA_KEY_SIZE: u32 = 256;

const MAX_ECDSA_KEY_SIZE: u32 = 384;
const MAX_RSA_KEY_SIZE: u32 = 4096;
const MAX_DSA_KEY_SIZE: u32 = 1024;

const NO_CERTIFICATE: &str = "Signature does not have a signing certificate.";

fn unknown_key_message(algorithm: PublicKeyAlgorithm) -> String {
    match algorithm {
        PublicKeyAlgorithm::Ecdsa => "Signature uses ECDSA with an unknown curve.",
        PublicKeyAlgorithm::Rsa => "Signature has an unknown RSA key size.",
        PublicKeyAlgorithm::Dsa => "Signature has an unknown DSA key size.",
        PublicKeyAlgorithm::Other => "Signature uses an unknown algorithm.",
    }
    .to_owned()
}

/// `key` is the algorithm with its article, e.g. `an ECDSA`.
fn below_minimum(key: &str, size: u32, minimum: u32) -> String {
    format!("Signature uses {key} key of size {size} which is below the recommended {minimum}.")
}

fn above_maximum(algorithm: PublicKeyAlgorithm, size: u32, maximum: u32) -> String {
    format!(
        "Signature uses {algorithm} signature with a key size of {size} exceeding maximum size of {maximum}."
    )
}

/// Rule 10011: signing keys meet a minimum size.
#[derive(Clone, Debug, Default)]
pub struct StrongKeyLengthRule {
    calculator: Arc<BitStrengthCalculator>,
}

impl StrongKeyLengthRule {
    pub fn new(calculator: Arc<BitStrengthCalculator>) -> Self {
        Self { calculator }
    }
}

impl RuleDescriptor for StrongKeyLengthRule {
    fn rule_id(&self) -> u32 {
        10011
    }

    fn rule_name(&self) -> &'static str {
        "Strong Key Length"
    }

    fn short_description(&self) -> &'static str {
        "Validates the key length of a signing certificate."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for StrongKeyLengthRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        config: &CheckConfiguration,
    ) -> RuleResult {
        let min_dsa = if config.rule_set.flags().contains(RuleSet::MODERN) {
            MIN_DSA_KEY_SIZE
        } else {
            MIN_COMPAT_DSA_KEY_SIZE
        };

        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY, true) {
            let Some(certificate) = signature.certificate() else {
                logger.log_signature_message(signature, NO_CERTIFICATE);
                result = RuleResult::Fail;
                continue;
            };

            let strength = self.calculator.calculate_strength(certificate);
            let message = match (strength.algorithm, strength.bit_size) {
                (PublicKeyAlgorithm::Other, _) | (_, None) => {
                    Some(unknown_key_message(strength.algorithm))
                }
                (PublicKeyAlgorithm::Ecdsa, Some(size)) if size < MIN_ECDSA_KEY_SIZE => {
                    Some(below_minimum("an ECDSA", size, MIN_ECDSA_KEY_SIZE))
                }
                (PublicKeyAlgorithm::Rsa, Some(size)) if size < MIN_RSA_KEY_SIZE => {
                    Some(below_minimum("a RSA", size, MIN_RSA_KEY_SIZE))
                }
                (PublicKeyAlgorithm::Dsa, Some(size)) if size < min_dsa => {
                    Some(below_minimum("a DSA", size, min_dsa))
                }
                _ => None,
            };

            if let Some(message) = message {
                logger.log_signature_message(signature, &message);
                result = RuleResult::Fail;
            }
        }

        result
    }
}

/// Rule 10012: the primary signature uses an RSA or DSA key.
#[derive(Clone, Debug, Default)]
pub struct RsaDsaPrimarySignatureRule {
    calculator: Arc<BitStrengthCalculator>,
}

impl RsaDsaPrimarySignatureRule {
    pub fn new(calculator: Arc<BitStrengthCalculator>) -> Self {
        Self { calculator }
    }
}

impl RuleDescriptor for RsaDsaPrimarySignatureRule {
    fn rule_id(&self) -> u32 {
        10012
    }

    fn rule_name(&self) -> &'static str {
        "RSA/DSA Primary Signature"
    }

    fn short_description(&self) -> &'static str {
        "Primary signature should be RSA or DSA."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::COMPAT
    }
}

impl SignatureRule for RsaDsaPrimarySignatureRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let Some(primary) = graph.primary() else {
            return RuleResult::Fail;
        };

        let Some(certificate) = primary.certificate() else {
            logger.log_signature_message(primary, NO_CERTIFICATE);
            return RuleResult::Fail;
        };

        let algorithm = self.calculator.calculate_strength(certificate).algorithm;
        if !matches!(algorithm, PublicKeyAlgorithm::Rsa | PublicKeyAlgorithm::Dsa) {
            logger.log_signature_message(
                primary,
                &format!("Primary signature should use RSA or DSA key but uses {algorithm}."),
            );
            return RuleResult::Fail;
        }

        RuleResult::Pass
    }
}

/// Rule 10013: signing keys stay below the sizes older verifiers accept.
#[derive(Clone, Debug, Default)]
pub struct MaxKeyLengthRule {
    calculator: Arc<BitStrengthCalculator>,
}

impl MaxKeyLengthRule {
    pub fn new(calculator: Arc<BitStrengthCalculator>) -> Self {
        Self { calculator }
    }
}

impl RuleDescriptor for MaxKeyLengthRule {
    fn rule_id(&self) -> u32 {
        10013
    }

    fn rule_name(&self) -> &'static str {
        "Maximum Key Length"
    }

    fn short_description(&self) -> &'static str {
        "Validates the maximum key length of a signing certificate."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for MaxKeyLengthRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY, true) {
            let Some(certificate) = signature.certificate() else {
                logger.log_signature_message(signature, NO_CERTIFICATE);
                result = RuleResult::Fail;
                continue;
            };

            let strength = self.calculator.calculate_strength(certificate);
            let message = match (strength.algorithm, strength.bit_size) {
                (PublicKeyAlgorithm::Other, _) | (_, None) => {
                    Some(unknown_key_message(strength.algorithm))
                }
                (algorithm, Some(size)) => {
                    let max = match algorithm {
                        PublicKeyAlgorithm::Ecdsa => MAX_ECDSA_KEY_SIZE,
                        PublicKeyAlgorithm::Rsa => MAX_RSA_KEY_SIZE,
                        _ => MAX_DSA_KEY_SIZE,
                    };
                    (size > max).then(|| above_maximum(algorithm, size, max))
                }
            };

            if let Some(message) = message {
                logger.log_signature_message(signature, &message);
                result = RuleResult::Fail;
            }
        }

        result
    }
}
