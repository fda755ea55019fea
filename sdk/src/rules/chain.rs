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

//! Rules that look at the certificates embedded with each signature.

use std::collections::HashSet;

use authlint_crypto::{
    certificate::CertificateInfo,
    chain::{build_chain, validate_chain_strength, ChainFindingKind},
    hash::thumbprint,
    oids,
};
use log::debug;

use super::{RuleDescriptor, RuleResult, SignatureRule};
use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    signature::{Graph, SignatureKind},
};

/// Rule 10006: certificates in the signing chain are signed with algorithms
/// at least as strong as the signature's digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct SigningCertificateDigestAlgorithmRule;

impl RuleDescriptor for SigningCertificateDigestAlgorithmRule {
    fn rule_id(&self) -> u32 {
        10006
    }

    fn rule_name(&self) -> &'static str {
        "Strong Certificate Chain"
    }

    fn short_description(&self) -> &'static str {
        "Checks the signing certificate's and chain's signature algorithm."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for SigningCertificateDigestAlgorithmRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY_SIGNATURE, true) {
            let Some(certificate) = signature.certificate() else {
                logger.log_signature_message(
                    signature,
                    "Cannot build a chain successfully without a signing certificate.",
                );
                result = RuleResult::Fail;
                continue;
            };

            let chain = match build_chain(certificate, signature.additional_certificates()) {
                Ok(chain) => chain,
                Err(err) => {
                    debug!("chain building failed: {err}");
                    logger.log_signature_message(
                        signature,
                        &format!(
                            "Cannot build a chain successfully with signing certificate {}.",
                            thumbprint(certificate)
                        ),
                    );
                    result = RuleResult::Fail;
                    continue;
                }
            };

            let leaf_algorithm = chain
                .leaf()
                .map(|leaf| oids::display_name(&leaf.info.signature_algorithm))
                .unwrap_or_default();

            let report =
                validate_chain_strength(signature.digest_algorithm(), &chain, config.chain_policy);

            let digest = signature.digest_algorithm_name();
            for finding in &report.findings {
                let algorithm = oids::display_name(&finding.signature_algorithm);
                let message = match finding.kind {
                    ChainFindingKind::WeakerThanDigest => {
                        weaker_than_digest(&finding.thumbprint, &algorithm, &digest)
                    }
                    ChainFindingKind::WeakerThanLeaf => {
                        weaker_than_leaf(&finding.thumbprint, &algorithm, &leaf_algorithm)
                    }
                };
                logger.log_signature_message(signature, &message);
            }

            if !report.passed() {
                result = RuleResult::Fail;
            }
        }

        result
    }
}

fn weaker_than_digest(thumbprint: &str, algorithm: &str, digest: &str) -> String {
    format!(
        "Certificate {thumbprint} in chain uses {algorithm} for its signature algorithm instead of at least {digest}."
    )
}

fn weaker_than_leaf(thumbprint: &str, algorithm: &str, leaf_algorithm: &str) -> String {
    format!(
        "Certificate {thumbprint} in chain uses {algorithm} for its signature algorithm which is weaker than the signing certificate's {leaf_algorithm}."
    )
}

/// Rule 10010: every embedded certificate belongs to the chain of a signer
/// or countersigner.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUnknownCertificatesRule;

impl RuleDescriptor for NoUnknownCertificatesRule {
    fn rule_id(&self) -> u32 {
        10010
    }

    fn rule_name(&self) -> &'static str {
        "No Unknown Certificates"
    }

    fn short_description(&self) -> &'static str {
        "Checks for unknown embedded certificates."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for NoUnknownCertificatesRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        // Authenticode timestamps share their parent's certificate set, so
        // they are checked as part of the parent.
        let kinds = SignatureKind::ANY_SIGNATURE | SignatureKind::RFC3161_TIMESTAMP;

        for signature in graph.visit_all(kinds, false) {
            let pool = signature.additional_certificates();

            let mut signers: Vec<&[u8]> = signature.certificate().into_iter().collect();
            signers.extend(
                signature
                    .counter_signatures()
                    .visit_all(SignatureKind::AUTHENTICODE_TIMESTAMP, false)
                    .filter_map(|counter_signature| counter_signature.certificate()),
            );

            let mut known: HashSet<String> = HashSet::new();
            for signer in signers {
                match build_chain(signer, pool) {
                    Ok(chain) => known.extend(
                        chain
                            .elements()
                            .iter()
                            .map(|element| element.info.thumbprint.clone()),
                    ),
                    Err(err) => debug!("skipping signer certificate: {err}"),
                }
            }

            for der in pool {
                match CertificateInfo::from_der(der) {
                    Ok(info) if known.contains(&info.thumbprint) => {}
                    Ok(info) => {
                        logger.log_signature_message(
                            signature,
                            &format!(
                                "Signature contained untrusted certificate \"{}\" ({}).",
                                info.subject, info.thumbprint
                            ),
                        );
                        result = RuleResult::Fail;
                    }
                    Err(_) => {
                        logger.log_signature_message(
                            signature,
                            &format!(
                                "Signature contained unreadable certificate ({}).",
                                thumbprint(der)
                            ),
                        );
                        result = RuleResult::Fail;
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use authlint_crypto::{chain::IntermediateStrengthPolicy, hash::thumbprint};

    use super::*;
    use crate::{
        logger::MemorySignatureLogger,
        rules::test_support::graph_of,
        utils::test::{certificate, KeySpec, TestSigner},
    };

    fn run(
        rule: &dyn SignatureRule,
        graph: &Graph,
        config: &CheckConfiguration,
    ) -> (RuleResult, Vec<String>) {
        let mut logger = MemorySignatureLogger::new();
        let result = rule.validate(graph, &mut logger, config);
        (result, logger.into_messages())
    }

    /// Leaf issued by an intermediate issued by a self-signed root.
    fn three_level_signer(
        digest: &str,
        leaf_alg: &str,
        intermediate_alg: &str,
    ) -> (TestSigner, Vec<u8>) {
        let root = certificate("Chain Root", "Chain Root", oids::SHA256_RSA, KeySpec::Rsa(4096));
        let intermediate =
            certificate("Chain Intermediate", "Chain Root", intermediate_alg, KeySpec::Rsa(2048));
        let leaf = certificate("Chain Leaf", "Chain Intermediate", leaf_alg, KeySpec::Rsa(2048));

        let signer = TestSigner::new(digest)
            .with_certificate(leaf)
            .with_extra_certificate(intermediate.clone())
            .with_extra_certificate(root);
        (signer, intermediate)
    }

    #[test]
    fn strong_chain_passes() {
        let (signer, _) = three_level_signer(oids::SHA256, oids::SHA256_RSA, oids::SHA384_RSA);
        let graph = graph_of(&[signer]);

        let (result, messages) = run(
            &SigningCertificateDigestAlgorithmRule,
            &graph,
            &CheckConfiguration::default(),
        );
        assert_eq!(result, RuleResult::Pass);
        assert!(messages.is_empty());
    }

    #[test]
    fn intermediate_weaker_than_digest_fails() {
        let (signer, intermediate) =
            three_level_signer(oids::SHA256, oids::SHA256_RSA, oids::SHA1_RSA);
        let graph = graph_of(&[signer]);

        let (result, messages) = run(
            &SigningCertificateDigestAlgorithmRule,
            &graph,
            &CheckConfiguration::default(),
        );
        assert_eq!(result, RuleResult::Fail);
        assert_eq!(messages.len(), 1);
        let expected = format!(
            "Certificate {} in chain uses sha1RSA for its signature algorithm instead of at least SHA256.",
            thumbprint(&intermediate)
        );
        assert!(messages[0].ends_with(&expected));
    }

    #[test]
    fn intermediate_weaker_than_leaf_follows_policy() {
        // SHA1 digest, SHA384 leaf, SHA256 intermediate.
        let (signer, _) = three_level_signer(oids::SHA1, oids::SHA384_RSA, oids::SHA256_RSA);
        let graph = graph_of(&[signer]);

        let mut config = CheckConfiguration::default();
        let (result, messages) = run(&SigningCertificateDigestAlgorithmRule, &graph, &config);
        assert_eq!(result, RuleResult::Pass);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("weaker than the signing certificate's sha384RSA"));

        config.chain_policy = IntermediateStrengthPolicy::Enforce;
        assert_eq!(
            run(&SigningCertificateDigestAlgorithmRule, &graph, &config).0,
            RuleResult::Fail
        );

        config.chain_policy = IntermediateStrengthPolicy::Ignore;
        assert_eq!(
            run(&SigningCertificateDigestAlgorithmRule, &graph, &config),
            (RuleResult::Pass, vec![])
        );
    }

    #[test]
    fn missing_signing_certificate_fails() {
        let graph = graph_of(&[TestSigner::sha256().without_embedded_certificate()]);
        let (result, messages) = run(
            &SigningCertificateDigestAlgorithmRule,
            &graph,
            &CheckConfiguration::default(),
        );

        let expected = "Cannot build a chain successfully without a signing certificate.";
        assert_eq!(result, RuleResult::Fail);
        assert!(messages[0].ends_with(expected));
    }

    #[test]
    fn chain_certificates_are_known() {
        let (signer, _) = three_level_signer(oids::SHA256, oids::SHA256_RSA, oids::SHA256_RSA);
        let (result, messages) = run(
            &NoUnknownCertificatesRule,
            &graph_of(&[signer]),
            &CheckConfiguration::default(),
        );
        assert_eq!(result, RuleResult::Pass);
        assert!(messages.is_empty());
    }

    #[test]
    fn stray_certificate_is_reported() {
        let stray = certificate("Stray", "Somebody Else", oids::SHA256_RSA, KeySpec::Rsa(2048));
        let signer = TestSigner::sha256().with_extra_certificate(stray.clone());
        let (result, messages) = run(
            &NoUnknownCertificatesRule,
            &graph_of(&[signer]),
            &CheckConfiguration::default(),
        );

        assert_eq!(result, RuleResult::Fail);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].ends_with(&format!(
            "Signature contained untrusted certificate \"CN=Stray\" ({}).",
            thumbprint(&stray)
        )));
    }

    #[test]
    fn authenticode_timestamp_certificate_is_known() {
        let timestamp = TestSigner::sha256();
        let timestamp_certificate = timestamp.certificate.clone();
        let signer = TestSigner::sha256()
            .with_extra_certificate(timestamp_certificate)
            .unsigned(oids::AUTHENTICODE_COUNTER_SIGNATURE, timestamp.signer_info());

        let (result, messages) = run(
            &NoUnknownCertificatesRule,
            &graph_of(&[signer]),
            &CheckConfiguration::default(),
        );
        assert_eq!(result, RuleResult::Pass, "{messages:?}");
    }
}
