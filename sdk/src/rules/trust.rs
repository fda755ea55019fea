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

//! Signature validity, delegated to a [`TrustVerifier`].

use std::{path::Path, sync::Arc};

use log::debug;

use super::{FileRule, RuleDescriptor, RuleResult};
use crate::{
    config::{CheckConfiguration, RevocationChecking, RuleSet},
    error::Error,
    extract::SignatureExtractor,
    logger::SignatureLogger,
    signature::SignatureKind,
};

/// Decides whether the signatures of a file can be trusted.
pub trait TrustVerifier: Send + Sync {
    /// Returns a short reason when the file's signatures are not valid.
    fn verify(&self, path: &Path, revocation: RevocationChecking) -> Result<(), String>;
}

/// A [`TrustVerifier`] that only needs the file itself.
///
/// Every signature and countersignature must decode and resolve its signing
/// certificate from the certificates embedded in the file. Revocation is not
/// checked.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedSignerVerifier;

impl TrustVerifier for EmbeddedSignerVerifier {
    fn verify(&self, path: &Path, revocation: RevocationChecking) -> Result<(), String> {
        if revocation != RevocationChecking::None {
            debug!("revocation checking ({revocation:?}) is not performed for embedded signers");
        }

        let graph = SignatureExtractor
            .extract_file(path)
            .map_err(|err| err.to_string())?;

        if graph.is_empty() {
            return Err("NotSigned".to_owned());
        }

        for signature in graph.visit_all(SignatureKind::ANY, true) {
            if signature.certificate().is_none() {
                let identity = signature.identity().unwrap_or_default();
                return Err(Error::UnresolvableCertificate(identity).to_string());
            }

            let nested = signature.nested().malformed();
            let counters = signature.counter_signatures().malformed();
            if let Some(branch) = nested.iter().chain(counters).next() {
                return Err(Error::MalformedSignature(branch.reason.clone()).to_string());
            }
        }

        Ok(())
    }
}

/// Rule 10007
pub struct TrustedSignatureRule {
    verifier: Arc<dyn TrustVerifier>,
}

impl TrustedSignatureRule {
    pub fn new(verifier: Arc<dyn TrustVerifier>) -> Self {
        Self { verifier }
    }
}

impl RuleDescriptor for TrustedSignatureRule {
    fn rule_id(&self) -> u32 {
        10007
    }

    fn rule_name(&self) -> &'static str {
        "Valid Signature"
    }

    fn short_description(&self) -> &'static str {
        "Validates the file has correct signatures."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl FileRule for TrustedSignatureRule {
    fn validate(
        &self,
        path: &Path,
        logger: &mut dyn SignatureLogger,
        config: &CheckConfiguration,
    ) -> RuleResult {
        match self.verifier.verify(path, config.revocation_mode) {
            Ok(()) => RuleResult::Pass,
            Err(reason) => {
                logger.log_message(&format!(
                    "Authenticode signature validation failed with '{reason}'."
                ));
                RuleResult::Fail
            }
        }
    }
}
