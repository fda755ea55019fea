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

//! Signature-free certificate chain building and chain strength comparison.
//!
//! Chains are built purely by matching issuer and subject names over the
//! certificates embedded next to a signature. Nothing here verifies a
//! signature or consults a trust store; the chain exists only so callers know
//! which certificates are intermediates and which one is the root.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    certificate::{CertificateError, CertificateInfo},
    digest_strength::digest_strength,
};

/// One certificate of a [`CertificateChain`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainElement {
    /// DER encoding of the certificate.
    pub der: Vec<u8>,

    /// Parsed summary of the certificate.
    pub info: CertificateInfo,
}

/// A certificate chain ordered from leaf to root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificateChain {
    elements: Vec<ChainElement>,
    complete: bool,
}

impl CertificateChain {
    /// All elements, leaf first.
    pub fn elements(&self) -> &[ChainElement] {
        &self.elements
    }

    /// The signing (leaf) certificate.
    pub fn leaf(&self) -> Option<&ChainElement> {
        self.elements.first()
    }

    /// Returns `true` if the chain ends in a self-issued certificate.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Elements that are subject to strength checks: everything except a
    /// self-issued root.
    pub fn non_root(&self) -> &[ChainElement] {
        match (self.complete, self.elements.split_last()) {
            (true, Some((_root, rest))) => rest,
            _ => &self.elements,
        }
    }

    /// Returns `true` if a certificate with `thumbprint` is part of the chain.
    pub fn contains(&self, thumbprint: &str) -> bool {
        self.elements.iter().any(|e| e.info.thumbprint == thumbprint)
    }
}

/// Build the chain for `leaf_der` using certificates from `pool`.
///
/// Certificates in `pool` that cannot be parsed are ignored. The chain stops
/// at the first self-issued certificate, when no issuer is found, or when a
/// certificate would repeat.
pub fn build_chain<C: AsRef<[u8]>>(
    leaf_der: &[u8],
    pool: &[C],
) -> Result<CertificateChain, CertificateError> {
    let leaf = ChainElement {
        der: leaf_der.to_vec(),
        info: CertificateInfo::from_der(leaf_der)?,
    };

    let candidates: Vec<ChainElement> = pool
        .iter()
        .filter_map(|der| {
            let der = der.as_ref();
            match CertificateInfo::from_der(der) {
                Ok(info) => Some(ChainElement {
                    der: der.to_vec(),
                    info,
                }),
                Err(_) => {
                    debug!("skipping unparsable certificate in chain pool");
                    None
                }
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(leaf.info.thumbprint.clone());

    let mut elements = vec![leaf];
    let mut complete = false;

    while let Some(current) = elements.last() {
        if current.info.is_self_issued() {
            complete = true;
            break;
        }

        let issuer = candidates
            .iter()
            .find(|c| current.info.is_issued_by(&c.info) && !seen.contains(&c.info.thumbprint));

        match issuer {
            Some(issuer) => {
                seen.insert(issuer.info.thumbprint.clone());
                elements.push(issuer.clone());
            }
            None => break,
        }
    }

    Ok(CertificateChain { elements, complete })
}

/// How intermediates weaker than the leaf certificate are treated.
///
/// Every element must always be at least as strong as the signature's
/// digest. This policy only governs the additional comparison against the
/// leaf certificate's own signature algorithm.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntermediateStrengthPolicy {
    /// Do not compare intermediates with the leaf.
    Ignore,

    /// Report weaker intermediates without failing.
    #[default]
    Warn,

    /// Report weaker intermediates and fail.
    Enforce,
}

/// Why a chain element was reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChainFindingKind {
    /// The element is signed with an algorithm weaker than the signature's
    /// digest.
    WeakerThanDigest,

    /// The element is weaker than the leaf certificate's signature algorithm.
    WeakerThanLeaf,
}

/// A chain element that fell short of the required strength.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainFinding {
    /// What the element fell short of.
    pub kind: ChainFindingKind,

    /// Thumbprint of the offending certificate.
    pub thumbprint: String,

    /// OID of the offending certificate's signature algorithm.
    pub signature_algorithm: String,

    /// Whether this finding fails the chain.
    pub fails: bool,
}

/// Result of [`validate_chain_strength`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChainStrengthReport {
    /// Findings in chain order.
    pub findings: Vec<ChainFinding>,
}

impl ChainStrengthReport {
    /// Returns `true` if no finding fails the chain.
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(|f| f.fails)
    }
}

/// Compare every non-root element of `chain` with the signature's digest.
pub fn validate_chain_strength(
    digest_oid: &str,
    chain: &CertificateChain,
    policy: IntermediateStrengthPolicy,
) -> ChainStrengthReport {
    let signature_strength = digest_strength(digest_oid);
    let leaf_strength = chain
        .leaf()
        .map(|leaf| digest_strength(&leaf.info.signature_algorithm))
        .unwrap_or_default();

    let mut report = ChainStrengthReport::default();

    for element in chain.non_root() {
        let strength = digest_strength(&element.info.signature_algorithm);

        let (kind, fails) = if strength < signature_strength {
            (ChainFindingKind::WeakerThanDigest, true)
        } else if strength < leaf_strength {
            match policy {
                IntermediateStrengthPolicy::Ignore => continue,
                IntermediateStrengthPolicy::Warn => (ChainFindingKind::WeakerThanLeaf, false),
                IntermediateStrengthPolicy::Enforce => (ChainFindingKind::WeakerThanLeaf, true),
            }
        } else {
            continue;
        };

        report.findings.push(ChainFinding {
            kind,
            thumbprint: element.info.thumbprint.clone(),
            signature_algorithm: element.info.signature_algorithm.clone(),
            fails,
        });
    }

    report
}
