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

//! Public key bit strength of signing certificates.
//!
//! RSA and DSA sizes are read directly from the key material. ECDSA sizes
//! come from the named curve in the key's domain parameters, resolved
//! through a [`CurveSizeCache`] shared by every calculator that holds it.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use asn1_rs::{Any, FromDer, Tag};
use log::debug;
use serde::Serialize;
use x509_parser::{certificate::X509Certificate, public_key::PublicKey, x509::SubjectPublicKeyInfo};

use crate::oids;

/// Public key algorithm families recognized by the strength rules.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum PublicKeyAlgorithm {
    /// RSA keys.
    Rsa,
    /// DSA keys.
    Dsa,
    /// Elliptic curve keys.
    Ecdsa,
    /// Anything else, including certificates that could not be read.
    Other,
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rsa => "RSA",
            Self::Dsa => "DSA",
            Self::Ecdsa => "ECDSA",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Algorithm family and key size of a certificate's public key.
///
/// A `bit_size` of `None` means the size could not be determined. Callers
/// must treat that as a failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct CertificateBitStrength {
    /// Key algorithm family.
    pub algorithm: PublicKeyAlgorithm,

    /// Key size in bits, if known.
    pub bit_size: Option<u32>,
}

impl CertificateBitStrength {
    fn unknown(algorithm: PublicKeyAlgorithm) -> Self {
        Self {
            algorithm,
            bit_size: None,
        }
    }
}

/// Concurrent memo of named curve OID to key size.
///
/// Only curves with a known size are stored, so the cache is bounded by the
/// resolver's table no matter which OIDs a file supplies.
#[derive(Debug, Default)]
pub struct CurveSizeCache {
    sizes: RwLock<HashMap<String, u32>>,
}

impl CurveSizeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached size for `curve_oid`, computing it with `resolve` on
    /// a miss. A `None` from `resolve` is returned without being cached.
    pub fn get_or_insert_with<F>(&self, curve_oid: &str, resolve: F) -> Option<u32>
    where
        F: FnOnce(&str) -> Option<u32>,
    {
        if let Ok(sizes) = self.sizes.read() {
            if let Some(size) = sizes.get(curve_oid) {
                return Some(*size);
            }
        }

        let Some(size) = resolve(curve_oid) else {
            debug!("curve {curve_oid} has no known size");
            return None;
        };
        debug!("caching curve {curve_oid} with size {size}");

        if let Ok(mut sizes) = self.sizes.write() {
            sizes.insert(curve_oid.to_owned(), size);
        }

        Some(size)
    }

    /// Number of curves resolved so far.
    pub fn len(&self) -> usize {
        self.sizes.read().map(|sizes| sizes.len()).unwrap_or_default()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key size of a named curve, or `None` if the curve is unknown.
pub fn named_curve_size(curve_oid: &str) -> Option<u32> {
    match curve_oid {
        oids::CURVE_P192 => Some(192),
        oids::CURVE_P224 => Some(224),
        oids::CURVE_P256 | oids::CURVE_SECP256K1 | oids::CURVE_BRAINPOOL_P256R1 => Some(256),
        oids::CURVE_P384 | oids::CURVE_BRAINPOOL_P384R1 => Some(384),
        oids::CURVE_BRAINPOOL_P512R1 => Some(512),
        oids::CURVE_P521 => Some(521),
        _ => None,
    }
}

/// Classifies certificate public keys.
#[derive(Clone, Debug, Default)]
pub struct BitStrengthCalculator {
    curves: Arc<CurveSizeCache>,
}

impl BitStrengthCalculator {
    /// Create a calculator that memoizes curve sizes in `curves`.
    pub fn new(curves: Arc<CurveSizeCache>) -> Self {
        Self { curves }
    }

    /// The curve cache backing this calculator.
    pub fn curve_cache(&self) -> &Arc<CurveSizeCache> {
        &self.curves
    }

    /// Classify the public key of a DER-encoded certificate.
    ///
    /// Never fails: a certificate that cannot be parsed is reported as
    /// [`PublicKeyAlgorithm::Other`] with an unknown size.
    pub fn calculate_strength(&self, certificate_der: &[u8]) -> CertificateBitStrength {
        match X509Certificate::from_der(certificate_der) {
            Ok((_rem, cert)) => self.public_key_strength(cert.public_key()),
            Err(err) => {
                debug!("unable to parse certificate for key strength: {err}");
                CertificateBitStrength::unknown(PublicKeyAlgorithm::Other)
            }
        }
    }

    /// Classify a subject public key info structure.
    pub fn public_key_strength(&self, spki: &SubjectPublicKeyInfo<'_>) -> CertificateBitStrength {
        let key_algorithm = spki.algorithm.algorithm.to_id_string();

        match key_algorithm.as_str() {
            oids::RSA => {
                let bit_size = match spki.parsed() {
                    Ok(PublicKey::RSA(rsa)) => bit_length(rsa.modulus),
                    _ => None,
                };
                CertificateBitStrength {
                    algorithm: PublicKeyAlgorithm::Rsa,
                    bit_size,
                }
            }

            oids::DSA => CertificateBitStrength {
                algorithm: PublicKeyAlgorithm::Dsa,
                bit_size: spki.algorithm.parameters.as_ref().and_then(dsa_prime_size),
            },

            oids::EC_PUBLIC_KEY => {
                let bit_size = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .and_then(|parameters| parameters.as_oid().ok())
                    .and_then(|curve| {
                        self.curves
                            .get_or_insert_with(&curve.to_id_string(), named_curve_size)
                    });

                CertificateBitStrength {
                    algorithm: PublicKeyAlgorithm::Ecdsa,
                    bit_size,
                }
            }

            _ => CertificateBitStrength::unknown(PublicKeyAlgorithm::Other),
        }
    }
}

// Dss-Parms ::= SEQUENCE { p INTEGER, q INTEGER, g INTEGER }
fn dsa_prime_size(parameters: &Any<'_>) -> Option<u32> {
    let seq = parameters.as_sequence().ok()?;
    let (_rem, p) = Any::from_der(&seq.content).ok()?;
    if p.tag() != Tag::Integer {
        return None;
    }
    bit_length(p.as_bytes())
}

/// Bit length of a big-endian unsigned integer, ignoring leading zero bytes.
fn bit_length(be_bytes: &[u8]) -> Option<u32> {
    let significant = be_bytes
        .iter()
        .position(|b| *b != 0)
        .map(|start| &be_bytes[start..])?;

    let top_bits = 8 - significant[0].leading_zeros();
    u32::try_from(significant.len() - 1)
        .ok()
        .map(|bytes| bytes * 8 + top_bits)
}
