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

//! Summary information about a DER-encoded X.509 certificate.

use asn1_rs::FromDer;
use thiserror::Error;
use x509_parser::certificate::X509Certificate;

use crate::hash::thumbprint;

/// Describes errors that can occur when reading a certificate.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum CertificateError {
    /// The certificate could not be parsed.
    #[error("the certificate could not be parsed")]
    InvalidCertificate,
}

/// The parts of a certificate used for reporting and chain building.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificateInfo {
    /// Upper-case hex SHA-1 of the certificate DER.
    pub thumbprint: String,

    /// Subject distinguished name, RFC 4514 style.
    pub subject: String,

    /// Serial number as upper-case hex.
    pub serial_number: String,

    /// OID of the algorithm the issuer used to sign this certificate.
    pub signature_algorithm: String,

    issuer_raw: Vec<u8>,
    subject_raw: Vec<u8>,
}

impl CertificateInfo {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_rem, cert) =
            X509Certificate::from_der(der).map_err(|_err| CertificateError::InvalidCertificate)?;

        let tbs = &cert.tbs_certificate;

        Ok(Self {
            thumbprint: thumbprint(der),
            subject: tbs.subject().to_string(),
            serial_number: hex::encode_upper(tbs.raw_serial()),
            signature_algorithm: cert.signature_algorithm.algorithm.to_id_string(),
            issuer_raw: tbs.issuer().as_raw().to_vec(),
            subject_raw: tbs.subject().as_raw().to_vec(),
        })
    }

    /// Returns `true` if the issuer and subject names are identical.
    pub fn is_self_issued(&self) -> bool {
        self.issuer_raw == self.subject_raw
    }

    /// Returns `true` if `issuer`'s subject is this certificate's issuer.
    pub fn is_issued_by(&self, issuer: &CertificateInfo) -> bool {
        self.issuer_raw == issuer.subject_raw
    }
}
