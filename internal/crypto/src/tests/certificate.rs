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

use super::fixtures::rsa_certificate;
use crate::{certificate::CertificateInfo, hash::thumbprint, oids};

#[test]
fn summary_fields() {
    let der = rsa_certificate("Contoso Code Signing", "Contoso CA", oids::SHA256_RSA);
    let info = CertificateInfo::from_der(&der).unwrap();

    assert_eq!(info.subject, "CN=Contoso Code Signing");
    assert_eq!(info.signature_algorithm, oids::SHA256_RSA);
    assert_eq!(info.thumbprint, thumbprint(&der));
    assert_eq!(info.thumbprint.len(), 40);
    assert!(!info.serial_number.is_empty());
    assert!(!info.is_self_issued());
}

#[test]
fn issuer_matching() {
    let leaf = CertificateInfo::from_der(&rsa_certificate("Leaf", "CA", oids::SHA256_RSA)).unwrap();
    let ca = CertificateInfo::from_der(&rsa_certificate("CA", "CA", oids::SHA256_RSA)).unwrap();

    assert!(leaf.is_issued_by(&ca));
    assert!(!ca.is_issued_by(&leaf));
    assert!(ca.is_self_issued());
}

#[test]
fn garbage_is_rejected() {
    assert!(CertificateInfo::from_der(&[0x30, 0x03, 0x02, 0x01, 0x01]).is_err());
}
