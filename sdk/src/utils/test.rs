// Copyright 2022 Adobe. All rights reserved.
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

#![allow(clippy::unwrap_used)]

//! Builders for PE images, certificates and CMS blobs used across the unit
//! tests. Signature values are placeholders; nothing in this crate verifies
//! them.

use std::{
    collections::BTreeMap,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use authlint_crypto::{hash::sha1, oids};
use cms::{
    cert::{CertificateChoices, IssuerAndSerialNumber},
    content_info::{CmsVersion, ContentInfo},
    signed_data::{
        CertificateSet, EncapsulatedContentInfo, SignedData, SignerIdentifier, SignerInfo,
        SignerInfos,
    },
};
use const_oid::db::rfc5911;
use der::{
    asn1::{BitString, OctetString, SetOfVec, UtcTime},
    oid::ObjectIdentifier,
    Any, Decode, Encode,
};
use x509_cert::{
    attr::Attribute,
    certificate::{TbsCertificate, Version},
    name::Name,
    serial_number::SerialNumber,
    spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned},
    time::{Time, Validity},
    Certificate,
};

/// `SpcIndirectDataContent`
const SPC_INDIRECT_DATA: &str = "1.3.6.1.4.1.311.2.1.4";

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

fn next_id() -> u32 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A minimal PE32+ image with no sections.
///
/// When `certificate_table` is given it is appended to the file and the
/// security data directory points at it.
pub fn pe_image(certificate_table: Option<&[u8]>) -> Vec<u8> {
    const E_LFANEW: usize = 0x40;
    const OPTIONAL_HEADER: usize = E_LFANEW + 4 + 20;
    const SIZE_OF_HEADERS: usize = 0x200;

    let mut image = vec![0u8; SIZE_OF_HEADERS];

    image[..2].copy_from_slice(b"MZ");
    image[0x3c..0x40].copy_from_slice(&(E_LFANEW as u32).to_le_bytes());
    image[E_LFANEW..E_LFANEW + 4].copy_from_slice(b"PE\0\0");

    // IMAGE_FILE_HEADER
    let file_header = E_LFANEW + 4;
    image[file_header..file_header + 2].copy_from_slice(&0x8664u16.to_le_bytes());
    image[file_header + 16..file_header + 18].copy_from_slice(&240u16.to_le_bytes());
    image[file_header + 18..file_header + 20].copy_from_slice(&0x0022u16.to_le_bytes());

    // IMAGE_OPTIONAL_HEADER64
    let put_u32 = |image: &mut Vec<u8>, offset: usize, value: u32| {
        image[OPTIONAL_HEADER + offset..OPTIONAL_HEADER + offset + 4]
            .copy_from_slice(&value.to_le_bytes());
    };
    image[OPTIONAL_HEADER..OPTIONAL_HEADER + 2].copy_from_slice(&0x020bu16.to_le_bytes());
    image[OPTIONAL_HEADER + 24..OPTIONAL_HEADER + 32]
        .copy_from_slice(&0x1_4000_0000u64.to_le_bytes());
    put_u32(&mut image, 32, 0x1000); // SectionAlignment
    put_u32(&mut image, 36, 0x200); // FileAlignment
    put_u32(&mut image, 56, 0x1000); // SizeOfImage
    put_u32(&mut image, 60, SIZE_OF_HEADERS as u32);
    put_u32(&mut image, 108, 16); // NumberOfRvaAndSizes

    if let Some(table) = certificate_table {
        let security_directory = 112 + 8 * 4;
        let offset = image.len() as u32;
        put_u32(&mut image, security_directory, offset);
        put_u32(&mut image, security_directory + 4, table.len() as u32);
        image.extend_from_slice(table);
    }

    image
}

/// A WIN_CERTIFICATE entry holding `signed_data` followed by `padding`.
pub fn win_certificate(signed_data: &[u8], padding: &[u8]) -> Vec<u8> {
    let length = (8 + signed_data.len() + padding.len()) as u32;

    let mut entry = Vec::with_capacity(length as usize);
    entry.extend_from_slice(&length.to_le_bytes());
    entry.extend_from_slice(&0x0200u16.to_le_bytes());
    entry.extend_from_slice(&0x0002u16.to_le_bytes());
    entry.extend_from_slice(signed_data);
    entry.extend_from_slice(padding);
    entry
}

/// A PE image whose certificate table holds a single signed data entry.
pub fn signed_pe(signed_data: &[u8], padding: &[u8]) -> Vec<u8> {
    pe_image(Some(&win_certificate(signed_data, padding)))
}

/// Encode a DER TLV with a definite length.
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        out.push(0x80 | (bytes.len() - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
    out.extend_from_slice(content);
    out
}

fn integer(magnitude: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(magnitude.len() + 1);
    if magnitude.first().is_some_and(|b| b & 0x80 != 0) {
        content.push(0);
    }
    content.extend_from_slice(magnitude);
    tlv(0x02, &content)
}

fn magnitude(bits: usize) -> Vec<u8> {
    let mut value = vec![0x5a; bits / 8];
    value[0] = 0xc1;
    value
}

/// Subject public key shapes.
pub enum KeySpec {
    Rsa(usize),
    Dsa(usize),
    NamedCurve(&'static str),
    /// Raw DER of the EC domain parameters.
    EcParameters(Vec<u8>),
}

fn key_material(key: &KeySpec) -> (ObjectIdentifier, Option<Any>, Vec<u8>) {
    match key {
        KeySpec::Rsa(bits) => (
            ObjectIdentifier::new_unwrap(oids::RSA),
            Some(Any::null()),
            tlv(
                0x30,
                &[integer(&magnitude(*bits)), integer(&[0x01, 0x00, 0x01])].concat(),
            ),
        ),
        KeySpec::Dsa(bits) => {
            let params = tlv(
                0x30,
                &[
                    integer(&magnitude(*bits)),
                    integer(&magnitude(256)),
                    integer(&[0x02]),
                ]
                .concat(),
            );
            (
                ObjectIdentifier::new_unwrap(oids::DSA),
                Some(Any::from_der(&params).unwrap()),
                integer(&magnitude(*bits)),
            )
        }
        KeySpec::NamedCurve(curve) => (
            ObjectIdentifier::new_unwrap(oids::EC_PUBLIC_KEY),
            Some(Any::encode_from(&ObjectIdentifier::new(curve).unwrap()).unwrap()),
            [vec![0x04], vec![0x11; 64]].concat(),
        ),
        KeySpec::EcParameters(params) => (
            ObjectIdentifier::new_unwrap(oids::EC_PUBLIC_KEY),
            Some(Any::from_der(params).unwrap()),
            [vec![0x04], vec![0x11; 64]].concat(),
        ),
    }
}

fn utc(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap())
}

/// Build a DER certificate for `CN={subject}` issued by `CN={issuer}`.
pub fn certificate(
    subject: &str,
    issuer: &str,
    signature_algorithm: &str,
    key: KeySpec,
) -> Vec<u8> {
    let (key_oid, key_parameters, key_bits) = key_material(&key);

    let signature_algorithm = AlgorithmIdentifierOwned {
        oid: ObjectIdentifier::new(signature_algorithm).unwrap(),
        parameters: None,
    };

    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&next_id().to_be_bytes()).unwrap(),
        signature: signature_algorithm.clone(),
        issuer: Name::from_str(&format!("CN={issuer}")).unwrap(),
        validity: Validity {
            not_before: utc(1_700_000_000),
            not_after: utc(2_000_000_000),
        },
        subject: Name::from_str(&format!("CN={subject}")).unwrap(),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: key_oid,
                parameters: key_parameters,
            },
            subject_public_key: BitString::from_bytes(&key_bits).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };

    Certificate {
        tbs_certificate,
        signature_algorithm,
        signature: BitString::from_bytes(&[0x30, 0x00]).unwrap(),
    }
    .to_der()
    .unwrap()
}

/// Encode an `SpcSpOpusInfo` value with an IA5 program name.
pub fn opus_info(description: Option<&str>, url: Option<&str>) -> Vec<u8> {
    let mut content = Vec::new();
    if let Some(description) = description {
        content.extend(tlv(0xa0, &tlv(0x81, description.as_bytes())));
    }
    if let Some(url) = url {
        content.extend(tlv(0xa1, &tlv(0x80, url.as_bytes())));
    }
    tlv(0x30, &content)
}

/// One signer of a CMS signed data structure.
pub struct TestSigner {
    pub digest_algorithm: String,

    /// DER of the signer's certificate.
    pub certificate: Vec<u8>,

    /// Raw bytes of the message digest signed attribute.
    pub message_digest: Vec<u8>,

    embed_certificate: bool,
    extra_certificates: Vec<Vec<u8>>,
    signed: Vec<(String, Vec<u8>)>,
    unsigned: Vec<(String, Vec<u8>)>,
}

impl TestSigner {
    /// A signer using `digest_algorithm` with a self-issued RSA 2048 certificate.
    pub fn new(digest_algorithm: &str) -> Self {
        let id = next_id();
        let name = format!("Test Signer {id}");

        Self {
            digest_algorithm: digest_algorithm.to_owned(),
            certificate: certificate(&name, &name, oids::SHA256_RSA, KeySpec::Rsa(2048)),
            message_digest: sha1(format!("message {id}").as_bytes()),
            embed_certificate: true,
            extra_certificates: Vec::new(),
            signed: Vec::new(),
            unsigned: Vec::new(),
        }
    }

    pub fn sha1() -> Self {
        Self::new(oids::SHA1)
    }

    pub fn sha256() -> Self {
        Self::new(oids::SHA256)
    }

    pub fn sha384() -> Self {
        Self::new(oids::SHA384)
    }

    pub fn sha512() -> Self {
        Self::new(oids::SHA512)
    }

    /// Replace the signer's certificate.
    pub fn with_certificate(mut self, certificate: Vec<u8>) -> Self {
        self.certificate = certificate;
        self
    }

    /// Leave the signer's certificate out of the embedded set.
    pub fn without_embedded_certificate(mut self) -> Self {
        self.embed_certificate = false;
        self
    }

    /// Embed another certificate next to the signer's.
    pub fn with_extra_certificate(mut self, certificate: Vec<u8>) -> Self {
        self.extra_certificates.push(certificate);
        self
    }

    pub fn signed(mut self, oid: &str, value: Vec<u8>) -> Self {
        self.signed.push((oid.to_owned(), value));
        self
    }

    pub fn unsigned(mut self, oid: &str, value: Vec<u8>) -> Self {
        self.unsigned.push((oid.to_owned(), value));
        self
    }

    /// Certificates this signer contributes to the embedded set.
    pub fn embedded_certificates(&self) -> Vec<Vec<u8>> {
        let mut certificates = Vec::new();
        if self.embed_certificate {
            certificates.push(self.certificate.clone());
        }
        certificates.extend(self.extra_certificates.iter().cloned());
        certificates
    }

    fn build_signer_info(&self) -> SignerInfo {
        let certificate = Certificate::from_der(&self.certificate).unwrap();

        let mut signed = vec![
            (
                oids::CONTENT_TYPE.to_owned(),
                ObjectIdentifier::new_unwrap(SPC_INDIRECT_DATA).to_der().unwrap(),
            ),
            (
                oids::MESSAGE_DIGEST.to_owned(),
                OctetString::new(self.message_digest.clone())
                    .unwrap()
                    .to_der()
                    .unwrap(),
            ),
        ];
        signed.extend(self.signed.iter().cloned());

        SignerInfo {
            version: CmsVersion::V1,
            sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
                issuer: certificate.tbs_certificate.issuer.clone(),
                serial_number: certificate.tbs_certificate.serial_number.clone(),
            }),
            digest_alg: AlgorithmIdentifierOwned {
                oid: ObjectIdentifier::new(&self.digest_algorithm).unwrap(),
                parameters: None,
            },
            signed_attrs: attributes(&signed),
            signature_algorithm: AlgorithmIdentifierOwned {
                oid: ObjectIdentifier::new_unwrap(oids::RSA),
                parameters: None,
            },
            signature: OctetString::new(vec![0x5a; 32]).unwrap(),
            unsigned_attrs: attributes(&self.unsigned),
        }
    }

    /// DER of a bare `SignerInfo`, as carried by an Authenticode
    /// countersignature attribute.
    pub fn signer_info(&self) -> Vec<u8> {
        self.build_signer_info().to_der().unwrap()
    }

    /// DER of a `ContentInfo` wrapping signed data with this single signer.
    pub fn signed_data(&self) -> Vec<u8> {
        Self::signed_data_with(std::slice::from_ref(self))
    }

    /// DER of a `ContentInfo` wrapping signed data with every signer in
    /// `signers`.
    pub fn signed_data_with(signers: &[TestSigner]) -> Vec<u8> {
        let mut digest_algorithms: Vec<AlgorithmIdentifierOwned> = Vec::new();
        let mut certificates: Vec<CertificateChoices> = Vec::new();
        let mut seen: Vec<Vec<u8>> = Vec::new();

        for signer in signers {
            let digest = AlgorithmIdentifierOwned {
                oid: ObjectIdentifier::new(&signer.digest_algorithm).unwrap(),
                parameters: None,
            };
            if !digest_algorithms.contains(&digest) {
                digest_algorithms.push(digest);
            }

            for der in signer.embedded_certificates() {
                if !seen.contains(&der) {
                    certificates.push(CertificateChoices::Certificate(
                        Certificate::from_der(&der).unwrap(),
                    ));
                    seen.push(der);
                }
            }
        }

        let signed_data = SignedData {
            version: CmsVersion::V1,
            digest_algorithms: SetOfVec::try_from(digest_algorithms).unwrap(),
            encap_content_info: EncapsulatedContentInfo {
                econtent_type: ObjectIdentifier::new_unwrap(SPC_INDIRECT_DATA),
                econtent: None,
            },
            certificates: Some(CertificateSet(SetOfVec::try_from(certificates).unwrap())),
            crls: None,
            signer_infos: SignerInfos(
                SetOfVec::try_from(
                    signers
                        .iter()
                        .map(TestSigner::build_signer_info)
                        .collect::<Vec<_>>(),
                )
                .unwrap(),
            ),
        };

        ContentInfo {
            content_type: rfc5911::ID_SIGNED_DATA,
            content: Any::encode_from(&signed_data).unwrap(),
        }
        .to_der()
        .unwrap()
    }
}

/// A SHA256 signer with publisher information and a SHA256 Authenticode
/// timestamp whose certificate is embedded. It passes every modern rule.
pub fn well_formed_signer() -> TestSigner {
    let timestamp = TestSigner::sha256();
    let publisher = opus_info(Some("Lint"), Some("https://example.com"));

    TestSigner::sha256()
        .signed(oids::OPUS_INFO, publisher)
        .with_extra_certificate(timestamp.certificate.clone())
        .unsigned(oids::AUTHENTICODE_COUNTER_SIGNATURE, timestamp.signer_info())
}

/// Group `entries` by OID into a DER attribute set.
fn attributes(entries: &[(String, Vec<u8>)]) -> Option<SetOfVec<Attribute>> {
    if entries.is_empty() {
        return None;
    }

    let mut grouped: BTreeMap<&str, Vec<Any>> = BTreeMap::new();
    for (oid, value) in entries {
        grouped
            .entry(oid.as_str())
            .or_default()
            .push(Any::from_der(value).unwrap());
    }

    let attributes: Vec<Attribute> = grouped
        .into_iter()
        .map(|(oid, values)| Attribute {
            oid: ObjectIdentifier::new(oid).unwrap(),
            values: SetOfVec::try_from(values).unwrap(),
        })
        .collect();

    Some(SetOfVec::try_from(attributes).unwrap())
}
