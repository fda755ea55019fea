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

//! Builds signature nodes from decoded CMS structures.

use authlint_crypto::oids;
use cms::{
    cert::{x509::Certificate, CertificateChoices},
    content_info::ContentInfo,
    signed_data::{SignedData, SignerIdentifier, SignerInfo},
};
use const_oid::db::{rfc5280, rfc5911};
use der::{Decode, Encode, SliceReader};
use log::{debug, warn};
use x509_cert::{attr::Attributes, ext::pkix::SubjectKeyIdentifier};

use crate::{
    error::{Error, Result},
    signature::{AttributeSet, Graph, Signature, SignatureKind},
};

/// Deepest level below a top-level signature that is decoded.
///
/// Nested signatures and countersignatures both count as one level. A
/// branch below this depth is recorded as malformed instead.
pub const MAX_SIGNATURE_DEPTH: usize = 32;

/// Decode a `ContentInfo`-wrapped `SignedData` and build one node per signer.
///
/// Trailing bytes after the structure are ignored; the padding rule looks
/// at them separately. Nested signatures are decoded eagerly and attached to
/// the signer whose unsigned attributes carry them.
pub(crate) fn signatures_from_blob(
    bytes: &[u8],
    kind: SignatureKind,
    depth: usize,
) -> Result<Vec<Signature>> {
    let signed_data = decode_signed_data(bytes)?;
    let certificates = certificate_ders(&signed_data)?;

    signed_data
        .signer_infos
        .0
        .iter()
        .map(|signer_info| {
            let signature = signature_from_signer_info(signer_info, kind, &certificates, depth)?;
            let nested = nested_signature_graph(&signature);
            Ok(signature.with_nested(nested))
        })
        .collect()
}

fn decode_signed_data(bytes: &[u8]) -> Result<SignedData> {
    let mut reader = SliceReader::new(bytes)?;

    let content_info = ContentInfo::decode(&mut reader)
        .map_err(|err| Error::MalformedSignature(format!("invalid ContentInfo: {err}")))?;

    if content_info.content_type != rfc5911::ID_SIGNED_DATA {
        return Err(Error::MalformedSignature(format!(
            "unexpected content type {}",
            content_info.content_type
        )));
    }

    content_info
        .content
        .decode_as::<SignedData>()
        .map_err(|err| Error::MalformedSignature(format!("invalid SignedData: {err}")))
}

fn certificate_ders(signed_data: &SignedData) -> Result<Vec<Vec<u8>>> {
    let Some(certificates) = &signed_data.certificates else {
        return Ok(Vec::new());
    };

    let mut ders = Vec::new();
    for choice in certificates.0.iter() {
        if let CertificateChoices::Certificate(certificate) = choice {
            ders.push(certificate.to_der()?);
        }
    }
    Ok(ders)
}

fn attribute_set(attributes: Option<&Attributes>) -> Result<AttributeSet> {
    let mut set = AttributeSet::new();
    for attribute in attributes.into_iter().flat_map(|a| a.iter()) {
        let oid = attribute.oid.to_string();
        for value in attribute.values.iter() {
            set.push(oid.clone(), value.to_der()?);
        }
    }
    Ok(set)
}

fn signature_from_signer_info(
    signer_info: &SignerInfo,
    kind: SignatureKind,
    certificates: &[Vec<u8>],
    depth: usize,
) -> Result<Signature> {
    let certificate = resolve_signer(&signer_info.sid, certificates);
    if certificate.is_none() {
        debug!("signer certificate not found among {} embedded certificates", certificates.len());
    }

    Ok(Signature::new(
        kind,
        signer_info.digest_alg.oid.to_string(),
        signer_info.signature_algorithm.oid.to_string(),
    )
    .with_signed_attributes(attribute_set(signer_info.signed_attrs.as_ref())?)
    .with_unsigned_attributes(attribute_set(signer_info.unsigned_attrs.as_ref())?)
    .with_certificate(certificate)
    .with_additional_certificates(certificates.to_vec())
    .with_depth(depth))
}

/// Find the certificate a signer identifier refers to.
fn resolve_signer(sid: &SignerIdentifier, certificates: &[Vec<u8>]) -> Option<Vec<u8>> {
    certificates
        .iter()
        .find(|der| {
            let Ok(certificate) = Certificate::from_der(der) else {
                return false;
            };
            let tbs = &certificate.tbs_certificate;

            match sid {
                SignerIdentifier::IssuerAndSerialNumber(isn) => {
                    tbs.serial_number == isn.serial_number && tbs.issuer == isn.issuer
                }
                SignerIdentifier::SubjectKeyIdentifier(ski) => tbs
                    .extensions
                    .iter()
                    .flatten()
                    .filter(|ext| ext.extn_id == rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER)
                    .filter_map(|ext| {
                        SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes()).ok()
                    })
                    .any(|candidate| candidate == *ski),
            }
        })
        .cloned()
}

/// Record every value of `oid` on `parent` as a malformed branch.
fn record_too_deep(parent: &Signature, oid: &str, graph: &mut Graph) {
    for _ in parent.unsigned_attributes().values(oid) {
        warn!("skipping signature nested deeper than {MAX_SIGNATURE_DEPTH} levels");
        graph.push_malformed(
            oid,
            format!("signature nesting exceeds {MAX_SIGNATURE_DEPTH} levels"),
        );
    }
}

fn nested_signature_graph(parent: &Signature) -> Graph {
    let mut graph = Graph::default();
    if parent.depth() >= MAX_SIGNATURE_DEPTH {
        record_too_deep(parent, oids::NESTED_SIGNATURE, &mut graph);
        return graph;
    }

    let depth = parent.depth() + 1;
    for value in parent.unsigned_attributes().values(oids::NESTED_SIGNATURE) {
        match signatures_from_blob(value, SignatureKind::NESTED_SIGNATURE, depth) {
            Ok(signatures) => signatures.into_iter().for_each(|s| graph.push(s)),
            Err(err) => {
                warn!("skipping malformed nested signature: {err}");
                graph.push_malformed(oids::NESTED_SIGNATURE, err.to_string());
            }
        }
    }

    graph
}

/// Decode the countersignature forest of `parent` from its unsigned
/// attributes.
///
/// Authenticode countersignatures are bare signer infos and resolve their
/// certificate from the parent's certificate set. RFC 3161 tokens are
/// complete signed data structures with their own certificates. Each
/// countersignature decodes its own countersignatures on demand.
pub(crate) fn counter_signature_graph(parent: &Signature) -> Graph {
    let mut graph = Graph::default();
    if parent.depth() >= MAX_SIGNATURE_DEPTH {
        record_too_deep(parent, oids::AUTHENTICODE_COUNTER_SIGNATURE, &mut graph);
        record_too_deep(parent, oids::RFC3161_COUNTER_SIGNATURE, &mut graph);
        return graph;
    }

    let depth = parent.depth() + 1;
    for attribute in parent.unsigned_attributes().iter() {
        let decoded: Vec<Result<Vec<Signature>>> = match attribute.oid.as_str() {
            oids::AUTHENTICODE_COUNTER_SIGNATURE => attribute
                .values
                .iter()
                .map(|value| {
                    let signer_info = SignerInfo::from_der(value).map_err(|err| {
                        Error::MalformedSignature(format!("invalid countersignature: {err}"))
                    })?;
                    signature_from_signer_info(
                        &signer_info,
                        SignatureKind::AUTHENTICODE_TIMESTAMP,
                        parent.additional_certificates(),
                        depth,
                    )
                    .map(|s| vec![s])
                })
                .collect(),

            oids::RFC3161_COUNTER_SIGNATURE => attribute
                .values
                .iter()
                .map(|value| timestamp_token_signatures(value, depth))
                .collect(),

            _ => continue,
        };

        for result in decoded {
            match result {
                Ok(signatures) => signatures.into_iter().for_each(|s| graph.push(s)),
                Err(err) => {
                    warn!("skipping malformed countersignature: {err}");
                    graph.push_malformed(&attribute.oid, err.to_string());
                }
            }
        }
    }

    graph
}

fn timestamp_token_signatures(token: &[u8], depth: usize) -> Result<Vec<Signature>> {
    let signed_data = decode_signed_data(token)?;
    let certificates = certificate_ders(&signed_data)?;

    signed_data
        .signer_infos
        .0
        .iter()
        .map(|signer_info| {
            signature_from_signer_info(
                signer_info,
                SignatureKind::RFC3161_TIMESTAMP,
                &certificates,
                depth,
            )
        })
        .collect()
}
