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

//! The signature graph: one node per signer, with nested primary signatures
//! and countersignatures held in two separate forests.

use std::sync::OnceLock;

use authlint_crypto::oids;
use bitflags::bitflags;
use der::{asn1::OctetStringRef, Decode};

use crate::extract::counter_signature_graph;

mod visit;
pub use visit::VisitAll;

bitflags! {
    /// Where a [`Signature`] was found in the signed structure.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct SignatureKind: u8 {
        /// A top-level signature from the WIN_CERTIFICATE table.
        const SIGNATURE = 0x01;
        /// A primary signature carried in a nested-signature attribute.
        const NESTED_SIGNATURE = 0x02;
        /// A PKCS #9 countersignature.
        const AUTHENTICODE_TIMESTAMP = 0x04;
        /// An RFC 3161 timestamp token.
        const RFC3161_TIMESTAMP = 0x08;

        /// Any primary signature.
        const ANY_SIGNATURE = Self::SIGNATURE.bits() | Self::NESTED_SIGNATURE.bits();
        /// Any countersignature.
        const ANY_COUNTER_SIGNATURE =
            Self::AUTHENTICODE_TIMESTAMP.bits() | Self::RFC3161_TIMESTAMP.bits();
        /// Every kind.
        const ANY = Self::ANY_SIGNATURE.bits() | Self::ANY_COUNTER_SIGNATURE.bits();
    }
}

/// One attribute type and its DER-encoded values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    /// Attribute type OID, dotted.
    pub oid: String,

    /// Each value as a complete DER TLV.
    pub values: Vec<Vec<u8>>,
}

/// Ordered multimap of attribute OID to values.
///
/// Attributes keep the order they were decoded in. Adding a value for an
/// OID that is already present appends to that attribute.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, oid: impl Into<String>, value: Vec<u8>) {
        let oid = oid.into();
        match self.attributes.iter_mut().find(|a| a.oid == oid) {
            Some(attribute) => attribute.values.push(value),
            None => self.attributes.push(Attribute {
                oid,
                values: vec![value],
            }),
        }
    }

    pub fn get(&self, oid: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.oid == oid)
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.get(oid).is_some()
    }

    /// Values of `oid`, or nothing if the attribute is absent.
    pub fn values<'a>(&'a self, oid: &str) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.get(oid)
            .into_iter()
            .flat_map(|a| a.values.iter().map(Vec::as_slice))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A signer discovered in a file.
///
/// Nested primary signatures are decoded when the node is built. The
/// countersignature forest is decoded from the unsigned attributes the first
/// time [`Signature::counter_signatures`] is called.
#[derive(Clone, Debug)]
pub struct Signature {
    kind: SignatureKind,
    digest_algorithm: String,
    signature_algorithm: String,
    signed_attributes: AttributeSet,
    unsigned_attributes: AttributeSet,
    certificate: Option<Vec<u8>>,
    additional_certificates: Vec<Vec<u8>>,
    nested: Graph,
    counter_signatures: OnceLock<Graph>,
    depth: usize,
}

impl Signature {
    /// Create a node with no attributes, certificates or children.
    pub fn new(
        kind: SignatureKind,
        digest_algorithm: impl Into<String>,
        signature_algorithm: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            digest_algorithm: digest_algorithm.into(),
            signature_algorithm: signature_algorithm.into(),
            signed_attributes: AttributeSet::default(),
            unsigned_attributes: AttributeSet::default(),
            certificate: None,
            additional_certificates: Vec::new(),
            nested: Graph::default(),
            counter_signatures: OnceLock::new(),
            depth: 0,
        }
    }

    pub fn with_signed_attributes(mut self, attributes: AttributeSet) -> Self {
        self.signed_attributes = attributes;
        self
    }

    pub fn with_signed_attribute(mut self, oid: &str, value: Vec<u8>) -> Self {
        self.signed_attributes.push(oid, value);
        self
    }

    pub fn with_unsigned_attributes(mut self, attributes: AttributeSet) -> Self {
        self.unsigned_attributes = attributes;
        self
    }

    pub fn with_unsigned_attribute(mut self, oid: &str, value: Vec<u8>) -> Self {
        self.unsigned_attributes.push(oid, value);
        self
    }

    pub fn with_certificate(mut self, certificate: Option<Vec<u8>>) -> Self {
        self.certificate = certificate;
        self
    }

    pub fn with_additional_certificates(mut self, certificates: Vec<Vec<u8>>) -> Self {
        self.additional_certificates = certificates;
        self
    }

    pub fn with_nested(mut self, nested: Graph) -> Self {
        self.nested = nested;
        self
    }

    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Supply the countersignature forest instead of decoding it from the
    /// unsigned attributes.
    pub fn with_counter_signatures(self, counter_signatures: Graph) -> Self {
        Self {
            counter_signatures: OnceLock::from(counter_signatures),
            ..self
        }
    }

    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    /// Digest algorithm OID.
    pub fn digest_algorithm(&self) -> &str {
        &self.digest_algorithm
    }

    /// Display name of the digest algorithm, e.g. `SHA256`.
    pub fn digest_algorithm_name(&self) -> String {
        oids::display_name(&self.digest_algorithm)
    }

    /// Signature algorithm OID from the signer info.
    pub fn signature_algorithm(&self) -> &str {
        &self.signature_algorithm
    }

    pub fn signed_attributes(&self) -> &AttributeSet {
        &self.signed_attributes
    }

    pub fn unsigned_attributes(&self) -> &AttributeSet {
        &self.unsigned_attributes
    }

    /// DER of the signer's certificate, when it could be resolved.
    pub fn certificate(&self) -> Option<&[u8]> {
        self.certificate.as_deref()
    }

    /// Every certificate embedded alongside this signer.
    pub fn additional_certificates(&self) -> &[Vec<u8>] {
        &self.additional_certificates
    }

    /// Nested primary signatures carried by this signer.
    pub fn nested(&self) -> &Graph {
        &self.nested
    }

    /// Countersignatures over this signer, decoded on first use.
    pub fn counter_signatures(&self) -> &Graph {
        self.counter_signatures
            .get_or_init(|| counter_signature_graph(self))
    }

    /// Levels between this node and the top-level signature it hangs from.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Lower-case hex of the message digest signed attribute.
    ///
    /// Used to tell signatures apart in diagnostics.
    pub fn identity(&self) -> Option<String> {
        let value = self.signed_attributes.values(oids::MESSAGE_DIGEST).next()?;

        Some(match OctetStringRef::from_der(value) {
            Ok(digest) => hex::encode(digest.as_bytes()),
            Err(_) => hex::encode(value),
        })
    }
}

/// A nested or countersignature branch that could not be decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MalformedBranch {
    /// OID of the unsigned attribute that carried the branch.
    pub attribute: String,

    /// Why decoding failed.
    pub reason: String,
}

/// An ordered forest of signatures.
///
/// The graph owns its nodes and, through them, every child graph. Branches
/// that failed to decode are kept alongside the nodes that did.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    signatures: Vec<Signature>,
    malformed: Vec<MalformedBranch>,
}

static EMPTY: Graph = Graph {
    signatures: Vec::new(),
    malformed: Vec::new(),
};

impl Graph {
    pub fn new(signatures: Vec<Signature>) -> Self {
        Self {
            signatures,
            malformed: Vec::new(),
        }
    }

    /// The shared empty graph.
    pub fn empty() -> &'static Graph {
        &EMPTY
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn malformed(&self) -> &[MalformedBranch] {
        &self.malformed
    }

    /// The first top-level signature.
    pub fn primary(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Pre-order walk over nodes whose kind intersects `kind`.
    ///
    /// With `deep` false the walk does not descend below a node that did
    /// not match. With `deep` true every node is inspected.
    pub fn visit_all(&self, kind: SignatureKind, deep: bool) -> VisitAll<'_> {
        VisitAll::new(self, kind, deep)
    }

    pub(crate) fn push(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }

    pub(crate) fn push_malformed(&mut self, attribute: &str, reason: impl Into<String>) {
        self.malformed.push(MalformedBranch {
            attribute: attribute.to_owned(),
            reason: reason.into(),
        });
    }
}

impl FromIterator<Signature> for Graph {
    fn from_iter<I: IntoIterator<Item = Signature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
