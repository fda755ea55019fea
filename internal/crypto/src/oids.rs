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

//! Object identifiers used when auditing Authenticode signatures.
//!
//! Identifiers are kept in dotted-decimal string form since that is how the
//! signature graph records algorithms and attribute types.

/// MD2 digest.
pub const MD2: &str = "1.2.840.113549.2.2";
/// MD4 digest.
pub const MD4: &str = "1.2.840.113549.2.4";
/// MD5 digest.
pub const MD5: &str = "1.2.840.113549.2.5";
/// SHA-1 digest.
pub const SHA1: &str = "1.3.14.3.2.26";
/// SHA-256 digest.
pub const SHA256: &str = "2.16.840.1.101.3.4.2.1";
/// SHA-384 digest.
pub const SHA384: &str = "2.16.840.1.101.3.4.2.2";
/// SHA-512 digest.
pub const SHA512: &str = "2.16.840.1.101.3.4.2.3";

/// md2WithRSAEncryption.
pub const MD2_RSA: &str = "1.2.840.113549.1.1.2";
/// md4WithRSAEncryption.
pub const MD4_RSA: &str = "1.2.840.113549.1.1.3";
/// md5WithRSAEncryption.
pub const MD5_RSA: &str = "1.2.840.113549.1.1.4";
/// sha1WithRSAEncryption.
pub const SHA1_RSA: &str = "1.2.840.113549.1.1.5";
/// sha256WithRSAEncryption.
pub const SHA256_RSA: &str = "1.2.840.113549.1.1.11";
/// sha384WithRSAEncryption.
pub const SHA384_RSA: &str = "1.2.840.113549.1.1.12";
/// sha512WithRSAEncryption.
pub const SHA512_RSA: &str = "1.2.840.113549.1.1.13";

/// ecdsa-with-SHA1.
pub const SHA1_ECDSA: &str = "1.2.840.10045.4.1";
/// ecdsa-with-SHA256.
pub const SHA256_ECDSA: &str = "1.2.840.10045.4.3.2";
/// ecdsa-with-SHA384.
pub const SHA384_ECDSA: &str = "1.2.840.10045.4.3.3";
/// ecdsa-with-SHA512.
pub const SHA512_ECDSA: &str = "1.2.840.10045.4.3.4";

/// id-dsa-with-sha1.
pub const SHA1_DSA: &str = "1.2.840.10040.4.3";
/// id-dsa-with-sha256.
pub const SHA256_DSA: &str = "2.16.840.1.101.3.4.3.2";

/// rsaEncryption public key algorithm.
pub const RSA: &str = "1.2.840.113549.1.1.1";
/// id-dsa public key algorithm.
pub const DSA: &str = "1.2.840.10040.4.1";
/// id-ecPublicKey public key algorithm.
pub const EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";

/// NIST P-192 (prime192v1).
pub const CURVE_P192: &str = "1.2.840.10045.3.1.1";
/// NIST P-224.
pub const CURVE_P224: &str = "1.3.132.0.33";
/// NIST P-256 (prime256v1).
pub const CURVE_P256: &str = "1.2.840.10045.3.1.7";
/// NIST P-384.
pub const CURVE_P384: &str = "1.3.132.0.34";
/// NIST P-521.
pub const CURVE_P521: &str = "1.3.132.0.35";
/// secp256k1.
pub const CURVE_SECP256K1: &str = "1.3.132.0.10";
/// brainpoolP256r1.
pub const CURVE_BRAINPOOL_P256R1: &str = "1.3.36.3.3.2.8.1.1.7";
/// brainpoolP384r1.
pub const CURVE_BRAINPOOL_P384R1: &str = "1.3.36.3.3.2.8.1.1.11";
/// brainpoolP512r1.
pub const CURVE_BRAINPOOL_P512R1: &str = "1.3.36.3.3.2.8.1.1.13";

/// PKCS #9 content type attribute.
pub const CONTENT_TYPE: &str = "1.2.840.113549.1.9.3";
/// PKCS #9 message digest attribute.
pub const MESSAGE_DIGEST: &str = "1.2.840.113549.1.9.4";
/// PKCS #9 signing time attribute.
pub const SIGNING_TIME: &str = "1.2.840.113549.1.9.5";
/// PKCS #9 countersignature attribute, used for Authenticode timestamps.
pub const AUTHENTICODE_COUNTER_SIGNATURE: &str = "1.2.840.113549.1.9.6";
/// Microsoft RFC 3161 timestamp token attribute.
pub const RFC3161_COUNTER_SIGNATURE: &str = "1.3.6.1.4.1.311.3.3.1";
/// Microsoft nested signature attribute.
pub const NESTED_SIGNATURE: &str = "1.3.6.1.4.1.311.2.4.1";
/// SpcSpOpusInfo (publisher information) attribute.
pub const OPUS_INFO: &str = "1.3.6.1.4.1.311.2.1.12";
/// SpcStatementType attribute.
pub const STATEMENT_TYPE: &str = "1.3.6.1.4.1.311.2.1.11";
/// CMS signed data content type.
pub const SIGNED_DATA: &str = "1.2.840.113549.1.7.2";

/// Returns the conventional display name for an OID, if one is known.
pub fn friendly_name(oid: &str) -> Option<&'static str> {
    let name = match oid {
        MD2 => "MD2",
        MD4 => "MD4",
        MD5 => "MD5",
        SHA1 => "SHA1",
        SHA256 => "SHA256",
        SHA384 => "SHA384",
        SHA512 => "SHA512",
        MD2_RSA => "md2RSA",
        MD4_RSA => "md4RSA",
        MD5_RSA => "md5RSA",
        SHA1_RSA => "sha1RSA",
        SHA256_RSA => "sha256RSA",
        SHA384_RSA => "sha384RSA",
        SHA512_RSA => "sha512RSA",
        SHA1_ECDSA => "sha1ECDSA",
        SHA256_ECDSA => "sha256ECDSA",
        SHA384_ECDSA => "sha384ECDSA",
        SHA512_ECDSA => "sha512ECDSA",
        SHA1_DSA => "sha1DSA",
        SHA256_DSA => "sha256DSA",
        RSA => "RSA",
        DSA => "DSA",
        EC_PUBLIC_KEY => "ECC",
        CURVE_P192 => "nistP192",
        CURVE_P224 => "nistP224",
        CURVE_P256 => "nistP256",
        CURVE_P384 => "nistP384",
        CURVE_P521 => "nistP521",
        CURVE_SECP256K1 => "secP256k1",
        CURVE_BRAINPOOL_P256R1 => "brainpoolP256r1",
        CURVE_BRAINPOOL_P384R1 => "brainpoolP384r1",
        CURVE_BRAINPOOL_P512R1 => "brainpoolP512r1",
        CONTENT_TYPE => "Content Type",
        MESSAGE_DIGEST => "Message Digest",
        SIGNING_TIME => "Signing Time",
        AUTHENTICODE_COUNTER_SIGNATURE => "Counter Signature",
        RFC3161_COUNTER_SIGNATURE => "Timestamp Token",
        NESTED_SIGNATURE => "Nested Signature",
        OPUS_INFO => "SpcSpOpusInfo",
        STATEMENT_TYPE => "SpcStatementType",
        SIGNED_DATA => "PKCS7 Signed",
        _ => return None,
    };
    Some(name)
}

/// Like [`friendly_name`] but falls back to the dotted OID.
pub fn display_name(oid: &str) -> String {
    friendly_name(oid).map_or_else(|| oid.to_owned(), str::to_owned)
}
