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

//! Relative strength of digest and signature algorithms.

use crate::oids;

/// Strength ordinal given to algorithms that are not recognized.
///
/// Every comparison against a known algorithm fails for this value.
pub const UNKNOWN_STRENGTH: u16 = 0;

/// Returns an ordinal for a digest or signature algorithm OID.
///
/// The value is only meaningful when compared with another ordinal. It is
/// not a bit count: MD2 < MD4 < MD5 < SHA-1 < SHA-256 < SHA-384 < SHA-512.
/// Signature algorithms rank by the digest they use.
pub fn digest_strength(oid: &str) -> u16 {
    match oid {
        oids::MD2 | oids::MD2_RSA => 2,
        oids::MD4 | oids::MD4_RSA => 4,
        oids::MD5 | oids::MD5_RSA => 5,
        oids::SHA1 | oids::SHA1_RSA | oids::SHA1_ECDSA | oids::SHA1_DSA => 10,
        oids::SHA256 | oids::SHA256_RSA | oids::SHA256_ECDSA | oids::SHA256_DSA => 256,
        oids::SHA384 | oids::SHA384_RSA | oids::SHA384_ECDSA => 384,
        oids::SHA512 | oids::SHA512_RSA | oids::SHA512_ECDSA => 512,
        _ => UNKNOWN_STRENGTH,
    }
}

/// Returns `true` if `oid` names a SHA-2 family digest.
pub fn is_sha2_digest(oid: &str) -> bool {
    matches!(oid, oids::SHA256 | oids::SHA384 | oids::SHA512)
}

/// Returns `true` if `oid` names MD2, MD4 or MD5.
pub fn is_md_digest(oid: &str) -> bool {
    matches!(oid, oids::MD2 | oids::MD4 | oids::MD5)
}
