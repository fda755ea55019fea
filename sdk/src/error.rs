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

use thiserror::Error;

/// `Error` enumerates errors returned by signature extraction and linting.
///
/// A file without a signature is not an error: extraction returns an empty
/// [`Graph`](crate::Graph) and every rule fails on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The file is not a PE image the locator understands.
    #[error("unable to parse PE image: {0}")]
    PeParse(String),

    /// The security data directory points outside the file or is truncated.
    #[error("invalid WIN_CERTIFICATE structure: {0}")]
    InvalidWinCertificate(String),

    /// Signature bytes are present but are not a usable CMS structure.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// A signer certificate could not be found in the attached certificates.
    #[error("unresolvable certificate: {0}")]
    UnresolvableCertificate(String),

    #[error(transparent)]
    Der(#[from] der::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for linting operations.
pub type Result<T> = std::result::Result<T, Error>;
