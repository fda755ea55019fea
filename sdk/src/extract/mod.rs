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

//! Builds a signature [`Graph`] from a PE file.

use std::path::Path;

use log::debug;

use crate::{
    error::Result,
    signature::{Graph, SignatureKind},
};

mod cms;
pub(crate) mod pe;
pub(crate) mod win_certificate;

pub(crate) use self::cms::counter_signature_graph;
pub use self::cms::MAX_SIGNATURE_DEPTH;
pub use self::win_certificate::WinCertificate;

/// Extracts Authenticode signatures from PE images.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureExtractor;

impl SignatureExtractor {
    /// Build the signature graph of an in-memory PE image.
    ///
    /// An image without a certificate table, or whose table holds no signed
    /// data entries, yields an empty graph. Signed data that cannot be
    /// decoded is an [`Error::MalformedSignature`](crate::Error::MalformedSignature).
    pub fn extract(&self, file_bytes: &[u8]) -> Result<Graph> {
        let Some(range) = pe::certificate_table_range(file_bytes)? else {
            debug!("no certificate table present");
            return Ok(Graph::default());
        };

        let mut graph = Graph::default();

        for entry in WinCertificate::parse_table(&file_bytes[range])? {
            if !entry.is_signed_data() {
                debug!("ignoring WIN_CERTIFICATE entry of type 0x{:04x}", entry.certificate_type);
                continue;
            }

            let signatures = cms::signatures_from_blob(entry.content, SignatureKind::SIGNATURE, 0)?;
            signatures.into_iter().for_each(|s| graph.push(s));
        }

        Ok(graph)
    }

    /// Read `path` and build its signature graph.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Graph> {
        let bytes = std::fs::read(path.as_ref())?;
        self.extract(&bytes)
    }

    /// Build nodes directly from a `ContentInfo`-wrapped `SignedData` blob.
    pub fn extract_signed_data(&self, signed_data: &[u8]) -> Result<Graph> {
        cms::signatures_from_blob(signed_data, SignatureKind::SIGNATURE, 0).map(Graph::new)
    }
}

/// Bytes following the signed data in every PKCS #7 WIN_CERTIFICATE entry.
pub fn certificate_padding(file_bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let Some(range) = pe::certificate_table_range(file_bytes)? else {
        return Ok(Vec::new());
    };

    WinCertificate::parse_table(&file_bytes[range])?
        .iter()
        .filter(|entry| entry.is_signed_data())
        .map(|entry| entry.padding().map(<[u8]>::to_vec))
        .collect()
}
