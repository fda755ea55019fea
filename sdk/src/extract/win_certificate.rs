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

//! WIN_CERTIFICATE entries of the PE certificate table.

use cms::content_info::ContentInfo;
use der::{Decode, Encode, SliceReader};

use crate::error::{Error, Result};

/// `WIN_CERT_REVISION_1_0`
pub const WIN_CERT_REVISION_1_0: u16 = 0x0100;
/// `WIN_CERT_REVISION_2_0`
pub const WIN_CERT_REVISION_2_0: u16 = 0x0200;
/// `WIN_CERT_TYPE_PKCS_SIGNED_DATA`
pub const WIN_CERT_TYPE_PKCS_SIGNED_DATA: u16 = 0x0002;

const HEADER_LEN: usize = 8;

/// One length-prefixed entry of the certificate table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WinCertificate<'a> {
    /// `dwLength`, including the 8-byte header.
    pub length: u32,
    /// `wRevision`
    pub revision: u16,
    /// `wCertificateType`
    pub certificate_type: u16,
    /// `bCertificate`: everything after the header up to `dwLength`.
    pub content: &'a [u8],
}

impl<'a> WinCertificate<'a> {
    /// Parse a single entry at the start of `data`.
    ///
    /// Only signed data entries must carry a known `wRevision`; other entry
    /// types are returned as they are.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = data
            .get(..HEADER_LEN)
            .ok_or_else(|| Error::InvalidWinCertificate("truncated header".into()))?;

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let revision = u16::from_le_bytes([header[4], header[5]]);
        let certificate_type = u16::from_le_bytes([header[6], header[7]]);

        if certificate_type == WIN_CERT_TYPE_PKCS_SIGNED_DATA
            && revision != WIN_CERT_REVISION_1_0
            && revision != WIN_CERT_REVISION_2_0
        {
            return Err(Error::InvalidWinCertificate(format!(
                "unknown revision 0x{revision:04x}"
            )));
        }

        let content = usize::try_from(length)
            .ok()
            .filter(|len| *len >= HEADER_LEN)
            .and_then(|len| data.get(HEADER_LEN..len))
            .ok_or_else(|| {
                Error::InvalidWinCertificate(format!(
                    "length {length} does not fit the certificate table"
                ))
            })?;

        Ok(Self {
            length,
            revision,
            certificate_type,
            content,
        })
    }

    /// Parse every entry of a certificate table. Entries are 8-byte aligned.
    pub fn parse_table(table: &'a [u8]) -> Result<Vec<Self>> {
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset < table.len() {
            let rest = &table[offset..];

            // Alignment slack after the last entry.
            if rest.len() < HEADER_LEN && rest.iter().all(|b| *b == 0) {
                break;
            }

            let entry = Self::parse(rest)?;
            let advance = (HEADER_LEN + entry.content.len()).next_multiple_of(8);
            entries.push(entry);
            offset += advance;
        }

        Ok(entries)
    }

    /// Returns `true` if this entry carries PKCS #7 signed data.
    pub fn is_signed_data(&self) -> bool {
        self.certificate_type == WIN_CERT_TYPE_PKCS_SIGNED_DATA
    }

    /// Length of the CMS structure when decoded and re-encoded.
    pub fn signed_data_len(&self) -> Result<usize> {
        let mut reader = SliceReader::new(self.content)?;
        let content_info = ContentInfo::decode(&mut reader)
            .map_err(|err| Error::MalformedSignature(err.to_string()))?;

        Ok(usize::try_from(content_info.encoded_len()?)?)
    }

    /// Bytes that follow the CMS structure inside `bCertificate`.
    pub fn padding(&self) -> Result<&'a [u8]> {
        let used = self.signed_data_len()?;
        Ok(self.content.get(used..).unwrap_or_default())
    }
}
