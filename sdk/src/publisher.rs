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

//! Publisher information carried in the `SpcSpOpusInfo` signed attribute.

use der::{
    asn1::{Any, Ia5StringRef},
    Decode, Sequence, Tag, TagNumber, Tagged,
};
use log::debug;

use crate::error::Result;

/// `SpcSpOpusInfo ::= SEQUENCE { programName [0] EXPLICIT SpcString OPTIONAL,
/// moreInfo [1] EXPLICIT SpcLink OPTIONAL }`
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct SpcSpOpusInfo {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    program_name: Option<Any>,

    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", optional = "true")]
    more_info: Option<Any>,
}

/// Description and link a publisher attached to a signature.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PublisherInformation {
    /// Program name / description.
    pub description: Option<String>,

    /// More-info URL, or a file reference when the link is not a URL.
    pub url: Option<String>,
}

impl PublisherInformation {
    /// Decode the DER value of an opus info attribute.
    pub fn from_der(value: &[u8]) -> Result<Self> {
        let opus_info = SpcSpOpusInfo::from_der(value)?;

        Ok(Self {
            description: opus_info.program_name.as_ref().and_then(spc_string),
            url: opus_info.more_info.as_ref().and_then(spc_link),
        })
    }

    /// Returns `true` if neither a description nor a URL is present.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.url.is_none()
    }
}

/// `SpcString ::= CHOICE { unicode [0] IMPLICIT BMPSTRING, ascii [1] IMPLICIT IA5STRING }`
fn spc_string(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::ContextSpecific { number, .. } if number == TagNumber::N0 => bmp_string(value.value()),
        Tag::ContextSpecific { number, .. } if number == TagNumber::N1 => ia5_string(value.value()),
        other => {
            debug!("unexpected SpcString alternative {other}");
            None
        }
    }
}

/// `SpcLink ::= CHOICE { url [0] IMPLICIT IA5STRING, moniker [1] IMPLICIT
/// SpcSerializedObject, file [2] EXPLICIT SpcString }`
fn spc_link(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::ContextSpecific { number, .. } if number == TagNumber::N0 => ia5_string(value.value()),
        Tag::ContextSpecific { number, .. } if number == TagNumber::N2 => {
            Any::from_der(value.value()).ok().as_ref().and_then(spc_string)
        }
        other => {
            debug!("ignoring SpcLink alternative {other}");
            None
        }
    }
}

fn bmp_string(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}

fn ia5_string(bytes: &[u8]) -> Option<String> {
    Ia5StringRef::new(bytes).ok().map(|s| s.as_str().to_owned())
}
