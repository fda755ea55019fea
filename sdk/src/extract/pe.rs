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

//! Locates the security data directory of a PE image.

use std::ops::Range;

use object::{
    pe,
    read::pe::{ImageNtHeaders, PeFile, PeFile32, PeFile64},
    FileKind,
};

use crate::error::{Error, Result};

/// Byte range of the certificate table, or `None` if the image has none.
///
/// The security directory's "virtual address" is a file offset, unlike every
/// other data directory.
pub fn certificate_table_range(data: &[u8]) -> Result<Option<Range<usize>>> {
    let kind = FileKind::parse(data).map_err(|err| Error::PeParse(err.to_string()))?;

    let directory = match kind {
        FileKind::Pe32 => security_directory(
            &PeFile32::parse(data).map_err(|err| Error::PeParse(err.to_string()))?,
        ),
        FileKind::Pe64 => security_directory(
            &PeFile64::parse(data).map_err(|err| Error::PeParse(err.to_string()))?,
        ),
        other => return Err(Error::PeParse(format!("not a PE image ({other:?})"))),
    };

    let Some((offset, size)) = directory else {
        return Ok(None);
    };

    if offset == 0 || size == 0 {
        return Ok(None);
    }

    let start = usize::try_from(offset)
        .map_err(|_| Error::InvalidWinCertificate("table offset out of range".into()))?;
    let end = usize::try_from(size)
        .ok()
        .and_then(|size| start.checked_add(size))
        .filter(|end| *end <= data.len())
        .ok_or_else(|| {
            Error::InvalidWinCertificate("certificate table extends past end of file".into())
        })?;

    Ok(Some(start..end))
}

fn security_directory<Pe: ImageNtHeaders>(file: &PeFile<'_, Pe>) -> Option<(u32, u32)> {
    file.data_directory(pe::IMAGE_DIRECTORY_ENTRY_SECURITY)
        .map(|directory| directory.address_range())
}
