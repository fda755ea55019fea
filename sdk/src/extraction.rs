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

//! Writes embedded certificates to disk.

use std::{collections::BTreeSet, fs, path::Path};

use authlint_crypto::hash::thumbprint;
use log::debug;

use crate::{
    error::Result,
    signature::{Graph, SignatureKind},
};

const NO_IDENTITY: &str = "unidentified";

/// Write every certificate embedded with any signature in `graph` as PEM.
///
/// Files land in `{dir}/{file_name}/{identity}/Certificates/{thumbprint}.cer`.
/// Returns the number of distinct files written.
pub fn extract_certificates(graph: &Graph, dir: &Path, file_name: &str) -> Result<usize> {
    let mut written = BTreeSet::new();

    for signature in graph.visit_all(SignatureKind::ANY, true) {
        let identity = signature
            .identity()
            .unwrap_or_else(|| NO_IDENTITY.to_owned());
        let target = dir.join(file_name).join(identity).join("Certificates");

        for der in signature.additional_certificates() {
            fs::create_dir_all(&target)?;

            let path = target.join(format!("{}.cer", thumbprint(der)));
            let encoded = pem::encode(&pem::Pem::new("CERTIFICATE", der.clone()));
            fs::write(&path, encoded)?;

            debug!("wrote {}", path.display());
            written.insert(path);
        }
    }

    Ok(written.len())
}
