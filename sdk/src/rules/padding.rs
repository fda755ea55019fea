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

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::{FileRule, RuleDescriptor, RuleResult};
use crate::{
    config::{CheckConfiguration, RuleSet},
    extract::certificate_padding,
    logger::SignatureLogger,
};

/// Rule 10008: nothing but zeros may follow the PKCS #7 structure inside a
/// WIN_CERTIFICATE entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct WinCertificatePaddingRule;

impl RuleDescriptor for WinCertificatePaddingRule {
    fn rule_id(&self) -> u32 {
        10008
    }

    fn rule_name(&self) -> &'static str {
        "No WinCertificate Structure Padding"
    }

    fn short_description(&self) -> &'static str {
        "Checks for non-zero data after the signature."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl FileRule for WinCertificatePaddingRule {
    fn validate(
        &self,
        path: &Path,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let padding = match std::fs::read(path)
            .map_err(crate::Error::from)
            .and_then(|bytes| certificate_padding(&bytes))
        {
            Ok(padding) => padding,
            Err(err) => {
                logger.log_message(&format!("Unable to read the certificate table: {err}."));
                return RuleResult::Fail;
            }
        };

        let mut result = RuleResult::Pass;
        for entry in padding.iter().filter(|p| p.iter().any(|b| *b != 0)) {
            logger.log_message(&format!(
                "Non-zero data found after PKCS#7 structure: {}.",
                STANDARD.encode(entry)
            ));
            result = RuleResult::Fail;
        }

        result
    }
}
