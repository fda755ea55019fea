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

//! Options that control a lint run.

use std::{collections::BTreeSet, path::PathBuf};

pub use authlint_crypto::chain::IntermediateStrengthPolicy;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Rule-set membership of a rule.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct RuleSet: u8 {
        /// Current best practice; SHA-1 is not acceptable.
        const MODERN = 0x01;
        /// Compatibility with older Windows versions that only verify SHA-1.
        const COMPAT = 0x02;
        /// Member of every rule-set.
        const ALL = 0xFF;
    }
}

/// The rule-set a run is checked against.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveRuleSet {
    #[default]
    Modern,
    Compat,
    All,
}

impl ActiveRuleSet {
    /// Flags a rule must intersect to run.
    pub fn flags(self) -> RuleSet {
        match self {
            ActiveRuleSet::Modern => RuleSet::MODERN,
            ActiveRuleSet::Compat => RuleSet::COMPAT,
            ActiveRuleSet::All => RuleSet::ALL,
        }
    }
}

/// Revocation checking requested from the trust verifier.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationChecking {
    #[default]
    None,
    Offline,
    Online,
}

/// Settings for checking one or more files.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CheckConfiguration {
    /// Rule ids reported as skipped instead of being run.
    pub suppress_error_ids: BTreeSet<u32>,

    /// Collect per-signature diagnostics.
    pub verbose: bool,

    pub rule_set: ActiveRuleSet,

    pub revocation_mode: RevocationChecking,

    /// Directory embedded certificates are written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_path: Option<PathBuf>,

    /// How intermediates weaker than the leaf certificate are treated.
    pub chain_policy: IntermediateStrengthPolicy,
}
