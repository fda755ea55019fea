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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]

/// The internal name of this library.
pub const NAME: &str = "authenticode-lint";

/// The version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod collector;
pub mod config;
mod engine;
mod error;
pub mod extract;
mod extraction;
pub mod logger;
mod publisher;
pub mod rules;
pub mod signature;

pub(crate) mod utils;

pub use authlint_crypto as crypto;
pub use collector::{CollectorSet, MemoryRuleResultCollector, RuleResultCollector};
pub use config::{
    ActiveRuleSet, CheckConfiguration, IntermediateStrengthPolicy, RevocationChecking, RuleSet,
};
pub use engine::{RuleEngine, RuleEngineReport, RuleEngineResult, RuleOutcome};
pub use error::{Error, Result};
pub use extract::SignatureExtractor;
pub use extraction::extract_certificates;
pub use publisher::PublisherInformation;
pub use rules::{Rule, RuleRegistry, RuleResult};
pub use signature::{Graph, Signature, SignatureKind};

/// PE image and CMS builders for the tests of dependent crates.
#[cfg(feature = "test_utils")]
pub use utils::test as test_utils;
