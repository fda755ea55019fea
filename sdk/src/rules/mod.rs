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

//! The rule catalogue.
//!
//! Every rule has a permanent id. Ids are never reused for a different
//! check, and the registry always lists rules in id order.

use std::{fmt, path::Path, sync::Arc};

use authlint_crypto::bit_strength::BitStrengthCalculator;
use serde::Serialize;

use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    signature::Graph,
};

mod attributes;
mod chain;
mod digest;
mod key_length;
mod padding;
mod primary;
mod publisher;
mod timestamp;
mod trust;

pub use self::{
    attributes::NoUnknownUnsignedAttributeRule,
    chain::{NoUnknownCertificatesRule, SigningCertificateDigestAlgorithmRule},
    digest::{
        NoSha1Rule, NoWeakFileDigestAlgorithmsRule, Sha1PrimarySignatureRule,
        Sha2PrimarySignatureRule, Sha2SignatureExistsRule,
    },
    key_length::{MaxKeyLengthRule, RsaDsaPrimarySignatureRule, StrongKeyLengthRule},
    padding::WinCertificatePaddingRule,
    primary::SinglePrimarySignatureRule,
    publisher::{PublisherInformationPresentRule, PublisherInformationUrlHttpsRule},
    timestamp::TimestampedRule,
    trust::{EmbeddedSignerVerifier, TrustVerifier, TrustedSignatureRule},
};

/// Outcome of one rule for one file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleResult {
    Pass,
    Fail,
    /// The rule id was suppressed.
    Skip,
    /// The rule is not part of the active rule-set.
    Excluded,
}

impl fmt::Display for RuleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Excluded => "excluded",
        };
        f.write_str(name)
    }
}

/// Identity shared by every rule.
pub trait RuleDescriptor {
    fn rule_id(&self) -> u32;

    fn rule_name(&self) -> &'static str;

    fn short_description(&self) -> &'static str;

    /// Rule-sets this rule belongs to.
    fn rule_set(&self) -> RuleSet;
}

/// A rule evaluated over the decoded signature graph.
pub trait SignatureRule: RuleDescriptor + Send + Sync {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        config: &CheckConfiguration,
    ) -> RuleResult;
}

/// A rule evaluated over the file itself.
pub trait FileRule: RuleDescriptor + Send + Sync {
    fn validate(
        &self,
        path: &Path,
        logger: &mut dyn SignatureLogger,
        config: &CheckConfiguration,
    ) -> RuleResult;
}

/// A registered rule, tagged by what it inspects.
pub enum Rule {
    File(Box<dyn FileRule>),
    Signature(Box<dyn SignatureRule>),
}

impl Rule {
    pub fn rule_id(&self) -> u32 {
        match self {
            Rule::File(rule) => rule.rule_id(),
            Rule::Signature(rule) => rule.rule_id(),
        }
    }

    pub fn rule_name(&self) -> &'static str {
        match self {
            Rule::File(rule) => rule.rule_name(),
            Rule::Signature(rule) => rule.rule_name(),
        }
    }

    pub fn short_description(&self) -> &'static str {
        match self {
            Rule::File(rule) => rule.short_description(),
            Rule::Signature(rule) => rule.short_description(),
        }
    }

    pub fn rule_set(&self) -> RuleSet {
        match self {
            Rule::File(rule) => rule.rule_set(),
            Rule::Signature(rule) => rule.rule_set(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.rule_id())
            .field("name", &self.rule_name())
            .finish()
    }
}

/// The complete, id-ordered list of rules.
///
/// Built once and shared read-only between runs.
#[derive(Debug)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Register every rule, sharing `calculator` between the key length
    /// rules and handing `verifier` to the trust rule.
    pub fn new(calculator: Arc<BitStrengthCalculator>, verifier: Arc<dyn TrustVerifier>) -> Self {
        let mut rules = vec![
            Rule::Signature(Box::new(Sha1PrimarySignatureRule)),
            Rule::Signature(Box::new(Sha2SignatureExistsRule)),
            Rule::Signature(Box::new(NoWeakFileDigestAlgorithmsRule)),
            Rule::Signature(Box::new(TimestampedRule)),
            Rule::Signature(Box::new(PublisherInformationPresentRule)),
            Rule::Signature(Box::new(PublisherInformationUrlHttpsRule)),
            Rule::Signature(Box::new(SigningCertificateDigestAlgorithmRule)),
            Rule::File(Box::new(TrustedSignatureRule::new(verifier))),
            Rule::File(Box::new(WinCertificatePaddingRule)),
            Rule::Signature(Box::new(NoUnknownUnsignedAttributeRule)),
            Rule::Signature(Box::new(NoUnknownCertificatesRule)),
            Rule::Signature(Box::new(StrongKeyLengthRule::new(calculator.clone()))),
            Rule::Signature(Box::new(RsaDsaPrimarySignatureRule::new(calculator.clone()))),
            Rule::Signature(Box::new(MaxKeyLengthRule::new(calculator))),
            Rule::Signature(Box::new(SinglePrimarySignatureRule)),
            Rule::Signature(Box::new(NoSha1Rule)),
            Rule::Signature(Box::new(Sha2PrimarySignatureRule)),
        ];
        rules.sort_by_key(Rule::rule_id);

        Self { rules }
    }

    /// Registry over an explicit rule list, sorted by id.
    pub fn from_rules(mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(Rule::rule_id);
        Self { rules }
    }

    /// Rules in id order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, rule_id: u32) -> Option<&Rule> {
        self.rules
            .binary_search_by_key(&rule_id, Rule::rule_id)
            .ok()
            .map(|index| &self.rules[index])
    }

    pub fn contains_id(&self, rule_id: u32) -> bool {
        self.get(rule_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new(
            Arc::new(BitStrengthCalculator::default()),
            Arc::new(EmbeddedSignerVerifier),
        )
    }
}
