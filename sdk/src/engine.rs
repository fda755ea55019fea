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

//! Runs the rule catalogue over a file's signature graph.

use std::{path::Path, sync::Arc};

use log::{debug, warn};
use serde::Serialize;

use crate::{
    collector::RuleResultCollector,
    config::CheckConfiguration,
    error::Result,
    extract::SignatureExtractor,
    extraction::extract_certificates,
    logger::{MemorySignatureLogger, NullSignatureLogger, SignatureLogger},
    rules::{Rule, RuleRegistry, RuleResult},
    signature::Graph,
};

const NOT_SIGNED: &str = "File is not Authenticode signed.";

/// Aggregate outcome of a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum RuleEngineResult {
    AllPass,
    NotAllPass,
}

impl RuleEngineResult {
    /// Combine two aggregates; any failure wins.
    pub fn and(self, other: RuleEngineResult) -> RuleEngineResult {
        if self == RuleEngineResult::AllPass && other == RuleEngineResult::AllPass {
            RuleEngineResult::AllPass
        } else {
            RuleEngineResult::NotAllPass
        }
    }
}

/// What one rule reported for one file.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub rule_id: u32,
    pub rule_name: &'static str,
    pub result: RuleResult,
    pub messages: Vec<String>,
}

/// Every rule outcome for one file, in rule id order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RuleEngineReport {
    pub result: RuleEngineResult,
    pub outcomes: Vec<RuleOutcome>,
}

impl RuleEngineReport {
    pub fn outcome(&self, rule_id: u32) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|outcome| outcome.rule_id == rule_id)
    }
}

/// Evaluates a shared [`RuleRegistry`].
///
/// The engine holds no per-file state, so one engine can check any number
/// of files, from any number of threads.
#[derive(Clone, Debug)]
pub struct RuleEngine {
    registry: Arc<RuleRegistry>,
}

impl RuleEngine {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Extract the signatures of `path` and run every rule over them.
    ///
    /// A file without a signature is not an error: every rule fails on it.
    /// A malformed top-level signature is, since no rule can say anything
    /// meaningful about it.
    pub fn check_file(
        &self,
        path: &Path,
        config: &CheckConfiguration,
        collector: &mut dyn RuleResultCollector,
    ) -> Result<RuleEngineReport> {
        let graph = SignatureExtractor.extract_file(path)?;

        if let Some(dir) = config.extract_path.as_deref() {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match extract_certificates(&graph, dir, &file_name) {
                Ok(count) => debug!("extracted {count} certificates from {}", path.display()),
                Err(err) => warn!("unable to extract certificates from {}: {err}", path.display()),
            }
        }

        self.run_all(path, &graph, config, collector)
    }

    /// Run every registered rule, in id order, over an extracted graph.
    pub fn run_all(
        &self,
        file: &Path,
        graph: &Graph,
        config: &CheckConfiguration,
        collector: &mut dyn RuleResultCollector,
    ) -> Result<RuleEngineReport> {
        let active = config.rule_set.flags();
        let mut result = RuleEngineResult::AllPass;
        let mut outcomes = Vec::with_capacity(self.registry.len());

        collector.begin_set(&file.display().to_string());

        for rule in self.registry.rules() {
            let (rule_result, messages) = if graph.is_empty() {
                (RuleResult::Fail, vec![NOT_SIGNED.to_owned()])
            } else if config.suppress_error_ids.contains(&rule.rule_id()) {
                (RuleResult::Skip, Vec::new())
            } else if !rule.rule_set().intersects(active) {
                (RuleResult::Excluded, Vec::new())
            } else {
                Self::evaluate(rule, file, graph, config)
            };

            debug!("rule {} on {}: {rule_result}", rule.rule_id(), file.display());

            if rule_result == RuleResult::Fail {
                result = RuleEngineResult::NotAllPass;
            }

            collector.collect_result(rule, rule_result, &messages);
            outcomes.push(RuleOutcome {
                rule_id: rule.rule_id(),
                rule_name: rule.rule_name(),
                result: rule_result,
                messages,
            });
        }

        collector.complete_set();
        collector.flush()?;

        Ok(RuleEngineReport { result, outcomes })
    }

    fn evaluate(
        rule: &Rule,
        file: &Path,
        graph: &Graph,
        config: &CheckConfiguration,
    ) -> (RuleResult, Vec<String>) {
        if config.verbose {
            let mut logger = MemorySignatureLogger::new();
            let result = Self::dispatch(rule, file, graph, &mut logger, config);
            (result, logger.into_messages())
        } else {
            let result = Self::dispatch(rule, file, graph, &mut NullSignatureLogger, config);
            (result, Vec::new())
        }
    }

    fn dispatch(
        rule: &Rule,
        file: &Path,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        config: &CheckConfiguration,
    ) -> RuleResult {
        match rule {
            Rule::File(rule) => rule.validate(file, logger, config),
            Rule::Signature(rule) => rule.validate(graph, logger, config),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(Arc::new(RuleRegistry::default()))
    }
}
