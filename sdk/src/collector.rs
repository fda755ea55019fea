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

//! Receivers for rule outcomes.
//!
//! The engine reports each file as one set: `begin_set`, one
//! `collect_result` per rule in id order, `complete_set`, then `flush`.

use serde::Serialize;

use crate::{
    error::Result,
    rules::{Rule, RuleResult},
};

/// Receives rule outcomes from the [`RuleEngine`](crate::RuleEngine).
pub trait RuleResultCollector {
    /// Start collecting results for `file`.
    fn begin_set(&mut self, file: &str);

    fn collect_result(&mut self, rule: &Rule, result: RuleResult, messages: &[String]);

    /// No more results for the current file.
    fn complete_set(&mut self);

    /// Write out anything buffered so far.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One rule's outcome as recorded by a collector.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedResult {
    pub rule_id: u32,
    pub rule_name: String,
    pub result: RuleResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

/// Every outcome for one file.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CollectedSet {
    pub file: String,
    pub results: Vec<CollectedResult>,
}

impl CollectedSet {
    /// Returns the outcome of `rule_id`, if it was collected.
    pub fn result_of(&self, rule_id: u32) -> Option<&CollectedResult> {
        self.results.iter().find(|result| result.rule_id == rule_id)
    }
}

/// Keeps every completed set in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryRuleResultCollector {
    sets: Vec<CollectedSet>,
    current: Option<CollectedSet>,
    flushes: usize,
}

impl MemoryRuleResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed sets in the order they were begun.
    pub fn sets(&self) -> &[CollectedSet] {
        &self.sets
    }

    pub fn into_sets(self) -> Vec<CollectedSet> {
        self.sets
    }

    /// Number of times [`RuleResultCollector::flush`] was called.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl RuleResultCollector for MemoryRuleResultCollector {
    fn begin_set(&mut self, file: &str) {
        self.current = Some(CollectedSet {
            file: file.to_owned(),
            results: Vec::new(),
        });
    }

    fn collect_result(&mut self, rule: &Rule, result: RuleResult, messages: &[String]) {
        if let Some(current) = self.current.as_mut() {
            current.results.push(CollectedResult {
                rule_id: rule.rule_id(),
                rule_name: rule.rule_name().to_owned(),
                result,
                messages: messages.to_vec(),
            });
        }
    }

    fn complete_set(&mut self) {
        if let Some(current) = self.current.take() {
            self.sets.push(current);
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Forwards every call to each member collector in turn.
#[derive(Default)]
pub struct CollectorSet<'a> {
    collectors: Vec<&'a mut dyn RuleResultCollector>,
}

impl<'a> CollectorSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, collector: &'a mut dyn RuleResultCollector) {
        self.collectors.push(collector);
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl RuleResultCollector for CollectorSet<'_> {
    fn begin_set(&mut self, file: &str) {
        for collector in &mut self.collectors {
            collector.begin_set(file);
        }
    }

    fn collect_result(&mut self, rule: &Rule, result: RuleResult, messages: &[String]) {
        for collector in &mut self.collectors {
            collector.collect_result(rule, result, messages);
        }
    }

    fn complete_set(&mut self) {
        for collector in &mut self.collectors {
            collector.complete_set();
        }
    }

    /// Flushes every member, returning the first error after all have run.
    fn flush(&mut self) -> Result<()> {
        let mut first_error = None;
        for collector in &mut self.collectors {
            if let Err(err) = collector.flush() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
