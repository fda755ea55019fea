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

//! Collectors that render rule outcomes for people and machines.

use std::{
    fs::File,
    io::{self, BufWriter, Stdout, Write},
    path::PathBuf,
};

use authenticode_lint::{
    collector::CollectedSet, rules::Rule, Error, MemoryRuleResultCollector, RuleResult,
    RuleResultCollector,
};
use serde::Serialize;

/// Prints one line per rule to a writer, stdout by default.
pub struct StdOutRuleResultCollector<W: Write = Stdout> {
    out: W,
    file: Option<String>,
    error: Option<io::Error>,
}

impl StdOutRuleResultCollector<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for StdOutRuleResultCollector<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StdOutRuleResultCollector<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            file: None,
            error: None,
        }
    }

    fn line(&mut self, text: &str) {
        if self.error.is_none() {
            if let Err(err) = writeln!(self.out, "{text}") {
                self.error = Some(err);
            }
        }
    }
}

impl<W: Write> RuleResultCollector for StdOutRuleResultCollector<W> {
    fn begin_set(&mut self, file: &str) {
        self.file = Some(file.to_owned());
        self.line(&format!("Start checks for {file}."));
    }

    fn collect_result(&mut self, rule: &Rule, result: RuleResult, messages: &[String]) {
        let verdict = match result {
            RuleResult::Pass => "passed.",
            RuleResult::Fail => "failed.",
            RuleResult::Skip => "was skipped because it was suppressed.",
            RuleResult::Excluded => "was excluded because it is not part of the ruleset.",
        };
        self.line(&format!(
            "\tRule #{} \"{}\" {verdict}",
            rule.rule_id(),
            rule.rule_name()
        ));
        for message in messages {
            self.line(&format!("\t\t{message}"));
        }
    }

    fn complete_set(&mut self) {
        if let Some(file) = self.file.take() {
            self.line(&format!("Complete checks for {file}."));
        }
    }

    fn flush(&mut self) -> authenticode_lint::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(Error::Io(err));
        }
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct Report<'a> {
    files: &'a [CollectedSet],
}

/// Writes every outcome seen so far to a JSON file on each flush.
pub struct JsonReportCollector {
    path: PathBuf,
    results: MemoryRuleResultCollector,
}

impl JsonReportCollector {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            results: MemoryRuleResultCollector::new(),
        }
    }
}

impl RuleResultCollector for JsonReportCollector {
    fn begin_set(&mut self, file: &str) {
        self.results.begin_set(file);
    }

    fn collect_result(&mut self, rule: &Rule, result: RuleResult, messages: &[String]) {
        self.results.collect_result(rule, result, messages);
    }

    fn complete_set(&mut self) {
        self.results.complete_set();
    }

    fn flush(&mut self) -> authenticode_lint::Result<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(
            &mut out,
            &Report {
                files: self.results.sets(),
            },
        )
        .map_err(io::Error::other)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use authenticode_lint::RuleRegistry;

    use super::*;

    #[test]
    fn text_lines() {
        let registry = RuleRegistry::default();
        let mut out = Vec::new();
        let mut collector = StdOutRuleResultCollector::with_writer(&mut out);

        collector.begin_set("app.exe");
        collector.collect_result(registry.get(10000).unwrap(), RuleResult::Pass, &[]);
        collector.collect_result(
            registry.get(10003).unwrap(),
            RuleResult::Fail,
            &["Signature is not timestamped.".to_owned()],
        );
        collector.collect_result(registry.get(10004).unwrap(), RuleResult::Skip, &[]);
        collector.collect_result(registry.get(10015).unwrap(), RuleResult::Excluded, &[]);
        collector.complete_set();
        collector.flush().unwrap();
        drop(collector);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Start checks for app.exe.\n\
             \tRule #10000 \"Primary SHA1\" passed.\n\
             \tRule #10003 \"Timestamped Rule\" failed.\n\
             \t\tSignature is not timestamped.\n\
             \tRule #10004 \"Publisher Information Present\" was skipped because it was suppressed.\n\
             \tRule #10015 \"No SHA1 File Digests\" was excluded because it is not part of the ruleset.\n\
             Complete checks for app.exe.\n"
        );
    }

    #[test]
    fn json_report() {
        let registry = RuleRegistry::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut collector = JsonReportCollector::new(path.clone());

        collector.begin_set("app.exe");
        collector.collect_result(registry.get(10008).unwrap(), RuleResult::Fail, &[]);
        collector.complete_set();
        collector.flush().unwrap();

        let report: serde_json::Value =
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(report["files"][0]["file"], "app.exe");
        assert_eq!(report["files"][0]["results"][0]["ruleId"], 10008);
        assert_eq!(report["files"][0]["results"][0]["result"], "fail");
    }
}
