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

//! Lint the Authenticode signatures of PE files.
//!
//! Exit codes: 0 when every rule passed on every file, 1 for an invalid
//! configuration, 2 when a rule failed or a file could not be checked.

use std::{process::exit, sync::Arc};

use authenticode_lint::{CollectorSet, RuleEngine, RuleEngineResult, RuleRegistry};
use clap::Parser;
use log::debug;

mod collectors;
mod options;

use collectors::{JsonReportCollector, StdOutRuleResultCollector};
use options::{CliArgs, Options};

const EXIT_INVALID_CONFIGURATION: i32 = 1;
const EXIT_RULE_FAILED: i32 = 2;

fn main() {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() {
                EXIT_INVALID_CONFIGURATION
            } else {
                0
            };
            let _ = err.print();
            exit(code);
        }
    };

    // set RUST_LOG=debug to get detailed debug logging
    let default_level = if args.verbose { "warn" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let registry = Arc::new(RuleRegistry::default());

    let options = match args.validate(&registry) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Invalid configuration: {err:#}");
            exit(EXIT_INVALID_CONFIGURATION);
        }
    };

    let mut stdout = StdOutRuleResultCollector::new();
    let mut report = options.report.clone().map(JsonReportCollector::new);

    let mut collectors = CollectorSet::new();
    if !options.quiet {
        collectors.push(&mut stdout);
    }
    if let Some(report) = report.as_mut() {
        collectors.push(report);
    }

    let engine = RuleEngine::new(registry);
    if run(&engine, &options, &mut collectors) == RuleEngineResult::NotAllPass {
        exit(EXIT_RULE_FAILED);
    }
}

/// Check every input file. Each collector is flushed by the engine once per
/// file.
fn run(
    engine: &RuleEngine,
    options: &Options,
    collectors: &mut CollectorSet,
) -> RuleEngineResult {
    let mut overall = RuleEngineResult::AllPass;

    for file in &options.files {
        debug!("checking {}", file.display());

        match engine.check_file(file, &options.config, &mut *collectors) {
            Ok(file_report) => overall = overall.and(file_report.result),
            Err(err) => {
                eprintln!("Unable to check {}: {err}", file.display());
                overall = RuleEngineResult::NotAllPass;
            }
        }
    }

    overall
}
