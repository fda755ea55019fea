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

//! Command line options and how they combine with a configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use authenticode_lint::{ActiveRuleSet, CheckConfiguration, RevocationChecking, RuleRegistry};
use clap::{Parser, ValueEnum};
use log::warn;

#[derive(Debug, Parser)]
#[command(
    name = "authlint",
    about = "Lint the Authenticode signatures of PE files.",
    version,
    arg_required_else_help = true
)]
pub struct CliArgs {
    /// Files to check. Glob wildcards are expanded.
    #[arg(long = "in", value_name = "GLOB", num_args = 1.., required = true)]
    pub inputs: Vec<String>,

    /// Comma separated rule ids to skip.
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    pub suppress: Vec<u32>,

    /// Do not print results.
    #[arg(long)]
    pub quiet: bool,

    /// Print the reason for every failed rule.
    #[arg(long)]
    pub verbose: bool,

    /// Write a JSON report to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Revocation checking performed by the trust verifier.
    #[arg(long, value_enum)]
    pub revocation: Option<RevocationArg>,

    /// Write embedded certificates below this directory.
    #[arg(long, value_name = "DIR")]
    pub extract: Option<PathBuf>,

    /// Rule-set to check against.
    #[arg(long, value_enum)]
    pub ruleset: Option<RuleSetArg>,

    /// TOML configuration file. Command line flags take precedence.
    #[arg(long, value_name = "FILE", env = "AUTHLINT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RuleSetArg {
    Modern,
    Compat,
    All,
}

impl From<RuleSetArg> for ActiveRuleSet {
    fn from(value: RuleSetArg) -> Self {
        match value {
            RuleSetArg::Modern => ActiveRuleSet::Modern,
            RuleSetArg::Compat => ActiveRuleSet::Compat,
            RuleSetArg::All => ActiveRuleSet::All,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RevocationArg {
    None,
    Offline,
    Online,
}

impl From<RevocationArg> for RevocationChecking {
    fn from(value: RevocationArg) -> Self {
        match value {
            RevocationArg::None => RevocationChecking::None,
            RevocationArg::Offline => RevocationChecking::Offline,
            RevocationArg::Online => RevocationChecking::Online,
        }
    }
}

/// A configuration that passed validation, plus the files it applies to.
#[derive(Debug)]
pub struct Options {
    pub config: CheckConfiguration,
    pub files: Vec<PathBuf>,
    pub quiet: bool,
    pub report: Option<PathBuf>,
}

impl CliArgs {
    /// Read the configuration file, if any, and lay the flags over it.
    pub fn configuration(&self) -> Result<CheckConfiguration> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => CheckConfiguration::default(),
        };

        config.suppress_error_ids.extend(self.suppress.iter().copied());
        config.verbose |= self.verbose;
        if let Some(rule_set) = self.ruleset {
            config.rule_set = rule_set.into();
        }
        if let Some(revocation) = self.revocation {
            config.revocation_mode = revocation.into();
        }
        if let Some(extract) = &self.extract {
            config.extract_path = Some(extract.clone());
        }

        Ok(config)
    }

    /// Check the combined configuration against `registry` and resolve inputs.
    pub fn validate(&self, registry: &RuleRegistry) -> Result<Options> {
        if self.verbose && self.quiet {
            bail!("--verbose and --quiet cannot be used together");
        }

        let mut config = self.configuration()?;

        if let Some(id) = config
            .suppress_error_ids
            .iter()
            .find(|id| !registry.contains_id(**id))
        {
            bail!("rule {id} cannot be suppressed because it does not exist");
        }

        if let Some(dir) = &config.extract_path {
            if !dir.is_dir() {
                warn!(
                    "extract directory {} does not exist, certificates will not be extracted",
                    dir.display()
                );
                config.extract_path = None;
            }
        }

        let files = resolve_inputs(&self.inputs)?;
        if files.is_empty() {
            bail!("no input files found");
        }

        Ok(Options {
            config,
            files,
            quiet: self.quiet,
            report: self.report.clone(),
        })
    }
}

fn load_config(path: &Path) -> Result<CheckConfiguration> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("unable to read configuration {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid configuration {}", path.display()))
}

/// Expand every pattern, keeping only regular files, in pattern order.
fn resolve_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths = glob::glob(pattern).with_context(|| format!("invalid pattern {pattern}"))?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    if !files.contains(&path) {
                        files.push(path);
                    }
                }
                Ok(_) => {}
                Err(err) => warn!("unable to read {}: {err}", err.path().display()),
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use authenticode_lint::IntermediateStrengthPolicy;

    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("authlint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "suppress_error_ids = [10001]\nrule_set = \"all\"\nchain_policy = \"enforce\"\n"
        )
        .unwrap();
        let config_path = file.path().to_str().unwrap().to_owned();

        let args = parse(&[
            "--in",
            "*.exe",
            "--config",
            &config_path,
            "--suppress",
            "10002,10003",
            "--ruleset",
            "compat",
        ]);
        let config = args.configuration().unwrap();

        assert_eq!(
            config.suppress_error_ids.into_iter().collect::<Vec<_>>(),
            [10001, 10002, 10003]
        );
        assert_eq!(config.rule_set, ActiveRuleSet::Compat);
        assert_eq!(config.chain_policy, IntermediateStrengthPolicy::Enforce);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let args = parse(&["--in", "*.exe", "--verbose", "--quiet"]);
        let err = args.validate(&RuleRegistry::default()).unwrap_err();
        assert!(err.to_string().contains("cannot be used together"));
    }

    #[test]
    fn unknown_suppressed_rule() {
        let args = parse(&["--in", "*.exe", "--suppress", "42"]);
        let err = args.validate(&RuleRegistry::default()).unwrap_err();
        assert!(err.to_string().contains("rule 42"));
    }

    #[test]
    fn inputs_must_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.exe");
        let args = parse(&["--in", pattern.to_str().unwrap()]);

        let err = args.validate(&RuleRegistry::default()).unwrap_err();
        assert!(err.to_string().contains("no input files"));

        std::fs::write(dir.path().join("a.exe"), b"MZ").unwrap();
        std::fs::write(dir.path().join("b.dll"), b"MZ").unwrap();
        let options = args.validate(&RuleRegistry::default()).unwrap();
        assert_eq!(options.files, [dir.path().join("a.exe")]);
    }

    #[test]
    fn missing_extract_dir_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.exe"), b"MZ").unwrap();
        let pattern = dir.path().join("*.exe");
        let missing = dir.path().join("missing");
        let args = parse(&[
            "--in",
            pattern.to_str().unwrap(),
            "--extract",
            missing.to_str().unwrap(),
        ]);

        let options = args.validate(&RuleRegistry::default()).unwrap();
        assert_eq!(options.config.extract_path, None);
    }
}
