//! Defines the command-line arguments of a unitprobe test binary.
//!
//! This module uses the `clap` crate with its "derive" feature; the parsed arguments are
//! turned into a plain [`RunOptions`] before anything runs.

use std::path::PathBuf;

use clap::Parser;

use crate::checker::ExpectationPolicy;

pub const DEFAULT_REPORT: &str = "results.json";

/// The command-line arguments every test binary accepts.
#[derive(Debug, Parser)]
#[command(
    name = "unitprobe",
    version,
    about = "Runs the registered unit tests and reports the results."
)]
pub struct RunnerArgs {
    /// Enable debug output and dump the registry after the run.
    #[arg(short, long)]
    pub debug: bool,

    /// Report details of all teststeps, not just the failed ones.
    #[arg(short = 'a', long = "all-steps")]
    pub all_steps: bool,

    /// Disable all testcases whose path does NOT contain <FILTER>.
    #[arg(short, long, value_name = "FILTER")]
    pub filter: Option<String>,

    /// No pdf generation.
    #[arg(long = "nopdf")]
    pub nopdf: bool,

    /// Where to write the JSON report.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_REPORT)]
    pub report: PathBuf,

    /// Keep an exception expectation until it is overwritten.
    #[arg(long = "sticky-expect")]
    pub sticky_expect: bool,
}

/// Everything a run needs, independent of how it was configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub debug: bool,
    pub report_all_steps: bool,
    pub filter: String,
    pub skip_pdf: bool,
    pub report_path: PathBuf,
    pub expectation_policy: ExpectationPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            debug: false,
            report_all_steps: false,
            filter: String::new(),
            skip_pdf: false,
            report_path: PathBuf::from(DEFAULT_REPORT),
            expectation_policy: ExpectationPolicy::default(),
        }
    }
}

impl From<RunnerArgs> for RunOptions {
    fn from(args: RunnerArgs) -> Self {
        Self {
            debug: args.debug,
            report_all_steps: args.all_steps,
            filter: args.filter.unwrap_or_default(),
            skip_pdf: args.nopdf,
            report_path: args.report,
            expectation_policy: if args.sticky_expect {
                ExpectationPolicy::Sticky
            } else {
                ExpectationPolicy::OneShot
            },
        }
    }
}
