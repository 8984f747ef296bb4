//! The unitprobe runner.
//!
//! A test binary collects its registration functions and hands them to [`main`]; the
//! runner parses the command line, builds a [`Registry`], runs the whole cycle and maps
//! the outcome to a process exit code:
//!
//! - `0`: every executed testcase passed
//! - `1`: at least one testcase failed
//! - `2`: a fatal framework error aborted the run
//!
//! ```no_run
//! use unitprobe::{cli, is_equal, test_case, FrameworkError, Registry};
//!
//! fn math(registry: &mut Registry) -> Result<(), FrameworkError> {
//!     registry.subscribe(test_case!("/Math/add", "2 + 2 => 4", |t| {
//!         is_equal!(t, 2 + 2, 4);
//!         Ok(())
//!     }))
//! }
//!
//! fn main() {
//!     std::process::exit(cli::main(&[math]));
//! }
//! ```

use std::io::Write;

use clap::Parser;
use tracing_subscriber::prelude::*;

use crate::cli::args::{RunOptions, RunnerArgs};
use crate::errors::FrameworkError;
use crate::registry::{Registration, Registry};
use crate::report::ReportModel;

pub mod args;
pub mod output;

pub const LOG_ENV: &str = "UNITPROBE_LOG";

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub registry: Registry,
    pub model: ReportModel,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.model.has_failures() {
            1
        } else {
            0
        }
    }
}

/// Parses the process arguments, runs and returns the exit code.
pub fn main(registrations: &[Registration]) -> i32 {
    let options: RunOptions = RunnerArgs::parse().into();
    init_tracing(options.debug);
    match run(registrations, &options) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    }
}

/// Installs the `tracing` subscriber; `UNITPROBE_LOG` overrides the level.
pub fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Runs the full cycle: register, filter, execute, roll up, report.
///
/// # Errors
/// Any fatal [`FrameworkError`]. Failing testcases are not errors; they show up in the
/// returned model.
pub fn run(registrations: &[Registration], options: &RunOptions) -> Result<RunOutcome, FrameworkError> {
    let mut registry = Registry::with_policy(options.expectation_policy);
    registry.register_all(registrations)?;
    registry.set_filter(options.filter.as_str());

    registry.exec()?;
    registry.gen_statistics()?;

    let model = ReportModel::build(&registry, options.report_all_steps);

    let mut stdout = output::stdout();
    print_console(&mut stdout, &registry, &model, options.debug)
        .map_err(|source| FrameworkError::ReportWrite {
            path: "<stdout>".into(),
            source,
        })?;

    model.write_json(&options.report_path)?;
    if !options.skip_pdf {
        tracing::info!("pdf conversion is not available, skipping (use --nopdf to silence)");
    }

    Ok(RunOutcome { registry, model })
}

/// Console output of a run; `debug` prepends the registry dump.
fn print_console<W: termcolor::WriteColor>(
    out: &mut W,
    registry: &Registry,
    model: &ReportModel,
    debug: bool,
) -> std::io::Result<()> {
    if debug {
        writeln!(out, "{}", registry.dump())?;
    }
    output::print_testcases(out, model)?;
    output::print_failures(out, model)?;
    output::print_summary(out, model)
}
