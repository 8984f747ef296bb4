//! Fatal framework errors.
//!
//! These mean the registry or its invariants are broken and no result after them can be
//! trusted. They are returned up to the runner, which renders them with `miette` and aborts.
//! Failing assertions and errors raised by test bodies are *not* represented here; they
//! are recorded as failing teststeps.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::probe::SourceLocation;

#[derive(Debug, Error, Diagnostic)]
pub enum FrameworkError {
    #[error("duplicate testcase '{suite}/{name}': registered by <{first_path}> at {first_location} and by <{second_path}> at {second_location}")]
    #[diagnostic(
        code(unitprobe::registry::duplicate),
        help("testcase names must be unique within a suite; rename one of the two paths")
    )]
    DuplicateTestcase {
        suite: String,
        name: String,
        first_path: String,
        first_location: SourceLocation,
        second_path: String,
        second_location: SourceLocation,
    },

    #[error("suite '{suite}' not found")]
    #[diagnostic(code(unitprobe::registry::suite_not_found))]
    SuiteNotFound { suite: String },

    #[error("testcase '{name}' not found in suite '{suite}'")]
    #[diagnostic(code(unitprobe::registry::testcase_not_found))]
    TestcaseNotFound { suite: String, name: String },

    #[error("testcase <{path}> was skipped, but {steps} teststeps were executed")]
    #[diagnostic(
        code(unitprobe::registry::disabled_with_steps),
        help("a disabled testcase must never run its body")
    )]
    DisabledWithSteps { path: String, steps: usize },

    #[error("failed to write report <{}>", path.display())]
    #[diagnostic(code(unitprobe::report::write))]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report")]
    #[diagnostic(code(unitprobe::report::encode))]
    ReportEncode {
        #[source]
        source: serde_json::Error,
    },
}

impl FrameworkError {
    /// Process exit code used by the runner when aborting on this error.
    pub fn exit_code(&self) -> i32 {
        2
    }
}
