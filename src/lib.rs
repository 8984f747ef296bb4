//! unitprobe: a self-registering unit-test framework.
//!
//! Testcases are declared with [`test_case!`], registered into an explicit [`Registry`]
//! through an ordered registration pass, executed under an optional path filter and rolled
//! up into suite, testcase and teststep statistics. Assertions go through the [`Checker`]
//! handed to each body; errors escaping a body are classified and recorded, never
//! propagated.

pub use crate::checker::{Checker, ExpectationPolicy};
pub use crate::errors::FrameworkError;
pub use crate::exception::{ErrorKind, Raised, TestError};
pub use crate::probe::{BodyResult, Probe, SourceLocation};
pub use crate::registry::{Registration, Registry, Statistics};
pub use crate::report::ReportModel;

pub mod checker;
pub mod cli;
pub mod errors;
pub mod exception;
pub mod model;
pub mod path;
pub mod probe;
pub mod registry;
pub mod report;
