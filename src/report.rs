//! The aggregated, serializable view of a finished run.
//!
//! [`ReportModel::build`] reads a registry after [`Registry::gen_statistics`] and produces
//! everything a renderer needs: totals for suites, testcases and teststeps, a per-suite and
//! per-testcase breakdown, and the selected teststep details. The console printer in
//! `cli::output` and the JSON writer both work from this model only.
//!
//! Percentages are `None` whenever their denominator is zero.
//!
//! [`Registry::gen_statistics`]: crate::registry::Registry::gen_statistics

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::checker::ExpectationPolicy;
use crate::errors::FrameworkError;
use crate::model::{DisableReason, RecordedStep, StepId, Suite, Testcase, Verdict};
use crate::probe::SourceLocation;
use crate::registry::Registry;

/// `part` as a percentage of `whole`.
pub fn percent(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 * 100.0 / whole as f64)
    }
}

/// Renders a duration in µs, ms or s with three significant digits.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 0.001 {
        format!("{} µs", significant(secs * 1_000_000.0))
    } else if secs < 1.0 {
        format!("{} ms", significant(secs * 1_000.0))
    } else {
        format!("{} s", significant(secs))
    }
}

fn significant(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

// =============================================================================
// MODEL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total: usize,
    pub executed: usize,
    pub ok: usize,
    pub ok_percent: Option<f64>,
    pub disabled: usize,
    pub disabled_percent: Option<f64>,
    pub fail: usize,
    pub fail_percent: Option<f64>,
}

impl Totals {
    /// `ok` and `fail` are shares of the executed count, `disabled` of the total.
    pub fn new(ok: usize, fail: usize, disabled: usize) -> Self {
        let executed = ok + fail;
        let total = executed + disabled;
        Self {
            total,
            executed,
            ok,
            ok_percent: percent(ok, executed),
            disabled,
            disabled_percent: percent(disabled, total),
            fail,
            fail_percent: percent(fail, executed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub id: StepId,
    pub ok: bool,
    pub description: String,
    pub location: String,
    pub message: String,
    pub expected: String,
    pub actual: String,
    pub what: String,
}

impl StepReport {
    fn new(recorded: &RecordedStep, location: &str) -> Self {
        let step = &recorded.step;
        // exception type names win over rendered values
        let (expected, actual) = if step.ex_expected.is_some() || step.ex_happened.is_some() {
            (
                step.ex_expected.clone().unwrap_or_default(),
                step.ex_happened.clone().unwrap_or_default(),
            )
        } else {
            (step.expected.clone(), step.actual.clone())
        };
        Self {
            id: recorded.id,
            ok: step.ok,
            description: step.description.clone(),
            location: location.to_string(),
            message: step.message.clone(),
            expected,
            actual,
            what: step.what.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestcaseReport {
    pub name: String,
    pub path: String,
    pub description: String,
    pub location: String,
    pub verdict: Verdict,
    pub disabled: Option<DisableReason>,
    pub steps_ok: usize,
    pub steps_fail: usize,
    pub ok_percent: Option<f64>,
    pub fail_percent: Option<f64>,
    pub elapsed: String,
    pub elapsed_secs: f64,
    pub steps: Vec<StepReport>,
}

impl TestcaseReport {
    fn new(tc: &Testcase, description: &str, location: Option<&SourceLocation>, all_steps: bool) -> Self {
        let location = location.map(ToString::to_string).unwrap_or_default();
        let executed = tc.executed_steps();
        let steps = tc
            .steps
            .iter()
            .filter(|s| all_steps || !s.step.ok)
            .map(|s| StepReport::new(s, &location))
            .collect();
        Self {
            name: tc.name.clone(),
            path: tc.path.clone(),
            description: description.to_string(),
            location,
            verdict: tc.verdict(),
            disabled: tc.disabled,
            steps_ok: tc.ts_ok,
            steps_fail: tc.ts_fail,
            ok_percent: percent(tc.ts_ok, executed),
            fail_percent: percent(tc.ts_fail, executed),
            elapsed: format_elapsed(tc.elapsed),
            elapsed_secs: tc.elapsed.as_secs_f64(),
            steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub verdict: Verdict,
    pub testcases_total: Totals,
    pub elapsed: String,
    pub elapsed_secs: f64,
    pub testcases: Vec<TestcaseReport>,
}

impl SuiteReport {
    fn new(suite: &Suite, registry: &Registry, all_steps: bool) -> Self {
        let testcases = suite
            .testcases
            .values()
            .map(|tc| {
                let probe = registry.probe(&tc.path);
                TestcaseReport::new(
                    tc,
                    probe.map(|p| p.description.as_str()).unwrap_or_default(),
                    probe.map(|p| &p.location),
                    all_steps,
                )
            })
            .collect();
        let elapsed = suite.elapsed();
        Self {
            name: suite.name.clone(),
            verdict: suite.verdict(),
            testcases_total: Totals::new(suite.tc_ok, suite.tc_fail, suite.tc_disabled),
            elapsed: format_elapsed(elapsed),
            elapsed_secs: elapsed.as_secs_f64(),
            testcases,
        }
    }
}

/// What the console summary reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryState {
    NoSuites,
    AllDisabled,
    NoSteps,
    Complete { failed: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    pub title: Option<String>,
    pub filter: String,
    pub expectation_policy: ExpectationPolicy,
    pub all_steps: bool,
    pub suites_total: Totals,
    pub testcases_total: Totals,
    pub steps_total: Totals,
    pub elapsed: String,
    pub elapsed_secs: f64,
    pub suites: Vec<SuiteReport>,
}

impl ReportModel {
    /// Builds the model from a registry whose statistics are current.
    ///
    /// Only failing teststeps are included unless `all_steps` is set.
    pub fn build(registry: &Registry, all_steps: bool) -> Self {
        let stats = registry.statistics();
        let elapsed: Duration = registry.suites().map(Suite::elapsed).sum();
        Self {
            title: registry.title().map(str::to_string),
            filter: registry.filter().to_string(),
            expectation_policy: registry.policy(),
            all_steps,
            suites_total: Totals::new(stats.suites_ok, stats.suites_fail, 0),
            testcases_total: Totals::new(stats.tc_ok, stats.tc_fail, stats.tc_disabled),
            steps_total: Totals::new(stats.ts_ok, stats.ts_fail, 0),
            elapsed: format_elapsed(elapsed),
            elapsed_secs: elapsed.as_secs_f64(),
            suites: registry
                .suites()
                .map(|s| SuiteReport::new(s, registry, all_steps))
                .collect(),
        }
    }

    pub fn summary_state(&self) -> SummaryState {
        if self.suites_total.total == 0 {
            SummaryState::NoSuites
        } else if self.testcases_total.executed == 0 {
            SummaryState::AllDisabled
        } else if self.steps_total.executed == 0 {
            SummaryState::NoSteps
        } else {
            SummaryState::Complete {
                failed: self.has_failures(),
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        self.testcases_total.fail > 0
    }

    pub fn to_json(&self) -> Result<String, FrameworkError> {
        serde_json::to_string_pretty(self).map_err(|source| FrameworkError::ReportEncode { source })
    }

    /// Writes the model as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), FrameworkError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| FrameworkError::ReportWrite {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("<{}> created.", path.display());
        Ok(())
    }
}
