//! Registry data: suites hold testcases, testcases hold teststeps.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

// =============================================================================
// TESTSTEP
// =============================================================================

/// Identity of a teststep within its testcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepId {
    /// Recorded by an assertion; the ordinal is per testcase and starts at 1.
    Ordinal(u32),
    /// Injected by the executor when a body raised.
    Synthetic,
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepId::Ordinal(n) => write!(f, "TS-{:03}", n),
            StepId::Synthetic => f.write_str("TC-intern"),
        }
    }
}

impl Serialize for StepId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One recorded assertion outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Teststep {
    pub ok: bool,
    pub description: String,
    pub message: String,
    /// Rendered expected value.
    pub expected: String,
    /// Rendered actual value.
    pub actual: String,
    /// Source text of the expected expression.
    pub expected_expr: String,
    /// Source text of the actual expression.
    pub actual_expr: String,
    pub ex_expected: Option<String>,
    pub ex_happened: Option<String>,
    /// Detail text of a raised error.
    pub what: String,
}

/// A teststep as stored in its testcase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStep {
    pub id: StepId,
    pub step: Teststep,
}

// =============================================================================
// TESTCASE
// =============================================================================

/// Why a testcase did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisableReason {
    /// The path ended in `/DISABLE`.
    Marker,
    /// The path did not contain the run filter.
    Filter,
}

/// Tri-state outcome of a testcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Ok,
    Fail,
    Disabled,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Ok => "OK",
            Verdict::Fail => "FAIL",
            Verdict::Disabled => "DISABLED",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Testcase {
    pub name: String,
    pub path: String,
    pub disabled: Option<DisableReason>,
    pub steps: Vec<RecordedStep>,
    pub step_counter: u32,
    pub elapsed: Duration,
    /// Outstanding exception expectation.
    pub ex_expected: Option<String>,
    /// Type name of the last raise seen by an assertion or the executor.
    pub ex_happened: Option<String>,
    pub ts_ok: usize,
    pub ts_fail: usize,
}

impl Testcase {
    pub fn new(name: impl Into<String>, path: impl Into<String>, disabled: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            disabled: disabled.then_some(DisableReason::Marker),
            ..Self::default()
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.is_some()
    }

    /// Appends an assertion step under the next ordinal.
    pub fn push_step(&mut self, step: Teststep) -> StepId {
        self.step_counter += 1;
        let id = StepId::Ordinal(self.step_counter);
        self.steps.push(RecordedStep { id, step });
        id
    }

    pub fn push_synthetic(&mut self, step: Teststep) {
        self.steps.push(RecordedStep {
            id: StepId::Synthetic,
            step,
        });
    }

    pub fn step(&self, id: StepId) -> Option<&Teststep> {
        self.steps.iter().find(|s| s.id == id).map(|s| &s.step)
    }

    /// Recomputes `ts_ok` / `ts_fail` from the recorded steps.
    pub fn recount(&mut self) {
        let ok = self.steps.iter().filter(|s| s.step.ok).count();
        self.ts_ok = ok;
        self.ts_fail = self.steps.len() - ok;
    }

    pub fn executed_steps(&self) -> usize {
        self.ts_ok + self.ts_fail
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_disabled() {
            Verdict::Disabled
        } else if self.ts_fail == 0 {
            Verdict::Ok
        } else {
            Verdict::Fail
        }
    }
}

// =============================================================================
// SUITE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suite {
    pub name: String,
    pub testcases: BTreeMap<String, Testcase>,
    pub tc_ok: usize,
    pub tc_fail: usize,
    pub tc_disabled: usize,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Recomputes the testcase rollup from member verdicts.
    pub fn recount(&mut self) {
        let (mut ok, mut fail, mut disabled) = (0, 0, 0);
        for tc in self.testcases.values() {
            match tc.verdict() {
                Verdict::Ok => ok += 1,
                Verdict::Fail => fail += 1,
                Verdict::Disabled => disabled += 1,
            }
        }
        self.tc_ok = ok;
        self.tc_fail = fail;
        self.tc_disabled = disabled;
    }

    pub fn executed(&self) -> usize {
        self.tc_ok + self.tc_fail
    }

    /// A suite fails as soon as one of its testcases fails.
    pub fn verdict(&self) -> Verdict {
        if self.tc_fail > 0 {
            Verdict::Fail
        } else {
            Verdict::Ok
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.testcases.values().map(|tc| tc.elapsed).sum()
    }
}
