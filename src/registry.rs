//! # Unitprobe: the Testcase Registry
//!
//! Holds every registered [`Probe`] and the suite → testcase tree built from them, and
//! drives the three phases of a run:
//!
//! 1. **Subscription**: probes are registered through [`Registry::subscribe`], usually
//!    from an ordered list of registration functions passed to [`Registry::register_all`].
//! 2. **Execution**: [`Registry::exec`] walks the probes in path order, applies the filter,
//!    runs every enabled body and turns escaping raises into a synthetic failing step.
//! 3. **Rollup**: [`Registry::gen_statistics`] recomputes every counter from the recorded
//!    steps; the report module reads the result.
//!
//! Registry invariant: every testcase in the suite map has a probe in the path map under
//! its path, and vice versa. The registry is an ordinary value owned by the runner; nothing
//! about it is global.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::checker::{Checker, ExpectationPolicy};
use crate::errors::FrameworkError;
use crate::exception::{classify, classify_panic, Classified, UNKNOWN_TYPE};
use crate::model::{DisableReason, Suite, Testcase, Teststep, Verdict};
use crate::probe::{Command, Probe};

/// Description of the step injected when a body raises outside any assertion.
pub const SYNTHETIC_STEP_DESC: &str = "internally generated Teststep for Testcase exception failure";

/// Expected exception text of the synthetic step.
pub const NO_EXCEPTION: &str = "no exception";

/// A registration function, as collected by a test binary.
pub type Registration = fn(&mut Registry) -> Result<(), FrameworkError>;

/// Rollup produced by [`Registry::gen_statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub suites_ok: usize,
    pub suites_fail: usize,
    pub tc_ok: usize,
    pub tc_fail: usize,
    pub tc_disabled: usize,
    pub ts_ok: usize,
    pub ts_fail: usize,
}

impl Statistics {
    pub fn tc_executed(&self) -> usize {
        self.tc_ok + self.tc_fail
    }

    pub fn ts_executed(&self) -> usize {
        self.ts_ok + self.ts_fail
    }

    pub fn has_failures(&self) -> bool {
        self.tc_fail > 0
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    probes: BTreeMap<String, Probe>,
    suites: BTreeMap<String, Suite>,
    filter: String,
    title: Option<String>,
    policy: ExpectationPolicy,
    statistics: Statistics,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ExpectationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // =========================================================================
    // SUBSCRIPTION
    // =========================================================================

    /// Runs every registration function in order, stopping at the first fatal error.
    pub fn register_all(&mut self, registrations: &[Registration]) -> Result<(), FrameworkError> {
        for register in registrations {
            register(self)?;
        }
        tracing::debug!(testcases = self.probes.len(), suites = self.suites.len(), "registration complete");
        Ok(())
    }

    /// Registers a probe under its path and its (suite, name) identity.
    ///
    /// # Errors
    /// [`FrameworkError::DuplicateTestcase`] when the suite already holds a testcase of the
    /// same name. Nothing is inserted in that case.
    pub fn subscribe(&mut self, probe: Probe) -> Result<(), FrameworkError> {
        let suite_name = probe.suite().to_string();
        let tc_name = probe.name().to_string();

        if let Some(existing) = self
            .suites
            .get(&suite_name)
            .and_then(|suite| suite.testcases.get(&tc_name))
        {
            let first = self.probes.get(&existing.path).ok_or_else(|| {
                FrameworkError::TestcaseNotFound {
                    suite: suite_name.clone(),
                    name: tc_name.clone(),
                }
            })?;
            tracing::error!(
                "two testcases have the same name: {}/{} in {} and {} in {}",
                suite_name,
                tc_name,
                first.location,
                probe.path,
                probe.location
            );
            return Err(FrameworkError::DuplicateTestcase {
                suite: suite_name,
                name: tc_name,
                first_path: existing.path.clone(),
                first_location: first.location.clone(),
                second_path: probe.path.clone(),
                second_location: probe.location.clone(),
            });
        }

        let testcase = Testcase::new(tc_name.clone(), probe.path.clone(), probe.is_disabled());
        self.suites
            .entry(suite_name.clone())
            .or_insert_with(|| Suite::new(suite_name))
            .testcases
            .insert(tc_name, testcase);
        self.probes.insert(probe.path.clone(), probe);
        Ok(())
    }

    /// Applies an out-of-band command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetTitle(title) => self.set_title(title),
        }
    }

    /// Parses and applies a command string; unknown commands are reported and ignored.
    pub fn command(&mut self, cmd: &str, data: &str) {
        if let Some(command) = Command::parse(cmd, data) {
            self.apply(command);
        }
    }

    /// Sets the report title. The first title wins.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        match &self.title {
            Some(current) if !current.is_empty() => {
                tracing::warn!("Title was already set to <{}>, ignoring <{}>", current, title);
            }
            _ => self.title = Some(title),
        }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        if !self.filter.is_empty() {
            tracing::info!("set filter to <{}>", self.filter);
        }
    }

    pub fn set_policy(&mut self, policy: ExpectationPolicy) {
        self.policy = policy;
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn policy(&self) -> ExpectationPolicy {
        self.policy
    }

    pub fn probes(&self) -> impl Iterator<Item = &Probe> {
        self.probes.values()
    }

    pub fn probe(&self, path: &str) -> Option<&Probe> {
        self.probes.get(path)
    }

    pub fn suites(&self) -> impl Iterator<Item = &Suite> {
        self.suites.values()
    }

    pub fn suite(&self, name: &str) -> Option<&Suite> {
        self.suites.get(name)
    }

    pub fn testcase_count(&self) -> usize {
        self.probes.len()
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    /// Exact lookup by (suite, name).
    ///
    /// # Errors
    /// A miss means the path map and the suite map drifted apart; it is fatal.
    pub fn find_testcase(&self, suite: &str, name: &str) -> Result<&Testcase, FrameworkError> {
        let s = self
            .suites
            .get(suite)
            .ok_or_else(|| FrameworkError::SuiteNotFound {
                suite: suite.to_string(),
            })?;
        s.testcases
            .get(name)
            .ok_or_else(|| FrameworkError::TestcaseNotFound {
                suite: suite.to_string(),
                name: name.to_string(),
            })
    }

    // =========================================================================
    // EXECUTION
    // =========================================================================

    /// Runs every registered testcase once, in path order.
    ///
    /// Only fatal framework errors are returned; test failures end up as teststeps.
    pub fn exec(&mut self) -> Result<(), FrameworkError> {
        for (path, probe) in &self.probes {
            let testcase = find_testcase_mut(&mut self.suites, probe.suite(), probe.name())?;

            if !path.contains(self.filter.as_str()) {
                tracing::info!(
                    "Test {} skipped because of filter condition <{}>",
                    path,
                    self.filter
                );
                testcase.disabled.get_or_insert(DisableReason::Filter);
                continue;
            }

            if testcase.is_disabled() {
                tracing::debug!("Test {} is DISABLED", path);
                continue;
            }

            run_testcase(testcase, probe, self.policy);
        }
        Ok(())
    }

    // =========================================================================
    // ROLLUP
    // =========================================================================

    /// Recomputes all counters from the recorded steps, top to bottom.
    ///
    /// # Errors
    /// [`FrameworkError::DisabledWithSteps`] when a disabled testcase has executed steps.
    pub fn gen_statistics(&mut self) -> Result<Statistics, FrameworkError> {
        let mut stats = Statistics::default();

        for suite in self.suites.values_mut() {
            for tc in suite.testcases.values_mut() {
                tc.recount();
                if tc.is_disabled() && tc.executed_steps() > 0 {
                    return Err(FrameworkError::DisabledWithSteps {
                        path: tc.path.clone(),
                        steps: tc.executed_steps(),
                    });
                }
                if !tc.is_disabled() {
                    stats.ts_ok += tc.ts_ok;
                    stats.ts_fail += tc.ts_fail;
                }
            }

            suite.recount();
            stats.tc_ok += suite.tc_ok;
            stats.tc_fail += suite.tc_fail;
            stats.tc_disabled += suite.tc_disabled;
            match suite.verdict() {
                Verdict::Fail => stats.suites_fail += 1,
                _ => stats.suites_ok += 1,
            }
        }

        self.statistics = stats;
        Ok(stats)
    }

    // =========================================================================
    // DEBUG DUMP
    // =========================================================================

    /// Text dump of the whole registry.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "filter   : {}", self.filter);
        let _ = writeln!(out, "title    : {}", self.title.as_deref().unwrap_or(""));
        let _ = writeln!(out, "policy   : {:?}", self.policy);
        let _ = writeln!(out, "suites OK: {}", self.statistics.suites_ok);
        let _ = writeln!(out, "suites FAIL: {}", self.statistics.suites_fail);

        out.push_str(" === probes ======================\n");
        for (i, probe) in self.probes.values().enumerate() {
            let _ = writeln!(out, "[{}] <{}> -> {:?}", i, probe.path, probe);
        }

        out.push_str(" === suites ======================\n");
        for (i, suite) in self.suites.values().enumerate() {
            let _ = writeln!(
                out,
                "[{}] {} OK={} FAIL={} DISABLED={}",
                i, suite.name, suite.tc_ok, suite.tc_fail, suite.tc_disabled
            );
            for tc in suite.testcases.values() {
                let _ = writeln!(
                    out,
                    "\t{} <{}> disabled={:?} ts_OK={} ts_FAIL={} expected={:?} happened={:?} time={:?}",
                    tc.name, tc.path, tc.disabled, tc.ts_ok, tc.ts_fail, tc.ex_expected, tc.ex_happened, tc.elapsed
                );
                for recorded in &tc.steps {
                    let _ = writeln!(out, "\t\t{}: {:?}", recorded.id, recorded.step);
                }
            }
        }
        out
    }
}

// =============================================================================
// INTERNAL HELPERS
// =============================================================================

fn find_testcase_mut<'a>(
    suites: &'a mut BTreeMap<String, Suite>,
    suite: &str,
    name: &str,
) -> Result<&'a mut Testcase, FrameworkError> {
    suites
        .get_mut(suite)
        .ok_or_else(|| FrameworkError::SuiteNotFound {
            suite: suite.to_string(),
        })?
        .testcases
        .get_mut(name)
        .ok_or_else(|| FrameworkError::TestcaseNotFound {
            suite: suite.to_string(),
            name: name.to_string(),
        })
}

/// Runs one body under timing; an escaping raise becomes the synthetic failing step.
fn run_testcase(testcase: &mut Testcase, probe: &Probe, policy: ExpectationPolicy) {
    testcase.ex_happened = None;

    let start = Instant::now();
    let outcome = {
        let mut checker = Checker::new(testcase, &probe.description, policy);
        catch_unwind(AssertUnwindSafe(|| (probe.body)(&mut checker)))
    };
    let elapsed: Duration = start.elapsed();
    testcase.elapsed = elapsed;

    let raised = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(classify(&e)),
        Err(payload) => Some(classify_panic(payload.as_ref())),
    };

    if let Some(raised) = raised {
        tracing::debug!("FAILED: <{} - raised {}", testcase.name, raised.type_name());
        testcase.ex_happened = Some(raised.type_name().to_string());
        testcase.push_synthetic(synthetic_step(raised));
    }
}

fn synthetic_step(raised: Classified) -> Teststep {
    let mut message = format!("exception escaped the testcase: {}", raised.type_name());
    if raised.type_name() == UNKNOWN_TYPE {
        message.push_str(" (UNKNOWN) means it was not derived from the recognized error family.");
    }
    Teststep {
        ok: false,
        description: SYNTHETIC_STEP_DESC.to_string(),
        message,
        ex_expected: Some(NO_EXCEPTION.to_string()),
        ex_happened: Some(raised.type_name().to_string()),
        what: raised.what,
        ..Teststep::default()
    }
}
