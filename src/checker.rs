//! The assertion surface a running test body works with.
//!
//! Every assertion records exactly one [`Teststep`] on the current testcase. Assertions
//! that evaluate a closure also settle the testcase's exception expectation: a raise that
//! matches the outstanding [`Checker::expect`] passes, anything else fails.
//!
//! # Expectation lifetime
//!
//! An expectation set with [`Checker::expect`] is matched against assertions that follow
//! it. Under [`ExpectationPolicy::OneShot`] the next assertion consumes it; under
//! [`ExpectationPolicy::Sticky`] it stays in force until the next `expect` call replaces it.

use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::exception::{classify, classify_panic, Classified, ErrorKind, Raised, UNKNOWN_TYPE};
use crate::model::{Testcase, Teststep};

pub const MSG_AS_EXPECTED: &str = "exception happened (or not), as expected";
pub const MSG_UNEXPECTED: &str = "unexpected exception occurred!";
pub const MSG_MISMATCH: &str = "exceptions do NOT match";
pub const MSG_ASSERT: &str = "assert violation";

/// How long an exception expectation stays in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpectationPolicy {
    /// Consumed by the next assertion.
    #[default]
    OneShot,
    /// Kept until overwritten by another `expect`.
    Sticky,
}

/// Result of evaluating one assertion, before the expectation is settled.
enum Evaluation {
    Passed,
    Failed(Teststep),
    Raised(Classified),
}

pub struct Checker<'a> {
    testcase: &'a mut Testcase,
    description: &'a str,
    policy: ExpectationPolicy,
}

impl<'a> Checker<'a> {
    pub fn new(testcase: &'a mut Testcase, description: &'a str, policy: ExpectationPolicy) -> Self {
        Self {
            testcase,
            description,
            policy,
        }
    }

    pub fn testcase(&self) -> &Testcase {
        &*self.testcase
    }

    // =========================================================================
    // EXPECTATIONS
    // =========================================================================

    /// Declares that the next assertion is expected to raise `type_name`.
    pub fn expect(&mut self, type_name: impl Into<String>) {
        let type_name = type_name.into();
        tracing::debug!(testcase = %self.testcase.path, expected = %type_name, "exception expected");
        self.testcase.ex_expected = Some(type_name);
    }

    pub fn expect_kind(&mut self, kind: ErrorKind) {
        self.expect(kind.as_str());
    }

    pub fn expectation(&self) -> Option<&str> {
        self.testcase.ex_expected.as_deref()
    }

    // =========================================================================
    // VALUE ASSERTIONS
    // =========================================================================

    /// Records whether `actual == expected`.
    pub fn equal<A, B>(&mut self, actual: A, expected: B) -> bool
    where
        A: PartialEq<B> + Display,
        B: Display,
    {
        let evaluation = compare(&actual, &expected, "", "");
        self.settle(evaluation)
    }

    pub fn is_true(&mut self, value: bool) -> bool {
        let evaluation = truth(value, "");
        self.settle(evaluation)
    }

    // =========================================================================
    // GUARDED ASSERTIONS
    // =========================================================================

    /// Evaluates `eval` and compares its value with `expected`.
    ///
    /// An `Err` or a panic from `eval` is classified and settled against the expectation.
    pub fn check_equal<A, B, E, F>(
        &mut self,
        eval: F,
        expected: B,
        actual_expr: &str,
        expected_expr: &str,
    ) -> bool
    where
        F: FnOnce() -> Result<A, E>,
        E: Into<Raised>,
        A: PartialEq<B> + Display,
        B: Display,
    {
        let evaluation = match guarded(eval) {
            Ok(actual) => compare(&actual, &expected, actual_expr, expected_expr),
            Err(raised) => Evaluation::Raised(raised),
        };
        self.settle(evaluation)
    }

    pub fn check_true<E, F>(&mut self, eval: F, expr: &str) -> bool
    where
        F: FnOnce() -> Result<bool, E>,
        E: Into<Raised>,
    {
        let evaluation = match guarded(eval) {
            Ok(value) => truth(value, expr),
            Err(raised) => Evaluation::Raised(raised),
        };
        self.settle(evaluation)
    }

    /// Passes when `eval` completes without raising.
    pub fn check_ok<T, E, F>(&mut self, eval: F, expr: &str) -> bool
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<Raised>,
    {
        let evaluation = match guarded(eval) {
            Ok(_) => Evaluation::Passed,
            Err(raised) => Evaluation::Raised(raised),
        };
        if matches!(evaluation, Evaluation::Passed) {
            tracing::trace!(testcase = %self.testcase.path, expr, "statement completed");
        }
        self.settle(evaluation)
    }

    // =========================================================================
    // STEP RECORDING
    // =========================================================================

    fn take_expectation(&mut self) -> Option<String> {
        match self.policy {
            ExpectationPolicy::OneShot => self.testcase.ex_expected.take(),
            ExpectationPolicy::Sticky => self.testcase.ex_expected.clone(),
        }
    }

    /// Reconciles the evaluation with the expectation and records the step.
    fn settle(&mut self, evaluation: Evaluation) -> bool {
        let expected = self.take_expectation();

        let step = match (evaluation, expected) {
            (Evaluation::Passed, None) => Teststep {
                ok: true,
                ..Teststep::default()
            },
            (Evaluation::Failed(step), None) => step,
            (Evaluation::Raised(raised), Some(expected))
                if !raised.class.is_unknown() && raised.type_name() == expected =>
            {
                self.testcase.ex_happened = Some(raised.type_name().to_string());
                Teststep {
                    ok: true,
                    message: MSG_AS_EXPECTED.to_string(),
                    ex_expected: Some(expected),
                    ex_happened: Some(raised.type_name().to_string()),
                    ..Teststep::default()
                }
            }
            (Evaluation::Raised(raised), expected) => {
                self.testcase.ex_happened = Some(raised.type_name().to_string());
                Teststep {
                    ok: false,
                    message: mismatch_message(expected.as_deref(), Some(raised.type_name())),
                    ex_expected: expected,
                    ex_happened: Some(raised.type_name().to_string()),
                    what: raised.what,
                    ..Teststep::default()
                }
            }
            // an expectation was outstanding, but nothing was raised
            (Evaluation::Passed, Some(expected)) => Teststep {
                ok: false,
                message: mismatch_message(Some(&expected), None),
                ex_expected: Some(expected),
                ..Teststep::default()
            },
            (Evaluation::Failed(step), Some(expected)) => Teststep {
                ok: false,
                message: mismatch_message(Some(&expected), None),
                ex_expected: Some(expected),
                ..step
            },
        };

        self.record(step)
    }

    fn record(&mut self, mut step: Teststep) -> bool {
        step.description = self.description.to_string();
        let ok = step.ok;
        let id = self.testcase.push_step(step);
        if ok {
            tracing::debug!("passed: <{} - {}", self.testcase.name, id);
        } else {
            tracing::debug!("FAILED: <{} - {}", self.testcase.name, id);
        }
        ok
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn guarded<T, E, F>(eval: F) -> Result<T, Classified>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Raised>,
{
    match catch_unwind(AssertUnwindSafe(eval)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(classify(&e.into())),
        Err(payload) => Err(classify_panic(payload.as_ref())),
    }
}

fn compare<A, B>(actual: &A, expected: &B, actual_expr: &str, expected_expr: &str) -> Evaluation
where
    A: PartialEq<B> + Display,
    B: Display,
{
    if actual == expected {
        return Evaluation::Passed;
    }

    let actual_val = actual.to_string();
    let expected_val = expected.to_string();
    let message = format!(
        "{} expected to be: {}, but evaluated to {}",
        if actual_expr.is_empty() { actual_val.as_str() } else { actual_expr },
        annotate(expected_expr, &expected_val),
        actual_val
    );

    Evaluation::Failed(Teststep {
        ok: false,
        message,
        expected: expected_val,
        actual: actual_val,
        expected_expr: expected_expr.to_string(),
        actual_expr: actual_expr.to_string(),
        ..Teststep::default()
    })
}

fn truth(value: bool, expr: &str) -> Evaluation {
    if value {
        return Evaluation::Passed;
    }
    Evaluation::Failed(Teststep {
        ok: false,
        message: MSG_ASSERT.to_string(),
        expected: "true".to_string(),
        actual: "false".to_string(),
        actual_expr: expr.to_string(),
        ..Teststep::default()
    })
}

/// `expr => value`, or just the value when the expression adds nothing.
pub fn annotate(expr: &str, value: &str) -> String {
    if expr.is_empty() || expr == value {
        value.to_string()
    } else {
        format!("{} => {}", expr, value)
    }
}

fn mismatch_message(expected: Option<&str>, happened: Option<&str>) -> String {
    let mut msg = match expected {
        None => MSG_UNEXPECTED.to_string(),
        Some(_) => MSG_MISMATCH.to_string(),
    };
    if happened == Some(UNKNOWN_TYPE) {
        msg.push_str(" (UNKNOWN) means it was not derived from the recognized error family.");
    }
    msg
}

// =============================================================================
// MACROS
// =============================================================================

/// `is_equal!(t, actual, expected)`: equality assertion that records both expressions.
#[macro_export]
macro_rules! is_equal {
    ($t:expr, $actual:expr, $expected:expr $(,)?) => {
        $t.check_equal(
            || ::core::result::Result::<_, $crate::exception::Raised>::Ok($actual),
            $expected,
            stringify!($actual),
            stringify!($expected),
        )
    };
}

/// `try_equal!(t, fallible, expected)`: like [`is_equal!`] for an expression yielding `Result`.
#[macro_export]
macro_rules! try_equal {
    ($t:expr, $actual:expr, $expected:expr $(,)?) => {
        $t.check_equal(|| $actual, $expected, stringify!($actual), stringify!($expected))
    };
}

#[macro_export]
macro_rules! is_true {
    ($t:expr, $cond:expr $(,)?) => {
        $t.check_true(
            || ::core::result::Result::<bool, $crate::exception::Raised>::Ok($cond),
            stringify!($cond),
        )
    };
}

#[macro_export]
macro_rules! try_true {
    ($t:expr, $cond:expr $(,)?) => {
        $t.check_true(|| $cond, stringify!($cond))
    };
}

/// `is_ok!(t, statement)`: passes when the statement runs without panicking.
#[macro_export]
macro_rules! is_ok {
    ($t:expr, $stmt:expr $(,)?) => {
        $t.check_ok(
            || {
                let _ = $stmt;
                ::core::result::Result::<(), $crate::exception::Raised>::Ok(())
            },
            stringify!($stmt),
        )
    };
}

/// `try_ok!(t, fallible)`: passes when the expression yields `Ok`.
#[macro_export]
macro_rules! try_ok {
    ($t:expr, $stmt:expr $(,)?) => {
        $t.check_ok(|| $stmt, stringify!($stmt))
    };
}
