// unitprobe self-test: exercises every assertion and exception path of the framework.
// Usage: cargo run --bin unitprobe-selftest -- [-d] [-a] [-f <filter>] [--nopdf]
//
// Several testcases fail on purpose; a clean run exits with 1.

use std::fmt;

use unitprobe::{cli, is_equal, is_ok, is_true, test_case, try_equal, try_ok, try_true};
use unitprobe::{FrameworkError, Raised, Registry, TestError};

/// An error outside the recognized family.
#[derive(Debug)]
struct Foreign;

impl fmt::Display for Foreign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("foreign error")
    }
}

impl std::error::Error for Foreign {}

/// Panic payload that is neither an error nor a message.
struct Proprietary;

/// Division with a handful of deliberate failure modes.
fn divide(a: f64, b: f64) -> Result<f64, Raised> {
    if b.abs() < 1e-6 {
        return Err(TestError::runtime("division by zero").into());
    }
    if b == 42.0 {
        return Err(TestError::range("can't handle 42").into());
    }
    if b == 43.0 {
        std::panic::panic_any(42_i32);
    }
    if b == 44.0 {
        return Err(Box::new(Foreign));
    }
    if b == 45.0 {
        std::panic::panic_any(Proprietary);
    }
    // a known bug
    if (a - b).abs() < 1e-6 {
        return Ok(a * b);
    }
    Ok(a / b)
}

fn basic(r: &mut Registry) -> Result<(), FrameworkError> {
    r.command("setTitle", "divide");

    r.subscribe(test_case!("/1-Basic/0-ctor", "check construction", |t| {
        is_ok!(t, Vec::<f64>::with_capacity(4));
        try_ok!(t, divide(1.0, 2.0));
        Ok(())
    }))?;
    r.subscribe(test_case!("/1-Basic/t01", "10.0/5.0 => 2.0", |t| {
        try_equal!(t, divide(10.0, 5.0), 2.0);
        try_true!(t, divide(10.0, 5.0).map(|v| v > 1.0));
        Ok(())
    }))?;
    r.subscribe(test_case!("/1-Basic/t02", "10/2 => 5", |t| {
        try_equal!(t, divide(10.0, 2.0), 5.0);
        try_true!(t, divide(10.0, 2.0).map(|v| v < 10.0));
        Ok(())
    }))?;
    r.subscribe(test_case!("/1-Basic/t03", "7/2 => 3.5", |t| {
        try_equal!(t, divide(7.0, 2.0), 3.5);
        Ok(())
    }))?;
    r.subscribe(test_case!("/1-Basic/t04", "6/3 => 100-98", |t| {
        let (a, b) = (100.0, 98.0);
        try_equal!(t, divide(6.0, 3.0), a - b);
        Ok(())
    }))?;
    r.subscribe(test_case!("/1-Basic/t05", "4/4 => 1", |t| {
        try_equal!(t, divide(4.0, 4.0), 1.0);
        Ok(())
    }))
}

fn advanced(r: &mut Registry) -> Result<(), FrameworkError> {
    r.subscribe(test_case!("/2-Advanced/a-01", "(-) 55/5 => 11", |t| {
        try_equal!(t, divide(55.0, -5.0), -11.0);
        try_equal!(t, divide(-55.0, 5.0), -11.0);
        try_equal!(t, divide(-55.0, -5.0), 11.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/2-Advanced/a-02", "100/.5 => 200", |t| {
        try_equal!(t, divide(100.0, 0.5), 200.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/2-Advanced/a-03", "0.1 + 0.2 => 0.3", |t| {
        is_equal!(t, 0.1 + 0.2, 0.3);
        Ok(())
    }))
}

fn big(r: &mut Registry) -> Result<(), FrameworkError> {
    r.subscribe(test_case!("/3-Big/t01", "1000000/2 => 500000", |t| {
        try_equal!(t, divide(1_000_000.0, 2.0), 500_000.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/3-Big/t02", "some more big numbers", |t| {
        try_equal!(t, divide(1e9, 2.0), 5e8);
        try_equal!(t, divide(1e10, 3.0), 5e9);
        try_equal!(t, divide(1e11, 2.0), 5e10);
        Ok(())
    }))?;
    r.subscribe(test_case!("/3-Big/t03/DISABLE", "some even bigger numbers", |t| {
        try_equal!(t, divide(1e10, 2.0), 5e8);
        try_equal!(t, divide(1e12, 2.0), 5e10);
        Ok(())
    }))
}

fn exceptions(r: &mut Registry) -> Result<(), FrameworkError> {
    r.subscribe(test_case!("/4-Except/e-01", "expected exceptions", |t| {
        t.expect("RuntimeError");
        try_equal!(t, divide(5.0, 0.0), 1.0);
        t.expect("RangeError");
        try_equal!(t, divide(5.0, 42.0), 1.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-02", "div zero, no expectation", |t| {
        try_equal!(t, divide(5.0, 0.0), 1.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-03", "range error, no expectation", |t| {
        try_equal!(t, divide(5.0, 42.0), 1.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-04", "integer panic payload", |t| {
        try_equal!(t, divide(5.0, 43.0), 1.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-05", "error outside the family", |t| {
        try_equal!(t, divide(5.0, 44.0), 1.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-06", "proprietary panic payload", |t| {
        try_equal!(t, divide(5.0, 45.0), 1.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-07", "error outside of a teststep", |t| {
        try_equal!(t, divide(12.0, 3.0), 4.0);
        Err(TestError::runtime("gone wrong").into())
    }))?;
    r.subscribe(test_case!("/4-Except/e-08", "expectation does not cover the body", |t| {
        t.expect("RangeError");
        divide(3.0, 42.0)?;
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-08a", "plain assertion", |t| {
        is_true!(t, 42.0 / 3.0 > 13.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-09", "expected exception never raised", |t| {
        t.expect("RangeError");
        try_equal!(t, divide(12.0, 3.0), 4.0);
        Ok(())
    }))?;
    r.subscribe(test_case!("/4-Except/e-10", "good case", |t| {
        try_equal!(t, divide(12.0, 3.0), 4.0);
        Ok(())
    }))
}

fn main() {
    std::process::exit(cli::main(&[basic, advanced, big, exceptions]));
}
