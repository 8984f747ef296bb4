// End-to-end runs through the registry: subscribe, exec, rollup.

mod common;

use common::{assert_rollups, run, run_probes, testcase};
use unitprobe::model::{DisableReason, StepId, Verdict};
use unitprobe::{is_equal, test_case, try_equal, ErrorKind, ExpectationPolicy, FrameworkError, Raised, Registry, TestError};

fn divide(a: i32, b: i32) -> Result<i32, Raised> {
    if b == 0 {
        return Err(TestError::divide_by_zero("division by zero").into());
    }
    Ok(a / b)
}

#[test]
fn passing_equality() {
    let registry = run(vec![test_case!("/Math/add", "2+2 => 4", |t| {
        is_equal!(t, 2 + 2, 4);
        Ok(())
    })]);
    let tc = testcase(&registry, "Math", "add");
    assert_eq!(tc.steps.len(), 1);
    assert!(tc.steps[0].step.ok);
    assert_eq!(tc.verdict(), Verdict::Ok);
    assert_eq!(registry.suite("Math").unwrap().verdict(), Verdict::Ok);
    assert_rollups(&registry);
}

#[test]
fn failing_equality_renders_values() {
    let registry = run(vec![test_case!("/Math/add", "2+2 => 5", |t| {
        is_equal!(t, 2 + 2, 5);
        Ok(())
    })]);
    let tc = testcase(&registry, "Math", "add");
    let step = tc.step(StepId::Ordinal(1)).unwrap();
    assert!(!step.ok);
    assert_eq!(step.actual, "4");
    assert_eq!(step.expected, "5");
    assert_eq!(step.actual_expr, "2 + 2");
    assert_eq!(tc.verdict(), Verdict::Fail);
    assert_rollups(&registry);
}

#[test]
fn disable_marker_never_runs_the_body() {
    let registry = run(vec![test_case!("/Suite/t1/DISABLE", "", |t| {
        is_equal!(t, 1, 2);
        panic!("must not run");
    })]);
    let tc = testcase(&registry, "Suite", "t1");
    assert_eq!(tc.disabled, Some(DisableReason::Marker));
    assert!(tc.steps.is_empty());
    let suite = registry.suite("Suite").unwrap();
    assert_eq!((suite.tc_ok, suite.tc_fail, suite.tc_disabled), (0, 0, 1));
    assert_rollups(&registry);
}

#[test]
fn expected_exception_matches_by_type_name() {
    for policy in [ExpectationPolicy::OneShot, ExpectationPolicy::Sticky] {
        let registry = run_probes(
            policy,
            vec![
                test_case!("/Ex/same", "", |t| {
                    t.expect_kind(ErrorKind::DivideByZero);
                    try_equal!(t, divide(1, 0), 0);
                    Ok(())
                }),
                test_case!("/Ex/other", "", |t| {
                    t.expect("RangeError");
                    try_equal!(t, divide(1, 0), 0);
                    Ok(())
                }),
            ],
        );

        let same = testcase(&registry, "Ex", "same");
        assert_eq!(same.steps.len(), 1);
        assert!(same.steps[0].step.ok);

        let other = testcase(&registry, "Ex", "other");
        assert_eq!(other.steps.len(), 1);
        let step = &other.steps[0].step;
        assert!(!step.ok);
        assert!(step.message.to_lowercase().contains("exceptions do not match"));
        assert_eq!(step.ex_expected.as_deref(), Some("RangeError"));
        assert_eq!(step.ex_happened.as_deref(), Some("DivideByZeroError"));
        assert_rollups(&registry);
    }
}

#[test]
fn duplicate_identity_names_both_locations() {
    let mut registry = Registry::new();
    let first = test_case!("/S/t", "", |_t| Ok(()));
    let second = test_case!("S/t", "", |_t| Ok(()));
    let (first_line, second_line) = (first.location.line, second.location.line);

    registry.subscribe(first).unwrap();
    let err = registry.subscribe(second).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(&format!("scenarios.rs:{}", first_line)));
    assert!(msg.contains(&format!("scenarios.rs:{}", second_line)));
    assert!(matches!(err, FrameworkError::DuplicateTestcase { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn expectation_policies_differ_after_the_first_assertion() {
    let body = || {
        test_case!("/Ex/twice", "", |t| {
            t.expect("DivideByZeroError");
            try_equal!(t, divide(1, 0), 0);
            try_equal!(t, divide(2, 0), 0);
            Ok(())
        })
    };

    let one_shot = run_probes(ExpectationPolicy::OneShot, vec![body()]);
    let steps: Vec<bool> = testcase(&one_shot, "Ex", "twice")
        .steps
        .iter()
        .map(|s| s.step.ok)
        .collect();
    assert_eq!(steps, [true, false]);

    let sticky = run_probes(ExpectationPolicy::Sticky, vec![body()]);
    let steps: Vec<bool> = testcase(&sticky, "Ex", "twice")
        .steps
        .iter()
        .map(|s| s.step.ok)
        .collect();
    assert_eq!(steps, [true, true]);
}

#[test]
fn escaping_error_adds_the_synthetic_step() {
    let registry = run(vec![test_case!("/Ex/escape", "", |t| {
        is_equal!(t, 12 / 3, 4);
        divide(1, 0)?;
        Ok(())
    })]);
    let tc = testcase(&registry, "Ex", "escape");
    assert_eq!(tc.steps.len(), 2);
    assert_eq!(tc.steps[1].id, StepId::Synthetic);
    assert_eq!(tc.steps[1].step.ex_happened.as_deref(), Some("DivideByZeroError"));
    assert_eq!(tc.ex_happened.as_deref(), Some("DivideByZeroError"));
    assert_eq!(tc.verdict(), Verdict::Fail);
    assert_rollups(&registry);
}

#[test]
fn rollups_across_suites() {
    let registry = run(vec![
        test_case!("/A/ok", "", |t| {
            t.equal(1, 1);
            Ok(())
        }),
        test_case!("/A/off/DISABLE", "", |_t| Ok(())),
        test_case!("/B/bad", "", |t| {
            t.equal(1, 1);
            t.equal(1, 2);
            Ok(())
        }),
        test_case!("loose", "", |t| {
            t.is_true(true);
            Ok(())
        }),
    ]);
    let stats = registry.statistics();
    assert_eq!((stats.suites_ok, stats.suites_fail), (2, 1));
    assert_eq!((stats.tc_ok, stats.tc_fail, stats.tc_disabled), (2, 1, 1));
    assert_eq!((stats.ts_ok, stats.ts_fail), (3, 1));
    assert!(registry.suite("default").is_some());
    assert_rollups(&registry);
}

#[test]
fn filter_applies_before_the_marker() {
    let mut registry = Registry::new();
    registry
        .subscribe(test_case!("/Big/t1/DISABLE", "", |_t| Ok(())))
        .unwrap();
    registry
        .subscribe(test_case!("/Small/t1", "", |t| {
            t.is_true(true);
            Ok(())
        }))
        .unwrap();
    registry.set_filter("Big");
    registry.exec().unwrap();
    registry.gen_statistics().unwrap();

    assert_eq!(testcase(&registry, "Big", "t1").disabled, Some(DisableReason::Marker));
    assert_eq!(testcase(&registry, "Small", "t1").disabled, Some(DisableReason::Filter));
    assert_eq!(registry.statistics().tc_disabled, 2);
    assert_rollups(&registry);
}
