//! Shared helpers for the integration tests.

#![allow(dead_code)]

use unitprobe::model::Testcase;
use unitprobe::{ExpectationPolicy, Probe, Registry};

/// Subscribes, executes and rolls up the given probes.
pub fn run_probes(policy: ExpectationPolicy, probes: Vec<Probe>) -> Registry {
    let mut registry = Registry::with_policy(policy);
    for probe in probes {
        registry.subscribe(probe).expect("unique testcase");
    }
    registry.exec().expect("exec");
    registry.gen_statistics().expect("statistics");
    registry
}

pub fn run(probes: Vec<Probe>) -> Registry {
    run_probes(ExpectationPolicy::OneShot, probes)
}

pub fn testcase<'r>(registry: &'r Registry, suite: &str, name: &str) -> &'r Testcase {
    registry.find_testcase(suite, name).expect("testcase registered")
}

/// Rollup invariants that must hold after every run.
pub fn assert_rollups(registry: &Registry) {
    for suite in registry.suites() {
        assert_eq!(
            suite.tc_ok + suite.tc_fail + suite.tc_disabled,
            suite.testcases.len(),
            "suite {} rollup",
            suite.name
        );
        for tc in suite.testcases.values() {
            assert_eq!(tc.ts_ok + tc.ts_fail, tc.steps.len(), "testcase {} rollup", tc.path);
            if tc.is_disabled() {
                assert!(tc.steps.is_empty(), "disabled testcase {} has steps", tc.path);
            }
            assert!(registry.probe(&tc.path).is_some(), "{} has no probe", tc.path);
        }
    }
}
