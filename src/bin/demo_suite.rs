//! Demonstration suite for the system test orchestrator.
//!
//! ## Usage
//! ```bash
//! cargo run --bin demo_suite -- -p demo_params.json -o report.html
//! cargo run --bin demo_suite -- -fo        # only "Forced Failure"
//! ```
//!
//! Behaviour is steered from the parameter file:
//! ```json
//! { "flaky_failures": 2, "slow_ms": 0, "force_failure": false,
//!   "abort_setup": false, "fail_teardown": false }
//! ```

use serde::Deserialize;
use simple_system_tests::{HookResult, Logger, Params, SuiteFixture, TestCase, TestSuite};
use std::thread;
use std::time::Duration;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct DemoParams {
    flaky_failures: u32,
    slow_ms: u64,
    force_failure: bool,
    abort_setup: bool,
    fail_teardown: bool,
}

impl DemoParams {
    fn from_params(params: &Params) -> Self {
        serde_json::from_value(serde_json::Value::Object(params.clone())).unwrap_or_default()
    }
}

// ============================================================================
// FIXTURE
// ============================================================================

#[derive(Default)]
struct DemoEnvironment;

impl SuiteFixture for DemoEnvironment {
    fn setup(&mut self, params: &Params, log: &Logger) -> HookResult {
        log.info("bringing up demo environment");
        if DemoParams::from_params(params).abort_setup {
            miette::bail!("demo environment refused to start");
        }
        Ok(())
    }

    fn teardown(&mut self, params: &Params, log: &Logger) -> HookResult {
        log.info("tearing down demo environment");
        if DemoParams::from_params(params).fail_teardown {
            miette::bail!("demo environment left resources behind");
        }
        Ok(())
    }
}

// ============================================================================
// TEST CASES
// ============================================================================

#[derive(Default)]
struct EnvironmentReady {
    params: DemoParams,
}

impl TestCase for EnvironmentReady {
    fn description(&self) -> &str {
        "Environment Ready"
    }

    fn set_params(&mut self, params: &Params) {
        self.params = DemoParams::from_params(params);
    }

    fn execute(&mut self, log: &Logger) -> HookResult {
        log.info(format_args!("running with {:?}", self.params));
        Ok(())
    }
}

#[derive(Default)]
struct FlakyService {
    failures_left: u32,
}

impl TestCase for FlakyService {
    fn description(&self) -> &str {
        "Flaky Service"
    }

    fn set_params(&mut self, params: &Params) {
        self.failures_left = DemoParams::from_params(params).flaky_failures;
    }

    fn execute(&mut self, log: &Logger) -> HookResult {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            miette::bail!("service not ready yet");
        }
        log.info("service answered");
        Ok(())
    }

    fn retry(&self) -> u32 {
        2
    }
}

#[derive(Default)]
struct SlowOperation {
    delay: Duration,
}

impl TestCase for SlowOperation {
    fn description(&self) -> &str {
        "Slow Operation"
    }

    fn set_params(&mut self, params: &Params) {
        self.delay = Duration::from_millis(DemoParams::from_params(params).slow_ms);
    }

    fn execute(&mut self, log: &Logger) -> HookResult {
        log.info(format_args!("sleeping {:?}", self.delay));
        thread::sleep(self.delay);
        Ok(())
    }

    fn timeout(&self) -> Option<Duration> {
        Some(Duration::from_millis(200))
    }
}

#[derive(Default)]
struct ForcedFailure {
    fail: bool,
}

impl TestCase for ForcedFailure {
    fn description(&self) -> &str {
        "Forced Failure"
    }

    fn set_params(&mut self, params: &Params) {
        self.fail = DemoParams::from_params(params).force_failure;
    }

    fn execute(&mut self, _log: &Logger) -> HookResult {
        miette::ensure!(!self.fail, "failure forced by parameters");
        Ok(())
    }
}

fn main() -> miette::Result<()> {
    let mut suite = TestSuite::new().with_fixture(DemoEnvironment);
    suite.add_test_case(EnvironmentReady::default())?;
    suite.add_test_case(FlakyService::default())?;
    suite.add_test_case(SlowOperation::default())?;
    suite.add_test_case(ForcedFailure::default())?;
    suite.execute_tests()
}
