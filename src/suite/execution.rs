//! Execution of one test case: prepare, attempt with retries, teardown, record.
//!
//! The orchestrator calls hooks only through [`invoke_hook`], which turns both
//! returned errors and panics into a [`HookFailure`]. Nothing a hook does can
//! unwind past this module.

use crate::cli::output::Console;
use crate::config::Params;
use crate::errors::HookFailure;
use crate::logging::{CachedLogger, Logger};
use crate::report::{ResultRecord, RetryInfo};
use crate::test_case::{HookResult, TestCase};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Runs a single hook and converts every way it can fail into a [`HookFailure`].
pub(crate) fn invoke_hook<F>(hook: F) -> Result<(), HookFailure>
where
    F: FnOnce() -> HookResult,
{
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(report)) => Err(HookFailure::Error(report)),
        Err(payload) => Err(HookFailure::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Whether `elapsed` violates `limit`. A zero limit never does; equality is allowed.
pub(crate) fn exceeds_timeout(limit: Duration, elapsed: Duration) -> bool {
    !limit.is_zero() && elapsed > limit
}

struct Attempt {
    failed: bool,
    duration: Duration,
}

fn attempt(test_case: &mut dyn TestCase, log: &Logger) -> Attempt {
    let start = Instant::now();
    let mut failed = match invoke_hook(|| test_case.execute(log)) {
        Ok(()) => false,
        Err(e) => {
            log.error(format_args!("Testcase execution failed with: {e}"));
            true
        }
    };
    let duration = start.elapsed();

    if let Some(limit) = test_case
        .timeout()
        .filter(|limit| exceeds_timeout(*limit, duration))
    {
        log.error(format_args!(
            "Testcase execution timeout ({} s) exceeded taking {:.5} s instead.",
            limit.as_secs_f64(),
            duration.as_secs_f64()
        ));
        failed = true;
    }

    Attempt { failed, duration }
}

/// Drives `test_case` through its whole lifecycle and returns its record.
///
/// A failed prepare ends the case immediately with a zero duration; execute and
/// teardown are not called. Otherwise execute is attempted until it succeeds or
/// the retry budget is spent, and teardown always runs afterwards. A failing
/// teardown fails the case even when the last attempt passed.
pub(crate) fn run_test_case(
    test_case: &mut dyn TestCase,
    params: &Params,
    logs: &mut CachedLogger,
    console: &Console,
) -> ResultRecord {
    test_case.set_params(params);
    let description = test_case.description().to_string();
    let retry_budget = test_case.retry();

    console.test_header(&description);
    let log = logs.start_logging();

    if let Err(e) = invoke_hook(|| test_case.prepare(&log)) {
        log.error(format_args!("Preparation of testcase failed with: {e}"));
        return ResultRecord::new(
            description,
            logs.stop_logging(),
            false,
            Duration::ZERO,
            RetryInfo::new(0, retry_budget),
        );
    }

    let mut retries = 0;
    let mut last = attempt(test_case, &log);
    while last.failed && retries < retry_budget {
        retries += 1;
        console.retry_notice(retries);
        log.info(format_args!("{retries}. Retry of testcase"));
        last = attempt(test_case, &log);
    }
    let mut failed = last.failed;

    if let Err(e) = invoke_hook(|| test_case.teardown(&log)) {
        log.error(format_args!("Testcase teardown failed with: {e}"));
        failed = true;
    }

    tracing::debug!(test = %description, retries, failed, "test case finished");
    ResultRecord::new(
        description,
        logs.stop_logging(),
        !failed,
        last.duration,
        RetryInfo::new(retries, retry_budget),
    )
}
