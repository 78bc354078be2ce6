// Per-test-case execution: prepare, retry loop, timeout, teardown, captured logs.
mod common;

use common::{args, journal, quiet_suite, Journal, MemoryReport, ScriptedCase, ScriptedFixture, Step};
use simple_system_tests::{ResultRecord, RetryInfo, RunSummary};
use std::path::PathBuf;
use std::time::Duration;

/// Runs `cases` through a silent suite and returns the summary plus the test records.
fn run_cases(log: &Journal, cases: Vec<ScriptedCase>) -> (RunSummary, MemoryReport) {
    let dir = tempfile::tempdir().unwrap();
    let params: PathBuf = dir.path().join("absent.json");
    let report = MemoryReport::default();
    let mut suite = quiet_suite(&report, ScriptedFixture::new(log));
    for case in cases {
        suite.add_test_case(case).unwrap();
    }
    let summary = suite.run(args(&params, &["-no"])).unwrap();
    (summary, report)
}

fn calls(log: &Journal, entry: &str) -> usize {
    log.borrow().iter().filter(|e| e.as_str() == entry).count()
}

#[test]
fn retry_recovers_after_two_failures() {
    let log = journal();
    let case = ScriptedCase::new("Flaky", &log)
        .retry(2)
        .steps(vec![Step::Fail("refused"), Step::Fail("refused"), Step::Pass]);

    let (summary, report) = run_cases(&log, vec![case]);

    let record = report.record("Flaky");
    assert!(record.passed);
    assert_eq!(record.retries, RetryInfo::new(2, 2));
    assert_eq!((summary.passed, summary.failed), (1, 0));
    assert_eq!(calls(&log, "Flaky:execute"), 3);
    assert_eq!(calls(&log, "Flaky:teardown"), 1);
    assert!(record.log.contains("1. Retry of testcase"));
    assert!(record.log.contains("2. Retry of testcase"));
}

#[test]
fn retry_budget_exhaustion_fails_the_case_once() {
    let log = journal();
    let case = ScriptedCase::new("Broken", &log)
        .retry(3)
        .steps(vec![Step::Fail("still down")]);

    let (summary, report) = run_cases(&log, vec![case]);

    let record = report.record("Broken");
    assert!(!record.passed);
    assert_eq!(record.retries, RetryInfo::new(3, 3));
    assert_eq!(calls(&log, "Broken:execute"), 4);
    assert_eq!((summary.passed, summary.failed), (0, 1));
    assert_eq!(
        record
            .log
            .matches("Testcase execution failed with: still down")
            .count(),
        4
    );
}

#[test]
fn zero_retry_attempts_exactly_once() {
    let log = journal();
    let case = ScriptedCase::new("Once", &log).steps(vec![Step::Fail("nope"), Step::Pass]);

    let (_, report) = run_cases(&log, vec![case]);

    assert!(!report.record("Once").passed);
    assert_eq!(report.record("Once").retries, RetryInfo::new(0, 0));
    assert_eq!(calls(&log, "Once:execute"), 1);
}

#[test]
fn success_stops_the_retry_loop() {
    let log = journal();
    let case = ScriptedCase::new("Steady", &log).retry(5);

    let (_, report) = run_cases(&log, vec![case]);

    assert!(report.record("Steady").passed);
    assert_eq!(report.record("Steady").retries, RetryInfo::new(0, 5));
    assert_eq!(calls(&log, "Steady:execute"), 1);
}

#[test]
fn exceeding_the_timeout_fails_without_an_error() {
    let log = journal();
    let case = ScriptedCase::new("Slow", &log)
        .timeout(Duration::from_millis(5))
        .steps(vec![Step::Sleep(Duration::from_millis(50))]);

    let (summary, report) = run_cases(&log, vec![case]);

    let record = report.record("Slow");
    assert!(!record.passed);
    assert!(record.duration >= Duration::from_millis(50));
    assert!(record.log.contains("Testcase execution timeout"));
    assert!(!record.log.contains("Testcase execution failed with"));
    assert_eq!(summary.failed, 1);
}

#[test]
fn timeouts_are_retried_like_errors() {
    let log = journal();
    let case = ScriptedCase::new("Warmup", &log)
        .timeout(Duration::from_millis(20))
        .retry(1)
        .steps(vec![Step::Sleep(Duration::from_millis(60)), Step::Pass]);

    let (_, report) = run_cases(&log, vec![case]);

    let record = report.record("Warmup");
    assert!(record.passed);
    assert_eq!(record.retries.used, 1);
    assert!(record.duration < Duration::from_millis(60));
}

#[test]
fn no_timeout_never_fails_for_duration() {
    let log = journal();
    let unlimited = ScriptedCase::new("Unlimited", &log)
        .steps(vec![Step::Sleep(Duration::from_millis(30))]);
    let zero = ScriptedCase::new("Zero", &log)
        .timeout(Duration::ZERO)
        .steps(vec![Step::Sleep(Duration::from_millis(30))]);

    let (summary, report) = run_cases(&log, vec![unlimited, zero]);

    assert!(report.record("Unlimited").passed);
    assert!(report.record("Zero").passed);
    assert_eq!(summary.passed, 2);
}

#[test]
fn prepare_failure_skips_execute_and_teardown() {
    let log = journal();
    let case = ScriptedCase::new("Unprepared", &log).retry(2).failing_prepare();

    let (summary, report) = run_cases(&log, vec![case]);

    let record = report.record("Unprepared");
    assert!(!record.passed);
    assert_eq!(record.duration, Duration::ZERO);
    assert!(record
        .log
        .contains("Preparation of testcase failed with: prepare refused"));
    assert_eq!(*log.borrow(), ["Unprepared:prepare"]);
    assert_eq!(summary.failed, 1);
}

#[test]
fn teardown_failure_overrides_a_passing_attempt() {
    let log = journal();
    let case = ScriptedCase::new("Leaky", &log).failing_teardown();

    let (summary, report) = run_cases(&log, vec![case]);

    let record = report.record("Leaky");
    assert!(!record.passed);
    assert!(record.log.contains("Testcase teardown failed with: teardown refused"));
    assert_eq!((summary.passed, summary.failed), (0, 1));
}

#[test]
fn teardown_runs_after_failed_attempts() {
    let log = journal();
    let case = ScriptedCase::new("Doomed", &log)
        .retry(1)
        .steps(vec![Step::Fail("bad")]);

    run_cases(&log, vec![case]);

    assert_eq!(
        *log.borrow(),
        [
            "Doomed:prepare",
            "Doomed:execute",
            "Doomed:execute",
            "Doomed:teardown"
        ]
    );
}

#[test]
fn panics_in_execute_are_contained() {
    let log = journal();
    let panicking = ScriptedCase::new("Panicky", &log).steps(vec![Step::Panic("index out of range")]);
    let after = ScriptedCase::new("After", &log);

    let (summary, report) = run_cases(&log, vec![panicking, after]);

    let record = report.record("Panicky");
    assert!(!record.passed);
    assert!(record
        .log
        .contains("Testcase execution failed with: panic: index out of range"));
    assert!(report.record("After").passed);
    assert_eq!((summary.passed, summary.failed), (1, 1));
}

#[test]
fn each_case_gets_its_own_captured_log() {
    let log = journal();
    let first = ScriptedCase::new("First", &log);
    let second = ScriptedCase::new("Second", &log);

    let (_, report) = run_cases(&log, vec![first, second]);

    let records: Vec<ResultRecord> = report.records();
    assert_eq!(records[0].log, "INFO prepared\nINFO First attempt 1\n");
    assert_eq!(records[1].log, "INFO prepared\nINFO Second attempt 1\n");
}

#[test]
fn counters_track_cases_not_attempts() {
    let log = journal();
    let cases = vec![
        ScriptedCase::new("Alpha", &log).retry(2).steps(vec![Step::Fail("x"), Step::Pass]),
        ScriptedCase::new("Beta", &log).retry(1).steps(vec![Step::Fail("y")]),
        ScriptedCase::new("Gamma", &log),
    ];

    let (summary, _) = run_cases(&log, cases);

    assert_eq!((summary.passed, summary.failed), (2, 1));
    assert_eq!(summary.executed(), 3);
}
