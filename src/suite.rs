//! The suite orchestrator.
//!
//! A [`TestSuite`] owns the registered test cases and drives a run:
//!
//! 1. parse the command line and load the parameter file (never fatal),
//! 2. select the active test cases (all of them when none is selected),
//! 3. run the fixture setup; a failure here records `Suite Setup`, writes the
//!    report and ends the run without executing any test case,
//! 4. run every active test case in registration order,
//! 5. run the fixture teardown; a failure is recorded and fails the run
//!    without stopping it,
//! 6. write the report and print the totals.
//!
//! # Example
//!
//! ```rust,no_run
//! use simple_system_tests::{HookResult, Logger, TestCase, TestSuite};
//!
//! struct Ping;
//!
//! impl TestCase for Ping {
//!     fn description(&self) -> &str {
//!         "Ping"
//!     }
//!
//!     fn execute(&mut self, log: &Logger) -> HookResult {
//!         log.info("pong");
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> miette::Result<()> {
//!     let mut suite = TestSuite::new();
//!     suite.add_test_case(Ping)?;
//!     suite.execute_tests()
//! }
//! ```

pub(crate) mod execution;

use crate::cli::args::{CaseFlag, OptionRegistry, ParsedOptions};
use crate::cli::output::Console;
use crate::config::{load_params_or_default, Params};
use crate::errors::SuiteError;
use crate::logging::{init_tracing, CachedLogger};
use crate::report::{HtmlReport, ReportSink, ResultRecord, RetryInfo};
use crate::test_case::{NoFixture, SuiteFixture, TestCase};
use std::ffi::OsString;
use std::path::Path;
use std::process;
use std::time::Instant;

// ============================================================================
// RUN RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every phase ran.
    Completed,
    /// Suite setup failed; no test case was executed.
    SetupAborted,
}

/// What one run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub outcome: RunOutcome,
    pub teardown_failed: bool,
    pub report_written: bool,
}

impl RunSummary {
    /// Number of test cases that ran to a verdict.
    pub fn executed(&self) -> usize {
        self.passed + self.failed
    }

    /// Process exit status: 1 after a setup abort, a failed teardown or any
    /// failed test case.
    pub fn exit_code(&self) -> i32 {
        if self.outcome == RunOutcome::SetupAborted || self.teardown_failed || self.failed != 0 {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RunCounters {
    passed: usize,
    failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuitePhase {
    Setup,
    Teardown,
}

impl SuitePhase {
    fn label(self) -> &'static str {
        match self {
            SuitePhase::Setup => "Setup",
            SuitePhase::Teardown => "Teardown",
        }
    }
}

// ============================================================================
// TEST SUITE
// ============================================================================

pub struct TestSuite {
    registry: OptionRegistry,
    test_cases: Vec<Box<dyn TestCase>>,
    fixture: Box<dyn SuiteFixture>,
    report: Box<dyn ReportSink>,
    console: Console,
    logs: CachedLogger,
    params: Params,
    counters: RunCounters,
}

impl Default for TestSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSuite {
    /// A suite with no fixture that writes an HTML report.
    pub fn new() -> Self {
        Self {
            registry: OptionRegistry::new(),
            test_cases: Vec::new(),
            fixture: Box::new(NoFixture),
            report: Box::new(HtmlReport::default()),
            console: Console::default(),
            logs: CachedLogger::new(),
            params: Params::new(),
            counters: RunCounters::default(),
        }
    }

    pub fn with_fixture(mut self, fixture: impl SuiteFixture + 'static) -> Self {
        self.fixture = Box::new(fixture);
        self
    }

    pub fn with_report(mut self, report: impl ReportSink + 'static) -> Self {
        self.report = Box::new(report);
        self
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Registers a test case and generates its selection flags.
    ///
    /// Test cases run in the order they were added.
    pub fn add_test_case(&mut self, test_case: impl TestCase + 'static) -> Result<(), SuiteError> {
        self.registry.register(test_case.description())?;
        self.test_cases.push(Box::new(test_case));
        Ok(())
    }

    pub fn case_flags(&self) -> &[CaseFlag] {
        self.registry.case_flags()
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    /// Parameters loaded by the most recent run.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Parses `args` (program name first) and runs the suite.
    ///
    /// Only command-line problems are returned as errors, help requests
    /// included. Every hook failure ends up in the summary instead.
    pub fn run<I, T>(&mut self, args: I) -> Result<RunSummary, SuiteError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let options = self.registry.parse(args)?;
        Ok(self.run_with_options(&options))
    }

    /// Runs the suite with already resolved options.
    pub fn run_with_options(&mut self, options: &ParsedOptions) -> RunSummary {
        self.counters = RunCounters::default();
        self.logs = CachedLogger::new();
        self.report.start_results();
        self.params = load_params_or_default(&options.params_path);

        let selection = self.active_indices(options);
        tracing::debug!(
            selected = selection.len(),
            registered = self.test_cases.len(),
            "resolved active test cases"
        );

        if !options.no_suite_setup && !self.run_suite_phase(SuitePhase::Setup) {
            self.console.aborted(SuitePhase::Setup.label());
            let report_written = self.finish_report(&options.report_path);
            return RunSummary {
                passed: 0,
                failed: 0,
                outcome: RunOutcome::SetupAborted,
                teardown_failed: false,
                report_written,
            };
        }

        for index in selection {
            let record = execution::run_test_case(
                self.test_cases[index].as_mut(),
                &self.params,
                &mut self.logs,
                &self.console,
            );
            self.record_test_case(record);
        }

        let teardown_failed =
            !options.no_suite_setup && !self.run_suite_phase(SuitePhase::Teardown);
        let report_written = self.finish_report(&options.report_path);

        let RunCounters { passed, failed } = self.counters;
        self.console.totals(passed, failed);

        RunSummary {
            passed,
            failed,
            outcome: RunOutcome::Completed,
            teardown_failed,
            report_written,
        }
    }

    /// Runs the suite against the process arguments and exits the process.
    ///
    /// Exits with 1 when suite setup or teardown fails or any test case fails,
    /// with 0 otherwise. Help and usage errors are printed by clap, which picks the
    /// status.
    pub fn execute_tests(&mut self) -> ! {
        init_tracing();
        let code = match self.run(std::env::args_os()) {
            Ok(summary) => summary.exit_code(),
            Err(SuiteError::Cli(e)) => e.exit(),
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                1
            }
        };
        process::exit(code)
    }

    // ------------------------------------------------------------------------
    // PRIVATE HELPERS
    // ------------------------------------------------------------------------

    fn active_indices(&self, options: &ParsedOptions) -> Vec<usize> {
        let active: Vec<usize> = self
            .test_cases
            .iter()
            .enumerate()
            .filter(|(_, tc)| tc.is_active(options))
            .map(|(index, _)| index)
            .collect();
        if active.is_empty() {
            (0..self.test_cases.len()).collect()
        } else {
            active
        }
    }

    /// Runs fixture setup or teardown and records it. Returns whether it passed.
    fn run_suite_phase(&mut self, phase: SuitePhase) -> bool {
        let label = phase.label();
        self.console.suite_phase(label);

        let start = Instant::now();
        let log = self.logs.start_logging();
        let fixture = &mut self.fixture;
        let params = &self.params;
        let result = execution::invoke_hook(|| match phase {
            SuitePhase::Setup => fixture.setup(params, &log),
            SuitePhase::Teardown => fixture.teardown(params, &log),
        });

        let passed = match result {
            Ok(()) => true,
            Err(e) => {
                log.error(format_args!("ABORT: Suite {label} failed with {e}"));
                false
            }
        };

        let duration = start.elapsed();
        self.report.add_result(ResultRecord::new(
            format!("Suite {label}"),
            self.logs.stop_logging(),
            passed,
            duration,
            RetryInfo::default(),
        ));
        passed
    }

    fn record_test_case(&mut self, record: ResultRecord) {
        self.console.verdict(record.passed);
        if record.passed {
            self.counters.passed += 1;
        } else {
            self.counters.failed += 1;
        }
        self.report.add_result(record);
    }

    fn finish_report(&mut self, path: &Path) -> bool {
        match self.report.finish_results(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "report written");
                true
            }
            Err(e) => {
                let cause = std::error::Error::source(&e)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                tracing::error!(%cause, "{e}");
                false
            }
        }
    }
}
