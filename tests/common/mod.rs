//! Shared helpers for the orchestrator integration tests: scripted test cases,
//! a scripted fixture, and a report sink that keeps records in memory.
#![allow(dead_code)]

use simple_system_tests::{
    Console, HookResult, Logger, Params, ParsedOptions, ReportSink, ResultRecord, SuiteError, SuiteFixture,
    TestCase, TestSuite,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

/// Ordered list of hook calls shared between test doubles.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

// ============================================================================
// IN-MEMORY REPORT
// ============================================================================

#[derive(Debug, Default)]
pub struct ReportState {
    pub records: Vec<ResultRecord>,
    pub finished: Vec<PathBuf>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryReport {
    pub state: Rc<RefCell<ReportState>>,
}

impl MemoryReport {
    pub fn records(&self) -> Vec<ResultRecord> {
        self.state.borrow().records.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.state
            .borrow()
            .records
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn record(&self, name: &str) -> ResultRecord {
        self.state
            .borrow()
            .records
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("no record named {name}"))
    }

    pub fn finished(&self) -> Vec<PathBuf> {
        self.state.borrow().finished.clone()
    }
}

impl ReportSink for MemoryReport {
    fn start_results(&mut self) {
        self.state.borrow_mut().records.clear();
    }

    fn add_result(&mut self, record: ResultRecord) {
        self.state.borrow_mut().records.push(record);
    }

    fn finish_results(&mut self, path: &Path) -> Result<(), SuiteError> {
        self.state.borrow_mut().finished.push(path.to_path_buf());
        Ok(())
    }
}

// ============================================================================
// SCRIPTED TEST CASE
// ============================================================================

/// What one call to `execute` does.
#[derive(Debug, Clone)]
pub enum Step {
    Pass,
    Fail(&'static str),
    Panic(&'static str),
    Sleep(Duration),
}

pub struct ScriptedCase {
    description: String,
    journal: Journal,
    steps: Vec<Step>,
    calls: usize,
    fail_prepare: bool,
    fail_teardown: bool,
    timeout: Option<Duration>,
    retry: u32,
    active: Option<bool>,
    pub seen_params: Rc<RefCell<Option<Params>>>,
}

impl ScriptedCase {
    pub fn new(description: &str, journal: &Journal) -> Self {
        Self {
            description: description.to_string(),
            journal: journal.clone(),
            steps: vec![Step::Pass],
            calls: 0,
            fail_prepare: false,
            fail_teardown: false,
            timeout: None,
            retry: 0,
            active: None,
            seen_params: Rc::new(RefCell::new(None)),
        }
    }

    /// Steps for successive attempts; the last step repeats.
    pub fn steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    pub fn failing_teardown(mut self) -> Self {
        self.fail_teardown = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Overrides flag-based selection.
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    fn note(&self, hook: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{hook}", self.description));
    }
}

impl TestCase for ScriptedCase {
    fn description(&self) -> &str {
        &self.description
    }

    fn is_active(&self, options: &ParsedOptions) -> bool {
        self.active
            .unwrap_or_else(|| options.is_selected(&self.description))
    }

    fn set_params(&mut self, params: &Params) {
        *self.seen_params.borrow_mut() = Some(params.clone());
    }

    fn prepare(&mut self, log: &Logger) -> HookResult {
        self.note("prepare");
        if self.fail_prepare {
            miette::bail!("prepare refused");
        }
        log.info("prepared");
        Ok(())
    }

    fn execute(&mut self, log: &Logger) -> HookResult {
        self.note("execute");
        let step = self
            .steps
            .get(self.calls)
            .or_else(|| self.steps.last())
            .cloned()
            .unwrap_or(Step::Pass);
        self.calls += 1;
        log.info(format_args!("{} attempt {}", self.description, self.calls));
        match step {
            Step::Pass => Ok(()),
            Step::Fail(message) => Err(miette::miette!("{message}")),
            Step::Panic(message) => panic!("{message}"),
            Step::Sleep(duration) => {
                thread::sleep(duration);
                Ok(())
            }
        }
    }

    fn teardown(&mut self, _log: &Logger) -> HookResult {
        self.note("teardown");
        if self.fail_teardown {
            miette::bail!("teardown refused");
        }
        Ok(())
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn retry(&self) -> u32 {
        self.retry
    }
}

// ============================================================================
// SCRIPTED FIXTURE
// ============================================================================

pub struct ScriptedFixture {
    journal: Journal,
    fail_setup: bool,
    fail_teardown: bool,
}

impl ScriptedFixture {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_setup: false,
            fail_teardown: false,
        }
    }

    pub fn failing_setup(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    pub fn failing_teardown(mut self) -> Self {
        self.fail_teardown = true;
        self
    }
}

impl SuiteFixture for ScriptedFixture {
    fn setup(&mut self, _params: &Params, log: &Logger) -> HookResult {
        self.journal.borrow_mut().push("suite:setup".to_string());
        log.info("environment up");
        if self.fail_setup {
            miette::bail!("database unreachable");
        }
        Ok(())
    }

    fn teardown(&mut self, _params: &Params, _log: &Logger) -> HookResult {
        self.journal.borrow_mut().push("suite:teardown".to_string());
        if self.fail_teardown {
            miette::bail!("container still running");
        }
        Ok(())
    }
}

// ============================================================================
// SUITE HELPERS
// ============================================================================

/// A silent suite reporting into `report`, wrapped by `fixture`.
pub fn quiet_suite(report: &MemoryReport, fixture: ScriptedFixture) -> TestSuite {
    TestSuite::new()
        .with_console(Console::silent())
        .with_report(report.clone())
        .with_fixture(fixture)
}

/// Full argument vector with the parameter file pointed at `params`.
pub fn args(params: &Path, extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        "system-tests".to_string(),
        "-p".to_string(),
        params.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}
