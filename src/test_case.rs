//! The contracts implemented by user test code.
//!
//! A [`TestCase`] is one unit of work with prepare/execute/teardown hooks, a
//! timeout and a retry budget. A [`SuiteFixture`] wraps the whole run with a
//! setup and teardown of the shared environment.
//!
//! Every hook receives the [`Logger`] of the phase it runs in. Anything written
//! to it, including the failure messages added by the orchestrator, lands in
//! that phase's report entry.

use crate::cli::args::ParsedOptions;
use crate::config::Params;
use crate::logging::Logger;
use std::time::Duration;

/// Outcome of a single hook. Returning an error (or panicking) fails the phase.
pub type HookResult = miette::Result<()>;

/// A registered system test.
pub trait TestCase {
    /// Stable, unique, human-readable identifier. Used as the report key and to
    /// derive the command-line flags that select this case.
    fn description(&self) -> &str;

    /// Whether this case was selected on the command line.
    fn is_active(&self, options: &ParsedOptions) -> bool {
        options.is_selected(self.description())
    }

    /// Receives the shared run parameters right before the case runs.
    fn set_params(&mut self, _params: &Params) {}

    fn prepare(&mut self, _log: &Logger) -> HookResult {
        Ok(())
    }

    fn execute(&mut self, log: &Logger) -> HookResult;

    fn teardown(&mut self, _log: &Logger) -> HookResult {
        Ok(())
    }

    /// Upper bound on the duration of one attempt. `None` or zero disables it.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Additional attempts allowed after the first failed one.
    fn retry(&self) -> u32 {
        0
    }
}

/// Setup and teardown of the environment shared by all test cases.
pub trait SuiteFixture {
    fn setup(&mut self, _params: &Params, _log: &Logger) -> HookResult {
        Ok(())
    }

    fn teardown(&mut self, _params: &Params, _log: &Logger) -> HookResult {
        Ok(())
    }
}

/// Fixture that does nothing in either phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFixture;

impl SuiteFixture for NoFixture {}
