//! A lightweight orchestrator for integration-style system tests.
//!
//! Register [`TestCase`] implementations on a [`TestSuite`], optionally wrap
//! them in a [`SuiteFixture`], and call [`TestSuite::execute_tests`] from
//! `main`. Each run selects test cases from generated command-line flags,
//! enforces per-case timeout and retry policy, captures a log per phase and
//! writes an HTML report.

pub use crate::cli::{Console, ParsedOptions};
pub use crate::config::Params;
pub use crate::errors::{ConfigError, HookFailure, SuiteError};
pub use crate::logging::{init_tracing, CachedLogger, Logger};
pub use crate::report::{HtmlReport, ReportSink, ResultRecord, RetryInfo};
pub use crate::suite::{RunOutcome, RunSummary, TestSuite};
pub use crate::test_case::{HookResult, NoFixture, SuiteFixture, TestCase};

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod report;
pub mod suite;
pub mod test_case;
