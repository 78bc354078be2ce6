//! Error types for the suite orchestrator.
//!
//! Three families live here:
//! - [`SuiteError`]: registration, command-line and report failures. These are the
//!   only errors that ever leave the orchestrator.
//! - [`ConfigError`]: problems reading the parameter file. Always recovered by
//!   falling back to an empty parameter set.
//! - [`HookFailure`]: a test case or fixture hook that returned an error or panicked.
//!   Converted into a failed phase at the orchestrator boundary.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// SUITE ERRORS
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum SuiteError {
    #[error("{description} has duplicate description")]
    #[diagnostic(
        code(simple_system_tests::registration::duplicate_description),
        help("every prefix of the description is already taken by another flag; rename the test case")
    )]
    DuplicateDescription { description: String },

    #[error("test case '{description}' maps to the command-line flag --{flag}, which is already in use")]
    #[diagnostic(
        code(simple_system_tests::registration::flag_conflict),
        help("descriptions differing only in case, spaces or hyphens share one long flag")
    )]
    FlagConflict { description: String, flag: String },

    #[error("test case '{description}' maps to the command-line flag --{flag}, which cannot be parsed")]
    #[diagnostic(
        code(simple_system_tests::registration::invalid_flag),
        help("'=' separates a long flag from its value; remove it from the description")
    )]
    InvalidFlag { description: String, flag: String },

    #[error(transparent)]
    #[diagnostic(code(simple_system_tests::cli))]
    Cli(#[from] clap::Error),

    #[error("failed to write report to {}", path.display())]
    #[diagnostic(code(simple_system_tests::report::write))]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("cannot read parameter file {}: {source}", path.display())]
    #[diagnostic(code(simple_system_tests::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed parameter file {}: {source}", path.display())]
    #[diagnostic(code(simple_system_tests::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("parameter file {} must contain a JSON object", path.display())]
    #[diagnostic(code(simple_system_tests::config::not_an_object))]
    NotAnObject { path: PathBuf },
}

// ============================================================================
// HOOK FAILURES
// ============================================================================

/// Why a hook did not complete successfully.
#[derive(Error, Debug)]
pub enum HookFailure {
    #[error("{0}")]
    Error(miette::Report),

    #[error("panic: {0}")]
    Panic(String),
}
