//! Command-line surface of a suite run: option parsing and console output.

pub mod args;
pub mod output;

pub use args::{long_flag_name, CaseFlag, OptionRegistry, ParsedOptions, SuiteArgs};
pub use output::Console;
