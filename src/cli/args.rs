//! Command-line options of a suite run.
//!
//! The fixed options are declared with the clap derive API. Every registered
//! test case adds a generated boolean flag with a unique short form derived from
//! its description by progressive prefixes (`A` -> `-a`, `Ab` -> `-ab`).
//!
//! Single-character short forms are declared as clap shorts, so `-ofile` and
//! `-o=file` work as usual. Short forms longer than one character (`-no`, `-ab`)
//! cannot be expressed that way; the registry rewrites such tokens to their long
//! form before clap sees the arguments.

use crate::config::DEFAULT_PARAMS_PATH;
use crate::errors::SuiteError;
use crate::report::DEFAULT_REPORT_PATH;
use clap::{Arg, ArgAction, Args, Command, FromArgMatches};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

/// Short flags owned by the orchestrator, with the long option each one stands for.
pub const RESERVED_FLAGS: [(&str, &str); 4] = [
    ("no", "no-suite-setup"),
    ("h", "help"),
    ("p", "json-system-params"),
    ("o", "report-output"),
];

// ============================================================================
// FIXED OPTIONS
// ============================================================================

#[derive(Debug, Clone, Args)]
pub struct SuiteArgs {
    /// No suite prepare and teardown (-no)
    #[arg(long = "no-suite-setup")]
    pub no_suite_setup: bool,

    /// Path to JSON params file
    #[arg(short = 'p', long = "json-system-params", value_name = "PATH", default_value = DEFAULT_PARAMS_PATH)]
    pub params_path: PathBuf,

    /// Path to report html file
    #[arg(short = 'o', long = "report-output", value_name = "PATH", default_value = DEFAULT_REPORT_PATH)]
    pub report_path: PathBuf,
}

/// The resolved options of one run.
#[derive(Debug, Clone)]
pub struct ParsedOptions {
    pub no_suite_setup: bool,
    pub params_path: PathBuf,
    pub report_path: PathBuf,
    selected: HashSet<String>,
}

impl Default for ParsedOptions {
    fn default() -> Self {
        Self {
            no_suite_setup: false,
            params_path: PathBuf::from(DEFAULT_PARAMS_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            selected: HashSet::new(),
        }
    }
}

impl ParsedOptions {
    /// Whether the flag generated for `description` was given.
    pub fn is_selected(&self, description: &str) -> bool {
        self.selected.contains(&long_flag_name(description))
    }

    /// Marks the test case with this description as selected.
    pub fn select(mut self, description: &str) -> Self {
        self.selected.insert(long_flag_name(description));
        self
    }
}

/// The character clap can take as the short form, if `short` is a single
/// alphanumeric one.
fn native_short(short: &str) -> Option<char> {
    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c),
        _ => None,
    }
}

/// Normalized long flag for a description: spaces and hyphens become
/// underscores, everything lowercase.
pub fn long_flag_name(description: &str) -> String {
    description.replace([' ', '-'], "_").to_lowercase()
}

// ============================================================================
// OPTION REGISTRY
// ============================================================================

/// The flags generated for one registered test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFlag {
    pub description: String,
    pub short: String,
    pub long: String,
}

impl CaseFlag {
    fn arg_id(&self) -> String {
        format!("case.{}", self.long)
    }
}

/// All short flags in use plus the flags generated for test cases.
#[derive(Debug, Clone)]
pub struct OptionRegistry {
    shorts: Vec<String>,
    cases: Vec<CaseFlag>,
}

impl Default for OptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self {
            shorts: RESERVED_FLAGS.iter().map(|(s, _)| s.to_string()).collect(),
            cases: Vec::new(),
        }
    }

    pub fn case_flags(&self) -> &[CaseFlag] {
        &self.cases
    }

    /// Shortest lowercase prefix of `description` not yet used as a short flag.
    pub fn derive_short_flag(&self, description: &str) -> Result<String, SuiteError> {
        let len = description.chars().count();
        for prefix_len in 1..=len {
            let candidate = description
                .chars()
                .take(prefix_len)
                .collect::<String>()
                .to_lowercase();
            if !self.shorts.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Err(SuiteError::DuplicateDescription {
            description: description.to_string(),
        })
    }

    /// Derives and reserves the flags for a new test case.
    pub fn register(&mut self, description: &str) -> Result<&CaseFlag, SuiteError> {
        let short = self.derive_short_flag(description)?;
        let long = long_flag_name(description);

        if long.contains('=') {
            return Err(SuiteError::InvalidFlag {
                description: description.to_string(),
                flag: long,
            });
        }
        let reserved = RESERVED_FLAGS.iter().any(|(_, l)| *l == long);
        if reserved || self.cases.iter().any(|c| c.long == long) {
            return Err(SuiteError::FlagConflict {
                description: description.to_string(),
                flag: long,
            });
        }

        tracing::debug!(%description, %short, %long, "registered test case flags");
        self.shorts.push(short.clone());
        self.cases.push(CaseFlag {
            description: description.to_string(),
            short,
            long,
        });
        Ok(&self.cases[self.cases.len() - 1])
    }

    /// Long form of a short flag clap cannot parse itself.
    fn long_for_short(&self, short: &str) -> Option<&str> {
        if native_short(short).is_some() {
            return None;
        }
        RESERVED_FLAGS
            .iter()
            .find(|(s, _)| *s == short)
            .map(|(_, long)| *long)
            .or_else(|| {
                self.cases
                    .iter()
                    .find(|c| c.short == short)
                    .map(|c| c.long.as_str())
            })
    }

    /// The clap command for the current set of flags.
    pub fn command(&self) -> Command {
        let base = Command::new("system-tests")
            .about("Runs the registered system tests and writes an HTML report.")
            .after_help("If no test case flag is given, all test cases run.");
        let mut command = SuiteArgs::augment_args(base);
        for flag in &self.cases {
            let mut arg = Arg::new(flag.arg_id())
                .long(flag.long.clone())
                .action(ArgAction::SetTrue)
                .help(format!("Test {} (-{})", flag.description, flag.short));
            if let Some(short) = native_short(&flag.short) {
                arg = arg.short(short);
            }
            command = command.arg(arg);
        }
        command
    }

    /// Rewrites every `-<short>` token that names a multi-character flag into
    /// its long form. The first argument (program name) and everything after a bare
    /// `--` are left untouched.
    pub fn expand_short_flags<I, T>(&self, args: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut expanded = Vec::new();
        let mut passthrough = false;
        for (index, arg) in args.into_iter().enumerate() {
            let arg: OsString = arg.into();
            if index == 0 || passthrough {
                expanded.push(arg);
                continue;
            }
            if arg == "--" {
                passthrough = true;
                expanded.push(arg);
                continue;
            }
            let rewritten = arg
                .to_str()
                .and_then(|s| s.strip_prefix('-'))
                .filter(|s| !s.starts_with('-'))
                .and_then(|short| self.long_for_short(short))
                .map(|long| OsString::from(format!("--{long}")));
            expanded.push(rewritten.unwrap_or(arg));
        }
        expanded
    }

    /// Parses a full argument vector, program name included.
    pub fn parse<I, T>(&self, args: I) -> Result<ParsedOptions, SuiteError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = self.expand_short_flags(args);
        let matches = self.command().try_get_matches_from(args)?;
        let fixed = SuiteArgs::from_arg_matches(&matches)?;
        let selected = self
            .cases
            .iter()
            .filter(|flag| matches.get_flag(&flag.arg_id()))
            .map(|flag| flag.long.clone())
            .collect();

        Ok(ParsedOptions {
            no_suite_setup: fixed.no_suite_setup,
            params_path: fixed.params_path,
            report_path: fixed.report_path,
            selected,
        })
    }
}
