//! Console presentation of a suite run.
//!
//! Everything the orchestrator prints for humans (phase headers, retry notices,
//! PASS/FAIL banners and the final totals) goes through [`Console`], so the
//! layout stays consistent and tests can silence it.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

const OVERLINE: &str = "---------------------------------------------------------------------";

/// Writes run progress to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
    choice: ColorChoice,
}

impl Default for Console {
    fn default() -> Self {
        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            enabled: true,
            choice,
        }
    }
}

impl Console {
    /// A console that prints nothing.
    pub fn silent() -> Self {
        Self {
            enabled: false,
            choice: ColorChoice::Never,
        }
    }

    pub fn suite_phase(&self, phase: &str) {
        self.plain_lines(&[OVERLINE, "", &format!("{phase} of Suite"), ""]);
    }

    pub fn test_header(&self, description: &str) {
        self.plain_lines(&[OVERLINE, "", &format!("TEST {description}:"), ""]);
    }

    pub fn retry_notice(&self, retry: u32) {
        self.colored(&format!("{retry}. Retry of testcase now."), Color::Yellow, false);
    }

    pub fn verdict(&self, passed: bool) {
        let (word, color) = if passed {
            ("PASS", Color::Green)
        } else {
            ("FAIL", Color::Red)
        };
        self.plain_lines(&["", "----"]);
        self.colored(word, color, true);
        self.plain_lines(&["----", ""]);
    }

    pub fn aborted(&self, phase: &str) {
        self.colored(&format!("ABORT: Suite {phase} failed"), Color::Red, true);
    }

    pub fn totals(&self, passed: usize, failed: usize) {
        self.plain_lines(&[OVERLINE]);
        self.colored(&format!("Total pass: {passed}"), Color::Green, false);
        let fail_color = if failed == 0 { Color::Green } else { Color::Red };
        self.colored(&format!("Total fail: {failed}"), fail_color, false);
    }

    // ------------------------------------------------------------------------
    // PRIVATE HELPERS
    // ------------------------------------------------------------------------

    fn plain_lines(&self, lines: &[&str]) {
        if !self.enabled {
            return;
        }
        let mut stdout = StandardStream::stdout(self.choice);
        for line in lines {
            let _ = writeln!(stdout, "{line}");
        }
    }

    fn colored(&self, text: &str, color: Color, bold: bool) {
        if !self.enabled {
            return;
        }
        let mut stdout = StandardStream::stdout(self.choice);
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.reset();
    }
}
