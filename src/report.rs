//! Result records and the HTML report renderer.
//!
//! The orchestrator hands one [`ResultRecord`] per suite phase and per executed
//! test case to a [`ReportSink`], then asks it to finalize exactly once per run.

use crate::errors::SuiteError;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default location of the generated report.
pub const DEFAULT_REPORT_PATH: &str = "index.html";

// ============================================================================
// RECORDS
// ============================================================================

/// Retry accounting for one record: retries consumed and retries allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryInfo {
    pub used: u32,
    pub allowed: u32,
}

impl RetryInfo {
    pub fn new(used: u32, allowed: u32) -> Self {
        Self { used, allowed }
    }
}

/// The aggregated outcome of one suite phase or test case.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub name: String,
    pub log: String,
    pub passed: bool,
    pub duration: Duration,
    pub retries: RetryInfo,
}

impl ResultRecord {
    pub fn new(
        name: impl Into<String>,
        log: impl Into<String>,
        passed: bool,
        duration: Duration,
        retries: RetryInfo,
    ) -> Self {
        Self {
            name: name.into(),
            log: log.into(),
            passed,
            duration,
            retries,
        }
    }
}

// ============================================================================
// SINK CONTRACT
// ============================================================================

/// Accumulates result records and writes the final report.
pub trait ReportSink {
    /// Called once at the beginning of every run.
    fn start_results(&mut self) {}

    fn add_result(&mut self, record: ResultRecord);

    /// Writes the report to `path`. Called exactly once per run.
    fn finish_results(&mut self, path: &Path) -> Result<(), SuiteError>;
}

// ============================================================================
// HTML REPORT
// ============================================================================

/// Renders all records of a run into a single self-contained HTML page.
#[derive(Debug, Clone)]
pub struct HtmlReport {
    title: String,
    records: Vec<ResultRecord>,
}

impl Default for HtmlReport {
    fn default() -> Self {
        Self::new("System Test Report")
    }
}

impl HtmlReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn render(&self) -> String {
        let passed = self.records.iter().filter(|r| r.passed).count();
        let failed = self.records.len() - passed;
        let title = escape_html(&self.title);

        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n"
        );
        let _ = writeln!(
            html,
            "<p class=\"summary\"><span class=\"pass\">{passed} passed</span>, <span class=\"fail\">{failed} failed</span></p>"
        );
        html.push_str(
            "<table>\n<tr><th>Name</th><th>Result</th><th>Duration</th><th>Retries</th><th>Log</th></tr>\n",
        );
        for record in &self.records {
            render_row(&mut html, record);
        }
        html.push_str("</table>\n</body>\n</html>\n");
        html
    }
}

impl ReportSink for HtmlReport {
    fn start_results(&mut self) {
        self.records.clear();
    }

    fn add_result(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    fn finish_results(&mut self, path: &Path) -> Result<(), SuiteError> {
        let write_error = |source| SuiteError::ReportWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, self.render()).map_err(write_error)
    }
}

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; vertical-align: top; }
.pass { color: #1a7f37; font-weight: bold; }
.fail { color: #cf222e; font-weight: bold; }
pre { margin: 0; white-space: pre-wrap; }
";

fn render_row(html: &mut String, record: &ResultRecord) {
    let (class, status) = if record.passed {
        ("pass", "PASS")
    } else {
        ("fail", "FAIL")
    };
    let _ = writeln!(
        html,
        "<tr><td>{}</td><td class=\"{class}\">{status}</td><td>{:.3} s</td><td>{}/{}</td><td><details><summary>log</summary><pre>{}</pre></details></td></tr>",
        escape_html(&record.name),
        record.duration.as_secs_f64(),
        record.retries.used,
        record.retries.allowed,
        escape_html(&record.log),
    );
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
