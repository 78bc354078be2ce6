//! Log capture and process-wide tracing setup.
//!
//! A [`CachedLogger`] records one capture session at a time. Each session is
//! exposed through a [`Logger`] handle that is passed explicitly into every hook,
//! so whatever a phase logs ends up in that phase's report entry. Every captured
//! line is also forwarded to `tracing` so it shows up on the console.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a fmt tracing subscriber (if one is not already active).
///
/// Honours `RUST_LOG` when set, otherwise falls back to `info`.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    let _ = TRACING_INIT.set(());
}

// ============================================================================
// LOG LEVELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LOGGER HANDLE
// ============================================================================

/// Handle onto a single capture session.
///
/// Cloning is cheap; all clones append to the same session buffer.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    buffer: Arc<Mutex<String>>,
}

impl Logger {
    pub fn debug(&self, message: impl fmt::Display) {
        self.record(Level::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.record(Level::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.record(Level::Warn, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.record(Level::Error, message);
    }

    /// Appends one line to the session and mirrors it to `tracing`.
    pub fn record(&self, level: Level, message: impl fmt::Display) {
        let message = message.to_string();
        match level {
            Level::Debug => tracing::debug!(target: "capture", "{message}"),
            Level::Info => tracing::info!(target: "capture", "{message}"),
            Level::Warn => tracing::warn!(target: "capture", "{message}"),
            Level::Error => tracing::error!(target: "capture", "{message}"),
        }

        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.push_str(level.as_str());
        buffer.push(' ');
        buffer.push_str(&message);
        buffer.push('\n');
    }

    /// Everything recorded in this session so far.
    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ============================================================================
// CAPTURE SERVICE
// ============================================================================

/// Scoped log recorder with at most one active session.
#[derive(Debug, Default)]
pub struct CachedLogger {
    active: Option<Logger>,
}

impl CachedLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh session, discarding any session that was still open.
    pub fn start_logging(&mut self) -> Logger {
        let logger = Logger::default();
        self.active = Some(logger.clone());
        logger
    }

    /// Closes the active session and returns its text.
    pub fn stop_logging(&mut self) -> String {
        self.active
            .take()
            .map(|logger| logger.contents())
            .unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
