// src/report.rs

//! Reporting collaborator for the index client
//!
//! The client never logs through global state. It reports caller mistakes
//! and empty remote results through a [`Reporter`] handed to it at
//! construction:
//! - `TracingReporter`: forwards to `tracing` (the default)
//! - `SilentReporter`: drops everything
//! - `MemoryReporter`: keeps messages for inspection

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// Severity of a reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportLevel::Error => "error",
            ReportLevel::Warn => "warn",
            ReportLevel::Info => "info",
            ReportLevel::Debug => "debug",
        };
        f.write_str(label)
    }
}

/// Sink for the client's diagnostic messages
pub trait Reporter {
    fn report(&self, level: ReportLevel, message: &str);

    fn error(&self, message: &str) {
        self.report(ReportLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.report(ReportLevel::Warn, message);
    }

    fn info(&self, message: &str) {
        self.report(ReportLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.report(ReportLevel::Debug, message);
    }
}

/// Reporter that emits `tracing` events under the `pypi_client::client` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Error => error!(target: "pypi_client::client", "{}", message),
            ReportLevel::Warn => warn!(target: "pypi_client::client", "{}", message),
            ReportLevel::Info => info!(target: "pypi_client::client", "{}", message),
            ReportLevel::Debug => debug!(target: "pypi_client::client", "{}", message),
        }
    }
}

/// Reporter that discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _level: ReportLevel, _message: &str) {}
}

/// Reporter that keeps messages in memory
///
/// Clones share the same buffer, so one clone can be handed to the client
/// while another is kept to read the messages back.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    messages: Rc<RefCell<Vec<(ReportLevel, String)>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages reported so far
    pub fn messages(&self) -> Vec<(ReportLevel, String)> {
        self.messages.borrow().clone()
    }

    /// Messages reported at `level`
    pub fn at(&self, level: ReportLevel) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}
