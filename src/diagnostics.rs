#![warn(missing_docs)]
//! Structured diagnostics collected during a solve.
//!
//! Every record pushed into [`Diagnostics`] is also forwarded to the [`log`] facade so that a
//! binary with an installed logger sees the same messages a test can inspect on the result.
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum::Display as StrumDisplay;

/// Severity of a [`Diagnostic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// purely informational (e.g. feedback loop found)
    Info,
    /// degraded but valid output (e.g. singular system, non-unitary matrix)
    Warning,
    /// caller error, the solve returned an empty result
    Error,
}

/// A single `{severity, message, context}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// severity of this record
    pub severity: Severity,
    /// human readable message
    pub message: String,
    /// where the record originated (component name, solver stage, ...)
    pub context: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

/// Sink for [`Diagnostic`]s of one solve.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates a new, empty [`Diagnostics`] sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }
    /// Push a record and forward it to the logger.
    pub fn push(&mut self, severity: Severity, context: &str, message: String) {
        match severity {
            Severity::Info => info!("{context}: {message}"),
            Severity::Warning => warn!("{context}: {message}"),
            Severity::Error => error!("{context}: {message}"),
        }
        self.records.push(Diagnostic {
            severity,
            message,
            context: context.to_owned(),
        });
    }
    /// Shortcut for an [`Severity::Info`] record.
    pub fn info(&mut self, context: &str, message: String) {
        self.push(Severity::Info, context, message);
    }
    /// Shortcut for a [`Severity::Warning`] record.
    pub fn warning(&mut self, context: &str, message: String) {
        self.push(Severity::Warning, context, message);
    }
    /// Shortcut for an [`Severity::Error`] record.
    pub fn error(&mut self, context: &str, message: String) {
        self.push(Severity::Error, context, message);
    }
    /// Returns the collected records.
    #[must_use]
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }
    /// Returns `true` if a record of at least the given severity is present.
    #[must_use]
    pub fn has(&self, severity: Severity) -> bool {
        self.records.iter().any(|d| d.severity >= severity)
    }
    /// Consume the sink and return the records.
    #[must_use]
    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }
    /// Move all records of `other` into this sink without logging them again.
    pub fn extend(&mut self, other: Self) {
        self.records.extend(other.records);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::check_warnings;
    #[test]
    fn push_and_log() {
        testing_logger::setup();
        let mut d = Diagnostics::new();
        d.info("network", "loop found".into());
        d.warning("solver", "singular".into());
        check_warnings(vec!["solver: singular"]);
        assert_eq!(d.records().len(), 2);
        assert!(d.has(Severity::Warning));
        assert!(!d.has(Severity::Error));
    }
    #[test]
    fn severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
    #[test]
    fn display() {
        let d = Diagnostic {
            severity: Severity::Warning,
            message: "msg".into(),
            context: "ctx".into(),
        };
        assert_eq!(format!("{d}"), "[Warning] ctx: msg");
    }
}
