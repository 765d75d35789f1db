//! Diagnostic sink
//!
//! The checker and the generator report through [`DiagnosticSink`]; reporting
//! never aborts a traversal.

use serde::{Deserialize, Serialize};

use crate::utils::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A reported problem attached to a source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

/// Abstract collector of semantic diagnostics
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn report_semantic_error(&mut self, location: &Location, message: String) {
        self.report(Diagnostic {
            severity: Severity::Error,
            location: *location,
            message,
        });
    }

    fn report_semantic_warning(&mut self, location: &Location, message: String) {
        self.report(Diagnostic {
            severity: Severity::Warning,
            location: *location,
            message,
        });
    }
}

/// In-memory sink used by the CLI and the tests
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Whether any error message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.items.iter().any(|d| d.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!(
            "{:?} at {}: {}",
            diagnostic.severity,
            diagnostic.location,
            diagnostic.message
        );
        self.items.push(diagnostic);
    }
}
