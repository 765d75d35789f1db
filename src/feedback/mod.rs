//! Structured Feedback Module
//!
//! Machine-readable output of a check run:
//! - JSON diagnostic reports
//! - Unit statistics

use serde::{Deserialize, Serialize};

use crate::frontend::ast::CompilationUnit;
use crate::utils::{Diagnostic, Diagnostics, Error, Severity};

// ==================== Options ====================

/// How a check run is judged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Fail the run when any warning was reported
    pub warnings_as_errors: bool,
}

impl CheckOptions {
    pub fn is_success(&self, diagnostics: &Diagnostics) -> bool {
        !diagnostics.has_errors() && !(self.warnings_as_errors && diagnostics.warnings().next().is_some())
    }
}

// ==================== Structured Report ====================

/// One diagnostic as reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl DiagnosticReport {
    pub fn from_diagnostic(diagnostic: &Diagnostic, file_name: &str) -> Self {
        Self {
            severity: diagnostic.severity,
            message: diagnostic.message.clone(),
            location: Location {
                file: file_name.to_string(),
                line: diagnostic.location.line,
                start: diagnostic.location.start,
                end: diagnostic.location.end,
            },
        }
    }

    /// Report for an error that stopped the run before checking
    pub fn from_error(error: &Error, file_name: &str) -> Self {
        Self {
            severity: Severity::Error,
            message: error.to_string(),
            location: Location {
                file: file_name.to_string(),
                line: 0,
                start: 0,
                end: 0,
            },
        }
    }
}

// ==================== Check Feedback ====================

/// Complete result of checking one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFeedback {
    pub success: bool,
    pub source_file: String,
    pub module: String,
    pub diagnostics: Vec<DiagnosticReport>,
    pub stats: CheckStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    pub type_count: usize,
    pub value_count: usize,
    pub template_count: usize,
    pub assignment_count: usize,
    pub erroneous_type_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    /// Semantic analysis time
    pub check_time_ms: u64,
}

impl CheckStats {
    pub fn collect(unit: &CompilationUnit, diagnostics: &Diagnostics, check_time_ms: u64) -> Self {
        Self {
            type_count: unit.types.len(),
            value_count: unit.values.len(),
            template_count: unit.templates.len(),
            assignment_count: unit.assignments.len(),
            erroneous_type_count: unit.types.iter().filter(|t| t.is_erroneous).count(),
            error_count: diagnostics.error_count(),
            warning_count: diagnostics.warnings().count(),
            check_time_ms,
        }
    }
}

impl CheckFeedback {
    pub fn new(
        source_file: &str,
        unit: &CompilationUnit,
        diagnostics: &Diagnostics,
        stats: CheckStats,
        options: CheckOptions,
    ) -> Self {
        Self {
            success: options.is_success(diagnostics),
            source_file: source_file.to_string(),
            module: unit.name.to_string(),
            diagnostics: diagnostics
                .items()
                .iter()
                .map(|d| DiagnosticReport::from_diagnostic(d, source_file))
                .collect(),
            stats,
        }
    }

    /// Feedback for a document that could not be loaded
    pub fn failure(source_file: &str, error: &Error) -> Self {
        Self {
            success: false,
            source_file: source_file.to_string(),
            module: String::new(),
            diagnostics: vec![DiagnosticReport::from_error(error, source_file)],
            stats: CheckStats {
                error_count: 1,
                ..CheckStats::default()
            },
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON (for programmatic use)
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::semantic::TypeChecker;
    use crate::frontend::AssignmentKind;
    use crate::types::TypeKind;
    use crate::utils::{CompilationTimestamp, DiagnosticSink, Location as SourceLocation};
    use pretty_assertions::assert_eq;

    fn checked(unit: &mut CompilationUnit) -> Diagnostics {
        let mut sink = Diagnostics::new();
        TypeChecker::new(unit, &mut sink, CompilationTimestamp::first()).check_unit();
        sink
    }

    #[test]
    fn test_feedback_for_bad_reference() {
        let mut unit = CompilationUnit::new("M");
        unit.define_type("I", TypeKind::Integer);
        let missing = unit.reference_type("Nowhere");
        unit.add_assignment("R", AssignmentKind::Type(missing));
        let diagnostics = checked(&mut unit);

        let stats = CheckStats::collect(&unit, &diagnostics, 0);
        assert_eq!(stats.type_count, 2);
        assert_eq!(stats.assignment_count, 2);
        assert_eq!(stats.erroneous_type_count, 1);
        assert_eq!(stats.error_count, 1);

        let feedback = CheckFeedback::new("m.json", &unit, &diagnostics, stats, CheckOptions::default());
        assert!(!feedback.success);
        assert_eq!(feedback.module, "M");
        assert_eq!(feedback.diagnostics[0].location.file, "m.json");
        assert!(feedback.diagnostics[0].message.contains("`Nowhere'"));

        let json: serde_json::Value = serde_json::from_str(&feedback.to_json()).expect("feedback is valid JSON");
        assert_eq!(json["stats"]["error_count"], 1);
        assert_eq!(json["diagnostics"][0]["severity"], "Error");
    }

    #[test]
    fn test_warnings_as_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report_semantic_warning(&SourceLocation::at_line(3), "Using `*' for mandatory field".to_string());
        assert!(CheckOptions::default().is_success(&diagnostics));
        assert!(!CheckOptions { warnings_as_errors: true }.is_success(&diagnostics));
    }

    #[test]
    fn test_failure_feedback() {
        let error = Error::InvalidUnit("scope 3 has no parent".to_string());
        let feedback = CheckFeedback::failure("bad.json", &error);
        assert!(!feedback.success);
        assert_eq!(feedback.stats.error_count, 1);
        assert_eq!(feedback.diagnostics[0].message, "Invalid compilation unit: scope 3 has no parent");
    }
}
