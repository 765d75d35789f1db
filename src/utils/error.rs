//! Error handling for the type system core
//!
//! Semantic problems are never raised as `Error`: they are reported to a
//! [`DiagnosticSink`](crate::utils::DiagnosticSink) and checking continues.
//! This enum covers what can actually stop a run.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Core error
#[derive(Error, Debug)]
pub enum Error {
    // ==================== Input Errors ====================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed interchange document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid compilation unit: {what} {index} is out of range ({len} defined)")]
    DanglingId {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid compilation unit: {0}")]
    InvalidUnit(String),

    // ==================== Generation Errors ====================
    #[error("Code generation error: {0}")]
    CodeGen(String),
}

impl Error {
    /// Whether the error comes from the input document rather than the core
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Json(_) | Self::DanglingId { .. } | Self::InvalidUnit(_)
        )
    }
}
