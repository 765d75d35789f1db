//! Utility module

mod location;
mod error;
mod timestamp;
mod diagnostics;

pub use location::Location;
pub use error::{Error, Result};
pub use timestamp::CompilationTimestamp;
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Severity};
