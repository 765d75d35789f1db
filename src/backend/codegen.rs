//! Code Generation trait - Backend abstraction

use crate::frontend::ast::CompilationUnit;
use crate::utils::Result;

/// Code generation backend trait
pub trait CodeGen {
    /// Generate source text for a checked unit
    fn generate(&mut self, unit: &mut CompilationUnit) -> Result<String>;

    /// Target language, used for output file extensions
    fn target(&self) -> &str;

    /// Get the backend name
    fn name(&self) -> &str;
}
