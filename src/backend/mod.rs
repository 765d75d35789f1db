//! Backend module - Code generation

pub mod codegen;
pub mod java;

pub use codegen::CodeGen;
pub use java::{BuildContext, GeneratorOptions, JavaCodeGen, JavaPrinter};
