//! Frontend module - AST arena, references, semantic analysis

pub mod identifier;
pub mod reference;
pub mod reference_chain;
pub mod ast;
pub mod value;
pub mod template;
pub mod semantic;

pub use identifier::Identifier;
pub use reference::{Reference, SubReference};
pub use reference_chain::{ChainLink, ReferenceChain};
pub use ast::{Assignment, AssignmentId, AssignmentKind, CompilationUnit, Scope, ScopeId, TemplateId, TypeId, ValueId};
pub use value::{CharSymbol, MacroKind, NamedValue, ValueKind, ValueNode};
pub use template::{
    DecodeMatch, LengthRestriction, NamedTemplate, PatternKind, PatternTemplate, RangeBound, TemplateKind,
    TemplateNode, ValueRange,
};
