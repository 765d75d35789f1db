//! TTCN-3/ASN.1 type system
//!
//! Semantic checking of types, values and templates over a node arena, and
//! generation of Java-style value and template classes from checked types.

pub mod utils;
pub mod types;
pub mod frontend;
pub mod backend;
pub mod feedback;
