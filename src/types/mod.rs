//! Type system data model

pub mod type_system;
pub mod field_map;
pub mod enumerated;
pub mod subtype;
pub mod attributes;

pub use type_system::*;
pub use field_map::{FieldDescriptor, FieldMap, Visibility};
pub use enumerated::{derive_unused_values, first_free_value, EnumItem, EnumeratedType};
pub use subtype::{LengthBounds, Restriction, SubTypeConstraint};
pub use attributes::{parse_raw_variants, AttributeKind, ByteOrder, Comp, RawEncodingAttributes, WithAttribute};
