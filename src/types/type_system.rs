//! Type nodes
//!
//! One [`TypeNode`] per type in the compilation unit. The category specific
//! payload lives in [`TypeKind`]; every semantic operation matches on it
//! exhaustively.

use serde::{Deserialize, Serialize};

use crate::frontend::ast::{AssignmentId, ScopeId, TypeId};
use crate::frontend::{Identifier, Reference};
use crate::types::{EnumeratedType, FieldMap, RawEncodingAttributes, SubTypeConstraint, WithAttribute};
use crate::utils::{CompilationTimestamp, Location};

/// ASN.1 character string types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asn1StringKind {
    NumericString,
    PrintableString,
    IA5String,
    VisibleString,
    UtcTime,
    GeneralizedTime,
    Utf8String,
    BmpString,
    UniversalString,
    TeletexString,
    VideotexString,
    GraphicString,
    GeneralString,
    ObjectDescriptor,
}

impl Asn1StringKind {
    /// Kinds whose values are plain 7-bit character strings
    pub fn is_narrow(self) -> bool {
        matches!(
            self,
            Self::NumericString
                | Self::PrintableString
                | Self::IA5String
                | Self::VisibleString
                | Self::UtcTime
                | Self::GeneralizedTime
        )
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::NumericString => "NumericString",
            Self::PrintableString => "PrintableString",
            Self::IA5String => "IA5String",
            Self::VisibleString => "VisibleString",
            Self::UtcTime => "UTCTime",
            Self::GeneralizedTime => "GeneralizedTime",
            Self::Utf8String => "UTF8String",
            Self::BmpString => "BMPString",
            Self::UniversalString => "UniversalString",
            Self::TeletexString => "TeletexString",
            Self::VideotexString => "VideotexString",
            Self::GraphicString => "GraphicString",
            Self::GeneralString => "GeneralString",
            Self::ObjectDescriptor => "ObjectDescriptor",
        }
    }
}

/// Record (TTCN-3 record / ASN.1 SEQUENCE) or set (set / SET)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSetType {
    #[serde(default)]
    pub is_set: bool,
    pub fields: FieldMap,
}

/// Union (TTCN-3 union / ASN.1 CHOICE)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnionType {
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassType {
    /// Base class, normally a referenced type
    #[serde(default)]
    pub base: Option<TypeId>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    pub fields: FieldMap,
}

/// Message based port
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortType {
    #[serde(default)]
    pub in_messages: Vec<TypeId>,
    #[serde(default)]
    pub out_messages: Vec<TypeId>,
    #[serde(default)]
    pub inout_messages: Vec<TypeId>,
}

impl PortType {
    /// Types that can be received
    pub fn incoming(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.in_messages.iter().chain(&self.inout_messages).copied()
    }

    /// Types that can be sent
    pub fn outgoing(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.out_messages.iter().chain(&self.inout_messages).copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencedType {
    pub reference: Reference,
    /// Resolved target, filled in by the check
    #[serde(skip)]
    pub refd: Option<TypeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    Boolean,
    Integer,
    Float,
    CharString,
    UniversalCharString,
    Asn1String(Asn1StringKind),
    Enumerated(EnumeratedType),
    RecordSet(RecordSetType),
    Union(UnionType),
    Class(ClassType),
    Port(PortType),
    Referenced(ReferencedType),
}

/// Flat classification used by the compatibility table and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Boolean,
    Integer,
    IntegerAsn1,
    Real,
    CharString,
    UniversalCharString,
    Asn1String(Asn1StringKind),
    Enumerated,
    Record,
    Set,
    Sequence,
    SetAsn1,
    Union,
    Choice,
    Class,
    Port,
    Referenced,
}

impl TypeCategory {
    /// Keyword used when a type has no name of its own
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::IntegerAsn1 => "INTEGER",
            Self::Real => "float",
            Self::CharString => "charstring",
            Self::UniversalCharString => "universal charstring",
            Self::Asn1String(kind) => kind.keyword(),
            Self::Enumerated => "enumerated",
            Self::Record => "record",
            Self::Set => "set",
            Self::Sequence => "SEQUENCE",
            Self::SetAsn1 => "SET",
            Self::Union => "union",
            Self::Choice => "CHOICE",
            Self::Class => "class",
            Self::Port => "port",
            Self::Referenced => "referenced type",
        }
    }
}

/// Where a type is declared; used to derive generated names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOwner {
    Assignment(AssignmentId),
    Field { parent: TypeId, name: Identifier },
    /// Element of a port message list or class base clause
    Anonymous { parent: TypeId, index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeNode {
    pub kind: TypeKind,
    #[serde(default)]
    pub location: Location,
    /// Declared in an ASN.1 module
    #[serde(default)]
    pub asn1: bool,
    #[serde(default)]
    pub sub_type: Option<SubTypeConstraint>,
    #[serde(default)]
    pub attributes: Vec<WithAttribute>,
    #[serde(default)]
    pub scope: Option<ScopeId>,

    #[serde(skip)]
    pub owner: Option<TypeOwner>,
    #[serde(skip)]
    pub raw: Option<RawEncodingAttributes>,
    #[serde(skip)]
    pub last_checked: Option<CompilationTimestamp>,
    #[serde(skip)]
    pub is_erroneous: bool,
    #[serde(skip)]
    pub last_generated: Option<CompilationTimestamp>,
}

impl TypeNode {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            location: Location::dummy(),
            asn1: false,
            sub_type: None,
            attributes: Vec::new(),
            scope: None,
            owner: None,
            raw: None,
            last_checked: None,
            is_erroneous: false,
            last_generated: None,
        }
    }

    pub fn category(&self) -> TypeCategory {
        match &self.kind {
            TypeKind::Boolean => TypeCategory::Boolean,
            TypeKind::Integer if self.asn1 => TypeCategory::IntegerAsn1,
            TypeKind::Integer => TypeCategory::Integer,
            TypeKind::Float => TypeCategory::Real,
            TypeKind::CharString => TypeCategory::CharString,
            TypeKind::UniversalCharString => TypeCategory::UniversalCharString,
            TypeKind::Asn1String(kind) => TypeCategory::Asn1String(*kind),
            TypeKind::Enumerated(_) => TypeCategory::Enumerated,
            TypeKind::RecordSet(r) => match (r.is_set, self.asn1) {
                (false, false) => TypeCategory::Record,
                (true, false) => TypeCategory::Set,
                (false, true) => TypeCategory::Sequence,
                (true, true) => TypeCategory::SetAsn1,
            },
            TypeKind::Union(_) if self.asn1 => TypeCategory::Choice,
            TypeKind::Union(_) => TypeCategory::Union,
            TypeKind::Class(_) => TypeCategory::Class,
            TypeKind::Port(_) => TypeCategory::Port,
            TypeKind::Referenced(_) => TypeCategory::Referenced,
        }
    }

    /// Field map of composite types
    pub fn fields(&self) -> Option<&FieldMap> {
        match &self.kind {
            TypeKind::RecordSet(r) => Some(&r.fields),
            TypeKind::Union(u) => Some(&u.fields),
            TypeKind::Class(c) => Some(&c.fields),
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut FieldMap> {
        match &mut self.kind {
            TypeKind::RecordSet(r) => Some(&mut r.fields),
            TypeKind::Union(u) => Some(&mut u.fields),
            TypeKind::Class(c) => Some(&mut c.fields),
            _ => None,
        }
    }

    /// Types whose values are character strings
    pub fn is_string(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::CharString | TypeKind::UniversalCharString | TypeKind::Asn1String(_)
        )
    }

    /// Types whose values may contain characters beyond ISO 646
    pub fn is_universal_string(&self) -> bool {
        match self.kind {
            TypeKind::UniversalCharString => true,
            TypeKind::Asn1String(kind) => !kind.is_narrow(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category() {
        let mut node = TypeNode::new(TypeKind::Integer);
        assert_eq!(node.category(), TypeCategory::Integer);
        node.asn1 = true;
        assert_eq!(node.category(), TypeCategory::IntegerAsn1);

        let set = TypeNode::new(TypeKind::RecordSet(RecordSetType {
            is_set: true,
            fields: FieldMap::new(),
        }));
        assert_eq!(set.category().keyword(), "set");
    }

    #[test]
    fn test_string_families() {
        assert!(TypeNode::new(TypeKind::Asn1String(Asn1StringKind::BmpString)).is_universal_string());
        assert!(!TypeNode::new(TypeKind::Asn1String(Asn1StringKind::IA5String)).is_universal_string());
        assert!(TypeNode::new(TypeKind::CharString).is_string());
    }
}
