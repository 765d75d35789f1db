//! Value nodes

use serde::{Deserialize, Serialize};

use crate::frontend::ast::{TypeId, ValueId};
use crate::frontend::{Identifier, Reference};
use crate::utils::{CompilationTimestamp, Location};

/// Piece of an ASN.1 character string literal (`{"ab", {0, 0, 1, 2}}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CharSymbol {
    Text(String),
    Quadruple { group: u8, plane: u8, row: u8, cell: u8 },
    /// IA5 table position
    Tuple { column: u8, row: u8 },
}

impl CharSymbol {
    /// Code point of a single character symbol
    pub fn code_point(&self) -> Option<u32> {
        match self {
            Self::Text(_) => None,
            Self::Quadruple { group, plane, row, cell } => Some(
                (u32::from(*group) << 24) | (u32::from(*plane) << 16) | (u32::from(*row) << 8) | u32::from(*cell),
            ),
            Self::Tuple { column, row } => Some(u32::from(*column) * 16 + u32::from(*row)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: Identifier,
    pub value: ValueId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacroKind {
    ModuleId,
    FileName,
    LineNumber,
    DefinitionId,
    Scope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValueKind {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    CharString(String),
    UniversalCharString(String),
    CharSymbols(Vec<CharSymbol>),
    /// Resolved enumeration item
    Enumerated(Identifier),
    /// Bare lower-case identifier: enumeration item or reference
    UndefinedLowerIdentifier(Identifier),
    Referenced(Reference),
    /// `{ name := value, ... }`
    Sequence(Vec<NamedValue>),
    /// `alternative : value` or `{ alternative := value }` of a union
    Choice { alternative: Identifier, value: ValueId },
    /// Operator application; its result kind was decided by an earlier pass
    Expression { operator: String, operands: Vec<ValueId> },
    Macro(MacroKind),
    Omit,
    /// `-` placeholder of a modified value
    NotUsed,
}

impl ValueKind {
    /// Name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean value",
            Self::Integer(_) => "integer value",
            Self::Real(_) => "float value",
            Self::CharString(_) => "charstring value",
            Self::UniversalCharString(_) => "universal charstring value",
            Self::CharSymbols(_) => "character string value",
            Self::Enumerated(_) => "enumerated value",
            Self::UndefinedLowerIdentifier(_) => "identifier",
            Self::Referenced(_) => "reference",
            Self::Sequence(_) => "record value",
            Self::Choice { .. } => "union value",
            Self::Expression { .. } => "expression",
            Self::Macro(_) => "macro",
            Self::Omit => "omit value",
            Self::NotUsed => "not used symbol",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueNode {
    pub kind: ValueKind,
    #[serde(default)]
    pub location: Location,
    /// Written in ASN.1 value notation
    #[serde(default)]
    pub asn1: bool,

    /// Type that checked this value
    #[serde(skip)]
    pub governor: Option<TypeId>,
    #[serde(skip)]
    pub is_erroneous: bool,
    #[serde(skip)]
    pub last_checked: Option<CompilationTimestamp>,
}

impl ValueNode {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            location: Location::dummy(),
            asn1: false,
            governor: None,
            is_erroneous: false,
            last_checked: None,
        }
    }

    pub fn is_negative_infinity(&self) -> bool {
        matches!(self.kind, ValueKind::Real(r) if r == f64::NEG_INFINITY)
    }

    pub fn is_positive_infinity(&self) -> bool {
        matches!(self.kind, ValueKind::Real(r) if r == f64::INFINITY)
    }
}
