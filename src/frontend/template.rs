//! Template nodes

use serde::{Deserialize, Serialize};

use crate::frontend::ast::{TemplateId, TypeId, ValueId};
use crate::frontend::{Identifier, Reference};
use crate::utils::{CompilationTimestamp, Location};

/// One end of a value range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RangeBound {
    /// `-infinity` or `infinity`
    Infinity { negative: bool },
    Value(ValueId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: RangeBound,
    pub max: RangeBound,
    #[serde(default)]
    pub min_exclusive: bool,
    #[serde(default)]
    pub max_exclusive: bool,
}

/// Which string type a pattern was checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternKind {
    #[default]
    Unchecked,
    CharString,
    UniversalCharString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTemplate {
    pub text: String,
    #[serde(skip)]
    pub kind: PatternKind,
}

/// `decmatch [encoding] Type: template`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeMatch {
    pub target_type: TypeId,
    pub target: TemplateId,
    #[serde(default)]
    pub encoding: Option<ValueId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedTemplate {
    pub name: Identifier,
    pub template: TemplateId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LengthRestriction {
    Single(ValueId),
    Range { lower: ValueId, upper: Option<ValueId> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TemplateKind {
    SpecificValue(ValueId),
    TemplateRefd(Reference),
    ValueList(Vec<TemplateId>),
    ComplementedList(Vec<TemplateId>),
    ValueRange(ValueRange),
    Pattern(PatternTemplate),
    DecodeMatch(DecodeMatch),
    NamedTemplateList(Vec<NamedTemplate>),
    AnyValue,
    AnyOrOmit,
    Omit,
}

impl TemplateKind {
    /// Name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Self::SpecificValue(_) => "specific value",
            Self::TemplateRefd(_) => "referenced template",
            Self::ValueList(_) => "value list match",
            Self::ComplementedList(_) => "complemented list match",
            Self::ValueRange(_) => "value range match",
            Self::Pattern(p) => match p.kind {
                PatternKind::UniversalCharString => "universal charstring pattern",
                _ => "character string pattern",
            },
            Self::DecodeMatch(_) => "decoded content match",
            Self::NamedTemplateList(_) => "value list notation",
            Self::AnyValue => "any value",
            Self::AnyOrOmit => "any or omit",
            Self::Omit => "omit value",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateNode {
    pub kind: TemplateKind,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub length_restriction: Option<LengthRestriction>,
    #[serde(default)]
    pub if_present: bool,
    /// Defined with `modifies`
    #[serde(default)]
    pub is_modified: bool,

    #[serde(skip)]
    pub governor: Option<TypeId>,
    #[serde(skip)]
    pub is_erroneous: bool,
    #[serde(skip)]
    pub last_checked: Option<CompilationTimestamp>,
}

impl TemplateNode {
    pub fn new(kind: TemplateKind) -> Self {
        Self {
            kind,
            location: Location::dummy(),
            length_restriction: None,
            if_present: false,
            is_modified: false,
            governor: None,
            is_erroneous: false,
            last_checked: None,
        }
    }
}
