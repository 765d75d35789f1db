//! References and sub-references
//!
//! A reference is a list of sub-references. The first one names the
//! assignment; the rest navigate into the referred entity (`x.field[2]`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frontend::ast::ValueId;
use crate::frontend::Identifier;
use crate::utils::Location;

/// One navigation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SubReference {
    /// `.name`
    Field { id: Identifier },
    /// `[index]`
    Array {
        index: ValueId,
        #[serde(default)]
        location: Location,
    },
    /// `name(actual, parameters)`
    Parameterised {
        id: Identifier,
        #[serde(default)]
        parameters: Vec<ValueId>,
    },
}

impl SubReference {
    pub fn field(name: &str) -> Self {
        Self::Field { id: Identifier::new(name) }
    }

    pub fn location(&self) -> Location {
        match self {
            Self::Field { id } | Self::Parameterised { id, .. } => id.location,
            Self::Array { location, .. } => *location,
        }
    }

    pub fn id(&self) -> Option<&Identifier> {
        match self {
            Self::Field { id } | Self::Parameterised { id, .. } => Some(id),
            Self::Array { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Explicit module qualifier (`M.x`)
    #[serde(default)]
    pub module: Option<Identifier>,
    pub subrefs: Vec<SubReference>,
    #[serde(default)]
    pub location: Location,
}

impl Reference {
    /// Reference to an assignment by name
    pub fn named(name: &str) -> Self {
        Self {
            module: None,
            subrefs: vec![SubReference::field(name)],
            location: Location::dummy(),
        }
    }

    /// Reference to an assignment followed by field sub-references
    pub fn with_fields(name: &str, fields: &[&str]) -> Self {
        let mut reference = Self::named(name);
        reference
            .subrefs
            .extend(fields.iter().map(|f| SubReference::field(f)));
        reference
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Identifier of the referred assignment
    pub fn id(&self) -> Option<&Identifier> {
        self.subrefs.first().and_then(SubReference::id)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "{}.", module)?;
        }
        for (i, subref) in self.subrefs.iter().enumerate() {
            match subref {
                SubReference::Field { id } => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}", id)?;
                }
                SubReference::Parameterised { id, .. } => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}(...)", id)?;
                }
                SubReference::Array { .. } => f.write_str("[...]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mut r = Reference::with_fields("rec", &["a", "b"]);
        r.subrefs.push(SubReference::Array {
            index: ValueId(0),
            location: Location::dummy(),
        });
        assert_eq!(r.to_string(), "rec.a.b[...]");
        assert_eq!(r.id().map(|id| id.name.as_str()), Some("rec"));
    }
}
