//! Identifiers
//!
//! An identifier keeps the name as written in the source; the target-language
//! spelling is derived on demand.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::utils::Location;

/// Words that cannot be used verbatim as generated Java names
const RESERVED_TARGET_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    #[serde(default)]
    pub location: Location,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Location::dummy(),
        }
    }

    pub fn with_location(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    /// Name as shown in diagnostics
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Name usable in generated code: ASN.1 hyphens become underscores and
    /// reserved words get a trailing underscore.
    pub fn target_name(&self) -> String {
        let mut name = self.name.replace('-', "_");
        if RESERVED_TARGET_WORDS.contains(&name.as_str()) {
            name.push('_');
        }
        name
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_name() {
        assert_eq!(Identifier::new("field-one").target_name(), "field_one");
        assert_eq!(Identifier::new("class").target_name(), "class_");
        assert_eq!(Identifier::new("plain").target_name(), "plain");
    }

    #[test]
    fn test_equality_ignores_location() {
        let a = Identifier::with_location("x", Location::at_line(3));
        let b = Identifier::with_location("x", Location::at_line(9));
        assert_eq!(a, b);
    }
}
