//! Sub-type constraints
//!
//! A constraint is a set of alternative value restrictions (a value matches
//! if any alternative admits it) plus an optional length restriction that
//! must always hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Restriction {
    /// `(min..max)`; `None` stands for the matching infinity
    IntegerRange { min: Option<i64>, max: Option<i64> },
    FloatRange { min: Option<f64>, max: Option<f64> },
    /// `("a".."z")`
    CharRange { from: char, to: char },
}

impl Restriction {
    fn admits_integer(&self, value: i64) -> Option<bool> {
        match self {
            Self::IntegerRange { min, max } => {
                Some(min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m))
            }
            _ => None,
        }
    }

    fn admits_real(&self, value: f64) -> Option<bool> {
        match self {
            Self::FloatRange { min, max } => {
                Some(min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m))
            }
            _ => None,
        }
    }

    fn admits_string(&self, value: &str) -> Option<bool> {
        match self {
            Self::CharRange { from, to } => Some(value.chars().all(|c| c >= *from && c <= *to)),
            _ => None,
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegerRange { min, max } => {
                match min {
                    Some(m) => write!(f, "{}", m)?,
                    None => f.write_str("-infinity")?,
                }
                f.write_str("..")?;
                match max {
                    Some(m) => write!(f, "{}", m),
                    None => f.write_str("infinity"),
                }
            }
            Self::FloatRange { min, max } => {
                match min {
                    Some(m) => write!(f, "{:?}", m)?,
                    None => f.write_str("-infinity")?,
                }
                f.write_str("..")?;
                match max {
                    Some(m) => write!(f, "{:?}", m),
                    None => f.write_str("infinity"),
                }
            }
            Self::CharRange { from, to } => write!(f, "\"{}\"..\"{}\"", from, to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    /// `None` means unbounded
    #[serde(default)]
    pub max: Option<usize>,
}

impl LengthBounds {
    pub fn admits(&self, len: usize) -> bool {
        len >= self.min && self.max.map_or(true, |m| len <= m)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTypeConstraint {
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    #[serde(default)]
    pub length: Option<LengthBounds>,
    #[serde(default)]
    pub location: Location,
}

impl SubTypeConstraint {
    pub fn new(restrictions: Vec<Restriction>) -> Self {
        Self {
            restrictions,
            length: None,
            location: Location::dummy(),
        }
    }

    pub fn length(min: usize, max: Option<usize>) -> Self {
        Self {
            restrictions: Vec::new(),
            length: Some(LengthBounds { min, max }),
            location: Location::dummy(),
        }
    }

    fn admits_with(&self, check: impl Fn(&Restriction) -> Option<bool>) -> bool {
        let mut relevant = self.restrictions.iter().filter_map(check).peekable();
        if relevant.peek().is_none() {
            return true;
        }
        relevant.any(|admitted| admitted)
    }

    pub fn admits_integer(&self, value: i64) -> bool {
        self.admits_with(|r| r.admits_integer(value))
    }

    pub fn admits_real(&self, value: f64) -> bool {
        self.admits_with(|r| r.admits_real(value))
    }

    pub fn admits_string(&self, value: &str) -> bool {
        let length_ok = self
            .length
            .map_or(true, |bounds| bounds.admits(value.chars().count()));
        length_ok && self.admits_with(|r| r.admits_string(value))
    }
}

impl fmt::Display for SubTypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if !self.restrictions.is_empty() {
            let alternatives: Vec<String> = self.restrictions.iter().map(ToString::to_string).collect();
            parts.push(format!("({})", alternatives.join(", ")));
        }
        if let Some(length) = self.length {
            match length.max {
                Some(max) if max == length.min => parts.push(format!("length({})", max)),
                Some(max) => parts.push(format!("length({}..{})", length.min, max)),
                None => parts.push(format!("length({}..infinity)", length.min)),
            }
        }
        f.write_str(&parts.join(" "))
    }
}
