//! Source location tracking

use std::fmt;

use serde::{Deserialize, Serialize};

/// A location represents a range in the source the node was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    /// File ID
    #[serde(default)]
    pub file_id: usize,
    /// 1-based line of the first character
    #[serde(default)]
    pub line: usize,
    /// Start byte offset
    #[serde(default)]
    pub start: usize,
    /// End byte offset (exclusive)
    #[serde(default)]
    pub end: usize,
}

impl Location {
    /// Create a new location
    pub fn new(file_id: usize, line: usize, start: usize, end: usize) -> Self {
        Self { file_id, line, start, end }
    }

    /// Create a dummy location (for testing and synthesized nodes)
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Location on a given line, used by builders that have no offsets
    pub fn at_line(line: usize) -> Self {
        Self { line, ..Self::default() }
    }

    /// Merge two locations
    pub fn merge(&self, other: &Location) -> Location {
        Location {
            file_id: self.file_id,
            line: self.line.min(other.line),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Get the length of the location
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the location is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_id, self.line)
    }
}
