//! Compilation timestamps
//!
//! Every checking or generation run carries a timestamp. A node remembers the
//! timestamp it was last processed at and skips the work unless the incoming
//! one is newer, which keeps repeated traversals of a shared graph linear and
//! lets cyclic graphs terminate.

use serde::{Deserialize, Serialize};

/// Monotonic version counter of a compilation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilationTimestamp(u64);

impl CompilationTimestamp {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The first timestamp of a fresh compilation
    pub fn first() -> Self {
        Self(1)
    }

    /// The timestamp of the next run
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Whether an entity last processed at `last` has to be processed again
    pub fn is_newer_than(self, last: Option<CompilationTimestamp>) -> bool {
        match last {
            Some(last) => last < self,
            None => true,
        }
    }
}

impl std::fmt::Display for CompilationTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate() {
        let t1 = CompilationTimestamp::first();
        let t2 = t1.next();
        assert!(t1.is_newer_than(None));
        assert!(!t1.is_newer_than(Some(t1)));
        assert!(!t1.is_newer_than(Some(t2)));
        assert!(t2.is_newer_than(Some(t1)));
    }
}
