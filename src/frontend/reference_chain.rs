//! Cycle guard for reference resolution
//!
//! Every resolution walk (type references, value references, class
//! inheritance) threads a chain through the call. Adding an entity that is
//! already on the chain reports the cycle instead of recursing.

use crate::utils::{DiagnosticSink, Location};

/// Node visited while following a chain of references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainLink {
    Type(usize),
    Value(usize),
    Template(usize),
}

pub struct ReferenceChain {
    links: Vec<ChainLink>,
    message: &'static str,
    /// Marks taken with [`ReferenceChain::mark`]
    marks: Vec<usize>,
}

impl ReferenceChain {
    pub fn new(message: &'static str) -> Self {
        Self {
            links: Vec::new(),
            message,
            marks: Vec::new(),
        }
    }

    /// Push `link`; returns false (after reporting) when it closes a cycle
    pub fn add(&mut self, link: ChainLink, location: &Location, sink: &mut dyn DiagnosticSink) -> bool {
        if self.links.contains(&link) {
            log::debug!("circular reference through {:?}", link);
            sink.report_semantic_error(location, self.message.to_string());
            return false;
        }
        self.links.push(link);
        true
    }

    pub fn contains(&self, link: ChainLink) -> bool {
        self.links.contains(&link)
    }

    pub fn mark(&mut self) {
        self.marks.push(self.links.len());
    }

    /// Drop everything added since the last mark
    pub fn previous_state(&mut self) {
        if let Some(len) = self.marks.pop() {
            self.links.truncate(len);
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
