//! Enumerated types and their generated sentinel values

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::frontend::Identifier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumItem {
    pub name: Identifier,
    /// Declared value; items without one get an implicit value in the check
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(skip)]
    pub implicit: bool,
}

impl EnumItem {
    pub fn new(name: &str, value: Option<i64>) -> Self {
        Self {
            name: Identifier::new(name),
            value,
            implicit: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumeratedType {
    pub items: Vec<EnumItem>,
    /// `(first unused, second unused)`, computed once
    #[serde(skip)]
    sentinels: Option<(i64, i64)>,
}

impl EnumeratedType {
    pub fn new(items: Vec<EnumItem>) -> Self {
        Self {
            items,
            sentinels: None,
        }
    }

    pub fn item(&self, name: &str) -> Option<&EnumItem> {
        self.items.iter().find(|item| item.name.name == name)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.item(name).is_some()
    }

    pub fn max_value(&self) -> Option<i64> {
        self.items.iter().filter_map(|item| item.value).max()
    }

    /// Values backing the generated UNKNOWN_VALUE and UNBOUND_VALUE
    pub fn sentinel_values(&mut self) -> (i64, i64) {
        if let Some(cached) = self.sentinels {
            return cached;
        }
        let computed = derive_unused_values(self.items.iter().filter_map(|item| item.value));
        self.sentinels = Some(computed);
        computed
    }

    /// Drop the cached sentinels after item values changed
    pub(crate) fn reset_sentinels(&mut self) {
        self.sentinels = None;
    }

    /// Cached sentinel values, if already computed
    pub fn cached_sentinels(&self) -> Option<(i64, i64)> {
        self.sentinels
    }
}

/// The two smallest non-negative integers not present in `used`
pub fn derive_unused_values(used: impl IntoIterator<Item = i64>) -> (i64, i64) {
    let used: BTreeSet<i64> = used.into_iter().collect();
    let mut free = (0i64..).filter(|candidate| !used.contains(candidate));
    // the range is unbounded and `used` finite, so both exist
    let first = free.next().unwrap_or(0);
    let second = free.next().unwrap_or(first + 1);
    (first, second)
}

/// Smallest non-negative integer not in `used`
pub fn first_free_value(used: &BTreeSet<i64>) -> i64 {
    (0i64..).find(|candidate| !used.contains(candidate)).unwrap_or(0)
}
