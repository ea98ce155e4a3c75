//! Stable, hierarchical item identifiers
//!
//! Every full rebuild stamps ids with a fresh [`IdGenerator`]. The root generator hands out
//! `"1"`, `"2"`, ... for top-level items. Nested items (widgets of a container, questions
//! of a group) use a generator derived from their parent, scoped under
//! `"{parentCounter}-{nestedIndex}."`, so the widgets of item 3 become `"3-1.1"`, `"3-1.2"`.
//!
//! Ids are deterministic for a given item list: an item keeps its id across rebuilds as long
//! as the number of items before it does not change.

use crate::ir::nodes::Item;
use serde::Serialize;
use std::fmt;

/// A dotted hierarchical item id such as `"3-1.2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StableId {
    fn from(value: &str) -> Self {
        StableId(value.to_string())
    }
}

impl From<String> for StableId {
    fn from(value: String) -> Self {
        StableId(value)
    }
}

/// Counter-based id generator.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    prefix: String,
    counter: usize,
    nested: usize,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_prefix(prefix: String) -> Self {
        Self {
            prefix,
            counter: 0,
            nested: 0,
        }
    }

    /// Advances the counter and returns `"{prefix}{counter}"`.
    pub fn next_id(&mut self) -> StableId {
        self.counter += 1;
        self.nested = 0;
        StableId(format!("{}{}", self.prefix, self.counter))
    }

    /// A generator scoped under the current counter and the next nested index.
    pub fn derive(&mut self) -> IdGenerator {
        self.nested += 1;
        IdGenerator::with_prefix(format!("{}{}-{}.", self.prefix, self.counter, self.nested))
    }
}

/// Stamps ids on `items` and, through derived generators, on their nested items.
pub fn assign_ids(items: &mut [Item], ids: &mut IdGenerator) {
    for item in items {
        item.id = ids.next_id();
        if let Some(children) = item.value.children_mut() {
            let mut nested = ids.derive();
            assign_ids(children, &mut nested);
        }
    }
}
