//! Copy-on-write text accumulator.
//!
//! Every rebuild reads the whole accumulated text. Snapshots share the buffer through an
//! `Arc`, so taking one is a pointer copy; appending only clones the text when a snapshot
//! is still alive.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// The growing full text of the current response.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    text: Arc<String>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, delta: &str) {
        Arc::make_mut(&mut self.text).push_str(delta);
    }

    /// A cheap, immutable view of the text as it is now.
    pub fn snapshot(&self) -> TextSnapshot {
        TextSnapshot(Arc::clone(&self.text))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Starts over with a fresh buffer; outstanding snapshots keep the old text.
    pub fn clear(&mut self) {
        self.text = Arc::new(String::new());
    }
}

/// Shared, immutable accumulated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSnapshot(Arc<String>);

impl Deref for TextSnapshot {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
