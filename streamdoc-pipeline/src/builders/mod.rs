//! Semantic builder passes
//!
//! After scanning, the item list holds markdown text, tables and raw elements. Builder passes
//! turn raw elements into semantic items: layout directives ([`options`]), visualizations
//! ([`widgets`]) and interactive questions ([`questions`]). Each pass consumes the list the
//! previous one produced; passes never look at the accumulated text.
//!
//! A pass removes the elements it consumed. Where its synthesized items go depends on
//! [`Placement`]: at the position of the element they replace, or after everything else.

use crate::error::PipelineError;
use crate::ir::nodes::{Item, LayoutOptions};
use crate::scanning::vocabulary::TagVocabulary;
use serde::{Deserialize, Serialize};

pub mod options;
pub mod partial_json;
pub mod questions;
pub mod widgets;

pub use options::OptionPass;
pub use questions::QuestionPass;
pub use widgets::WidgetPass;

/// Where synthesized items land in the rebuilt list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// At the position of the element they were built from
    #[default]
    Anchored,
    /// After all kept items, in the order they were built
    Append,
}

/// State shared by the passes of one build.
#[derive(Debug)]
pub struct BuildContext<'a> {
    pub tags: &'a TagVocabulary,
    pub placement: Placement,
    /// Layout directives collected so far
    pub options: LayoutOptions,
    /// Recoverable errors, in the order they were raised
    pub errors: Vec<PipelineError>,
}

impl<'a> BuildContext<'a> {
    pub fn new(tags: &'a TagVocabulary, placement: Placement) -> Self {
        Self {
            tags,
            placement,
            options: LayoutOptions::default(),
            errors: Vec::new(),
        }
    }
}

/// One transformation of the item list.
///
/// # Examples
///
/// ```ignore
/// struct DropRawXml;
///
/// impl BuildPass for DropRawXml {
///     fn name(&self) -> &str {
///         "drop-raw-xml"
///     }
///
///     fn apply(&self, items: Vec<Item>, _context: &mut BuildContext<'_>) -> Vec<Item> {
///         items
///             .into_iter()
///             .filter(|item| item.value.as_element().is_none())
///             .collect()
///     }
/// }
/// ```
pub trait BuildPass: Send + Sync {
    /// The name of this pass (e.g. "widgets")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Rebuilds the item list. Errors go to `context.errors`; a failing item never stops
    /// the items after it from being processed.
    fn apply(&self, items: Vec<Item>, context: &mut BuildContext<'_>) -> Vec<Item>;
}

/// Output list of a pass that honours [`Placement`].
#[derive(Debug)]
pub(crate) struct Rebuild {
    placement: Placement,
    items: Vec<Item>,
    deferred: Vec<Item>,
}

impl Rebuild {
    pub(crate) fn new(placement: Placement, capacity: usize) -> Self {
        Self {
            placement,
            items: Vec::with_capacity(capacity),
            deferred: Vec::new(),
        }
    }

    /// Passes an item through unchanged.
    pub(crate) fn keep(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Adds an item built from the element at the current position.
    pub(crate) fn synthesize(&mut self, item: Item) {
        match self.placement {
            Placement::Anchored => self.items.push(item),
            Placement::Append => self.deferred.push(item),
        }
    }

    /// The current position, for items synthesized after later items were kept.
    pub(crate) fn anchor(&self) -> usize {
        self.items.len()
    }

    /// Adds an item built from elements starting at an earlier [`Rebuild::anchor`].
    pub(crate) fn synthesize_at(&mut self, anchor: usize, item: Item) {
        match self.placement {
            Placement::Anchored => self.items.insert(anchor.min(self.items.len()), item),
            Placement::Append => self.deferred.push(item),
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Item> {
        self.items.append(&mut self.deferred);
        self.items
    }
}
