//! Full document rebuilds
//!
//! [`DocumentBuilder`] turns the whole accumulated text into a [`Document`], from scratch, on
//! every call:
//!
//! 1. the block scanner splits the text into markdown and element spans
//! 2. markdown spans become text and table items, element spans become raw element items
//! 3. the registered [`BuildPass`]es run in order (options, widgets, questions by default)
//! 4. ids are stamped on every item
//!
//! Nothing is carried over between builds, so building the same text twice gives the same
//! document.

use crate::builders::{BuildContext, BuildPass, OptionPass, Placement, QuestionPass, WidgetPass};
use crate::identity::{assign_ids, IdGenerator};
use crate::ir::element::RawSpan;
use crate::ir::nodes::{Document, Item, ItemValue};
use crate::scanning::{extract_markdown, parse_element, scan_blocks, TagVocabulary, TailRows};
use crate::transport::DecoderOptions;
use tracing::debug;

/// Everything that shapes how a stream is decoded and built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub decoder: DecoderOptions,
    pub tags: TagVocabulary,
    pub placement: Placement,
    /// Show a last `|` line on the terminal build instead of treating it as a row in progress
    pub keep_partial_rows_when_finished: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            decoder: DecoderOptions::default(),
            tags: TagVocabulary::default(),
            placement: Placement::default(),
            keep_partial_rows_when_finished: true,
        }
    }
}

/// Builds documents from accumulated text.
pub struct DocumentBuilder {
    tags: TagVocabulary,
    placement: Placement,
    keep_partial_rows_when_finished: bool,
    passes: Vec<Box<dyn BuildPass>>,
}

impl DocumentBuilder {
    /// A builder without any passes: elements stay raw.
    pub fn new(options: &PipelineOptions) -> Self {
        Self {
            tags: options.tags.clone(),
            placement: options.placement,
            keep_partial_rows_when_finished: options.keep_partial_rows_when_finished,
            passes: Vec::new(),
        }
    }

    /// A builder running the option, widget and question passes, in that order.
    pub fn with_defaults(options: &PipelineOptions) -> Self {
        let mut builder = Self::new(options);
        builder.register(OptionPass);
        builder.register(WidgetPass);
        builder.register(QuestionPass);
        builder
    }

    /// Appends a pass; passes run in registration order.
    pub fn register<P: BuildPass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn tags(&self) -> &TagVocabulary {
        &self.tags
    }

    /// Scans `text` into markdown, table and raw element items, before any pass runs.
    pub fn parse_items(&self, text: &str, finished: bool) -> Vec<Item> {
        let spans = scan_blocks(text, &self.tags, !finished);
        let last = spans.len().saturating_sub(1);
        let mut items = Vec::with_capacity(spans.len());

        for (index, span) in spans.into_iter().enumerate() {
            match span {
                RawSpan::Markdown(markdown) => {
                    let tail = if index != last {
                        TailRows::Keep
                    } else if !finished {
                        TailRows::HoldBack
                    } else if self.keep_partial_rows_when_finished {
                        TailRows::Keep
                    } else {
                        TailRows::StripPartial
                    };
                    items.extend(
                        extract_markdown(markdown, tail)
                            .into_iter()
                            .map(Item::new),
                    );
                }
                RawSpan::Xml { name, source } => match parse_element(source, &self.tags) {
                    Some(element) => items.push(Item::new(ItemValue::RawXml(element))),
                    None => debug!(name, "dropping malformed element"),
                },
                RawSpan::IncompleteXml { name, source } => {
                    debug!(name, bytes = source.len(), "element still streaming");
                }
            }
        }
        items
    }

    /// Builds the document for `text`. `finished` marks the terminal build of a stream.
    pub fn build(&self, text: &str, finished: bool) -> Document {
        let mut items = self.parse_items(text, finished);

        let mut context = BuildContext::new(&self.tags, self.placement);
        for pass in &self.passes {
            items = pass.apply(items, &mut context);
        }
        assign_ids(&mut items, &mut IdGenerator::new());

        debug!(
            bytes = text.len(),
            items = items.len(),
            errors = context.errors.len(),
            finished,
            "document rebuilt"
        );
        Document {
            items,
            finished,
            errors: context.errors,
            options: context.options,
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::with_defaults(&PipelineOptions::default())
    }
}

/// Builds a document from complete text with the default passes.
pub fn build_document(text: &str, options: &PipelineOptions) -> Document {
    DocumentBuilder::with_defaults(options).build(text, true)
}
