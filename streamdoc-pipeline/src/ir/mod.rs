//! Intermediate Representation (IR) for streamed documents.
//!
//! This module defines what the pipeline hands to the renderer: a [`nodes::Document`]
//! made of identified items. [`element`] holds the single-level element tree the
//! scanners produce before the builders turn elements into items.

pub mod element;
pub mod nodes;
