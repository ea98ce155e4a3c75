//! Text scanning: accumulated buffer to raw spans, markdown items and parsed elements.
//!
//! - [`blocks`] splits the buffer into markdown and tagged-element spans
//! - [`tables`] turns markdown spans into text and table values
//! - [`elements`] parses one tagged span into an [`Element`](crate::ir::element::Element)
//! - [`vocabulary`] names the recognized tags

pub mod blocks;
pub mod elements;
pub mod tables;
pub mod vocabulary;

pub use blocks::scan_blocks;
pub use elements::{parse_element, MAX_ELEMENT_DEPTH};
pub use tables::{extract_markdown, TailRows};
pub use vocabulary::TagVocabulary;
