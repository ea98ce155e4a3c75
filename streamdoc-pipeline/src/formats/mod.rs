//! Format implementations
//!
//! This module contains the renderings of [`Document`](crate::ir::nodes::Document) snapshots.

pub mod json;
pub mod tag;

pub use json::JsonFormat;
pub use tag::TagFormat;
