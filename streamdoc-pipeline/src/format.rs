//! Format trait definition
//!
//! A format renders a [`Document`] snapshot as text for a collaborator: the UI layer reads the
//! JSON rendering, tests and debugging sessions read the tag rendering.

use crate::error::PipelineError;
use crate::ir::nodes::Document;

/// Trait for document formats
///
/// # Examples
///
/// ```ignore
/// struct CountFormat;
///
/// impl Format for CountFormat {
///     fn name(&self) -> &str {
///         "count"
///     }
///
///     fn serialize(&self, doc: &Document) -> Result<String, PipelineError> {
///         Ok(doc.items.len().to_string())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "tag", "json")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Render a document snapshot
    fn serialize(&self, doc: &Document) -> Result<String, PipelineError>;
}
