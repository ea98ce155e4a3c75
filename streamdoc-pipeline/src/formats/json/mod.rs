//! JSON rendering of document snapshots, as consumed by the UI layer.

use crate::error::{ErrorKind, PipelineError, Stage};
use crate::format::Format;
use crate::ir::nodes::Document;

/// Serializes documents with serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Document snapshot as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn serialize(&self, doc: &Document) -> Result<String, PipelineError> {
        let result = if self.pretty {
            serde_json::to_string_pretty(doc)
        } else {
            serde_json::to_string(doc)
        };
        result.map_err(|e| {
            PipelineError::new(
                Stage::Format,
                ErrorKind::Serialization {
                    message: e.to_string(),
                },
            )
        })
    }
}
