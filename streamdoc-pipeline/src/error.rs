//! Error types for pipeline operations
//!
//! Every failure the pipeline can observe is a value of the closed [`ErrorKind`] enum, tagged
//! with the [`Stage`] that produced it and, where it applies, the index of the item being
//! processed. Recoverable errors are collected into `Document::errors`; none of them aborts the
//! processing of later items.

use serde::Serialize;
use thiserror::Error;

/// The pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Connection level failures reported by the transport collaborator
    Transport,
    /// A single server-sent event frame could not be decoded
    Frame,
    /// Layout directive pass
    Options,
    /// Chart and trend visualization pass
    Widget,
    /// Interactive question pass
    Question,
    /// Rendering a snapshot through a [`crate::Format`]
    Format,
}

/// What went wrong.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorKind {
    /// The connection failed or was closed with an error
    #[error("transport failed: {message}")]
    Transport { message: String },

    /// The server sent an error object inside the stream
    #[error("remote error {code} ({status}): {message}")]
    Remote {
        code: i64,
        status: String,
        message: String,
    },

    /// A frame was not valid UTF-8
    #[error("frame is not valid UTF-8")]
    FrameEncoding,

    /// A frame payload was not a JSON object of the expected shape
    #[error("malformed frame payload: {message}")]
    FrameJson { message: String },

    /// A visualization element named a widget kind we do not know
    #[error("unknown widget kind '{name}'")]
    UnknownWidget { name: String },

    /// Widget JSON could not be decoded, even after completion
    #[error("{widget} widget could not be decoded: {message}")]
    WidgetJson { widget: String, message: String },

    /// Format not found in registry
    #[error("format '{name}' not found")]
    FormatNotFound { name: String },

    /// A format failed to render a document
    #[error("serialization failed: {message}")]
    Serialization { message: String },
}

/// An error raised by one stage of the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{stage:?} stage{}: {kind}", item_suffix(.item_index))]
pub struct PipelineError {
    pub stage: Stage,
    /// Index of the item (in the list the stage was processing) that failed
    pub item_index: Option<usize>,
    pub kind: ErrorKind,
}

fn item_suffix(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!(" (item {index})"),
        None => String::new(),
    }
}

impl PipelineError {
    pub fn new(stage: Stage, kind: ErrorKind) -> Self {
        Self {
            stage,
            item_index: None,
            kind,
        }
    }

    pub fn at_item(stage: Stage, item_index: usize, kind: ErrorKind) -> Self {
        Self {
            stage,
            item_index: Some(item_index),
            kind,
        }
    }

    /// A connection level failure, as reported by the transport collaborator.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(
            Stage::Transport,
            ErrorKind::Transport {
                message: message.into(),
            },
        )
    }

    /// Whether this error ends the stream (as opposed to being skipped over).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Transport { .. } | ErrorKind::Remote { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
