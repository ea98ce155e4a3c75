//! JSON payload carried by each data frame.
//!
//! Only the fields the pipeline reads are modelled; everything else is ignored by serde.

use crate::error::{ErrorKind, PipelineError, Stage};
use serde::Deserialize;

/// `{ candidates: [ { content: { parts: [ { text } ] }, finishReason? } ], error? }`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub error: Option<RemoteError>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

/// An error object sent in place of candidates.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl StreamResponse {
    /// The text delta at `candidates[0].content.parts[0].text`.
    pub fn delta(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

impl From<RemoteError> for PipelineError {
    fn from(remote: RemoteError) -> Self {
        PipelineError::new(
            Stage::Transport,
            ErrorKind::Remote {
                code: remote.code,
                status: remote.status,
                message: remote.message,
            },
        )
    }
}

/// Parses one frame payload.
pub fn parse_payload(payload: &str) -> Result<StreamResponse, PipelineError> {
    serde_json::from_str(payload).map_err(|e| {
        PipelineError::new(
            Stage::Frame,
            ErrorKind::FrameJson {
                message: e.to_string(),
            },
        )
    })
}
