//! Server-sent event frame decoding
//!
//! Bytes arrive in arbitrary chunks. The decoder keeps whatever does not yet form a complete
//! line in an internal buffer, groups complete lines into frames (a blank line ends a frame),
//! and turns each frame's joined `data` lines into a [`FrameEvent`].
//!
//! Lines may end in `\n`, `\r\n` or `\r`. A chunk ending in `\r` is held back until the next
//! byte shows whether a `\n` follows.

use crate::error::{ErrorKind, PipelineError, Stage};
use crate::transport::payload::parse_payload;
use tracing::{debug, warn};

/// Wire-level knobs of the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Field name of payload lines
    pub data_field: String,
    /// Payload that marks the end of the stream
    pub done_sentinel: String,
    /// Finish reason of a normally completed response
    pub normal_finish_reason: String,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            data_field: "data".to_string(),
            done_sentinel: "[DONE]".to_string(),
            normal_finish_reason: "STOP".to_string(),
        }
    }
}

/// What one complete frame meant.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// Text to append to the accumulated buffer
    Delta(String),
    /// The end-of-stream sentinel
    Done,
    /// The server reported an error; the stream is over
    Remote(PipelineError),
    /// The frame was dropped; decoding continues with the next one
    Skipped(PipelineError),
}

/// Incremental frame decoder.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    options: DecoderOptions,
    /// Bytes of the line currently being received
    buffer: Vec<u8>,
    /// Complete lines of the frame currently being received
    lines: Vec<Vec<u8>>,
}

impl FrameDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            options,
            buffer: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Feeds a chunk and returns the events of every frame it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<FrameEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut start = 0;
        while let Some((end, next)) = find_line_end(&self.buffer[start..]) {
            let line = self.buffer[start..start + end].to_vec();
            start += next;
            self.take_line(line, &mut events);
        }
        self.buffer.drain(..start);
        events
    }

    /// Flushes a final frame that was not followed by a blank line.
    pub fn finish(&mut self) -> Vec<FrameEvent> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let mut line = std::mem::take(&mut self.buffer);
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.take_line(line, &mut events);
        }
        if !self.lines.is_empty() {
            let lines = std::mem::take(&mut self.lines);
            self.dispatch(lines, &mut events);
        }
        events
    }

    /// Drops all buffered bytes and partial frames.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.lines.clear();
    }

    /// Whether bytes of an incomplete frame are buffered.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty() || !self.lines.is_empty()
    }

    fn take_line(&mut self, line: Vec<u8>, events: &mut Vec<FrameEvent>) {
        if line.is_empty() {
            if !self.lines.is_empty() {
                let lines = std::mem::take(&mut self.lines);
                self.dispatch(lines, events);
            }
        } else {
            self.lines.push(line);
        }
    }

    fn dispatch(&self, lines: Vec<Vec<u8>>, events: &mut Vec<FrameEvent>) {
        let mut data = Vec::new();
        for line in lines {
            let Ok(line) = String::from_utf8(line) else {
                warn!("dropping frame that is not valid UTF-8");
                events.push(FrameEvent::Skipped(PipelineError::new(
                    Stage::Frame,
                    ErrorKind::FrameEncoding,
                )));
                return;
            };
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line.as_str(), ""),
            };
            if field == self.options.data_field {
                data.push(value.to_string());
            } else {
                debug!(field, "ignoring frame field");
            }
        }
        if data.is_empty() {
            return;
        }

        let payload = data.join("\n");
        if payload.trim() == self.options.done_sentinel {
            events.push(FrameEvent::Done);
            return;
        }

        let response = match parse_payload(&payload) {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "dropping malformed frame");
                events.push(FrameEvent::Skipped(err));
                return;
            }
        };
        if let Some(remote) = response.error.clone() {
            events.push(FrameEvent::Remote(remote.into()));
            return;
        }
        if let Some(reason) = response.finish_reason() {
            if reason != self.options.normal_finish_reason {
                warn!(reason, "response finished abnormally");
            }
        }
        if let Some(delta) = response.delta() {
            if !delta.is_empty() {
                events.push(FrameEvent::Delta(delta.to_string()));
            }
        }
    }
}

/// Finds the first line terminator: `(line_length, bytes_consumed)`.
fn find_line_end(bytes: &[u8]) -> Option<(usize, usize)> {
    for (i, byte) in bytes.iter().enumerate() {
        match byte {
            b'\n' => return Some((i, i + 1)),
            b'\r' => {
                let next = bytes.get(i + 1)?;
                return Some((i, if *next == b'\n' { i + 2 } else { i + 1 }));
            }
            _ => {}
        }
    }
    None
}
