//! One stream at a time
//!
//! A [`StreamSession`] owns everything that belongs to the current request: the frame decoder
//! with its pending bytes, the accumulated text and the errors seen so far. Each request is
//! identified by an [`Epoch`]. Starting a new request resets all of that state in one step and
//! moves to a new epoch; every later call carries the epoch it belongs to, and calls for any
//! other epoch are ignored, so a chunk that arrives late from a cancelled request cannot leak
//! into the new one.
//!
//! Sessions are plain synchronous values. [`crate::driver`] runs one on a tokio task.

use crate::error::PipelineError;
use crate::ir::nodes::Document;
use crate::pipeline::{DocumentBuilder, PipelineOptions};
use crate::transport::{Accumulator, DecoderOptions, FrameDecoder, FrameEvent, TextSnapshot};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Generation token of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }
}

impl From<u64> for Epoch {
    fn from(value: u64) -> Self {
        Epoch(value)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No request started yet
    Idle,
    Streaming,
    Finished,
}

/// Decoder, accumulator and builder of the current request.
pub struct StreamSession {
    epoch: Epoch,
    state: State,
    decoder: FrameDecoder,
    text: Accumulator,
    /// Transport and frame errors of the current request
    errors: Vec<PipelineError>,
    builder: DocumentBuilder,
}

impl StreamSession {
    pub fn new(options: &PipelineOptions) -> Self {
        Self::with_builder(
            options.decoder.clone(),
            DocumentBuilder::with_defaults(options),
        )
    }

    /// A session using a custom set of build passes.
    pub fn with_builder(decoder: DecoderOptions, builder: DocumentBuilder) -> Self {
        Self {
            epoch: Epoch::default(),
            state: State::Idle,
            decoder: FrameDecoder::new(decoder),
            text: Accumulator::new(),
            errors: Vec::new(),
            builder,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// Starts a new request and returns its epoch.
    pub fn begin(&mut self) -> Epoch {
        let epoch = self.epoch.next();
        self.begin_at(epoch);
        epoch
    }

    /// Starts a new request under an epoch allocated elsewhere.
    pub fn begin_at(&mut self, epoch: Epoch) {
        self.epoch = epoch;
        self.state = State::Streaming;
        self.decoder.reset();
        self.text.clear();
        self.errors.clear();
        info!(%epoch, "stream started");
    }

    /// Feeds transport bytes. Returns whether the document may have changed.
    pub fn ingest(&mut self, epoch: Epoch, bytes: &[u8]) -> bool {
        if !self.accepts(epoch) {
            return false;
        }
        let events = self.decoder.push(bytes);
        self.apply(events)
    }

    /// The transport closed the connection normally. Flushes a pending frame and finishes.
    pub fn close(&mut self, epoch: Epoch) -> bool {
        if !self.accepts(epoch) {
            return false;
        }
        let events = self.decoder.finish();
        self.apply(events);
        if self.state != State::Finished {
            self.finish();
        }
        true
    }

    /// The transport failed. Records the error and finishes with the text received so far.
    pub fn abort(&mut self, epoch: Epoch, error: PipelineError) -> bool {
        if !self.accepts(epoch) {
            return false;
        }
        warn!(%error, "stream failed");
        self.errors.push(error);
        self.finish();
        true
    }

    /// Builds the document for the text accumulated so far.
    pub fn snapshot(&self) -> Document {
        let mut document = self.builder.build(self.text.as_str(), self.is_finished());
        let mut errors = self.errors.clone();
        errors.append(&mut document.errors);
        document.errors = errors;
        document
    }

    /// [`StreamSession::ingest`], then a snapshot when anything changed.
    pub fn receive(&mut self, epoch: Epoch, bytes: &[u8]) -> Option<Document> {
        self.ingest(epoch, bytes).then(|| self.snapshot())
    }

    /// [`StreamSession::close`], then the final snapshot.
    pub fn complete(&mut self, epoch: Epoch) -> Option<Document> {
        self.close(epoch).then(|| self.snapshot())
    }

    /// [`StreamSession::abort`], then the final snapshot.
    pub fn fail(&mut self, epoch: Epoch, error: PipelineError) -> Option<Document> {
        self.abort(epoch, error).then(|| self.snapshot())
    }

    /// The accumulated text, shared without copying.
    pub fn text(&self) -> TextSnapshot {
        self.text.snapshot()
    }

    fn accepts(&self, epoch: Epoch) -> bool {
        if epoch != self.epoch {
            warn!(%epoch, current = %self.epoch, "ignoring input from another request");
            return false;
        }
        match self.state {
            State::Streaming => true,
            State::Idle | State::Finished => {
                debug!(%epoch, "ignoring input outside an active stream");
                false
            }
        }
    }

    fn apply(&mut self, events: Vec<FrameEvent>) -> bool {
        let mut changed = false;
        for event in events {
            match event {
                FrameEvent::Delta(delta) => {
                    self.text.push_str(&delta);
                    changed = true;
                }
                FrameEvent::Skipped(error) => {
                    self.errors.push(error);
                    changed = true;
                }
                FrameEvent::Done => {
                    self.finish();
                    return true;
                }
                FrameEvent::Remote(error) => {
                    warn!(%error, "server reported an error");
                    self.errors.push(error);
                    self.finish();
                    return true;
                }
            }
        }
        changed
    }

    fn finish(&mut self) {
        self.state = State::Finished;
        self.decoder.reset();
        info!(epoch = %self.epoch, bytes = self.text.len(), "stream finished");
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new(&PipelineOptions::default())
    }
}
