//! Streaming structured content pipeline
//!
//!     This crate turns a model response that arrives as server-sent events into a structured
//!     document (markdown text, tables, questions, visualization widgets, layout directives) and
//!     rebuilds that document from the whole accumulated text after every chunk.
//!
//!     TLDR:
//!         - The accumulated text is truncated all the time: mid-tag, mid-row, mid-JSON. No stage
//!           may render a half-received construct; they hold it back until it completes.
//!         - Every rebuild starts from scratch. Only item ids carry meaning across rebuilds, and
//!           they are derived deterministically from item positions.
//!         - Errors never stop later items from being built. They are collected into
//!           `Document::errors`.
//!
//!     This is a pure lib: no I/O, no environment variables, no logging subscriber. The transport
//!     (HTTP client, API keys) and the renderer are collaborators that live elsewhere.
//!
//! Architecture
//!
//!     Data flows strictly downward:
//!
//!     1. transport: bytes → frames → text deltas → accumulated text
//!     2. scanning/blocks: accumulated text → markdown and element spans
//!     3. scanning/tables: markdown spans → text and table items
//!     4. scanning/elements: element spans → raw element items
//!     5. builders: options, widgets and questions passes over the item list
//!     6. identity: stable ids on every item
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # ErrorKind, PipelineError, Stage
//!     ├── ir                      # Document, Item and Element types
//!     ├── transport               # SSE frame decoding and text accumulation
//!     ├── scanning                # block scanner, table extractor, element parser
//!     ├── builders                # BuildPass trait, the three passes, partial JSON completion
//!     ├── identity.rs             # StableId and IdGenerator
//!     ├── pipeline.rs             # DocumentBuilder: one full rebuild
//!     ├── session.rs              # StreamSession: epochs and per-request state
//!     ├── driver.rs               # tokio task running a session
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     └── formats                 # tag and json renderings of a Document
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common                  # frame builders shared by the suites
//!     ├── pipeline                # end to end builds of representative responses
//!     └── transport               # sessions, cancellation and the async driver
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Concurrency
//!
//!     A session is a synchronous value; rebuilds are pure computation over an in-memory string.
//!     The driver runs one session on one task, so rebuilds never overlap, and drains queued
//!     chunks before each rebuild. Epochs guard against late chunks from cancelled requests.
//!
pub mod builders;
pub mod driver;
pub mod error;
pub mod format;
pub mod formats;
pub mod identity;
pub mod ir;
pub mod pipeline;
pub mod registry;
pub mod scanning;
pub mod session;
pub mod transport;

pub use builders::{BuildContext, BuildPass, Placement};
pub use driver::{Command, StreamDriver, StreamHandle};
pub use error::{ErrorKind, PipelineError, Stage};
pub use format::Format;
pub use identity::{IdGenerator, StableId};
pub use ir::element::Element;
pub use ir::nodes::{Document, Item, ItemValue, LayoutOptions, PageControl};
pub use pipeline::{build_document, DocumentBuilder, PipelineOptions};
pub use registry::FormatRegistry;
pub use scanning::TagVocabulary;
pub use session::{Epoch, StreamSession};
pub use transport::DecoderOptions;
