//! Transport decoding: server-sent event bytes in, text deltas out.
//!
//! The transport collaborator delivers UTF-8 byte chunks as they become available.
//! [`frames::FrameDecoder`] splits them into frames and extracts the text delta of each one;
//! [`accumulator::Accumulator`] keeps the growing full text every rebuild reads.

pub mod accumulator;
pub mod frames;
pub mod payload;

pub use accumulator::{Accumulator, TextSnapshot};
pub use frames::{DecoderOptions, FrameDecoder, FrameEvent};
