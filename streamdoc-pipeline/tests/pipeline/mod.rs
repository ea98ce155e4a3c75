//! End to end builds
//!
//! Whole responses, and every prefix of them, through the default passes.

mod documents;
mod snapshots;
