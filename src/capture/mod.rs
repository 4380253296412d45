//! Media capture for interview answers
//!
//! This module owns the recording lifecycle for one question at a time:
//! - `MediaSource`: the device seam (a take is a channel of media chunks)
//! - `FileSource`: file-backed source for the terminal client and tests
//! - `Recorder`: start/stop control that assembles chunks into one blob

pub mod recorder;
pub mod source;

pub use recorder::{RecordedAnswer, Recorder};
pub use source::{FileSource, MediaChunk, MediaSource};
