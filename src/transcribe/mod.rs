//! Speech-to-text integration for ingested answers

pub mod gemini;

pub use gemini::{GeminiTranscriber, Transcriber};
