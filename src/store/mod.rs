//! Durable session records and on-disk artifact layout

pub mod meta;
pub mod store;

pub use meta::{QuestionRecord, SessionMeta};
pub use store::{media_file_name, transcript_file_name, SessionStore};
