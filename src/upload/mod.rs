//! Resilient answer uploads
//!
//! One submission = one question's media plus metadata. The retry loop in
//! `Uploader` is bounded and backs off exponentially between attempts; the
//! schedule lives in the pure `RetryPolicy` and the waiting in the injected
//! `Sleeper`, so the loop is testable without real delays. The transport
//! seam is `InterviewBackend`, implemented over HTTP by `HttpBackend`.

pub mod engine;
pub mod policy;
pub mod transport;

pub use engine::Uploader;
pub use policy::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{AnswerUpload, HttpBackend, InterviewBackend, UploadReceipt};
