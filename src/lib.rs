pub mod capture;
pub mod config;
pub mod error;
pub mod flow;
pub mod http;
pub mod protocol;
pub mod store;
pub mod transcribe;
pub mod upload;

pub use capture::{FileSource, MediaChunk, MediaSource, RecordedAnswer, Recorder};
pub use config::Config;
pub use error::{BackendError, CaptureError, FlowError, IngestError, UploadError};
pub use flow::{AnsweredQuestion, FlowOutcome, FlowPhase, InterviewFlow, InterviewScript};
pub use http::{create_router, AppState, IngestLimits};
pub use protocol::{
    FinishSessionRequest, StartSessionReply, StartSessionRequest, StatusReply, UploadReply,
    VerifyTokenRequest,
};
pub use store::{QuestionRecord, SessionMeta, SessionStore};
pub use transcribe::{GeminiTranscriber, Transcriber};
pub use upload::{
    AnswerUpload, HttpBackend, InterviewBackend, RetryPolicy, Sleeper, TokioSleeper, UploadReceipt,
    Uploader,
};
