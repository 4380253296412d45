use thiserror::Error;

/// Capture-side errors: the remedy is fixing the device or the media path,
/// not retrying the network.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("media device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("recording already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("media stream closed unexpectedly: {0}")]
    StreamClosed(String),
}

/// Classification of a single upload attempt against the server.
///
/// Every variant is retryable from the engine's point of view; the engine
/// decides when the budget is spent.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed server response: {0}")]
    MalformedResponse(String),
}

/// Terminal outcome of the upload retry loop.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// Rejection taxonomy for one upload submission.
///
/// Each class maps to its own HTTP status so clients can tell a size
/// violation from a media-type violation from a missing field. All of
/// these are terminal for the request; the server never retries.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing file or upload information")]
    MissingField(&'static str),

    #[error("Invalid questionIndex: {0}")]
    InvalidIndex(String),

    #[error("Unknown session folder: {0}")]
    UnknownSession(String),

    #[error("File type rejected: {got}. Only {accepted} format is accepted.")]
    UnsupportedMediaType { got: String, accepted: String },

    #[error("Upload Error: File size exceeds limit ({limit_mib}MB).")]
    TooLarge { limit_mib: u64 },

    #[error("Malformed upload request: {0}")]
    BadMultipart(String),

    #[error("Server error processing STT/metadata")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for IngestError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e)
    }
}

/// Ordering violations and session-setup failures in the interview flow.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("could not start session: {0}")]
    SessionStart(BackendError),

    #[error("could not finalize session: {0}")]
    Finalize(BackendError),

    #[error("interview already finished")]
    AlreadyFinished,

    #[error("interview not finished yet, nothing to finalize")]
    NotFinished,

    #[error("session already finalized")]
    AlreadyFinalized,
}
