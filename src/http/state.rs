use std::sync::Arc;

use crate::store::SessionStore;
use crate::transcribe::Transcriber;

/// Constraints applied to every uploaded answer
#[derive(Debug, Clone)]
pub struct IngestLimits {
    /// The one media type the system accepts
    pub media_type: String,
    /// Upload size ceiling in bytes
    pub max_bytes: u64,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Durable session records and artifacts
    pub store: Arc<SessionStore>,
    /// Speech-to-text collaborator invoked during ingest
    pub transcriber: Arc<dyn Transcriber>,
    /// Shared secret participants must present
    pub auth_token: String,
    pub limits: IngestLimits,
}

impl AppState {
    pub fn new(
        store: Arc<SessionStore>,
        transcriber: Arc<dyn Transcriber>,
        auth_token: impl Into<String>,
        limits: IngestLimits,
    ) -> Self {
        Self {
            store,
            transcriber,
            auth_token: auth_token.into(),
            limits,
        }
    }
}
