//! HTTP API for the interview server
//!
//! This module provides the REST surface the interview client talks to:
//! - POST /api/verify-token - Check the shared access token
//! - POST /api/session/start - Create a session folder for a participant
//! - POST /api/upload-one - Ingest one recorded answer (multipart)
//! - POST /api/session/finish - Stamp a session as complete
//! - GET /api/health - Health check
//! - GET /uploads/* - Stored media artifacts, for playback

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, IngestLimits};
