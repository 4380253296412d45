//! Wire envelopes shared by the server handlers and the client transport
//!
//! Field names match the JSON the original browser client exchanged with
//! the server (`ok`/`message` envelopes, camelCase keys), so existing
//! clients keep working against this server and vice versa.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/verify-token`
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// Request body for `POST /api/session/start`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub token: String,
    pub user_name: String,
}

/// Request body for `POST /api/session/finish`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishSessionRequest {
    pub token: String,
    pub folder: String,
    pub questions_count: u32,
}

/// Plain `{ok, message?}` envelope (verify-token, session/finish)
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusReply {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Response to `POST /api/session/start`
#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionReply {
    pub ok: bool,
    /// Opaque session key used by all subsequent calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StartSessionReply {
    pub fn ok(folder: impl Into<String>) -> Self {
        Self {
            ok: true,
            folder: Some(folder.into()),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            folder: None,
            message: Some(message.into()),
        }
    }
}

/// Response to `POST /api/upload-one`
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadReply {
    pub ok: bool,
    /// File name the media artifact was stored under
    #[serde(rename = "savedAs", default, skip_serializing_if = "Option::is_none")]
    pub saved_as: Option<String>,
    /// Machine-generated transcript for the uploaded answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadReply {
    pub fn ok(saved_as: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            ok: true,
            saved_as: Some(saved_as.into()),
            transcript: Some(transcript.into()),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            saved_as: None,
            transcript: None,
            message: Some(message.into()),
        }
    }
}
