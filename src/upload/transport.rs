use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::BackendError;
use crate::protocol::{
    FinishSessionRequest, StartSessionReply, StartSessionRequest, StatusReply, UploadReply,
    VerifyTokenRequest,
};

/// One question's answer, ready for submission
#[derive(Debug, Clone)]
pub struct AnswerUpload {
    /// Opaque session key returned by session start
    pub session_key: String,
    /// 1-based question index
    pub index: u32,
    /// Original question prompt text
    pub question: String,
    /// Declared media type of the blob
    pub media_type: String,
    /// Raw media bytes
    pub data: Vec<u8>,
}

/// What the server reports back for an accepted answer
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// File name the media artifact was stored under
    pub saved_as: String,
    /// Transcript text for immediate display
    pub transcript: String,
}

/// Client-side seam to the interview server
///
/// `upload_answer` carries no retry logic of its own: one call is one
/// attempt, classified by `BackendError`. The retry budget lives in
/// `Uploader`.
#[async_trait::async_trait]
pub trait InterviewBackend: Send + Sync {
    /// Check the shared access token before anything else
    async fn verify_token(&self) -> Result<(), BackendError>;

    /// Start a session; returns the opaque session key
    async fn start_session(&self, user_name: &str) -> Result<String, BackendError>;

    /// Submit one answer (single attempt)
    async fn upload_answer(&self, upload: &AnswerUpload) -> Result<UploadReceipt, BackendError>;

    /// Mark the session complete with the declared question count
    async fn finish_session(
        &self,
        session_key: &str,
        questions_count: u32,
    ) -> Result<(), BackendError>;
}

/// HTTP implementation of `InterviewBackend`
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read a `{ok, ...}` envelope, treating an unparseable body as a failure
/// of this attempt rather than a crash
async fn read_reply<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<(reqwest::StatusCode, T), BackendError> {
    let status = response.status();
    let body = response.text().await?;

    let reply = serde_json::from_str(&body).map_err(|e| {
        BackendError::MalformedResponse(format!("status {}: {}", status.as_u16(), e))
    })?;

    Ok((status, reply))
}

fn rejected(status: reqwest::StatusCode, message: Option<String>, fallback: &str) -> BackendError {
    BackendError::Rejected {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| fallback.to_string()),
    }
}

#[async_trait::async_trait]
impl InterviewBackend for HttpBackend {
    async fn verify_token(&self) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.url("/api/verify-token"))
            .json(&VerifyTokenRequest {
                token: self.token.clone(),
            })
            .send()
            .await?;

        let (status, reply): (_, StatusReply) = read_reply(response).await?;
        if !status.is_success() || !reply.ok {
            return Err(rejected(status, reply.message, "Invalid Token"));
        }

        Ok(())
    }

    async fn start_session(&self, user_name: &str) -> Result<String, BackendError> {
        let response = self
            .http
            .post(self.url("/api/session/start"))
            .json(&StartSessionRequest {
                token: self.token.clone(),
                user_name: user_name.to_string(),
            })
            .send()
            .await?;

        let (status, reply): (_, StartSessionReply) = read_reply(response).await?;
        if !status.is_success() || !reply.ok {
            return Err(rejected(status, reply.message, "Error starting session"));
        }

        reply.folder.ok_or_else(|| {
            BackendError::MalformedResponse("session start reply carried no folder".to_string())
        })
    }

    async fn upload_answer(&self, upload: &AnswerUpload) -> Result<UploadReceipt, BackendError> {
        let part = reqwest::multipart::Part::bytes(upload.data.clone())
            .file_name(format!("Q{}.webm", upload.index))
            .mime_str(&upload.media_type)?;

        let form = reqwest::multipart::Form::new()
            .text("token", self.token.clone())
            .text("folder", upload.session_key.clone())
            .text("questionIndex", upload.index.to_string())
            .text("questionText", upload.question.clone())
            .part("video", part);

        debug!(
            "Submitting question {} ({} bytes) for session {}",
            upload.index,
            upload.data.len(),
            upload.session_key
        );

        let response = self
            .http
            .post(self.url("/api/upload-one"))
            .multipart(form)
            .send()
            .await?;

        let (status, reply): (_, UploadReply) = read_reply(response).await?;
        if !status.is_success() || !reply.ok {
            return Err(rejected(
                status,
                reply.message,
                &format!("Upload failed (Status: {})", status.as_u16()),
            ));
        }

        Ok(UploadReceipt {
            saved_as: reply.saved_as.unwrap_or_default(),
            transcript: reply
                .transcript
                .unwrap_or_else(|| "Transcript not available.".to_string()),
        })
    }

    async fn finish_session(
        &self,
        session_key: &str,
        questions_count: u32,
    ) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.url("/api/session/finish"))
            .json(&FinishSessionRequest {
                token: self.token.clone(),
                folder: session_key.to_string(),
                questions_count,
            })
            .send()
            .await?;

        let (status, reply): (_, StatusReply) = read_reply(response).await?;
        if !status.is_success() || !reply.ok {
            return Err(rejected(status, reply.message, "Error finishing session"));
        }

        Ok(())
    }
}
