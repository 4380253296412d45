use super::state::{AppState, IngestLimits};
use crate::error::IngestError;
use crate::protocol::{
    FinishSessionRequest, StartSessionReply, StartSessionRequest, StatusReply, UploadReply,
    VerifyTokenRequest,
};
use crate::store::QuestionRecord;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info, warn};

// ============================================================================
// Error Classification
// ============================================================================

impl IngestError {
    fn status(&self) -> StatusCode {
        match self {
            IngestError::MissingField(_)
            | IngestError::InvalidIndex(_)
            | IngestError::BadMultipart(_) => StatusCode::BAD_REQUEST,
            IngestError::UnknownSession(_) => StatusCode::NOT_FOUND,
            IngestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            IngestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match &self {
            IngestError::Storage(e) => error!("Upload processing failed: {:#}", e),
            IngestError::MissingField(field) => warn!("Upload rejected: missing {}", field),
            other => warn!("Upload rejected: {}", other),
        }
        (self.status(), Json(UploadReply::error(self.to_string()))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(StatusReply::ok())
}

/// POST /api/verify-token
/// Check the shared access token before any session work starts
pub async fn verify_token(
    State(state): State<AppState>,
    Json(req): Json<VerifyTokenRequest>,
) -> impl IntoResponse {
    if req.token == state.auth_token {
        (StatusCode::OK, Json(StatusReply::ok())).into_response()
    } else {
        warn!("Invalid token presented");
        (
            StatusCode::UNAUTHORIZED,
            Json(StatusReply::error("Invalid Token")),
        )
            .into_response()
    }
}

/// POST /api/session/start
/// Create the session folder and initial metadata for a participant
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let user_name = req.user_name.trim();

    if req.token.is_empty() || user_name.is_empty() {
        warn!("Session start refused: missing token or name");
        return (
            StatusCode::BAD_REQUEST,
            Json(StartSessionReply::error("Missing Token or Name")),
        )
            .into_response();
    }

    match state.store.create_session(user_name).await {
        Ok(folder) => (StatusCode::OK, Json(StartSessionReply::ok(folder))).into_response(),
        Err(e) => {
            error!("Failed to start session: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StartSessionReply::error(
                    "Server error when creating session",
                )),
            )
                .into_response()
        }
    }
}

/// POST /api/upload-one
/// Ingest one recorded answer: validate, persist the media, transcribe it,
/// persist the transcript, and upsert the question record
pub async fn upload_one(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadReply>, IngestError> {
    let submission = read_submission(multipart, &state.limits).await?;

    if state.store.load(&submission.folder).await?.is_none() {
        return Err(IngestError::UnknownSession(submission.folder));
    }

    // Media lands on disk first so a question record never points at a
    // file that does not exist
    let saved_as = state
        .store
        .write_media(&submission.folder, submission.index, &submission.media)
        .await?;

    // STT failures come back as fallback text, never as an error
    let media_path = state
        .store
        .media_path(&submission.folder, submission.index);
    let transcript = state
        .transcriber
        .transcribe(&media_path, &submission.question)
        .await;

    let transcript_body = format!(
        "[Question {}: {}]\n--- Automatic Transcript (STT) ---\n{}\n",
        submission.index, submission.question, transcript
    );
    state
        .store
        .write_transcript(&submission.folder, submission.index, &transcript_body)
        .await?;

    let record = QuestionRecord::new(
        submission.index,
        &submission.question,
        submission.media.len() as u64,
        &submission.media_type,
    );
    state
        .store
        .upsert_question(&submission.folder, record)
        .await?;

    info!(
        "Q{} ingested for session {} ({} bytes)",
        submission.index,
        submission.folder,
        submission.media.len()
    );

    Ok(Json(UploadReply::ok(saved_as, transcript)))
}

/// POST /api/session/finish
/// Stamp the finish time and declared question count
///
/// Best-effort: the media and transcripts are already durable, so a
/// bookkeeping failure is logged without failing the client's last step.
pub async fn finish_session(
    State(state): State<AppState>,
    Json(req): Json<FinishSessionRequest>,
) -> impl IntoResponse {
    info!(
        "Session {} finishing, {} questions declared",
        req.folder, req.questions_count
    );

    if let Err(e) = state.store.finalize(&req.folder, req.questions_count).await {
        warn!("Could not stamp finish time for {}: {:#}", req.folder, e);
    }

    Json(StatusReply::ok())
}

// ============================================================================
// Multipart Intake
// ============================================================================

/// One fully validated upload submission
struct Submission {
    folder: String,
    index: u32,
    question: String,
    media: Vec<u8>,
    media_type: String,
}

/// Drain the multipart stream, enforcing the media type before the body is
/// read and the size ceiling while it streams, then check field presence
///
/// Rejection order for missing fields: folder, questionIndex, questionText,
/// video. Type and size violations fail before anything touches disk.
async fn read_submission(
    mut multipart: Multipart,
    limits: &IngestLimits,
) -> Result<Submission, IngestError> {
    let mut folder: Option<String> = None;
    let mut index_text: Option<String> = None;
    let mut question: Option<String> = None;
    let mut media: Option<(Vec<u8>, String)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_err)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "token" => {
                // Drained but not re-checked; the token is verified up
                // front at /api/verify-token
                field.text().await.map_err(multipart_err)?;
            }
            "folder" => folder = Some(field.text().await.map_err(multipart_err)?),
            "questionIndex" => index_text = Some(field.text().await.map_err(multipart_err)?),
            "questionText" => question = Some(field.text().await.map_err(multipart_err)?),
            "video" => {
                let got = field.content_type().unwrap_or_default().to_string();
                if got != limits.media_type {
                    return Err(IngestError::UnsupportedMediaType {
                        got,
                        accepted: limits.media_type.clone(),
                    });
                }

                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_err)? {
                    if (data.len() + chunk.len()) as u64 > limits.max_bytes {
                        return Err(IngestError::TooLarge {
                            limit_mib: limits.max_bytes / (1024 * 1024),
                        });
                    }
                    data.extend_from_slice(&chunk);
                }
                media = Some((data, got));
            }
            other => {
                warn!("Ignoring unexpected upload field: {}", other);
            }
        }
    }

    let folder = folder
        .filter(|f| !f.is_empty())
        .ok_or(IngestError::MissingField("folder"))?;

    let index_text = index_text
        .filter(|i| !i.is_empty())
        .ok_or(IngestError::MissingField("questionIndex"))?;
    let index: u32 = index_text
        .parse()
        .map_err(|_| IngestError::InvalidIndex(index_text.clone()))?;
    if index == 0 {
        return Err(IngestError::InvalidIndex(index_text));
    }

    let question = question
        .filter(|q| !q.is_empty())
        .ok_or(IngestError::MissingField("questionText"))?;

    let (media, media_type) = media.ok_or(IngestError::MissingField("video"))?;

    Ok(Submission {
        folder,
        index,
        question,
        media,
        media_type,
    })
}

fn multipart_err(e: axum::extract::multipart::MultipartError) -> IngestError {
    IngestError::BadMultipart(e.to_string())
}
