use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SYSTEM_INSTRUCTION: &str = "You are an accurate Speech-to-Text (STT) system specializing in transcribing interviews. Extract the full spoken content from the video below. Return only the converted text.";

/// Produces the transcript text for one stored answer
///
/// Infallible by signature: implementations convert every failure into a
/// human-readable fallback string, so ingestion always completes and the
/// participant always sees something in place of the transcript.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, media_path: &Path, question: &str) -> String;
}

/// Transcriber backed by a generative `generateContent` endpoint
///
/// The media file is sent inline as base64 alongside a fixed transcription
/// instruction; the first candidate's text is the transcript.
pub struct GeminiTranscriber {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    media_type: String,
}

impl GeminiTranscriber {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            media_type: media_type.into(),
        }
    }

    async fn request_transcript(&self, media_path: &Path, question: &str) -> Result<String, String> {
        let media = tokio::fs::read(media_path)
            .await
            .map_err(|e| e.to_string())?;

        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::text(format!(
                        "The interview question is: \"{}\". Transcribe the answer content in the video.",
                        question
                    )),
                    Part::inline(&self.media_type, STANDARD.encode(&media)),
                ],
            }],
            system_instruction: Content {
                parts: vec![Part::text(SYSTEM_INSTRUCTION.to_string())],
            },
        };

        debug!(
            "Requesting transcript for {} ({} bytes)",
            media_path.display(),
            media.len()
        );

        let reply: GenerateContentReply = self
            .http
            .post(format!("{}?key={}", self.api_url, self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        if let Some(error) = reply.error {
            return Err(error.message);
        }

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty());

        Ok(text.unwrap_or_else(|| {
            "Could not generate transcript. API error or unclear content.".to_string()
        }))
    }
}

#[async_trait]
impl Transcriber for GeminiTranscriber {
    async fn transcribe(&self, media_path: &Path, question: &str) -> String {
        if self.api_key.is_empty() {
            return "Gemini AI API Key is missing. Cannot generate transcript.".to_string();
        }

        match self.request_transcript(media_path, question).await {
            Ok(text) => text,
            Err(message) => {
                warn!("Transcription failed for {}: {}", media_path.display(), message);
                format!("Internal error calling AI: {}", message)
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline(media_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: media_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
