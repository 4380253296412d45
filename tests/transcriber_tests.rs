// Integration tests for the speech-to-text adapter
//
// No live STT API is involved: failure paths run against an unreachable
// port, and reply handling runs against a local stub that returns canned
// generateContent payloads.

use anyhow::Result;
use axum::extract::RawQuery;
use axum::routing::post;
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use greenroom::transcribe::{GeminiTranscriber, Transcriber};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

async fn media_file(temp: &TempDir) -> Result<PathBuf> {
    let path = temp.path().join("Q1.webm");
    tokio::fs::write(&path, b"webm-bytes").await?;
    Ok(path)
}

/// Serve one canned generateContent reply, capturing the query string and
/// request body for inspection
async fn spawn_stt_stub(reply: Value) -> Result<(String, Arc<Mutex<Option<(String, Value)>>>)> {
    let seen: Arc<Mutex<Option<(String, Value)>>> = Arc::new(Mutex::new(None));
    let captured = seen.clone();

    let app = Router::new().route(
        "/generate",
        post(move |RawQuery(query): RawQuery, Json(body): Json<Value>| {
            let reply = reply.clone();
            let captured = captured.clone();
            async move {
                *captured.lock().await = Some((query.unwrap_or_default(), body));
                Json(reply)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("http://{}/generate", addr), seen))
}

#[tokio::test]
async fn test_missing_api_key_short_circuits() -> Result<()> {
    let temp = TempDir::new()?;
    let media = media_file(&temp).await?;

    let transcriber = GeminiTranscriber::new("http://127.0.0.1:1/generate", "", "video/webm");
    let text = transcriber.transcribe(&media, "Introduce yourself.").await;

    assert_eq!(
        text,
        "Gemini AI API Key is missing. Cannot generate transcript."
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_falls_back_to_internal_error() -> Result<()> {
    let temp = TempDir::new()?;
    let media = media_file(&temp).await?;

    let transcriber =
        GeminiTranscriber::new("http://127.0.0.1:1/generate", "test-key", "video/webm");
    let text = transcriber.transcribe(&media, "Introduce yourself.").await;

    assert!(
        text.starts_with("Internal error calling AI: "),
        "unexpected fallback {:?}",
        text
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_media_file_falls_back_to_internal_error() -> Result<()> {
    let temp = TempDir::new()?;
    let media = temp.path().join("not-there.webm");

    let transcriber =
        GeminiTranscriber::new("http://127.0.0.1:1/generate", "test-key", "video/webm");
    let text = transcriber.transcribe(&media, "Introduce yourself.").await;

    assert!(text.starts_with("Internal error calling AI:"));
    Ok(())
}

#[tokio::test]
async fn test_successful_reply_returns_candidate_text() -> Result<()> {
    let temp = TempDir::new()?;
    let media = media_file(&temp).await?;
    let (url, _seen) = spawn_stt_stub(json!({
        "candidates": [
            {"content": {"parts": [{"text": "I am Jane and I live in Berlin."}]}}
        ]
    }))
    .await?;

    let transcriber = GeminiTranscriber::new(url, "test-key", "video/webm");
    let text = transcriber.transcribe(&media, "Introduce yourself.").await;

    assert_eq!(text, "I am Jane and I live in Berlin.");
    Ok(())
}

#[tokio::test]
async fn test_api_error_payload_surfaces_in_fallback() -> Result<()> {
    let temp = TempDir::new()?;
    let media = media_file(&temp).await?;
    let (url, _seen) = spawn_stt_stub(json!({
        "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
    }))
    .await?;

    let transcriber = GeminiTranscriber::new(url, "test-key", "video/webm");
    let text = transcriber.transcribe(&media, "Introduce yourself.").await;

    assert_eq!(text, "Internal error calling AI: API key not valid");
    Ok(())
}

#[tokio::test]
async fn test_blank_candidate_text_gets_generic_fallback() -> Result<()> {
    let temp = TempDir::new()?;
    let media = media_file(&temp).await?;
    let (url, _seen) = spawn_stt_stub(json!({
        "candidates": [
            {"content": {"parts": [{"text": ""}]}}
        ]
    }))
    .await?;

    let transcriber = GeminiTranscriber::new(url, "test-key", "video/webm");
    let text = transcriber.transcribe(&media, "Introduce yourself.").await;

    assert_eq!(
        text,
        "Could not generate transcript. API error or unclear content."
    );
    Ok(())
}

#[tokio::test]
async fn test_request_carries_question_media_and_key() -> Result<()> {
    let temp = TempDir::new()?;
    let media = media_file(&temp).await?;
    let (url, seen) = spawn_stt_stub(json!({
        "candidates": [
            {"content": {"parts": [{"text": "fine"}]}}
        ]
    }))
    .await?;

    let transcriber = GeminiTranscriber::new(url, "test-key", "video/webm");
    transcriber.transcribe(&media, "Introduce yourself.").await;

    let captured = seen.lock().await;
    let (query, body) = captured.as_ref().expect("stub saw the request");

    assert!(query.contains("key=test-key"));

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    assert_eq!(
        prompt,
        "The interview question is: \"Introduce yourself.\". Transcribe the answer content in the video."
    );

    let inline = &body["contents"][0]["parts"][1]["inlineData"];
    assert_eq!(inline["mimeType"], json!("video/webm"));
    assert_eq!(inline["data"], json!(STANDARD.encode(b"webm-bytes")));

    let system = body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    assert!(system.contains("Speech-to-Text"));
    Ok(())
}
