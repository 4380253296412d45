use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::source::MediaSource;
use crate::error::CaptureError;

/// A finished, immutable recording for one question
#[derive(Debug, Clone)]
pub struct RecordedAnswer {
    /// Assembled media bytes, chunks concatenated in arrival order
    pub data: Vec<u8>,
    /// Declared media type of the blob
    pub media_type: String,
}

impl RecordedAnswer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Recording controller for the current question
///
/// Owns the media source and enforces the start/stop protocol: `start` is
/// only legal when idle, `stop` only while recording. While a take is in
/// progress, chunks are collected in arrival order; empty chunks are
/// dropped. `stop` assembles everything collected into one blob.
pub struct Recorder {
    source: Box<dyn MediaSource>,
    collector: Option<JoinHandle<Vec<u8>>>,
    recording: bool,
}

impl Recorder {
    pub fn new(source: Box<dyn MediaSource>) -> Self {
        Self {
            source,
            collector: None,
            recording: false,
        }
    }

    /// Declared media type of blobs this recorder produces
    pub fn media_type(&self) -> &str {
        self.source.media_type()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Begin recording the current answer
    ///
    /// Starts with a fresh chunk buffer; a second `start` without an
    /// intervening `stop` is refused.
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if self.recording {
            return Err(CaptureError::AlreadyRecording);
        }

        let mut rx = self.source.start().await?;

        let collector = tokio::spawn(async move {
            let mut blob = Vec::new();
            while let Some(chunk) = rx.recv().await {
                if chunk.data.is_empty() {
                    continue;
                }
                blob.extend_from_slice(&chunk.data);
            }
            blob
        });

        self.collector = Some(collector);
        self.recording = true;

        info!("Recording started ({})", self.source.name());

        Ok(())
    }

    /// Finalize the in-flight recording and assemble the blob
    pub async fn stop(&mut self) -> Result<RecordedAnswer, CaptureError> {
        if !self.recording {
            return Err(CaptureError::NotRecording);
        }

        self.source.stop().await?;
        self.recording = false;

        let collector = self
            .collector
            .take()
            .ok_or_else(|| CaptureError::StreamClosed("chunk collector missing".to_string()))?;

        let data = collector
            .await
            .map_err(|e| CaptureError::StreamClosed(e.to_string()))?;

        if data.is_empty() {
            warn!("Recording stopped with no media captured");
        } else {
            info!("Recording stopped: {} bytes captured", data.len());
        }

        Ok(RecordedAnswer {
            data,
            media_type: self.source.media_type().to_string(),
        })
    }
}
