use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::CaptureError;

/// One piece of captured media, delivered in arrival order
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Raw container bytes (opaque; the system stores media unmodified)
    pub data: Vec<u8>,
}

/// Media capture source trait
///
/// A source represents an already-open capture device. Each recording take
/// is a `start()`/`stop()` pair: `start` returns a channel that receives
/// chunks until `stop` closes the take.
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// Begin a new take
    ///
    /// Returns a channel receiver that will receive media chunks until the
    /// take is stopped (or the source runs dry).
    async fn start(&mut self) -> Result<mpsc::Receiver<MediaChunk>, CaptureError>;

    /// End the current take
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if a take is currently in progress
    fn is_capturing(&self) -> bool;

    /// Declared media type of the produced blobs (e.g. "video/webm")
    fn media_type(&self) -> &str;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// File-backed media source
///
/// Replays a pre-recorded media file as a stream of paced chunks, standing
/// in for a live camera/microphone in the terminal client and in tests.
/// Every take replays the file from the beginning.
pub struct FileSource {
    path: PathBuf,
    media_type: String,
    chunk_size: usize,
    pace: Duration,
    capturing: Arc<AtomicBool>,
    reader_task: Option<JoinHandle<()>>,
}

impl FileSource {
    /// Open a media file as a capture source
    ///
    /// Fails with `CaptureError::DeviceUnavailable` if the file cannot be
    /// read; fixing the path or permissions is the remedy, not retrying.
    pub async fn open(path: impl AsRef<Path>, media_type: &str) -> Result<Self, CaptureError> {
        let path = path.as_ref().to_path_buf();

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {}", path.display(), e)))?;
        if !meta.is_file() {
            return Err(CaptureError::DeviceUnavailable(format!(
                "{} is not a file",
                path.display()
            )));
        }

        info!(
            "Media source opened: {} ({} bytes, {})",
            path.display(),
            meta.len(),
            media_type
        );

        Ok(Self {
            path,
            media_type: media_type.to_string(),
            chunk_size: 256 * 1024,
            pace: Duration::from_millis(40),
            capturing: Arc::new(AtomicBool::new(false)),
            reader_task: None,
        })
    }

    /// Override the chunk size (bytes) used when replaying the file
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Override the delay between chunks (zero makes replay immediate)
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }
}

#[async_trait::async_trait]
impl MediaSource for FileSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<MediaChunk>, CaptureError> {
        if self.capturing.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        let mut file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| CaptureError::DeviceUnavailable(format!("{}: {}", self.path.display(), e)))?;

        self.capturing.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(32);
        let capturing = Arc::clone(&self.capturing);
        let chunk_size = self.chunk_size;
        let pace = self.pace;
        let path = self.path.clone();

        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; chunk_size];
            let mut sent = 0usize;

            while capturing.load(Ordering::SeqCst) {
                let n = match file.read(&mut buf).await {
                    Ok(0) => break, // file exhausted, nothing more to replay
                    Ok(n) => n,
                    Err(e) => {
                        warn!("Media source read failed ({}): {}", path.display(), e);
                        break;
                    }
                };

                let chunk = MediaChunk {
                    data: buf[..n].to_vec(),
                };
                if tx.send(chunk).await.is_err() {
                    debug!("Chunk receiver dropped, ending take");
                    break;
                }
                sent += n;

                if !pace.is_zero() {
                    tokio::time::sleep(pace).await;
                }
            }

            debug!("File source take ended: {} bytes replayed", sent);
        });

        self.reader_task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.capturing.swap(false, Ordering::SeqCst) {
            warn!("File source stop called with no take in progress");
        }

        if let Some(task) = self.reader_task.take() {
            task.await
                .map_err(|e| CaptureError::StreamClosed(e.to_string()))?;
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn name(&self) -> &str {
        "file"
    }
}
