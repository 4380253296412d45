use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

use super::meta::{QuestionRecord, SessionMeta};

/// Media artifact name for one question index
pub fn media_file_name(index: u32) -> String {
    format!("Q{}.webm", index)
}

/// Transcript artifact name for one question index
pub fn transcript_file_name(index: u32) -> String {
    format!("transcript_Q{}.txt", index)
}

/// Filesystem-backed store for interview sessions
///
/// Every session lives in its own directory under the uploads root:
/// `meta.json` plus one media and one transcript artifact per answered
/// index. All artifact paths derive from (session key, index) alone, so
/// retrieval never lists directories.
///
/// Metadata updates are read-modify-write; a per-session mutex serializes
/// them so concurrent ingests for different indices of one session cannot
/// lose each other's records. Writes land in a temp file that is renamed
/// over `meta.json`, keeping the record parseable even if a write dies.
pub struct SessionStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore {
    /// Open the store, creating the uploads root if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create uploads root {}", root.display()))?;

        info!("Session store opened at {}", root.display());

        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_dir(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn meta_path(&self, key: &str) -> PathBuf {
        self.session_dir(key).join("meta.json")
    }

    pub fn media_path(&self, key: &str, index: u32) -> PathBuf {
        self.session_dir(key).join(media_file_name(index))
    }

    pub fn transcript_path(&self, key: &str, index: u32) -> PathBuf {
        self.session_dir(key).join(transcript_file_name(index))
    }

    /// Allocate a session key, create its directory, and persist the
    /// initial metadata record with zero question records
    ///
    /// The key is a minute-resolution timestamp prefix plus the sanitized
    /// participant name. Two sessions for the same name in the same minute
    /// would collide, so an existing directory gets a fresh uuid fragment
    /// appended until the key is unique.
    pub async fn create_session(&self, user_name: &str) -> Result<String> {
        let now = Utc::now();
        let base = format!("{}_{}", now.format("%d_%m_%Y_%H_%M"), sanitize_name(user_name));

        let mut key = base.clone();
        while fs::try_exists(self.session_dir(&key))
            .await
            .with_context(|| format!("Failed to probe session dir {}", key))?
        {
            let fragment = uuid::Uuid::new_v4().simple().to_string();
            key = format!("{}_{}", base, &fragment[..8]);
        }

        let dir = self.session_dir(&key);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create session dir {}", dir.display()))?;

        self.write_meta(&key, &SessionMeta::new(user_name, now))
            .await?;

        info!("Session created for {}: {}", user_name, key);
        Ok(key)
    }

    /// Read one session's metadata; `None` when the key is unknown
    pub async fn load(&self, key: &str) -> Result<Option<SessionMeta>> {
        let path = self.meta_path(key);
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let meta = serde_json::from_slice(&body)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(meta))
    }

    /// Replace any record sharing the new record's index, keep the rest,
    /// and re-sort ascending by index
    ///
    /// Tolerates out-of-order and re-submitted indices without ever holding
    /// two records for one index.
    pub async fn upsert_question(&self, key: &str, record: QuestionRecord) -> Result<()> {
        let lock = self.session_lock(key).await;
        let _guard = lock.lock().await;

        let mut meta = self
            .load(key)
            .await?
            .with_context(|| format!("Session {} has no metadata", key))?;

        meta.questions.retain(|q| q.index != record.index);
        meta.questions.push(record);
        meta.questions.sort_by_key(|q| q.index);

        self.write_meta(key, &meta).await
    }

    /// Stamp the finish time and the declared question count
    pub async fn finalize(&self, key: &str, declared_count: u32) -> Result<()> {
        let lock = self.session_lock(key).await;
        let _guard = lock.lock().await;

        let mut meta = self
            .load(key)
            .await?
            .with_context(|| format!("Session {} has no metadata", key))?;

        meta.finish_at = Some(Utc::now());
        meta.questions_count = Some(declared_count);

        self.write_meta(key, &meta).await?;

        info!(
            "Session {} finalized, {} questions declared",
            key, declared_count
        );
        Ok(())
    }

    /// Persist one answer's media bytes, overwriting any earlier upload for
    /// the same index; returns the stored file name
    ///
    /// No session lock needed: each (key, index) pair is a distinct path.
    pub async fn write_media(&self, key: &str, index: u32, data: &[u8]) -> Result<String> {
        let path = self.media_path(key, index);
        fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(media_file_name(index))
    }

    /// Persist one answer's transcript text; returns the stored file name
    pub async fn write_transcript(&self, key: &str, index: u32, content: &str) -> Result<String> {
        let path = self.transcript_path(key, index);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(transcript_file_name(index))
    }

    async fn session_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.to_string()).or_default().clone()
    }

    async fn write_meta(&self, key: &str, meta: &SessionMeta) -> Result<()> {
        let path = self.meta_path(key);
        let tmp = path.with_extension("json.tmp");

        let body =
            serde_json::to_vec_pretty(meta).context("Failed to serialize session metadata")?;

        fs::write(&tmp, &body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// Lowercase the participant name, replace every non-alphanumeric character
/// with `_`, and cap the length so the key stays filesystem-friendly
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(30)
        .collect()
}
