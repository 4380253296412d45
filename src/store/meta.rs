use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::{media_file_name, transcript_file_name};

/// Per-session metadata record, persisted as `meta.json`
///
/// Field names on disk are camelCase so existing session folders written by
/// earlier deployments stay readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub user_name: String,
    pub start_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_at: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_count: Option<u32>,
}

impl SessionMeta {
    pub fn new(user_name: &str, start_at: DateTime<Utc>) -> Self {
        Self {
            user_name: user_name.to_string(),
            start_at,
            finish_at: None,
            questions: Vec::new(),
            questions_count: None,
        }
    }

    /// The record for one question index, if that answer has been ingested
    pub fn question(&self, index: u32) -> Option<&QuestionRecord> {
        self.questions.iter().find(|q| q.index == index)
    }
}

/// One answered question within a session
///
/// At most one record exists per index; a re-upload replaces the old record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub index: u32,
    pub file_name: String,
    pub question: String,
    pub uploaded_at: DateTime<Utc>,
    pub file_size: u64,
    pub mime_type: String,
    pub transcript_file: String,
}

impl QuestionRecord {
    /// Build the record for a freshly ingested answer, stamping the upload
    /// time and deriving the artifact file names from the index
    pub fn new(index: u32, question: &str, file_size: u64, mime_type: &str) -> Self {
        Self {
            index,
            file_name: media_file_name(index),
            question: question.to_string(),
            uploaded_at: Utc::now(),
            file_size,
            mime_type: mime_type.to_string(),
            transcript_file: transcript_file_name(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_wire_names_are_camel_case() {
        let mut meta = SessionMeta::new("Jane Doe", Utc::now());
        meta.questions
            .push(QuestionRecord::new(1, "Introduce yourself.", 1024, "video/webm"));
        meta.finish_at = Some(Utc::now());
        meta.questions_count = Some(1);

        let json = serde_json::to_string(&meta).unwrap();
        for key in [
            "userName",
            "startAt",
            "finishAt",
            "questionsCount",
            "fileName",
            "uploadedAt",
            "fileSize",
            "mimeType",
            "transcriptFile",
        ] {
            assert!(json.contains(key), "missing wire key {}", key);
        }
    }

    #[test]
    fn test_record_derives_artifact_names_from_index() {
        let record = QuestionRecord::new(3, "Why us?", 42, "video/webm");
        assert_eq!(record.file_name, "Q3.webm");
        assert_eq!(record.transcript_file, "transcript_Q3.txt");
    }

    #[test]
    fn test_optional_fields_omitted_until_finalized() {
        let meta = SessionMeta::new("Jane", Utc::now());
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("finishAt"));
        assert!(!json.contains("questionsCount"));
    }
}
