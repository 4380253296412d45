// Integration tests for the upload retry engine
//
// The backend and the sleeper are both faked, so attempt counts and the
// backoff schedule can be asserted without network calls or real delays.

use anyhow::Result;
use async_trait::async_trait;
use greenroom::error::{BackendError, UploadError};
use greenroom::upload::{
    AnswerUpload, InterviewBackend, RetryPolicy, Sleeper, UploadReceipt, Uploader,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Backend whose first `fail_first` upload attempts are rejected
struct FlakyBackend {
    attempts: AtomicU32,
    fail_first: u32,
}

impl FlakyBackend {
    fn new(fail_first: u32) -> Arc<Self> {
        Arc::new(Self {
            attempts: AtomicU32::new(0),
            fail_first,
        })
    }
}

#[async_trait]
impl InterviewBackend for FlakyBackend {
    async fn verify_token(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn start_session(&self, _user_name: &str) -> Result<String, BackendError> {
        Ok("test_session".to_string())
    }

    async fn upload_answer(&self, upload: &AnswerUpload) -> Result<UploadReceipt, BackendError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_first {
            return Err(BackendError::Rejected {
                status: 500,
                message: "simulated outage".to_string(),
            });
        }

        Ok(UploadReceipt {
            saved_as: format!("Q{}.webm", upload.index),
            transcript: format!("transcript from attempt {}", attempt),
        })
    }

    async fn finish_session(
        &self,
        _session_key: &str,
        _questions_count: u32,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Sleeper that records requested waits instead of waiting
#[derive(Default)]
struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().await.push(duration);
    }
}

fn answer() -> AnswerUpload {
    AnswerUpload {
        session_key: "test_session".to_string(),
        index: 1,
        question: "Introduce yourself.".to_string(),
        media_type: "video/webm".to_string(),
        data: vec![1, 2, 3, 4],
    }
}

#[tokio::test]
async fn test_two_failures_then_success_takes_three_attempts() -> Result<()> {
    let backend = FlakyBackend::new(2);
    let sleeper = Arc::new(RecordingSleeper::default());
    let uploader = Uploader::new(backend.clone(), RetryPolicy::default(), sleeper.clone());

    let receipt = uploader.submit(&answer()).await.expect("third attempt succeeds");

    assert_eq!(backend.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(receipt.transcript, "transcript from attempt 3");
    assert_eq!(receipt.saved_as, "Q1.webm");

    // Backoff schedule between attempts: 1s after the first failure, 2s
    // after the second; nothing after the succeeding attempt
    let waits = sleeper.waits.lock().await;
    assert_eq!(
        *waits,
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
    Ok(())
}

#[tokio::test]
async fn test_spent_budget_is_a_terminal_failure() -> Result<()> {
    let backend = FlakyBackend::new(u32::MAX);
    let sleeper = Arc::new(RecordingSleeper::default());
    let uploader = Uploader::new(backend.clone(), RetryPolicy::default(), sleeper.clone());

    let err = uploader.submit(&answer()).await.expect_err("never succeeds");

    let UploadError::Exhausted {
        attempts,
        last_error,
    } = err;
    assert_eq!(attempts, 3);
    assert!(last_error.contains("simulated outage"));
    assert_eq!(backend.attempts.load(Ordering::SeqCst), 3);

    // No wait is scheduled after the final attempt
    let waits = sleeper.waits.lock().await;
    assert_eq!(waits.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_first_attempt_success_never_sleeps() -> Result<()> {
    let backend = FlakyBackend::new(0);
    let sleeper = Arc::new(RecordingSleeper::default());
    let uploader = Uploader::new(backend.clone(), RetryPolicy::default(), sleeper.clone());

    let receipt = uploader.submit(&answer()).await?;

    assert_eq!(receipt.transcript, "transcript from attempt 1");
    assert_eq!(backend.attempts.load(Ordering::SeqCst), 1);
    assert!(sleeper.waits.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_wider_budget_follows_doubling_schedule() -> Result<()> {
    let backend = FlakyBackend::new(4);
    let sleeper = Arc::new(RecordingSleeper::default());
    let policy = RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_secs(1),
    };
    let uploader = Uploader::new(backend.clone(), policy, sleeper.clone());

    let receipt = uploader.submit(&answer()).await?;

    assert_eq!(receipt.transcript, "transcript from attempt 5");
    let waits = sleeper.waits.lock().await;
    assert_eq!(
        *waits,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
        ]
    );
    Ok(())
}
