use std::sync::Arc;

use tracing::{info, warn};

use super::policy::{RetryPolicy, Sleeper};
use super::transport::{AnswerUpload, InterviewBackend, UploadReceipt};
use crate::error::UploadError;

/// Bounded-retry submission of one answer
///
/// An attempt succeeds only if the transport succeeds AND the reply body
/// carries the success marker; the transport maps everything else to a
/// `BackendError`, which this loop treats as retryable until the budget is
/// spent. The caller must not advance past a question whose submission
/// returned `Exhausted`.
pub struct Uploader {
    backend: Arc<dyn InterviewBackend>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Uploader {
    pub fn new(
        backend: Arc<dyn InterviewBackend>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            backend,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Submit one answer, retrying with backoff up to the policy budget
    pub async fn submit(&self, upload: &AnswerUpload) -> Result<UploadReceipt, UploadError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::from("no attempt was made");

        for attempt in 1..=attempts {
            info!(
                "Uploading question {} (attempt {}/{})",
                upload.index, attempt, attempts
            );

            match self.backend.upload_answer(upload).await {
                Ok(receipt) => {
                    info!(
                        "Question {} uploaded on attempt {} ({} bytes, saved as {})",
                        upload.index,
                        attempt,
                        upload.data.len(),
                        receipt.saved_as
                    );
                    return Ok(receipt);
                }
                Err(err) => {
                    warn!(
                        "Upload attempt {}/{} for question {} failed: {}",
                        attempt, attempts, upload.index, err
                    );
                    last_error = err.to_string();

                    if let Some(delay) = self.policy.delay_after(attempt) {
                        info!("Retrying question {} in {:?}", upload.index, delay);
                        self.sleeper.sleep(delay).await;
                    }
                }
            }
        }

        Err(UploadError::Exhausted {
            attempts,
            last_error,
        })
    }
}
