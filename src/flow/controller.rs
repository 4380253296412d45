use std::sync::Arc;

use tracing::{info, warn};

use super::script::InterviewScript;
use crate::capture::{RecordedAnswer, Recorder};
use crate::error::{CaptureError, FlowError, UploadError};
use crate::upload::{AnswerUpload, InterviewBackend, Uploader};

/// Phase of the single visible action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// Ready to record the current question
    Ready,
    /// Recording the current question
    Recording,
    /// Holding a finished, unsent recording for the current question
    Recorded,
    /// All questions answered; capture device released
    Finished,
}

/// One answered question, in the order answers were accepted
#[derive(Debug, Clone)]
pub struct AnsweredQuestion {
    pub index: u32,
    pub question: String,
    pub transcript: String,
}

/// What one press of the action produced
#[derive(Debug)]
pub enum FlowOutcome {
    RecordingStarted {
        index: u32,
    },
    RecordingStopped {
        index: u32,
        bytes: usize,
    },
    /// Answer stored server-side; flow advanced to the next question
    AnswerAccepted {
        index: u32,
        transcript: String,
    },
    /// Retry budget spent; the flow stays on the same index so the action
    /// can be pressed again for a manual retry
    UploadFailed {
        index: u32,
        attempts: u32,
        message: String,
    },
    /// Last answer accepted; the session is finished
    InterviewComplete {
        index: u32,
        transcript: String,
    },
}

/// Client-side session state machine
///
/// Owns the recorder, the upload engine, and the accumulated transcripts
/// for one interview run. At most one recording and one in-flight upload
/// exist at a time: `advance` borrows the flow mutably for the whole step,
/// so a second action cannot race the first.
pub struct InterviewFlow {
    backend: Arc<dyn InterviewBackend>,
    uploader: Uploader,
    script: InterviewScript,
    session_key: String,
    recorder: Option<Recorder>,
    phase: FlowPhase,
    current_index: u32,
    pending: Option<RecordedAnswer>,
    answers: Vec<AnsweredQuestion>,
    finalized: bool,
}

impl InterviewFlow {
    /// Verify the token, start a server session, and bind the flow to the
    /// returned session key
    pub async fn begin(
        backend: Arc<dyn InterviewBackend>,
        uploader: Uploader,
        recorder: Recorder,
        script: InterviewScript,
        user_name: &str,
    ) -> Result<Self, FlowError> {
        backend
            .verify_token()
            .await
            .map_err(FlowError::SessionStart)?;

        let session_key = backend
            .start_session(user_name)
            .await
            .map_err(FlowError::SessionStart)?;

        info!(
            "Interview session started for {}: {} ({} questions)",
            user_name,
            session_key,
            script.len()
        );

        let phase = if script.is_empty() {
            FlowPhase::Finished
        } else {
            FlowPhase::Ready
        };

        Ok(Self {
            backend,
            uploader,
            script,
            session_key,
            recorder: Some(recorder),
            phase,
            current_index: 1,
            pending: None,
            answers: Vec::new(),
            finalized: false,
        })
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// 1-based index of the question currently being answered
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.script.len()
    }

    /// Prompt text for the current question, if any remain
    pub fn current_question(&self) -> Option<&str> {
        if self.phase == FlowPhase::Finished {
            return None;
        }
        self.script.question(self.current_index)
    }

    /// Answers accepted so far, with the transcripts the server returned
    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    pub fn is_finished(&self) -> bool {
        self.phase == FlowPhase::Finished
    }

    /// Label for the single action, mirroring the original control
    pub fn action_label(&self) -> &'static str {
        match self.phase {
            FlowPhase::Ready => "Start Recording",
            FlowPhase::Recording => "Stop Recording",
            FlowPhase::Recorded => {
                if self.current_index as usize >= self.script.len() {
                    "Upload and Finish"
                } else {
                    "Next (Upload)"
                }
            }
            FlowPhase::Finished => "Finished",
        }
    }

    /// Perform the single action for the current phase
    pub async fn advance(&mut self) -> Result<FlowOutcome, FlowError> {
        match self.phase {
            FlowPhase::Ready => self.start_recording().await,
            FlowPhase::Recording => self.stop_recording().await,
            FlowPhase::Recorded => self.submit_pending().await,
            FlowPhase::Finished => Err(FlowError::AlreadyFinished),
        }
    }

    /// Issue the finalize call, exactly once, after the last answer
    ///
    /// Failure is surfaced to the caller but the flow stays Finished: the
    /// media and transcripts are already durable server-side, so finalize
    /// is bookkeeping rather than a correctness gate.
    pub async fn finalize(&mut self) -> Result<(), FlowError> {
        if self.phase != FlowPhase::Finished {
            return Err(FlowError::NotFinished);
        }
        if self.finalized {
            return Err(FlowError::AlreadyFinalized);
        }
        self.finalized = true;

        self.backend
            .finish_session(&self.session_key, self.script.len() as u32)
            .await
            .map_err(FlowError::Finalize)?;

        info!("Session {} finalized", self.session_key);

        Ok(())
    }

    async fn start_recording(&mut self) -> Result<FlowOutcome, FlowError> {
        let recorder = self.recorder.as_mut().ok_or(CaptureError::StreamClosed(
            "capture device already released".to_string(),
        ))?;

        recorder.start().await?;
        self.phase = FlowPhase::Recording;

        Ok(FlowOutcome::RecordingStarted {
            index: self.current_index,
        })
    }

    async fn stop_recording(&mut self) -> Result<FlowOutcome, FlowError> {
        let recorder = self.recorder.as_mut().ok_or(CaptureError::StreamClosed(
            "capture device already released".to_string(),
        ))?;

        let answer = recorder.stop().await?;
        let bytes = answer.len();
        self.pending = Some(answer);
        self.phase = FlowPhase::Recorded;

        Ok(FlowOutcome::RecordingStopped {
            index: self.current_index,
            bytes,
        })
    }

    async fn submit_pending(&mut self) -> Result<FlowOutcome, FlowError> {
        let index = self.current_index;
        let pending = self.pending.as_ref().ok_or(CaptureError::NotRecording)?;
        let question = self
            .script
            .question(index)
            .unwrap_or_default()
            .to_string();

        let upload = AnswerUpload {
            session_key: self.session_key.clone(),
            index,
            question: question.clone(),
            media_type: pending.media_type.clone(),
            data: pending.data.clone(),
        };

        match self.uploader.submit(&upload).await {
            Ok(receipt) => {
                self.pending = None;
                self.answers.push(AnsweredQuestion {
                    index,
                    question,
                    transcript: receipt.transcript.clone(),
                });

                if index as usize >= self.script.len() {
                    self.phase = FlowPhase::Finished;
                    // Release the capture device; the interview is over
                    self.recorder = None;
                    info!(
                        "All {} questions answered for session {}",
                        self.answers.len(),
                        self.session_key
                    );
                    Ok(FlowOutcome::InterviewComplete {
                        index,
                        transcript: receipt.transcript,
                    })
                } else {
                    self.current_index += 1;
                    self.phase = FlowPhase::Ready;
                    Ok(FlowOutcome::AnswerAccepted {
                        index,
                        transcript: receipt.transcript,
                    })
                }
            }
            Err(UploadError::Exhausted {
                attempts,
                last_error,
            }) => {
                warn!(
                    "Question {} stays pending after {} attempts: {}",
                    index, attempts, last_error
                );
                // Keep the blob and the index; the next action retries
                Ok(FlowOutcome::UploadFailed {
                    index,
                    attempts,
                    message: last_error,
                })
            }
        }
    }
}
