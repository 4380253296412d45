//! Interview flow control
//!
//! This module provides the `InterviewFlow` state machine that drives the
//! single visible action through one question at a time:
//! - Ready: start recording
//! - Recording: stop recording
//! - Recorded: upload with bounded retries, then advance or stay for a
//!   manual retry
//! - Finished: all questions answered, capture device released

pub mod controller;
pub mod script;

pub use controller::{AnsweredQuestion, FlowOutcome, FlowPhase, InterviewFlow};
pub use script::InterviewScript;
