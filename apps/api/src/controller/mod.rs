//! Optimization controller — the explicit state machine above the document
//! pipeline: `Idle → Ready(resume text) → Pending → Succeeded | Failed`.
//!
//! A tagged enum carries the submission outcome, so "content and error both
//! set" is unrepresentable. Submissions are sequence-numbered: a completion
//! whose sequence is not the latest issued is discarded, so a stale response
//! can never overwrite newer state.

use thiserror::Error;

pub mod handlers;

/// Upper bound on the pasted job description.
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 10_000;

/// Outcome-bearing submission state. Exactly one of content or error exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Pending { seq: u64 },
    Succeeded { content: String },
    Failed { error: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please upload your resume first")]
    MissingResume,

    #[error("Please paste the job description")]
    MissingJobDescription,

    #[error("an optimization is already in flight")]
    AlreadyPending,
}

/// Per-session controller. All state is volatile; nothing survives restart.
pub struct OptimizationController {
    resume_text: Option<String>,
    job_description: String,
    state: SubmissionState,
    next_seq: u64,
}

impl OptimizationController {
    pub fn new() -> Self {
        Self {
            resume_text: None,
            job_description: String::new(),
            state: SubmissionState::Idle,
            next_seq: 0,
        }
    }

    /// Replaces the resume wholesale (re-upload re-enters Ready).
    pub fn set_resume_text(&mut self, text: String) {
        self.resume_text = Some(text);
    }

    pub fn set_job_description(&mut self, text: String) {
        self.job_description = text;
    }

    pub fn resume_text(&self) -> Option<&str> {
        self.resume_text.as_deref()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Guarded entry into `Pending`: both inputs must be non-empty and no
    /// other submission may be in flight. Returns the issued sequence number
    /// plus snapshots of both inputs, so the actual rewrite call can run
    /// without holding the controller lock.
    pub fn begin_submission(&mut self) -> Result<(u64, String, String), SubmitError> {
        if matches!(self.state, SubmissionState::Pending { .. }) {
            return Err(SubmitError::AlreadyPending);
        }
        let resume = self
            .resume_text
            .as_ref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(SubmitError::MissingResume)?
            .clone();
        if self.job_description.trim().is_empty() {
            return Err(SubmitError::MissingJobDescription);
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        self.state = SubmissionState::Pending { seq };
        Ok((seq, resume, self.job_description.clone()))
    }

    /// Applies a submission outcome. Returns `false` when the completion is
    /// stale (its sequence is not the one currently pending) and the state
    /// was left untouched.
    pub fn complete_submission(
        &mut self,
        seq: u64,
        outcome: Result<String, String>,
    ) -> bool {
        match self.state {
            SubmissionState::Pending { seq: pending } if pending == seq => {
                self.state = match outcome {
                    Ok(content) => SubmissionState::Succeeded { content },
                    Err(error) => SubmissionState::Failed { error },
                };
                true
            }
            _ => false,
        }
    }

    /// The optimized markdown — present only in `Succeeded`. Download guard.
    pub fn content(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Succeeded { content } => Some(content),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl Default for OptimizationController {
    fn default() -> Self {
        Self::new()
    }
}
