//! Evaluation job state machine.
//!
//! ```text
//! Idle ──> Capturing ──> Extracting ──> Submitting ──> Processing ──> Succeeded
//!   │                                      ^                 │
//!   └──────────────────────────────────────┘                 ├──> Failed
//!                                                            └──> Cancelled
//! ```
//!
//! Every non-terminal status may also move to `Failed` or `Cancelled`
//! (except `Idle`, which can only be cancelled). Terminal statuses never
//! move again; a retry is a fresh job.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::JobId;

/// Stage labels shown while an idea is being scored, in display order.
pub const DEFAULT_STAGES: [&str; 5] = [
    "Processing Input",
    "Extracting Content",
    "Language Processing",
    "AI Analysis",
    "Generating Report",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    Capturing,
    Extracting,
    Submitting,
    Processing,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// True while a scoring request is outstanding.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Submitting | Self::Processing)
    }

    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use JobStatus::{
            Cancelled, Capturing, Extracting, Failed, Idle, Processing, Submitting, Succeeded,
        };
        matches!(
            (self, next),
            (Idle, Capturing | Submitting | Cancelled)
                | (Capturing, Extracting | Failed | Cancelled)
                | (Extracting, Submitting | Failed | Cancelled)
                | (Submitting, Processing | Failed | Cancelled)
                | (Processing, Succeeded | Failed | Cancelled)
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Extracting => "extracting",
            Self::Submitting => "submitting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure classification shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Permission,
    Device,
    Extraction,
    Validation,
    Auth,
    Timeout,
    Server,
    Cancelled,
}

impl ErrorKind {
    /// User-initiated cancellation is not shown as an error.
    #[must_use]
    pub const fn is_silent(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether offering "try again" with the same input makes sense.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Server | Self::Device | Self::Extraction
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permission => "permission",
            Self::Device => "device",
            Self::Extraction => "extraction",
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::Timeout => "timeout",
            Self::Server => "server",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure recorded on a job when it ends in `Failed` or `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub kind: ErrorKind,
    pub message: String,
}

impl JobError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "cancelled by user")
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal job transition {from} -> {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// A status change, as broadcast to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTransition {
    pub job: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationJob {
    id: JobId,
    status: JobStatus,
    stages: Vec<String>,
    current_stage: usize,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<JobError>,
}

impl EvaluationJob {
    #[must_use]
    pub fn new(stages: Vec<String>) -> Self {
        Self {
            id: JobId::new(),
            status: JobStatus::Idle,
            stages,
            current_stage: 0,
            started_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    #[must_use]
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    #[must_use]
    pub fn current_stage(&self) -> usize {
        self.current_stage
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    /// Move to `next`, returning the transition that happened.
    pub fn transition(&mut self, next: JobStatus) -> Result<JobTransition, TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        let from = self.status;
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        if next == JobStatus::Succeeded {
            self.current_stage = self.stages.len().saturating_sub(1);
        }
        Ok(JobTransition {
            job: self.id,
            from,
            to: next,
        })
    }

    /// Move to `Failed` (or `Cancelled` for a cancellation error) and record why.
    pub fn fail(&mut self, error: JobError) -> Result<JobTransition, TransitionError> {
        let next = if error.kind == ErrorKind::Cancelled {
            JobStatus::Cancelled
        } else {
            JobStatus::Failed
        };
        let transition = self.transition(next)?;
        self.error = Some(error);
        Ok(transition)
    }

    /// Record the visible stage cursor. Never moves backwards.
    pub fn advance_stage(&mut self, index: usize) {
        if self.status != JobStatus::Processing {
            return;
        }
        let last = self.stages.len().saturating_sub(1);
        self.current_stage = self.current_stage.max(index.min(last));
    }
}
