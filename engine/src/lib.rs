//! Core engine for IdeaScore: capture, submission, progress, and results.
//!
//! This crate holds the evaluation state machine without any terminal or UI
//! dependencies. A shell drives one [`SubmissionCoordinator`], renders its
//! [`ProgressSnapshot`], and reads the latest result from the shared
//! [`ResultStore`].

mod atomic_write;
pub mod capture;
pub mod coordinator;
pub mod progress;
pub mod result_store;

pub use capture::{
    Acquired, AudioClip, Camera, CaptureAdapter, CaptureError, CaptureFut, CaptureLimits,
    CaptureSource, Device, Extraction, FilePicker, ImageFrame, Microphone, Payload, Permission,
    SpeechTranscriber, TextRecognizer, UploadKind, normalize_text,
};
pub use coordinator::{CoordinatorSettings, SubmissionCoordinator, SubmitError};
pub use progress::{ProgressPhase, ProgressSnapshot, ProgressStageTracker, StageStatus, StageView};
pub use result_store::{PersistError, RECORD_FILENAME, ResultStore};

pub use ideascore_providers::{self, ScoringService};
pub use ideascore_types::{
    BusinessIdea, ErrorKind, EvaluationJob, EvaluationResult, JobError, JobId, JobStatus,
    JobTransition, RawCapture, ScoreDisplay, present,
};
