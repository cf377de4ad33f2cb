//! Core domain types for IdeaScore.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application: the capture
//! pipeline, the scoring client, the session store, and display code.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod capture;
mod idea;
mod ids;
mod job;
pub mod presenter;
mod result;
mod validation;

pub use capture::{CaptureModality, CaptureRef, RawCapture, clamp_unit};
pub use idea::{
    BusinessIdea, DEFAULT_LANGUAGE, INDUSTRIES, LANGUAGES, canonical_industry, canonical_language,
};
pub use ids::{CaptureId, IdeaId, JobId, ResultId};
pub use job::{
    DEFAULT_STAGES, ErrorKind, EvaluationJob, JobError, JobStatus, JobTransition,
    TransitionError,
};
pub use presenter::{ConfidenceLabel, ScoreDisplay, present};
pub use result::{DimensionScore, EvaluationResult, Feedback};
pub use validation::{
    DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, FieldError, IdeaField, TARGET_MARKET_MAX_CHARS,
    TITLE_MAX_CHARS, ValidationError,
};
