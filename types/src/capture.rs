//! Normalized capture output shared by every input modality.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CaptureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureModality {
    Image,
    Audio,
    Document,
}

impl CaptureModality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for CaptureModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text extracted from one capture, before it is folded into a
/// [`BusinessIdea`](crate::BusinessIdea).
///
/// Downstream code never branches on how the text was obtained; `modality`
/// and `source` exist for audit and display only.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCapture {
    pub id: CaptureId,
    pub modality: CaptureModality,
    /// Human-readable reference to where the capture came from
    /// (file path, "camera", "microphone").
    pub source: String,
    /// Normalized text. May be empty when nothing was recognized.
    pub text: String,
    /// Extraction confidence in `0.0..=1.0`, when the extractor reports one.
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl RawCapture {
    #[must_use]
    pub fn new(
        modality: CaptureModality,
        source: impl Into<String>,
        text: impl Into<String>,
        confidence: Option<f64>,
    ) -> Self {
        Self {
            id: CaptureId::new(),
            modality,
            source: source.into(),
            text: text.into(),
            confidence: confidence.and_then(clamp_unit),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Weak back-reference for an idea built from this capture.
    #[must_use]
    pub fn reference(&self) -> CaptureRef {
        CaptureRef {
            id: self.id,
            modality: self.modality,
        }
    }
}

/// Audit-only pointer from an idea to the capture it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRef {
    pub id: CaptureId,
    pub modality: CaptureModality,
}

/// Clamp a ratio into `0.0..=1.0`. NaN is treated as "no value".
#[must_use]
pub fn clamp_unit(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(0.0, 1.0))
    }
}
