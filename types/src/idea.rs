use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CaptureRef, IdeaId, RawCapture};

/// Industries an idea can be filed under.
pub const INDUSTRIES: [&str; 14] = [
    "Technology",
    "Healthcare",
    "Education",
    "Agriculture",
    "Finance",
    "Retail",
    "Manufacturing",
    "Transportation",
    "Energy",
    "Food & Beverages",
    "Tourism",
    "Real Estate",
    "Entertainment",
    "Other",
];

/// Language codes the scoring service understands.
pub const LANGUAGES: [&str; 11] = [
    "en-IN", "hi-IN", "mr-IN", "gu-IN", "or-IN", "ta-IN", "te-IN", "kn-IN", "ml-IN", "bn-IN",
    "pa-IN",
];

pub const DEFAULT_LANGUAGE: &str = "en-IN";

/// Returns the canonical spelling of `value` if it names a known industry.
#[must_use]
pub fn canonical_industry(value: &str) -> Option<&'static str> {
    let value = value.trim();
    INDUSTRIES
        .iter()
        .copied()
        .find(|industry| industry.eq_ignore_ascii_case(value))
}

/// Normalize a language code to its canonical casing.
///
/// Unknown codes pass through trimmed; an empty input falls back to
/// [`DEFAULT_LANGUAGE`].
#[must_use]
pub fn canonical_language(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return DEFAULT_LANGUAGE.to_string();
    }
    LANGUAGES
        .iter()
        .find(|code| code.eq_ignore_ascii_case(value))
        .map_or_else(|| value.to_string(), |code| (*code).to_string())
}

/// A business idea as submitted for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessIdea {
    pub id: IdeaId,
    pub title: String,
    pub description: String,
    pub industry: String,
    #[serde(default)]
    pub target_market: String,
    pub submitted_at: DateTime<Utc>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_capture: Option<CaptureRef>,
}

impl BusinessIdea {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            id: IdeaId::new(),
            title: title.into(),
            description: description.into(),
            industry: industry.into(),
            target_market: String::new(),
            submitted_at: Utc::now(),
            language: DEFAULT_LANGUAGE.to_string(),
            user_id: None,
            source_capture: None,
        }
    }

    /// Build an idea whose description is the capture's extracted text.
    pub fn from_capture(
        capture: &RawCapture,
        title: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        let mut idea = Self::new(title, capture.text.clone(), industry);
        idea.source_capture = Some(capture.reference());
        idea
    }

    pub fn with_target_market(mut self, target_market: impl Into<String>) -> Self {
        self.target_market = target_market.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}
