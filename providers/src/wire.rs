//! JSON shapes exchanged with the scoring service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ideascore_types::{
    BusinessIdea, DimensionScore, EvaluationResult, Feedback, IdeaId, ResultId,
};

/// Body of `POST /api/evaluate/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoringRequest {
    pub title: String,
    pub description: String,
    pub industry: String,
    pub target_market: String,
    pub language: String,
}

impl ScoringRequest {
    #[must_use]
    pub fn from_idea(idea: &BusinessIdea) -> Self {
        Self {
            title: idea.title.clone(),
            description: idea.description.clone(),
            industry: idea.industry.clone(),
            target_market: idea.target_market.clone(),
            language: idea.language.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringResponse {
    pub id: String,
    #[serde(alias = "score")]
    pub overall_score: f64,
    #[serde(default, alias = "confidence_score")]
    pub confidence: f64,
    #[serde(default)]
    pub structured_data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionScore>,
    #[serde(default)]
    pub feedback: Feedback,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScoringResponse {
    /// Freeze the response into a result for `idea_id`.
    ///
    /// A missing language falls back to `requested_language`; a missing
    /// completion time falls back to now.
    #[must_use]
    pub fn into_result(self, idea_id: IdeaId, requested_language: &str) -> EvaluationResult {
        let language = self
            .language
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| requested_language.to_string());
        EvaluationResult::new(
            ResultId::new(self.id),
            idea_id,
            self.overall_score,
            self.confidence,
            language,
            self.completed_at.unwrap_or_else(Utc::now),
        )
        .with_structured_data(self.structured_data)
        .with_dimensions(self.dimensions)
        .with_feedback(self.feedback)
    }
}

/// Structured error body: `{code, message}`, `{error: {code, message}}`,
/// or `{error: "message"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Nested { error: ErrorBody },
    Text { error: String },
    Flat(ErrorBody),
}

impl ErrorBody {
    /// Lenient parse; non-JSON bodies become the message verbatim.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope::Nested { error }) => error,
            Ok(ErrorEnvelope::Text { error }) => Self {
                code: None,
                message: Some(error),
            },
            Ok(ErrorEnvelope::Flat(flat)) => flat,
            Err(_) => {
                let trimmed = body.trim();
                Self {
                    code: None,
                    message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                }
            }
        }
    }

    /// Message to show, falling back to the code and then to `fallback`.
    #[must_use]
    pub fn describe(&self, fallback: &str) -> String {
        match (&self.code, &self.message) {
            (_, Some(message)) if !message.trim().is_empty() => message.trim().to_string(),
            (Some(code), _) if !code.trim().is_empty() => code.trim().to_string(),
            _ => fallback.to_string(),
        }
    }
}
