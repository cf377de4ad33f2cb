use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IdeaId, ResultId};

/// Score for one named evaluation dimension (e.g. `marketViability`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// A finished evaluation. Built once from a scoring response and never
/// modified; re-evaluating an idea yields a new result with a new id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    id: ResultId,
    idea_id: IdeaId,
    overall_score: f64,
    confidence: f64,
    #[serde(default)]
    structured_data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dimensions: BTreeMap<String, DimensionScore>,
    #[serde(default)]
    feedback: Feedback,
    language: String,
    completed_at: DateTime<Utc>,
}

impl EvaluationResult {
    /// Scores are clamped to `0..=100` and confidence to `0..=1`; NaN becomes 0.
    #[must_use]
    pub fn new(
        id: ResultId,
        idea_id: IdeaId,
        overall_score: f64,
        confidence: f64,
        language: impl Into<String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            idea_id,
            overall_score: finite_or_zero(overall_score).clamp(0.0, 100.0),
            confidence: finite_or_zero(confidence).clamp(0.0, 1.0),
            structured_data: BTreeMap::new(),
            dimensions: BTreeMap::new(),
            feedback: Feedback::default(),
            language: language.into(),
            completed_at,
        }
    }

    #[must_use]
    pub fn with_structured_data(mut self, data: BTreeMap<String, serde_json::Value>) -> Self {
        self.structured_data = data;
        self
    }

    #[must_use]
    pub fn with_dimensions(mut self, dimensions: BTreeMap<String, DimensionScore>) -> Self {
        self.dimensions = dimensions;
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ResultId {
        &self.id
    }

    #[must_use]
    pub fn idea_id(&self) -> IdeaId {
        self.idea_id
    }

    #[must_use]
    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn structured_data(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.structured_data
    }

    #[must_use]
    pub fn dimensions(&self) -> &BTreeMap<String, DimensionScore> {
        &self.dimensions
    }

    #[must_use]
    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
