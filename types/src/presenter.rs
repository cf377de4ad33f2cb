//! Pure mapping from an [`EvaluationResult`] to what a screen shows.
//!
//! Every function here is total: absent or malformed fields are dropped
//! from the output instead of producing an error.

use std::mem;

use serde::Serialize;

use crate::{EvaluationResult, Feedback};

/// Structured-data keys surfaced as key details, with their display labels.
pub const KEY_DETAIL_FIELDS: [(&str, &str); 5] = [
    ("Entrepreneur_Name", "Entrepreneur"),
    ("Education_Status", "Education"),
    ("Loan_Requirement_First_Month_INR", "Loan Requirement"),
    ("Key_USP", "Key Selling Point"),
    ("Main_Product_Service", "Product/Service"),
];

pub const HIGH_CONFIDENCE_MIN: u8 = 90;
pub const GOOD_CONFIDENCE_MIN: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLabel {
    High,
    Good,
    NeedsReview,
}

impl ConfidenceLabel {
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        if percent >= HIGH_CONFIDENCE_MIN {
            Self::High
        } else if percent >= GOOD_CONFIDENCE_MIN {
            Self::Good
        } else {
            Self::NeedsReview
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High Confidence",
            Self::Good => "Good Confidence",
            Self::NeedsReview => "Needs Review",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionRow {
    pub name: String,
    pub score: u8,
    pub confidence_percent: u8,
    pub reasoning: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreDisplay {
    pub score: u8,
    /// `"{score}/100"`.
    pub score_text: String,
    pub confidence_percent: u8,
    pub confidence_label: ConfidenceLabel,
    pub key_details: Vec<DetailRow>,
    pub dimensions: Vec<DimensionRow>,
    pub feedback: Feedback,
    pub language: String,
}

/// Round a ratio to a whole percent in `0..=100`. Non-finite input maps to 0.
#[must_use]
pub fn confidence_percent(confidence: f64) -> u8 {
    to_percent(confidence * 100.0)
}

fn to_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[must_use]
pub fn present(result: &EvaluationResult) -> ScoreDisplay {
    let score = to_percent(result.overall_score());
    let confidence = confidence_percent(result.confidence());

    ScoreDisplay {
        score,
        score_text: format!("{score}/100"),
        confidence_percent: confidence,
        confidence_label: ConfidenceLabel::from_percent(confidence),
        key_details: key_details(result),
        dimensions: dimension_rows(result),
        feedback: clean_feedback(result.feedback()),
        language: result.language().to_string(),
    }
}

fn key_details(result: &EvaluationResult) -> Vec<DetailRow> {
    let data = result.structured_data();
    KEY_DETAIL_FIELDS
        .iter()
        .filter_map(|(key, label)| {
            let value = data.get(*key).and_then(render_value)?;
            Some(DetailRow {
                label: *label,
                value,
            })
        })
        .collect()
}

fn render_value(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    let rendered = match value {
        // Zero and false read as "not provided".
        Value::Null | Value::Object(_) | Value::Bool(false) => return None,
        Value::Number(n) if n.as_f64().is_some_and(|v| v.abs() < f64::EPSILON) => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Array(_) | Value::Object(_) => None,
                other => render_value(other),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    };
    (!rendered.is_empty()).then_some(rendered)
}

fn dimension_rows(result: &EvaluationResult) -> Vec<DimensionRow> {
    result
        .dimensions()
        .iter()
        .map(|(name, dim)| DimensionRow {
            name: title_case(name),
            score: to_percent(dim.score),
            confidence_percent: confidence_percent(dim.confidence),
            reasoning: dim.reasoning.trim().to_string(),
            suggestions: non_blank(&dim.suggestions),
        })
        .collect()
}

fn clean_feedback(feedback: &Feedback) -> Feedback {
    Feedback {
        strengths: non_blank(&feedback.strengths),
        weaknesses: non_blank(&feedback.weaknesses),
        recommendations: non_blank(&feedback.recommendations),
        next_steps: non_blank(&feedback.next_steps),
    }
}

fn non_blank(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `marketViability` / `market_viability` -> `Market Viability`.
fn title_case(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
