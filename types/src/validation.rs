//! Field-level validation of a [`BusinessIdea`] before submission.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{BusinessIdea, canonical_industry, canonical_language};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 20;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const TARGET_MARKET_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaField {
    Title,
    Description,
    Industry,
    TargetMarket,
    Language,
}

impl IdeaField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Industry => "industry",
            Self::TargetMarket => "target_market",
            Self::Language => "language",
        }
    }
}

impl fmt::Display for IdeaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: IdeaField,
    pub message: String,
}

/// Every rule an idea violated, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid idea: {}", summary(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    #[must_use]
    pub fn has(&self, field: IdeaField) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

fn summary(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl BusinessIdea {
    /// Check every field and return a normalized copy.
    ///
    /// Normalization trims text fields, canonicalizes the industry spelling,
    /// and the language code. Nothing is changed when validation fails.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let mut fields = Vec::new();
        let mut reject = |field, message: String| fields.push(FieldError { field, message });

        let title = self.title.trim();
        let title_len = title.chars().count();
        if title_len == 0 {
            reject(IdeaField::Title, "title is required".to_string());
        } else if title_len > TITLE_MAX_CHARS {
            reject(
                IdeaField::Title,
                format!("title must be at most {TITLE_MAX_CHARS} characters"),
            );
        }

        let description = self.description.trim();
        let description_len = description.chars().count();
        if description_len < DESCRIPTION_MIN_CHARS {
            reject(
                IdeaField::Description,
                format!("description must be at least {DESCRIPTION_MIN_CHARS} characters"),
            );
        } else if description_len > DESCRIPTION_MAX_CHARS {
            reject(
                IdeaField::Description,
                format!("description must be at most {DESCRIPTION_MAX_CHARS} characters"),
            );
        }

        let industry = canonical_industry(&self.industry);
        if industry.is_none() {
            let message = if self.industry.trim().is_empty() {
                "industry is required".to_string()
            } else {
                format!("unknown industry '{}'", self.industry.trim())
            };
            reject(IdeaField::Industry, message);
        }

        let target_market = self.target_market.trim();
        if target_market.chars().count() > TARGET_MARKET_MAX_CHARS {
            reject(
                IdeaField::TargetMarket,
                format!("target market must be at most {TARGET_MARKET_MAX_CHARS} characters"),
            );
        }

        let language = canonical_language(&self.language);
        if language.chars().any(char::is_whitespace) {
            reject(
                IdeaField::Language,
                format!("invalid language code '{language}'"),
            );
        }

        if !fields.is_empty() {
            return Err(ValidationError { fields });
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            industry: industry.unwrap_or_default().to_string(),
            target_market: target_market.to_string(),
            language,
            ..self.clone()
        })
    }
}
