//! Rendered diagnosis handed to the presentation layer

use crate::config::ModelEntryConfig;
use crate::types::verdict::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown when a model cannot produce probability scores
pub const PROBABILITY_UNAVAILABLE: &str = "Probability scores not available for this model";

/// A verdict decorated with the model's user-facing wording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Unique response identifier
    pub request_id: String,

    /// Model that produced the verdict
    pub model: String,

    /// Page title for the model
    pub title: String,

    /// True when the condition is predicted present
    pub positive: bool,

    /// Positive-class probability, absent when the model cannot score
    pub probability_of_positive: Option<f64>,

    /// Diagnosis sentence
    pub message: String,

    /// Probability sentence, or the unavailable notice
    pub probability_text: String,

    pub timestamp: DateTime<Utc>,
}

impl Diagnosis {
    /// Render `verdict` with the wording configured for `model`
    pub fn new(model: &str, wording: &ModelEntryConfig, verdict: Verdict) -> Self {
        let message = if verdict.positive {
            wording.positive_message.clone()
        } else {
            wording.negative_message.clone()
        };

        let probability_text = match verdict.probability_percent() {
            Some(percent) => format!("{}: {}", wording.probability_label, percent),
            None => PROBABILITY_UNAVAILABLE.to_string(),
        };

        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            model: model.to_string(),
            title: wording.title.clone(),
            positive: verdict.positive,
            probability_of_positive: verdict.probability_of_positive,
            message,
            probability_text,
            timestamp: Utc::now(),
        }
    }
}
