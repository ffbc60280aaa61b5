//! Uniform prediction over loaded models

use crate::error::ServiceError;
use crate::metrics::PredictionMetrics;
use crate::models::classifier::Classifier;
use crate::models::registry::ModelHandle;
use crate::types::{FeatureVector, Verdict};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs a model on one feature vector and normalizes the output into a [`Verdict`].
///
/// Stateless apart from optional metrics: every call invokes the model again,
/// nothing is cached and nothing is retried.
#[derive(Default, Clone)]
pub struct PredictionService {
    metrics: Option<Arc<PredictionMetrics>>,
}

impl PredictionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record outcomes and latency into `metrics`
    pub fn with_metrics(metrics: Arc<PredictionMetrics>) -> Self {
        Self {
            metrics: Some(metrics),
        }
    }

    /// Predict with `model` on `vector`
    pub fn predict(&self, model: &ModelHandle, vector: &FeatureVector) -> Result<Verdict, ServiceError> {
        let start = Instant::now();
        let result = Self::run(model, vector);

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(verdict) => metrics.record_prediction(
                    model.name(),
                    start.elapsed(),
                    verdict.positive,
                    verdict.probability_of_positive,
                ),
                Err(e) => metrics.record_failure(e.kind()),
            }
        }

        match &result {
            Ok(verdict) => debug!(
                model = %model.name(),
                positive = verdict.positive,
                probability = ?verdict.probability_of_positive,
                latency_us = start.elapsed().as_micros() as u64,
                "Prediction complete"
            ),
            Err(e) => warn!(model = %model.name(), error = %e, "Prediction rejected"),
        }

        result
    }

    fn run(model: &ModelHandle, vector: &FeatureVector) -> Result<Verdict, ServiceError> {
        let expected = model.expected_feature_count();
        if vector.len() != expected {
            return Err(ServiceError::FeatureVectorMismatch {
                model: model.name().to_string(),
                expected,
                actual: vector.len(),
            });
        }

        // The classifier interface is batch-oriented: wrap the vector as a single row
        let batch: [&[f64]; 1] = [vector.values()];
        let classifier = model.classifier();

        let label = single_row(
            model,
            classifier
                .predict(&batch)
                .map_err(|e| ServiceError::prediction_failed(model.name(), e))?,
        )?;

        let positive = match label {
            1 => true,
            0 => false,
            other => {
                return Err(ServiceError::UnexpectedLabel {
                    model: model.name().to_string(),
                    label: other,
                })
            }
        };

        let probability_of_positive = Self::positive_probability(model, classifier, &batch)?;

        Ok(Verdict::new(positive, probability_of_positive))
    }

    /// Positive-class score, or `None` for label-only models.
    ///
    /// The capability was fixed at load time, so a failing score call on a
    /// score-capable model is a prediction failure, not "unavailable".
    fn positive_probability(
        model: &ModelHandle,
        classifier: &Classifier,
        batch: &[&[f64]],
    ) -> Result<Option<f64>, ServiceError> {
        let scores = match classifier.predict_proba(batch) {
            None => return Ok(None),
            Some(scores) => scores.map_err(|e| ServiceError::prediction_failed(model.name(), e))?,
        };

        let [negative, positive] = single_row(model, scores)?;
        if !(0.0..=1.0).contains(&positive) || !(0.0..=1.0).contains(&negative) {
            return Err(ServiceError::prediction_failed(
                model.name(),
                format!("class scores ({}, {}) fall outside [0, 1]", negative, positive),
            ));
        }

        Ok(Some(positive))
    }
}

/// Unwrap a one-row batch result
fn single_row<T>(model: &ModelHandle, mut rows: Vec<T>) -> Result<T, ServiceError> {
    match rows.len() {
        1 => Ok(rows.remove(0)),
        n => Err(ServiceError::prediction_failed(
            model.name(),
            format!("expected 1 result row, model returned {}", n),
        )),
    }
}
