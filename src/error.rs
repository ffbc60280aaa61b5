//! Error taxonomy for loading models and serving predictions

use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause attached to load and invocation failures
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the registry, the feature extractor and the prediction service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("model artifact for '{model}' not found at {}", .path.display())]
    ArtifactMissing { model: String, path: PathBuf },

    #[error("model artifact for '{model}' at {} could not be loaded: {source}", .path.display())]
    ArtifactCorrupt {
        model: String,
        path: PathBuf,
        #[source]
        source: Cause,
    },

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("model already registered: {0}")]
    DuplicateModel(String),

    #[error("model '{model}' expects {expected} features, got {actual}")]
    FeatureVectorMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("feature {index} is not a finite number ({value})")]
    NonFiniteFeature { index: usize, value: f64 },

    #[error("unknown input field '{field}' for model '{model}'")]
    UnknownField { model: String, field: String },

    #[error("missing input field '{field}' for model '{model}'")]
    MissingField { model: String, field: String },

    #[error("input '{field}' = {value} is outside [{min}, {max}]")]
    InputOutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("input '{field}' = {value} must be a whole number")]
    NotAnInteger { field: String, value: f64 },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("model '{model}' returned unexpected label {label}")]
    UnexpectedLabel { model: String, label: i64 },

    #[error("prediction with model '{model}' failed: {source}")]
    PredictionFailed {
        model: String,
        #[source]
        source: Cause,
    },
}

impl ServiceError {
    /// Wrap a classifier failure for `model`
    pub fn prediction_failed(model: &str, source: impl Into<Cause>) -> Self {
        ServiceError::PredictionFailed {
            model: model.to_string(),
            source: source.into(),
        }
    }

    /// Wrap an artifact load failure for `model`
    pub fn artifact_corrupt(model: &str, path: impl Into<PathBuf>, source: impl Into<Cause>) -> Self {
        ServiceError::ArtifactCorrupt {
            model: model.to_string(),
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether this error must abort startup instead of rejecting a single request
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            ServiceError::ArtifactMissing { .. }
                | ServiceError::ArtifactCorrupt { .. }
                | ServiceError::DuplicateModel(_)
        )
    }

    /// Short machine-readable name, used for metrics labels and error responses
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::ArtifactMissing { .. } => "artifact_missing",
            ServiceError::ArtifactCorrupt { .. } => "artifact_corrupt",
            ServiceError::ModelNotFound(_) => "model_not_found",
            ServiceError::DuplicateModel(_) => "duplicate_model",
            ServiceError::FeatureVectorMismatch { .. } => "feature_vector_mismatch",
            ServiceError::NonFiniteFeature { .. } => "non_finite_feature",
            ServiceError::UnknownField { .. } => "unknown_field",
            ServiceError::MissingField { .. } => "missing_field",
            ServiceError::InputOutOfRange { .. } => "input_out_of_range",
            ServiceError::NotAnInteger { .. } => "not_an_integer",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::UnexpectedLabel { .. } => "unexpected_label",
            ServiceError::PredictionFailed { .. } => "prediction_failed",
        }
    }
}
