//! Health Assistant Library
//!
//! Loads pre-trained diagnostic classifiers (diabetes, heart disease,
//! Parkinson's disease), turns form inputs into feature vectors and returns
//! a diagnosis with an optional positive-class probability.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod handler;
pub mod metrics;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use error::ServiceError;
pub use feature_extractor::{FeatureExtractor, FormSchema};
pub use handler::{PredictionRequest, RequestHandler, Response};
pub use models::{ModelHandle, ModelLoader, ModelRegistry, PredictionService};
pub use types::{Diagnosis, FeatureVector, Verdict};
