//! Request boundary between the presentation layer and the prediction core

use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::{ModelHandle, ModelRegistry, PredictionService};
use crate::types::{Diagnosis, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// One prediction request as sent by the presentation layer
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    /// Model selector
    pub model: String,
    /// Named form inputs; absent fields of a built-in form take their defaults
    #[serde(default)]
    pub inputs: HashMap<String, f64>,
    /// Raw positional feature vector; mutually exclusive with `inputs`
    #[serde(default)]
    pub features: Option<Vec<f64>>,
}

/// Response written back for each request
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Diagnosis(Diagnosis),
    Error { error: String, kind: &'static str },
}

impl Response {
    fn from_error(err: &ServiceError) -> Self {
        Response::Error {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// Serves prediction requests against an already-loaded registry
pub struct RequestHandler<'a> {
    config: &'a AppConfig,
    registry: &'a ModelRegistry,
    service: PredictionService,
}

impl<'a> RequestHandler<'a> {
    pub fn new(config: &'a AppConfig, registry: &'a ModelRegistry, service: PredictionService) -> Self {
        Self {
            config,
            registry,
            service,
        }
    }

    /// Handle one JSON request line. Never fails: errors become error responses.
    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<PredictionRequest>(line) {
            Ok(request) => match self.handle(&request) {
                Ok(diagnosis) => Response::Diagnosis(diagnosis),
                Err(e) => Response::from_error(&e),
            },
            Err(e) => {
                warn!(error = %e, "Failed to parse request");
                Response::Error {
                    error: format!("malformed request: {}", e),
                    kind: "bad_request",
                }
            }
        }
    }

    /// Run one request through extraction, prediction and rendering
    pub fn handle(&self, request: &PredictionRequest) -> Result<Diagnosis, ServiceError> {
        let model = self.registry.get(&request.model)?;
        let wording = self
            .config
            .entry(&request.model)
            .ok_or_else(|| ServiceError::ModelNotFound(request.model.clone()))?;

        let vector = match &request.features {
            Some(_) if !request.inputs.is_empty() => {
                return Err(ServiceError::BadRequest(
                    "request carries both `features` and `inputs`".to_string(),
                ))
            }
            Some(values) => FeatureVector::new(values.clone())?,
            None => extract(model, &request.inputs)?,
        };

        let verdict = self.service.predict(model, &vector)?;
        let diagnosis = Diagnosis::new(model.name(), wording, verdict);

        info!(
            request_id = %diagnosis.request_id,
            model = %diagnosis.model,
            positive = diagnosis.positive,
            probability = ?diagnosis.probability_of_positive,
            "Diagnosis produced"
        );

        Ok(diagnosis)
    }
}

/// Map named inputs onto the model's feature order.
///
/// The built-in form is used when it matches the model's order; otherwise every
/// feature must be supplied by name.
fn extract(model: &ModelHandle, inputs: &HashMap<String, f64>) -> Result<FeatureVector, ServiceError> {
    if let Some(extractor) = FeatureExtractor::for_model(model.name()) {
        if extractor.schema().feature_names() == model.feature_order() {
            return extractor.extract(inputs);
        }
    }

    if let Some(unknown) = inputs.keys().find(|k| !model.feature_order().contains(*k)) {
        return Err(ServiceError::UnknownField {
            model: model.name().to_string(),
            field: unknown.clone(),
        });
    }

    let values = model
        .feature_order()
        .iter()
        .map(|name| {
            inputs.get(name).copied().ok_or_else(|| ServiceError::MissingField {
                model: model.name().to_string(),
                field: name.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    FeatureVector::new(values)
}
