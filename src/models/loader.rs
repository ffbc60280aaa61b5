//! Model artifact loader

use crate::error::ServiceError;
use crate::models::classifier::Classifier;
use crate::models::linear::LinearArtifact;
use crate::models::onnx::{self, OnnxClassifier};
use crate::models::registry::ModelHandle;
use anyhow::{anyhow, bail, Result};
use std::path::Path;
use tracing::{debug, info};

/// Classifier read from disk, plus whatever input schema it declares
struct Artifact {
    classifier: Classifier,
    declared_features: Option<Vec<String>>,
    declared_count: Option<usize>,
}

/// Loader for classifier artifacts (`.onnx` graphs and `.json` linear models)
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        onnx::init_runtime()?;
        info!(onnx_threads = onnx_threads, "Model loader initialized");
        Ok(Self { onnx_threads })
    }

    /// Load one artifact and bind it to a feature order.
    ///
    /// `schema` is the statically known feature order for this model. When the
    /// artifact declares its own order, both must agree; when only one exists it
    /// is used; when neither exists the artifact is rejected.
    pub fn load<P: AsRef<Path>>(
        &self,
        name: &str,
        path: P,
        schema: &[String],
    ) -> Result<ModelHandle, ServiceError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ServiceError::ArtifactMissing {
                model: name.to_string(),
                path: path.to_path_buf(),
            });
        }

        let artifact = self
            .read_artifact(name, path)
            .map_err(|e| ServiceError::artifact_corrupt(name, path, e))?;

        let feature_order =
            resolve_feature_order(artifact.declared_features, artifact.declared_count, schema)
                .map_err(|e| ServiceError::artifact_corrupt(name, path, e))?;

        let handle = ModelHandle::new(name, artifact.classifier, feature_order)
            .map_err(|e| ServiceError::artifact_corrupt(name, path, e))?;

        info!(
            model = %name,
            path = %path.display(),
            features = handle.expected_feature_count(),
            capability = handle.classifier().capability(),
            "Model artifact loaded"
        );

        Ok(handle)
    }

    fn read_artifact(&self, name: &str, path: &Path) -> Result<Artifact> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("onnx") => {
                let (classifier, width) = OnnxClassifier::load(path, name, self.onnx_threads)?;
                Ok(Artifact {
                    classifier,
                    declared_features: None,
                    declared_count: width,
                })
            }
            Some("json") => {
                let bytes = std::fs::read(path)?;
                let linear = LinearArtifact::from_slice(&bytes)?;
                debug!(model = %name, coefficients = linear.feature_count(), "Parsed linear model");
                Ok(Artifact {
                    declared_features: linear.params().feature_names.clone(),
                    declared_count: Some(linear.feature_count()),
                    classifier: linear.into_classifier(),
                })
            }
            other => Err(anyhow!("unsupported artifact format: {:?}", other)),
        }
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

fn resolve_feature_order(
    declared: Option<Vec<String>>,
    declared_count: Option<usize>,
    schema: &[String],
) -> Result<Vec<String>> {
    let order = match declared {
        Some(declared) => {
            if !schema.is_empty() && declared != schema {
                bail!(
                    "artifact feature order {:?} disagrees with configured schema {:?}",
                    declared,
                    schema
                );
            }
            declared
        }
        None if schema.is_empty() => {
            bail!("artifact declares no feature names and no schema is configured")
        }
        None => schema.to_vec(),
    };

    if let Some(count) = declared_count {
        if count != order.len() {
            bail!("artifact expects {} features, schema has {}", count, order.len());
        }
    }
    Ok(order)
}
