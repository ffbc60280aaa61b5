//! Named, read-only model handles loaded once at startup

use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::feature_extractor::FormSchema;
use crate::models::classifier::Classifier;
use crate::models::loader::ModelLoader;
use anyhow::{bail, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

/// A loaded classifier bound to its input schema
#[derive(Debug)]
pub struct ModelHandle {
    name: String,
    classifier: Classifier,
    feature_order: Vec<String>,
}

impl ModelHandle {
    /// Bind a classifier to a non-empty feature order with unique names
    pub fn new(name: &str, classifier: Classifier, feature_order: Vec<String>) -> Result<Self> {
        if feature_order.is_empty() {
            bail!("model '{}' has an empty feature order", name);
        }
        {
            let mut seen = HashSet::new();
            if let Some(dup) = feature_order.iter().find(|f| !seen.insert(f.as_str())) {
                bail!("model '{}' lists feature '{}' twice", name, dup);
            }
        }

        Ok(Self {
            name: name.to_string(),
            classifier,
            feature_order,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn expected_feature_count(&self) -> usize {
        self.feature_order.len()
    }
}

/// Registry of loaded models, populated before any prediction and read-only afterwards
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelHandle>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured model. Any failure aborts the whole load.
    pub fn from_config(config: &AppConfig, loader: &ModelLoader) -> Result<Self, ServiceError> {
        let mut registry = Self::new();

        for (name, entry) in &config.models.entries {
            let schema = if entry.features.is_empty() {
                FormSchema::builtin(name)
                    .map(|form| form.feature_names())
                    .unwrap_or_default()
            } else {
                entry.features.clone()
            };

            let path = config.models.artifact_path(entry);
            registry.load(loader, name, &path, &schema)?;
        }

        info!(
            count = registry.len(),
            models = ?registry.names(),
            "Loaded {} models from {}",
            registry.len(),
            config.models.models_dir
        );

        Ok(registry)
    }

    /// Load one artifact and register it under `name`
    pub fn load<P: AsRef<Path>>(
        &mut self,
        loader: &ModelLoader,
        name: &str,
        path: P,
        schema: &[String],
    ) -> Result<&ModelHandle, ServiceError> {
        if self.models.contains_key(name) {
            return Err(ServiceError::DuplicateModel(name.to_string()));
        }
        let handle = loader.load(name, path, schema)?;
        self.register(handle)
    }

    /// Register an already-built handle
    pub fn register(&mut self, handle: ModelHandle) -> Result<&ModelHandle, ServiceError> {
        use std::collections::btree_map::Entry;

        match self.models.entry(handle.name.clone()) {
            Entry::Occupied(_) => Err(ServiceError::DuplicateModel(handle.name)),
            Entry::Vacant(slot) => Ok(slot.insert(handle)),
        }
    }

    /// Look up a model by name
    pub fn get(&self, name: &str) -> Result<&ModelHandle, ServiceError> {
        self.models
            .get(name)
            .ok_or_else(|| ServiceError::ModelNotFound(name.to_string()))
    }

    /// Registered model names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
