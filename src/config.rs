//! Configuration management for the health assistant

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configuration file path
pub const CONFIG_PATH_ENV: &str = "HEALTH_ASSISTANT_CONFIG";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub models: ModelsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model artifacts configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing model artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
    /// Number of intra-op threads per ONNX session
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Models keyed by name; all of them are loaded at startup
    pub entries: BTreeMap<String, ModelEntryConfig>,
}

/// One model: where its artifact lives and how its verdicts are worded
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntryConfig {
    /// Artifact file name, relative to `models_dir`
    pub file: String,
    /// Feature order; when empty the built-in form for this model (if any) is used
    #[serde(default)]
    pub features: Vec<String>,
    pub title: String,
    pub positive_message: String,
    pub negative_message: String,
    pub probability_label: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ModelsConfig {
    /// Full path of a model's artifact
    pub fn artifact_path(&self, entry: &ModelEntryConfig) -> PathBuf {
        Path::new(&self.models_dir).join(&entry.file)
    }
}

impl AppConfig {
    /// Load configuration from `$HEALTH_ASSISTANT_CONFIG`, or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Wording and artifact settings for a model
    pub fn entry(&self, model: &str) -> Option<&ModelEntryConfig> {
        self.models.entries.get(model)
    }
}

fn entry(
    file: &str,
    title: &str,
    positive_message: &str,
    negative_message: &str,
    probability_label: &str,
) -> ModelEntryConfig {
    ModelEntryConfig {
        file: file.to_string(),
        features: Vec::new(),
        title: title.to_string(),
        positive_message: positive_message.to_string(),
        negative_message: negative_message.to_string(),
        probability_label: probability_label.to_string(),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "diabetes".to_string(),
            entry(
                "diabetes_model.onnx",
                "Diabetes Prediction using ML",
                "The person is diabetic",
                "The person is not diabetic",
                "Probability of being diabetic",
            ),
        );
        entries.insert(
            "heart_disease".to_string(),
            entry(
                "heart_disease_model.onnx",
                "Heart Disease Prediction using ML",
                "The person is having heart disease",
                "The person does not have any heart disease",
                "Probability of having heart disease",
            ),
        );
        entries.insert(
            "parkinsons".to_string(),
            entry(
                "parkinsons_model.onnx",
                "Parkinson's Disease Prediction using ML",
                "The person has Parkinson's disease",
                "The person does not have Parkinson's disease",
                "Probability of having Parkinson's disease",
            ),
        );

        Self {
            models: ModelsConfig {
                models_dir: default_models_dir(),
                onnx_threads: default_onnx_threads(),
                entries,
            },
            logging: LoggingConfig::default(),
        }
    }
}
