//! Linear models stored as JSON documents.
//!
//! ```json
//! {"kind": "logistic_regression", "feature_names": ["Glucose", "BMI"],
//!  "coefficients": [0.03, 0.08], "intercept": -6.1}
//! ```
//!
//! `logistic_regression` can score; `linear_svc` produces labels only.

use crate::models::classifier::{Classifier, LabelClassifier, ScoreClassifier};
use anyhow::{bail, Result};
use serde::Deserialize;

/// On-disk linear model document
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinearArtifact {
    LogisticRegression(LinearParams),
    LinearSvc(LinearParams),
}

/// Weights shared by both linear model kinds
#[derive(Debug, Clone, Deserialize)]
pub struct LinearParams {
    /// Declared feature order, if the exporter recorded it
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearParams {
    fn validate(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            bail!("linear model has no coefficients");
        }
        if let Some(pos) = self.coefficients.iter().position(|c| !c.is_finite()) {
            bail!("coefficient {} is not finite", pos);
        }
        if !self.intercept.is_finite() {
            bail!("intercept is not finite");
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                bail!(
                    "{} feature names declared for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                );
            }
        }
        Ok(())
    }

    fn decision(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            bail!(
                "row has {} features, model has {} coefficients",
                row.len(),
                self.coefficients.len()
            );
        }
        let z = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        if !z.is_finite() {
            bail!("decision value overflowed");
        }
        Ok(z)
    }
}

impl LinearArtifact {
    /// Parse and validate a JSON document
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: LinearArtifact = serde_json::from_slice(bytes)?;
        artifact.params().validate()?;
        Ok(artifact)
    }

    pub fn params(&self) -> &LinearParams {
        match self {
            LinearArtifact::LogisticRegression(p) | LinearArtifact::LinearSvc(p) => p,
        }
    }

    pub fn feature_count(&self) -> usize {
        self.params().coefficients.len()
    }

    /// Wrap the parameters in the classifier variant matching their capabilities
    pub fn into_classifier(self) -> Classifier {
        match self {
            LinearArtifact::LogisticRegression(params) => {
                Classifier::score_capable(LogisticRegression { params })
            }
            LinearArtifact::LinearSvc(params) => Classifier::label_only(LinearSvc { params }),
        }
    }
}

/// Logistic regression: sigmoid of the decision value
pub struct LogisticRegression {
    params: LinearParams,
}

impl LogisticRegression {
    fn positive_probability(&self, row: &[f64]) -> Result<f64> {
        let z = self.params.decision(row)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl LabelClassifier for LogisticRegression {
    fn predict(&self, rows: &[&[f64]]) -> Result<Vec<i64>> {
        rows.iter()
            .map(|row| Ok(i64::from(self.params.decision(row)? > 0.0)))
            .collect()
    }
}

impl ScoreClassifier for LogisticRegression {
    fn predict_proba(&self, rows: &[&[f64]]) -> Result<Vec<[f64; 2]>> {
        rows.iter()
            .map(|row| {
                let p = self.positive_probability(row)?;
                Ok([1.0 - p, p])
            })
            .collect()
    }
}

/// Linear support vector classifier: sign of the decision value, no calibrated scores
pub struct LinearSvc {
    params: LinearParams,
}

impl LabelClassifier for LinearSvc {
    fn predict(&self, rows: &[&[f64]]) -> Result<Vec<i64>> {
        rows.iter()
            .map(|row| Ok(i64::from(self.params.decision(row)? > 0.0)))
            .collect()
    }
}
