//! Ordered numeric input record for a single prediction

use crate::error::ServiceError;
use serde::Serialize;

/// A validated, fixed-order feature vector.
///
/// Values are positional: index `i` must correspond to the `i`-th name in the
/// owning model's feature order. Every value is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build a vector, rejecting NaN and infinite values
    pub fn new(values: Vec<f64>) -> Result<Self, ServiceError> {
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ServiceError::NonFiniteFeature { index, value });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = ServiceError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}
