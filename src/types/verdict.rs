//! Normalized prediction outcome

use serde::{Deserialize, Serialize};

/// Result of one prediction: binary label plus an optional positive-class probability.
///
/// `probability_of_positive` is `None` when the model cannot produce scores; it is
/// never a placeholder value. When present it lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub positive: bool,
    pub probability_of_positive: Option<f64>,
}

impl Verdict {
    pub fn new(positive: bool, probability_of_positive: Option<f64>) -> Self {
        Self {
            positive,
            probability_of_positive,
        }
    }

    /// Probability formatted as a percentage with two decimals, e.g. `"73.21%"`
    pub fn probability_percent(&self) -> Option<String> {
        self.probability_of_positive
            .map(|p| format!("{:.2}%", p * 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_percent() {
        let verdict = Verdict::new(true, Some(0.73214));
        assert_eq!(verdict.probability_percent().as_deref(), Some("73.21%"));

        let verdict = Verdict::new(false, Some(0.0));
        assert_eq!(verdict.probability_percent().as_deref(), Some("0.00%"));
    }

    #[test]
    fn test_unavailable_probability_has_no_text() {
        let verdict = Verdict::new(true, None);
        assert_eq!(verdict.probability_percent(), None);
    }
}
