//! Classifier capabilities.
//!
//! A loaded classifier either produces labels only, or labels plus a
//! two-class probability pair. Which one is decided once, when the artifact
//! is loaded, and encoded in [`Classifier`].

use anyhow::Result;

/// Binary label prediction over a batch of rows
pub trait LabelClassifier: Send + Sync {
    /// One label per row
    fn predict(&self, rows: &[&[f64]]) -> Result<Vec<i64>>;
}

/// Classifier that can also score both classes
pub trait ScoreClassifier: LabelClassifier {
    /// One `[p(negative), p(positive)]` pair per row
    fn predict_proba(&self, rows: &[&[f64]]) -> Result<Vec<[f64; 2]>>;
}

/// A classifier together with its probed capability set
pub enum Classifier {
    ScoreCapable(Box<dyn ScoreClassifier>),
    LabelOnly(Box<dyn LabelClassifier>),
}

impl Classifier {
    pub fn score_capable(classifier: impl ScoreClassifier + 'static) -> Self {
        Classifier::ScoreCapable(Box::new(classifier))
    }

    pub fn label_only(classifier: impl LabelClassifier + 'static) -> Self {
        Classifier::LabelOnly(Box::new(classifier))
    }

    pub fn predict(&self, rows: &[&[f64]]) -> Result<Vec<i64>> {
        match self {
            Classifier::ScoreCapable(c) => c.predict(rows),
            Classifier::LabelOnly(c) => c.predict(rows),
        }
    }

    /// `None` when the classifier cannot score
    pub fn predict_proba(&self, rows: &[&[f64]]) -> Option<Result<Vec<[f64; 2]>>> {
        match self {
            Classifier::ScoreCapable(c) => Some(c.predict_proba(rows)),
            Classifier::LabelOnly(_) => None,
        }
    }

    pub fn supports_probability(&self) -> bool {
        matches!(self, Classifier::ScoreCapable(_))
    }

    pub fn capability(&self) -> &'static str {
        match self {
            Classifier::ScoreCapable(_) => "score_capable",
            Classifier::LabelOnly(_) => "label_only",
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Classifier").field(&self.capability()).finish()
    }
}
