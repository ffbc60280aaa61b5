//! Value types passed between the form layer, the prediction service and the presentation layer

pub mod diagnosis;
pub mod feature_vector;
pub mod verdict;

pub use diagnosis::Diagnosis;
pub use feature_vector::FeatureVector;
pub use verdict::Verdict;
