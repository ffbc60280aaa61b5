//! Classifier loading and inference components

pub mod classifier;
pub mod inference;
pub mod linear;
pub mod loader;
pub mod onnx;
pub mod registry;

pub use classifier::{Classifier, LabelClassifier, ScoreClassifier};
pub use inference::PredictionService;
pub use loader::ModelLoader;
pub use registry::{ModelHandle, ModelRegistry};
