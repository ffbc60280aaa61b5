//! ONNX classifiers run through ONNX Runtime

use crate::models::classifier::{Classifier, LabelClassifier, ScoreClassifier};
use anyhow::{anyhow, bail, Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::tensor::TensorElementType;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// ONNX session plus the input/output names the classifier needs
pub struct OnnxClassifier {
    name: String,
    /// `run` needs exclusive access to the session
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
    probability_output: Option<String>,
}

/// Initialize ONNX Runtime once for the process
pub fn init_runtime() -> Result<()> {
    ort::init().commit()?;
    info!("ONNX Runtime initialized");
    Ok(())
}

impl OnnxClassifier {
    /// Load an ONNX graph and probe its outputs.
    ///
    /// A graph exposing a probability output becomes score-capable; otherwise
    /// it is label-only. The returned width is the feature count the graph's
    /// input declares, when it declares a fixed one.
    pub fn load(path: &Path, name: &str, threads: usize) -> Result<(Classifier, Option<usize>)> {
        info!(model = %name, path = %path.display(), threads = threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| anyhow!("model declares no inputs"))?;
        let input_name = input.name.clone();
        let width = input.input_type.tensor_shape().and_then(|shape| declared_width(shape));

        let label_output = select_label_output(
            session
                .outputs
                .iter()
                .map(|o| (o.name.as_str(), o.output_type.tensor_type())),
        )?;

        let probability_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") && o.name != label_output)
            .map(|o| o.name.clone());

        info!(
            model = %name,
            input = %input_name,
            width = ?width,
            label = %label_output,
            probability = ?probability_output,
            "Model loaded successfully"
        );

        let score_capable = probability_output.is_some();
        let classifier = Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            label_output,
            probability_output,
        };

        let classifier = if score_capable {
            Classifier::score_capable(classifier)
        } else {
            Classifier::label_only(classifier)
        };
        Ok((classifier, width))
    }

    /// Run the graph on a `[rows, width]` float tensor and hand the outputs to `extract`
    fn run<T>(&self, rows: &[&[f64]], extract: impl FnOnce(&SessionOutputs) -> Result<T>) -> Result<T> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) {
            bail!("ragged batch");
        }

        let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().map(|&v| v as f32)).collect();
        let shape = vec![rows.len() as i64, width as i64];
        let input_tensor =
            Tensor::from_array((shape, flat)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        extract(&outputs)
    }

    fn extract_labels(&self, outputs: &SessionOutputs) -> Result<Vec<i64>> {
        let output = outputs
            .get(&self.label_output)
            .ok_or_else(|| anyhow!("output '{}' missing", self.label_output))?;

        let (_, data) = output
            .try_extract_tensor::<i64>()
            .context("label output is not an int64 tensor")?;
        Ok(data.to_vec())
    }

    /// Probabilities come either as a `[batch, 2]` float tensor or as
    /// `seq(map(int64, float))` when the exporter applied a zipmap.
    fn extract_probabilities(&self, outputs: &SessionOutputs, output_name: &str) -> Result<Vec<[f64; 2]>> {
        let output = outputs
            .get(output_name)
            .ok_or_else(|| anyhow!("output '{}' missing", output_name))?;

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            if dims.len() != 2 || dims[1] != 2 {
                bail!("expected [batch, 2] probabilities, got shape {:?}", dims);
            }
            debug!(model = %self.name, "Extracted probabilities from tensor");
            return Ok(data
                .chunks_exact(2)
                .map(|pair| [pair[0] as f64, pair[1] as f64])
                .collect());
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return self.extract_from_sequence_map(output);
        }

        bail!("unsupported probability output format")
    }

    fn extract_from_sequence_map(&self, output: &DynValue) -> Result<Vec<[f64; 2]>> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        let mut pairs = Vec::with_capacity(maps.len());
        for map_value in &maps {
            let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;
            let class = |id: i64| kv_pairs.iter().find(|(k, _)| *k == id).map(|(_, p)| *p as f64);
            match (class(0), class(1)) {
                (Some(negative), Some(positive)) => pairs.push([negative, positive]),
                _ => bail!("probability map lacks class 0 or class 1"),
            }
        }

        debug!(model = %self.name, rows = pairs.len(), "Extracted probabilities from seq(map)");
        Ok(pairs)
    }
}

/// Feature width of a `[batch, features]` input; symbolic or unknown widths are `None`
fn declared_width(shape: &[i64]) -> Option<usize> {
    match shape {
        [.., width] if shape.len() >= 2 && *width > 0 => Some(*width as usize),
        _ => None,
    }
}

/// Pick the output carrying class labels: one named `label`, else the first.
/// It must be an int64 tensor.
fn select_label_output<'a>(
    outputs: impl IntoIterator<Item = (&'a str, Option<TensorElementType>)>,
) -> Result<String> {
    let outputs: Vec<_> = outputs.into_iter().collect();
    let (name, ty) = outputs
        .iter()
        .find(|(name, _)| name.contains("label"))
        .or_else(|| outputs.first())
        .ok_or_else(|| anyhow!("model declares no outputs"))?;

    if *ty != Some(TensorElementType::Int64) {
        bail!("label output '{}' is {:?}, expected an int64 tensor", name, ty);
    }
    Ok(name.to_string())
}

impl LabelClassifier for OnnxClassifier {
    fn predict(&self, rows: &[&[f64]]) -> Result<Vec<i64>> {
        self.run(rows, |outputs| self.extract_labels(outputs))
    }
}

impl ScoreClassifier for OnnxClassifier {
    fn predict_proba(&self, rows: &[&[f64]]) -> Result<Vec<[f64; 2]>> {
        let output_name = self
            .probability_output
            .as_deref()
            .ok_or_else(|| anyhow!("model '{}' has no probability output", self.name))?;
        self.run(rows, |outputs| self.extract_probabilities(outputs, output_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        assert!(OnnxClassifier::load(&path, "broken", 1).is_err());
    }

    #[test]
    fn test_declared_width_from_input_shape() {
        assert_eq!(declared_width(&[-1, 8]), Some(8));
        assert_eq!(declared_width(&[1, 22]), Some(22));
        assert_eq!(declared_width(&[-1, -1]), None);
        assert_eq!(declared_width(&[8]), None);
        assert_eq!(declared_width(&[]), None);
    }

    #[test]
    fn test_label_output_must_be_int64() {
        let zipmap = [
            ("output_label", Some(TensorElementType::Int64)),
            ("output_probability", None),
        ];
        assert_eq!(select_label_output(zipmap).unwrap(), "output_label");

        // no output named label: the first one is used and must hold classes
        let unnamed = [("scores", Some(TensorElementType::Float32)), ("classes", Some(TensorElementType::Int64))];
        let err = select_label_output(unnamed).unwrap_err();
        assert!(err.to_string().contains("int64"));

        let named_float = [("label", Some(TensorElementType::Float32))];
        assert!(select_label_output(named_float).is_err());

        assert!(select_label_output(Vec::<(&str, Option<TensorElementType>)>::new()).is_err());
    }
}
