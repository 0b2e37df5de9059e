//! ONNX Runtime backed classifiers

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ndarray::{Array2, Array4};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use super::{ImageClassifier, ImageClassifierLoader, TabularClassifier};
use crate::error::ModelError;
use crate::prediction::{ClassifierOutput, PredictionResult};

fn open_session(path: &Path) -> Result<Session, ModelError> {
    if !path.exists() {
        return Err(ModelError::ArtifactMissing(path.to_path_buf()));
    }

    Session::builder()
        .map_err(load_error(path))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(load_error(path))?
        .commit_from_file(path)
        .map_err(load_error(path))
}

fn load_error<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> ModelError + '_ {
    move |e| ModelError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn lock(session: &Mutex<Session>) -> Result<std::sync::MutexGuard<'_, Session>, ModelError> {
    session
        .lock()
        .map_err(|e| ModelError::Inference(format!("Failed to lock session: {}", e)))
}

// ============================================================================
// Image classifier
// ============================================================================

/// Disease classifier exported from the Keras model.
pub struct OnnxImageClassifier {
    session: Mutex<Session>,
}

impl OnnxImageClassifier {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let session = open_session(path)?;
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl ImageClassifier for OnnxImageClassifier {
    fn predict(&self, batch: Array4<f32>) -> Result<ClassifierOutput, ModelError> {
        let input = Tensor::from_array(batch)?;

        let mut session = lock(&self.session)?;
        let outputs = session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err(ModelError::UnexpectedOutput("model produced no outputs".into()));
        }

        // [1, num_classes]; only the first row is ours
        let (shape, scores) = outputs[0].try_extract_tensor::<f32>()?;
        let width = shape.last().copied().unwrap_or(0).max(0) as usize;
        let scores = scores[..width.min(scores.len())].to_vec();
        ClassifierOutput::new(scores)
    }
}

/// Loads the image classifier from a fixed artifact path.
pub struct OnnxImageLoader {
    path: PathBuf,
}

impl OnnxImageLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageClassifierLoader for OnnxImageLoader {
    fn load(&self) -> Result<Arc<dyn ImageClassifier>, ModelError> {
        info!("Loading disease model from {:?}", self.path);
        let model = OnnxImageClassifier::load(&self.path)?;
        info!("Disease model loaded");
        Ok(Arc::new(model))
    }
}

// ============================================================================
// Tabular classifier
// ============================================================================

/// Crop classifier exported from the scikit-learn decision tree.
pub struct OnnxTabularClassifier {
    session: Mutex<Session>,
}

impl OnnxTabularClassifier {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let session = open_session(path)?;
        info!("Loaded crop model from {:?}", path);
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl TabularClassifier for OnnxTabularClassifier {
    fn predict(&self, row: Array2<f64>) -> Result<PredictionResult, ModelError> {
        let input = Tensor::from_array(row.mapv(|v| v as f32))?;

        let mut session = lock(&self.session)?;
        let outputs = session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err(ModelError::UnexpectedOutput("model produced no outputs".into()));
        }
        let label = &outputs[0];

        // skl2onnx emits int64 labels for integer classes and strings for
        // named classes; regressors exported as classifiers emit floats.
        if let Ok((_, values)) = label.try_extract_tensor::<i64>() {
            return first(values).map(|&v| PredictionResult::Index(v));
        }
        if let Ok((_, values)) = label.try_extract_tensor::<i32>() {
            return first(values).map(|&v| PredictionResult::Index(v as i64));
        }
        if let Ok((_, values)) = label.try_extract_tensor::<f32>() {
            return first(values).map(|&v| PredictionResult::Index(v.trunc() as i64));
        }
        if let Ok((_, values)) = label.try_extract_strings() {
            return first(&values).map(|v| PredictionResult::Label(v.clone()));
        }

        Err(ModelError::UnexpectedOutput("unsupported label tensor type".into()))
    }
}

fn first<T>(values: &[T]) -> Result<&T, ModelError> {
    values
        .first()
        .ok_or_else(|| ModelError::UnexpectedOutput("empty label tensor".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_reported() {
        let err = OnnxImageLoader::new("does/not/exist.onnx").load().err().unwrap();
        assert!(matches!(err, ModelError::ArtifactMissing(_)));
        assert!(err.to_string().contains("does/not/exist.onnx"));
    }

    #[test]
    fn test_missing_tabular_artifact_reported() {
        let result = OnnxTabularClassifier::load(Path::new("does/not/exist.onnx"));
        assert!(matches!(result, Err(ModelError::ArtifactMissing(_))));
    }
}
