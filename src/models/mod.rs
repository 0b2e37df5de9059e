//! Predictors and the registry that owns them
//!
//! The classifiers are opaque: the pipelines only see these traits, so the
//! ONNX-backed implementations can be swapped for fakes in tests.

pub mod onnx;
pub mod registry;
pub mod scaler;

use std::sync::Arc;

use ndarray::{Array2, Array4};

use crate::error::ModelError;
use crate::prediction::{ClassifierOutput, PredictionResult};

pub use onnx::{OnnxImageClassifier, OnnxImageLoader, OnnxTabularClassifier};
pub use registry::ModelRegistry;
pub use scaler::StandardScaler;

/// Maps a `[1, 224, 224, 3]` normalized pixel batch to per-class scores.
pub trait ImageClassifier: Send + Sync {
    fn predict(&self, batch: Array4<f32>) -> Result<ClassifierOutput, ModelError>;
}

/// Maps a `[1, 7]` feature row to a predicted class.
pub trait TabularClassifier: Send + Sync {
    fn predict(&self, row: Array2<f64>) -> Result<PredictionResult, ModelError>;
}

/// Optional rescaling applied to the feature row before tabular inference.
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, row: Array2<f64>) -> Result<Array2<f64>, ModelError>;
}

/// Produces the image classifier on first use. Runs on a blocking thread.
pub trait ImageClassifierLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn ImageClassifier>, ModelError>;
}
