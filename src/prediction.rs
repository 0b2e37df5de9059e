//! Classifier outputs and their mapping onto class labels

use serde::Serialize;
use tracing::warn;

use crate::error::ModelError;
use crate::labels::LabelTable;

/// Dense per-class scores from the image classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOutput {
    scores: Vec<f32>,
}

impl ClassifierOutput {
    pub fn new(scores: Vec<f32>) -> Result<Self, ModelError> {
        if scores.is_empty() {
            return Err(ModelError::EmptyOutput);
        }
        Ok(Self { scores })
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Index of the highest score. Ties go to the lowest index and NaN
    /// scores never win unless every score is NaN.
    pub fn argmax(&self) -> usize {
        let mut best: Option<(usize, f32)> = None;
        for (i, &score) in self.scores.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((i, score)),
            }
        }
        best.map(|(i, _)| i).unwrap_or(0)
    }
}

/// What the tabular classifier predicted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PredictionResult {
    Index(i64),
    Label(String),
}

/// Disease name for an arg-max index, or a synthesized `Class index N`.
pub fn disease_label(labels: &LabelTable, index: usize) -> String {
    match i64::try_from(index).ok().and_then(|i| labels.get(i)) {
        Some(name) => name.to_string(),
        None => {
            warn!("Class index {} outside label table of {}", index, labels.len());
            format!("Class index {}", index)
        }
    }
}

/// Crop name for a tabular prediction; out-of-range indices degrade to the raw value.
pub fn crop_label(labels: &LabelTable, prediction: &PredictionResult) -> String {
    match prediction {
        PredictionResult::Index(idx) => match labels.get(*idx) {
            Some(name) => name.to_string(),
            None => {
                warn!("Crop index {} outside label table of {}", idx, labels.len());
                idx.to_string()
            }
        },
        PredictionResult::Label(name) => name.clone(),
    }
}
