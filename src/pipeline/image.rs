//! Image Inference Pipeline
//!
//! Decode → RGB → 224×224 (aspect ratio not kept) → scale to [0, 1] →
//! `[1, H, W, 3]` batch → classifier → arg-max → label → advisory text.

use image::imageops::{self, FilterType};
use ndarray::Array4;
use serde::Serialize;
use tracing::debug;

use crate::error::{DecodeError, DiagnosisError, ValidationError};
use crate::labels::{AdvisoryTable, LabelTable};
use crate::models::ImageClassifier;
use crate::prediction::disease_label;

/// Side length of the square classifier input.
pub const INPUT_SIZE: u32 = 224;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseDiagnosis {
    pub disease: String,
    pub recommendation: String,
}

/// Turn uploaded bytes into a single-sample NHWC batch.
pub fn preprocess(bytes: &[u8]) -> Result<Array4<f32>, DecodeError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let side = INPUT_SIZE as usize;
    let mut batch = Array4::<f32>::zeros((1, side, side, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            batch[[0, y as usize, x as usize, c]] = pixel[c] as f32 / 255.0;
        }
    }

    Ok(batch)
}

/// Run the full pipeline over one upload.
pub fn diagnose(
    classifier: &dyn ImageClassifier,
    bytes: &[u8],
    labels: &LabelTable,
    advisories: &AdvisoryTable,
) -> Result<DiseaseDiagnosis, DiagnosisError> {
    if bytes.is_empty() {
        return Err(ValidationError::NoImage.into());
    }

    let batch = preprocess(bytes)?;
    let output = classifier.predict(batch)?;
    let index = output.argmax();
    let disease = disease_label(labels, index);
    let recommendation = advisories.recommendation(&disease).to_string();

    debug!(
        "Predicted class {} ({}) with score {:.4}",
        index,
        disease,
        output.scores().get(index).copied().unwrap_or(f32::NAN)
    );

    Ok(DiseaseDiagnosis {
        disease,
        recommendation,
    })
}
