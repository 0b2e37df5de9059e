//! Standard scaler loaded from JSON
//!
//! The artifact carries the fitted `mean_` and `scale_` vectors of a
//! scikit-learn `StandardScaler`:
//!
//! ```json
//! { "mean": [50.5, 53.3, 48.1, 25.6, 71.5, 6.5, 103.5],
//!   "scale": [36.9, 32.9, 50.6, 5.1, 22.3, 0.8, 54.9] }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::FeatureScaler;
use crate::error::ModelError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Load the scaler if the artifact exists. `Ok(None)` disables rescaling.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler file: {:?}", path))?;
        let scaler: StandardScaler = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse scaler JSON: {:?}", path))?;

        if scaler.mean.len() != scaler.scale.len() {
            anyhow::bail!(
                "Scaler mean has {} entries but scale has {}",
                scaler.mean.len(),
                scaler.scale.len()
            );
        }

        Ok(Some(scaler))
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, mut row: Array2<f64>) -> Result<Array2<f64>, ModelError> {
        if row.ncols() != self.mean.len() {
            return Err(ModelError::ScalerShape {
                expected: self.mean.len(),
                actual: row.ncols(),
            });
        }

        for mut sample in row.rows_mut() {
            for (j, value) in sample.iter_mut().enumerate() {
                let centred = *value - self.mean[j];
                // sklearn replaces zero variance with a unit scale
                *value = if self.scale[j] == 0.0 {
                    centred
                } else {
                    centred / self.scale[j]
                };
            }
        }

        Ok(row)
    }
}
