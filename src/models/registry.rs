//! Model Registry
//!
//! Owns the three predictors. The tabular classifier and scaler are built
//! eagerly at startup; the image classifier is loaded on first use behind a
//! `OnceCell`, so concurrent first requests share one load. A failed load
//! leaves the cell empty and the next caller tries again.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::{
    FeatureScaler, ImageClassifier, ImageClassifierLoader, OnnxImageLoader, OnnxTabularClassifier,
    StandardScaler, TabularClassifier,
};
use crate::error::ModelError;

pub struct ModelRegistry {
    image_loader: Arc<dyn ImageClassifierLoader>,
    image: OnceCell<Arc<dyn ImageClassifier>>,
    tabular: Arc<dyn TabularClassifier>,
    scaler: Option<Arc<dyn FeatureScaler>>,
}

impl ModelRegistry {
    pub fn new(
        image_loader: Arc<dyn ImageClassifierLoader>,
        tabular: Arc<dyn TabularClassifier>,
        scaler: Option<Arc<dyn FeatureScaler>>,
    ) -> Self {
        Self {
            image_loader,
            image: OnceCell::new(),
            tabular,
            scaler,
        }
    }

    /// Build the registry from on-disk artifacts.
    ///
    /// A missing crop model is fatal; a missing scaler only disables
    /// rescaling; the disease model is not touched until first use.
    pub fn from_artifacts(
        disease_model: &Path,
        crop_model: &Path,
        scaler_path: &Path,
    ) -> Result<Self> {
        let tabular = OnnxTabularClassifier::load(crop_model)
            .with_context(|| format!("Crop model unavailable at {:?}", crop_model))?;

        let scaler = match StandardScaler::load_optional(scaler_path)? {
            Some(s) => {
                info!("Loaded feature scaler from {:?}", scaler_path);
                Some(Arc::new(s) as Arc<dyn FeatureScaler>)
            }
            None => {
                info!("No scaler at {:?}; crop features will not be rescaled", scaler_path);
                None
            }
        };

        Ok(Self::new(
            Arc::new(OnnxImageLoader::new(disease_model)),
            Arc::new(tabular),
            scaler,
        ))
    }

    /// Shared image classifier, loading it on the first call.
    pub async fn image_classifier(&self) -> Result<Arc<dyn ImageClassifier>, ModelError> {
        let classifier = self
            .image
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.image_loader);
                let loaded = tokio::task::spawn_blocking(move || loader.load())
                    .await
                    .map_err(|e| ModelError::Task(e.to_string()))?;
                if let Err(e) = &loaded {
                    error!("Disease model load failed: {}", e);
                }
                loaded
            })
            .await?;
        Ok(Arc::clone(classifier))
    }

    pub fn is_image_classifier_loaded(&self) -> bool {
        self.image.initialized()
    }

    pub fn tabular_classifier(&self) -> Arc<dyn TabularClassifier> {
        Arc::clone(&self.tabular)
    }

    pub fn scaler(&self) -> Option<Arc<dyn FeatureScaler>> {
        self.scaler.clone()
    }
}
