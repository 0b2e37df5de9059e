//! Smart Agro prediction service
//!
//! Serves two pretrained classifiers and a weather proxy:
//! - `pipeline::image`: leaf photo → one of 38 PlantVillage disease labels
//! - `pipeline::tabular`: soil/climate readings → one of 22 crops
//! - `weather`: OpenWeather current + forecast, condensed into hourly/daily views
//!
//! `models` holds the predictor traits, their ONNX implementations, and the
//! registry that loads them. The HTTP surface lives in `api_server` behind
//! the `api` feature.

pub mod config;
pub mod error;
pub mod labels;
pub mod models;
pub mod pipeline;
pub mod prediction;
pub mod weather;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use error::{DecodeError, DiagnosisError, ModelError, ValidationError, WeatherError};
pub use labels::{AdvisoryTable, LabelTable};
pub use models::ModelRegistry;
pub use prediction::{ClassifierOutput, PredictionResult};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
