//! Error taxonomy for the prediction-serving layer
//!
//! Client mistakes are `ValidationError`. Everything else (model artifacts,
//! undecodable uploads, upstream weather failures) is a server-side failure
//! and is reported by the HTTP layer as a 500.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed or missing client input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("No image uploaded")]
    NoImage,

    #[error("No input provided")]
    EmptyPayload,

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing feature: {0}")]
    MissingFeature(&'static str),

    #[error("Invalid value for feature {feature}: {value}")]
    InvalidFeature { feature: &'static str, value: String },
}

/// Failure to load or run one of the predictors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Failed to load model from {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Classifier returned an empty score vector")]
    EmptyOutput,

    #[error("Unexpected classifier output: {0}")]
    UnexpectedOutput(String),

    #[error("Scaler expects {expected} features, got {actual}")]
    ScalerShape { expected: usize, actual: usize },

    #[error("Model task failed: {0}")]
    Task(String),
}

impl From<ort::Error> for ModelError {
    fn from(e: ort::Error) -> Self {
        ModelError::Inference(e.to_string())
    }
}

/// The uploaded bytes are not an image we can decode.
#[derive(Debug, Error)]
#[error("Failed to decode image: {0}")]
pub struct DecodeError(#[from] pub image::ImageError);

/// Everything that can go wrong in the disease detection pipeline.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failure talking to the upstream weather provider.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned status {status}")]
    Upstream { endpoint: &'static str, status: u16 },

    #[error("invalid {endpoint} payload: {reason}")]
    InvalidPayload { endpoint: &'static str, reason: String },

    #[error("forecast sample {index} has no dt_txt timestamp")]
    MissingTimestamp { index: usize },
}

impl WeatherError {
    /// Which upstream call produced the error, if any.
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            WeatherError::Request { endpoint, .. }
            | WeatherError::Upstream { endpoint, .. }
            | WeatherError::InvalidPayload { endpoint, .. } => Some(endpoint),
            WeatherError::MissingTimestamp { .. } => Some("forecast"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::NoImage.to_string(), "No image uploaded");
        assert_eq!(ValidationError::EmptyPayload.to_string(), "No input provided");
        assert_eq!(
            ValidationError::MissingFeature("humidity").to_string(),
            "Missing feature: humidity"
        );
        assert_eq!(
            ValidationError::InvalidFeature { feature: "ph", value: "\"acidic\"".into() }.to_string(),
            "Invalid value for feature ph: \"acidic\""
        );
    }

    #[test]
    fn test_weather_error_endpoint() {
        let err = WeatherError::Upstream { endpoint: "weather", status: 404 };
        assert_eq!(err.endpoint(), Some("weather"));
        assert_eq!(err.to_string(), "upstream returned status 404");
        assert_eq!(WeatherError::MissingTimestamp { index: 3 }.endpoint(), Some("forecast"));
    }
}
