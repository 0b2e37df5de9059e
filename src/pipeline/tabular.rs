//! Tabular Inference Pipeline
//!
//! Validates the seven soil/climate features in schema order, optionally
//! rescales them, and maps the tabular classifier's prediction to a crop.

use ndarray::Array2;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ModelError, ValidationError};
use crate::labels::LabelTable;
use crate::models::{FeatureScaler, TabularClassifier};
use crate::prediction::crop_label;

/// Required request fields, in validation and column order.
pub const FEATURE_NAMES: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRecommendation {
    pub recommended_crop: String,
}

/// Validated feature values, ordered as `FEATURE_NAMES`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; 7]);

impl FeatureVector {
    pub fn new(values: [f64; 7]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; 7] {
        &self.0
    }

    /// Validate a parsed request body. The first failing feature in schema
    /// order is reported; unknown fields are ignored.
    pub fn from_json(payload: &Value) -> Result<Self, ValidationError> {
        let fields = match payload {
            Value::Null => return Err(ValidationError::EmptyPayload),
            Value::Object(map) if map.is_empty() => return Err(ValidationError::EmptyPayload),
            Value::Array(items) if items.is_empty() => return Err(ValidationError::EmptyPayload),
            Value::Object(map) => map,
            _ => return Err(ValidationError::NotAnObject),
        };

        let mut values = [0.0; 7];
        for (slot, &feature) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
            let raw = match fields.get(feature) {
                None | Some(Value::Null) => return Err(ValidationError::MissingFeature(feature)),
                Some(raw) => raw,
            };
            *slot = coerce(raw).ok_or_else(|| ValidationError::InvalidFeature {
                feature,
                value: raw.to_string(),
            })?;
        }

        Ok(Self(values))
    }

    /// Parse raw body bytes, then validate.
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ValidationError::EmptyPayload);
        }
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        Self::from_json(&payload)
    }

    fn to_row(self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_NAMES.len()), |(_, j)| self.0[j])
    }
}

/// Numbers, numeric strings and booleans are accepted.
fn coerce(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Rescale (if a scaler is loaded), classify, and label.
pub fn recommend(
    classifier: &dyn TabularClassifier,
    scaler: Option<&dyn FeatureScaler>,
    features: &FeatureVector,
    labels: &LabelTable,
) -> Result<CropRecommendation, ModelError> {
    let mut row = features.to_row();
    if let Some(scaler) = scaler {
        row = scaler.transform(row)?;
    }

    let prediction = classifier.predict(row)?;
    let recommended_crop = crop_label(labels, &prediction);
    debug!("Crop prediction {:?} -> {}", prediction, recommended_crop);

    Ok(CropRecommendation { recommended_crop })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::PredictionResult;
    use crate::models::StandardScaler;
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn sample() -> Value {
        json!({
            "N": 90, "P": 42, "K": 43,
            "temperature": 20.87, "humidity": 82.0, "ph": 6.5, "rainfall": 202.9
        })
    }

    /// Echoes a fixed prediction and records the row it saw.
    struct Recording {
        prediction: PredictionResult,
        seen: Mutex<Option<Array2<f64>>>,
    }

    impl Recording {
        fn new(prediction: PredictionResult) -> Self {
            Self { prediction, seen: Mutex::new(None) }
        }
    }

    impl TabularClassifier for Recording {
        fn predict(&self, row: Array2<f64>) -> Result<PredictionResult, ModelError> {
            *self.seen.lock().unwrap() = Some(row);
            Ok(self.prediction.clone())
        }
    }

    #[test]
    fn test_valid_payload_in_schema_order() {
        let features = FeatureVector::from_json(&sample()).unwrap();
        assert_eq!(features.values(), &[90.0, 42.0, 43.0, 20.87, 82.0, 6.5, 202.9]);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let mut payload = sample();
        payload["soil_type"] = json!("loam");
        payload["notes"] = json!({"nested": true});
        assert_eq!(
            FeatureVector::from_json(&payload).unwrap(),
            FeatureVector::from_json(&sample()).unwrap()
        );
    }

    #[test]
    fn test_first_missing_feature_reported() {
        let mut payload = sample();
        payload.as_object_mut().unwrap().remove("humidity");
        payload.as_object_mut().unwrap().remove("K");
        assert_eq!(
            FeatureVector::from_json(&payload).unwrap_err(),
            ValidationError::MissingFeature("K")
        );

        let mut payload = sample();
        payload["rainfall"] = Value::Null;
        assert_eq!(
            FeatureVector::from_json(&payload).unwrap_err(),
            ValidationError::MissingFeature("rainfall")
        );
    }

    #[test]
    fn test_invalid_feature_names_value() {
        let mut payload = sample();
        payload["ph"] = json!("acidic");
        let err = FeatureVector::from_json(&payload).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFeature { feature: "ph", value: "\"acidic\"".to_string() }
        );
    }

    #[test]
    fn test_coercion_of_strings_and_bools() {
        let mut payload = sample();
        payload["N"] = json!(" 12.5 ");
        payload["P"] = json!(true);
        let features = FeatureVector::from_json(&payload).unwrap();
        assert_relative_eq!(features.values()[0], 12.5);
        assert_relative_eq!(features.values()[1], 1.0);
    }

    #[test]
    fn test_empty_payloads() {
        assert_eq!(FeatureVector::from_body(b"").unwrap_err(), ValidationError::EmptyPayload);
        assert_eq!(FeatureVector::from_body(b"{}").unwrap_err(), ValidationError::EmptyPayload);
        assert_eq!(FeatureVector::from_body(b"null").unwrap_err(), ValidationError::EmptyPayload);
        assert_eq!(FeatureVector::from_body(b"[1, 2]").unwrap_err(), ValidationError::NotAnObject);
        assert!(matches!(
            FeatureVector::from_body(b"{\"N\": ").unwrap_err(),
            ValidationError::InvalidJson(_)
        ));
    }

    #[test]
    fn test_recommend_without_scaler_uses_raw_row() {
        let classifier = Recording::new(PredictionResult::Index(20));
        let features = FeatureVector::from_json(&sample()).unwrap();
        let result = recommend(&classifier, None, &features, &LabelTable::crops()).unwrap();

        assert_eq!(result.recommended_crop, "rice");
        let seen = classifier.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.shape(), &[1, 7]);
        assert_relative_eq!(seen[[0, 6]], 202.9);
    }

    #[test]
    fn test_recommend_applies_scaler() {
        let classifier = Recording::new(PredictionResult::Index(99));
        let scaler = StandardScaler { mean: vec![10.0; 7], scale: vec![2.0; 7] };
        let features = FeatureVector::new([12.0, 14.0, 10.0, 8.0, 10.0, 10.0, 30.0]);
        let result = recommend(&classifier, Some(&scaler as &dyn FeatureScaler), &features, &LabelTable::crops()).unwrap();

        assert_eq!(result.recommended_crop, "99");
        let seen = classifier.seen.lock().unwrap().clone().unwrap();
        assert_relative_eq!(seen[[0, 0]], 1.0);
        assert_relative_eq!(seen[[0, 3]], -1.0);
        assert_relative_eq!(seen[[0, 6]], 10.0);
    }

    #[test]
    fn test_recommend_passes_string_labels_through() {
        let classifier = Recording::new(PredictionResult::Label("coffee".into()));
        let features = FeatureVector::from_json(&sample()).unwrap();
        let result = recommend(&classifier, None, &features, &LabelTable::crops()).unwrap();
        assert_eq!(result.recommended_crop, "coffee");
    }
}
