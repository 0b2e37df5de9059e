//! Service configuration from environment variables
//!
//! Only the weather API key is required; everything else has a default
//! suitable for running from the directory holding the model artifacts.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::weather::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub openweather_api_key: String,
    pub port: u16,
    pub disease_model_path: PathBuf,
    pub crop_model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub weather_base_url: String,
    pub weather_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openweather_api_key = lookup("OPENWEATHER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .context("Missing OPENWEATHER_API_KEY environment variable")?;

        let path = |key: &str, default: &str| PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()));

        Ok(Self {
            openweather_api_key,
            port: parse_or(&lookup, "PORT", 8080)?,
            disease_model_path: path("DISEASE_MODEL_PATH", "model.onnx"),
            crop_model_path: path("CROP_MODEL_PATH", "crop_model.onnx"),
            scaler_path: path("SCALER_PATH", "scaler.json"),
            weather_base_url: lookup("WEATHER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            weather_timeout: Duration::from_secs(parse_or(&lookup, "WEATHER_TIMEOUT_SECS", 10)?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServiceConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("OPENWEATHER_API_KEY", "abc123")]).unwrap();
        assert_eq!(cfg.openweather_api_key, "abc123");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.crop_model_path, PathBuf::from("crop_model.onnx"));
        assert_eq!(cfg.weather_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.weather_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_api_key_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("OPENWEATHER_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let cfg = config(&[
            ("OPENWEATHER_API_KEY", "k"),
            ("PORT", "3000"),
            ("DISEASE_MODEL_PATH", "/models/plant.onnx"),
            ("WEATHER_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.disease_model_path, PathBuf::from("/models/plant.onnx"));
        assert_eq!(cfg.weather_timeout, Duration::from_secs(3));

        let err = config(&[("OPENWEATHER_API_KEY", "k"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
