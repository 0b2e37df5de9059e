//! OpenWeather client
//!
//! Two calls per report: `/weather` (current conditions, passed through)
//! and `/forecast` (5-day, 3-hourly list). No retries, no caching.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::WeatherError;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Source of raw weather payloads.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, location: &str) -> Result<Value, WeatherError>;
    async fn forecast(&self, location: &str) -> Result<Value, WeatherError>;
}

pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn fetch(&self, endpoint: &'static str, location: &str) -> Result<Value, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} q={}", url, location);

        let response = self
            .http
            .get(&url)
            .query(&[("q", location), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|source| WeatherError::Request { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} lookup for {:?} returned {}", endpoint, location, status);
            return Err(WeatherError::Upstream {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WeatherError::InvalidPayload {
                endpoint,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, location: &str) -> Result<Value, WeatherError> {
        self.fetch("weather", location).await
    }

    async fn forecast(&self, location: &str) -> Result<Value, WeatherError> {
        self.fetch("forecast", location).await
    }
}
