//! Weather proxy: upstream client plus forecast aggregation

pub mod client;
pub mod forecast;

pub use client::{OpenWeatherClient, WeatherSource, DEFAULT_BASE_URL};
pub use forecast::{aggregate, WeatherReport, DAILY_SAMPLES, HOURLY_SAMPLES};

/// Used when the caller does not name a location.
pub const DEFAULT_LOCATION: &str = "Dhaka";
