//! Forecast Aggregator
//!
//! Condenses the provider's 3-hourly forecast list into:
//! - `hourly`: the first 12 samples, in order
//! - `daily`: the first sample of each calendar date, scanning in order and
//!   stopping as soon as 7 distinct dates have been seen
//!
//! Pure transformation over already-fetched JSON; no I/O.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::WeatherError;

pub const HOURLY_SAMPLES: usize = 12;
pub const DAILY_SAMPLES: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: String,
    pub current: Value,
    pub hourly: Vec<Value>,
    pub daily: Vec<Value>,
}

/// Calendar date portion of a `"YYYY-MM-DD HH:MM:SS"` timestamp.
fn sample_date(sample: &Value) -> Option<&str> {
    sample
        .get("dt_txt")
        .and_then(Value::as_str)
        .and_then(|ts| ts.split(' ').next())
}

/// The forecast `list`, or an empty slice when the provider omits it.
fn samples(forecast: &Value) -> &[Value] {
    forecast
        .get("list")
        .and_then(Value::as_array)
        .map(|list| list.as_slice())
        .unwrap_or(&[])
}

pub fn hourly(forecast: &Value) -> Vec<Value> {
    samples(forecast).iter().take(HOURLY_SAMPLES).cloned().collect()
}

pub fn daily(forecast: &Value) -> Result<Vec<Value>, WeatherError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut days = Vec::with_capacity(DAILY_SAMPLES);

    for (index, sample) in samples(forecast).iter().enumerate() {
        let date = sample_date(sample).ok_or(WeatherError::MissingTimestamp { index })?;
        if seen.insert(date) {
            days.push(sample.clone());
        }
        if seen.len() >= DAILY_SAMPLES {
            break;
        }
    }

    Ok(days)
}

pub fn aggregate(
    location: &str,
    current: Value,
    forecast: &Value,
) -> Result<WeatherReport, WeatherError> {
    Ok(WeatherReport {
        location: location.to_string(),
        current,
        hourly: hourly(forecast),
        daily: daily(forecast)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// `per_day` samples for each of `days` consecutive dates, 3 hours apart.
    fn forecast(days: usize, per_day: usize) -> Value {
        let list: Vec<Value> = (0..days)
            .flat_map(|d| {
                (0..per_day).map(move |h| {
                    json!({
                        "dt_txt": format!("2024-06-{:02} {:02}:00:00", d + 1, h * 3),
                        "main": { "temp": 25.0 + h as f64 },
                        "seq": d * per_day + h,
                    })
                })
            })
            .collect();
        json!({ "cod": "200", "list": list })
    }

    fn seqs(samples: &[Value]) -> Vec<u64> {
        samples.iter().map(|s| s["seq"].as_u64().unwrap()).collect()
    }

    #[test]
    fn test_hourly_short_list_is_whole_list() {
        let f = forecast(1, 5);
        assert_eq!(hourly(&f), f["list"].as_array().unwrap().clone());
    }

    #[test]
    fn test_hourly_truncates_to_twelve() {
        let f = forecast(5, 8);
        assert_eq!(seqs(&hourly(&f)), (0..12).collect::<Vec<u64>>());
    }

    #[test]
    fn test_daily_first_sample_per_date_capped_at_seven() {
        // 20 samples over 10 dates
        let f = forecast(10, 2);
        let days = daily(&f).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(seqs(&days), vec![0, 2, 4, 6, 8, 10, 12]);
        assert_eq!(days[6]["dt_txt"], "2024-06-07 00:00:00");
    }

    #[test]
    fn test_daily_stops_before_inspecting_later_samples() {
        let mut f = forecast(7, 1);
        // Unreadable samples after the 7th date are never looked at
        f["list"].as_array_mut().unwrap().push(json!({ "no_timestamp": true }));
        f["list"].as_array_mut().unwrap().push(json!({ "dt_txt": "2024-06-01 21:00:00" }));
        assert_eq!(daily(&f).unwrap().len(), 7);
    }

    #[test]
    fn test_daily_missing_timestamp_before_cutoff_is_error() {
        let f = json!({ "list": [
            { "dt_txt": "2024-06-01 00:00:00" },
            { "main": {} },
        ]});
        assert!(matches!(daily(&f), Err(WeatherError::MissingTimestamp { index: 1 })));
    }

    #[test]
    fn test_missing_list_yields_empty_views() {
        let report = aggregate("Dhaka", json!({"name": "Dhaka"}), &json!({"cod": "200"})).unwrap();
        assert_eq!(report.location, "Dhaka");
        assert_eq!(report.current["name"], "Dhaka");
        assert!(report.hourly.is_empty());
        assert!(report.daily.is_empty());
    }

    #[test]
    fn test_report_serializes_expected_keys() {
        let report = aggregate("Khulna", json!({}), &forecast(2, 3)).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        for key in ["location", "current", "hourly", "daily"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["daily"].as_array().unwrap().len(), 2);
    }
}
