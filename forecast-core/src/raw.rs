//! Wire schema of the Open-Meteo `/v1/forecast` response.
//!
//! Sections are columnar: `time` plus one array per requested variable, aligned by index.
//! Arrays for variables that were not requested are absent. Individual entries may be
//! `null` when the upstream has no value for that step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unit strings keyed by variable name, e.g. `"temperature_2m" -> "°C"`.
pub type RawUnits = BTreeMap<String, String>;

/// A variable column. `None` when not requested, inner `None` for null entries.
pub type Column<T> = Option<Vec<Option<T>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub generationtime_ms: Option<f64>,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub timezone: Option<String>,
    pub timezone_abbreviation: Option<String>,

    pub current: Option<RawCurrent>,
    pub current_units: Option<RawUnits>,
    /// Legacy `current_weather=true` block.
    pub current_weather: Option<RawCurrentWeather>,

    pub hourly: Option<RawHourly>,
    pub hourly_units: Option<RawUnits>,

    pub daily: Option<RawDaily>,
    pub daily_units: Option<RawUnits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCurrent {
    pub time: String,
    pub interval: Option<i64>,
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    #[serde(alias = "relativehumidity_2m")]
    pub relative_humidity_2m: Option<f64>,
    pub is_day: Option<i64>,
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
    pub showers: Option<f64>,
    pub snowfall: Option<f64>,
    #[serde(alias = "weathercode")]
    pub weather_code: Option<i64>,
    #[serde(alias = "cloudcover")]
    pub cloud_cover: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub pressure_msl: Option<f64>,
    #[serde(alias = "windspeed_10m")]
    pub wind_speed_10m: Option<f64>,
    #[serde(alias = "winddirection_10m")]
    pub wind_direction_10m: Option<f64>,
    #[serde(alias = "windgusts_10m")]
    pub wind_gusts_10m: Option<f64>,
    pub visibility: Option<f64>,
    pub uv_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCurrentWeather {
    pub time: String,
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub winddirection: Option<f64>,
    pub weathercode: Option<i64>,
    pub is_day: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHourly {
    pub time: Vec<String>,
    pub temperature_2m: Column<f64>,
    pub apparent_temperature: Column<f64>,
    #[serde(alias = "relativehumidity_2m")]
    pub relative_humidity_2m: Column<f64>,
    pub precipitation_probability: Column<f64>,
    pub precipitation: Column<f64>,
    #[serde(alias = "weathercode")]
    pub weather_code: Column<i64>,
    #[serde(alias = "windspeed_10m")]
    pub wind_speed_10m: Column<f64>,
    #[serde(alias = "winddirection_10m")]
    pub wind_direction_10m: Column<f64>,
    #[serde(alias = "windgusts_10m")]
    pub wind_gusts_10m: Column<f64>,
    pub surface_pressure: Column<f64>,
    #[serde(alias = "cloudcover")]
    pub cloud_cover: Column<f64>,
    pub visibility: Column<f64>,
    pub uv_index: Column<f64>,
    pub is_day: Column<i64>,
}

impl RawHourly {
    /// Length every column agrees on; anything past it is misaligned.
    pub fn common_len(&self) -> usize {
        [
            len(&self.temperature_2m),
            len(&self.apparent_temperature),
            len(&self.relative_humidity_2m),
            len(&self.precipitation_probability),
            len(&self.precipitation),
            len(&self.weather_code),
            len(&self.wind_speed_10m),
            len(&self.wind_direction_10m),
            len(&self.wind_gusts_10m),
            len(&self.surface_pressure),
            len(&self.cloud_cover),
            len(&self.visibility),
            len(&self.uv_index),
            len(&self.is_day),
        ]
        .into_iter()
        .flatten()
        .fold(self.time.len(), usize::min)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDaily {
    pub time: Vec<String>,
    #[serde(alias = "weathercode")]
    pub weather_code: Column<i64>,
    pub temperature_2m_max: Column<f64>,
    pub temperature_2m_min: Column<f64>,
    pub apparent_temperature_max: Column<f64>,
    pub apparent_temperature_min: Column<f64>,
    pub sunrise: Column<String>,
    pub sunset: Column<String>,
    pub daylight_duration: Column<f64>,
    pub uv_index_max: Column<f64>,
    pub precipitation_sum: Column<f64>,
    pub precipitation_probability_max: Column<f64>,
    #[serde(alias = "windspeed_10m_max")]
    pub wind_speed_10m_max: Column<f64>,
    #[serde(alias = "windgusts_10m_max")]
    pub wind_gusts_10m_max: Column<f64>,
    #[serde(alias = "winddirection_10m_dominant")]
    pub wind_direction_10m_dominant: Column<f64>,
}

impl RawDaily {
    pub fn common_len(&self) -> usize {
        [
            len(&self.weather_code),
            len(&self.temperature_2m_max),
            len(&self.temperature_2m_min),
            len(&self.apparent_temperature_max),
            len(&self.apparent_temperature_min),
            len(&self.sunrise),
            len(&self.sunset),
            len(&self.daylight_duration),
            len(&self.uv_index_max),
            len(&self.precipitation_sum),
            len(&self.precipitation_probability_max),
            len(&self.wind_speed_10m_max),
            len(&self.wind_gusts_10m_max),
            len(&self.wind_direction_10m_dominant),
        ]
        .into_iter()
        .flatten()
        .fold(self.time.len(), usize::min)
    }
}

fn len<T>(column: &Column<T>) -> Option<usize> {
    column.as_ref().map(Vec::len)
}

/// Value at `index`, flattening "not requested" and "null" into `None`.
pub(crate) fn value_at<T: Copy>(column: &Column<T>, index: usize) -> Option<T> {
    column.as_ref()?.get(index).copied().flatten()
}

pub(crate) fn text_at(column: &Column<String>, index: usize) -> Option<&str> {
    column.as_ref()?.get(index)?.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../testdata/sapporo_standard.json");

    #[test]
    fn decodes_full_payload() {
        let raw: RawForecastResponse = serde_json::from_str(FIXTURE).expect("fixture decodes");

        assert_eq!(raw.utc_offset_seconds, 32400);
        assert_eq!(raw.timezone.as_deref(), Some("Asia/Tokyo"));

        let current = raw.current.as_ref().expect("current block");
        assert_eq!(current.weather_code, Some(71));
        assert_eq!(current.relative_humidity_2m, Some(71.0));

        let hourly = raw.hourly.as_ref().expect("hourly block");
        assert_eq!(hourly.time.len(), 48);
        assert!(hourly.apparent_temperature.is_none());
        assert_eq!(hourly.common_len(), 48);

        let daily = raw.daily.as_ref().expect("daily block");
        assert_eq!(daily.common_len(), 7);
        assert_eq!(text_at(&daily.sunrise, 0), Some("2025-01-15T06:58"));
    }

    #[test]
    fn null_entries_and_legacy_names_decode() {
        let raw: RawForecastResponse = serde_json::from_str(
            r#"{
                "latitude": 1.0,
                "longitude": 2.0,
                "hourly": {
                    "time": ["2025-01-01T00:00", "2025-01-01T01:00"],
                    "weathercode": [3, null],
                    "windspeed_10m": [4.5, 5.0]
                }
            }"#,
        )
        .expect("payload decodes");

        let hourly = raw.hourly.expect("hourly block");
        assert_eq!(value_at(&hourly.weather_code, 0), Some(3));
        assert_eq!(value_at(&hourly.weather_code, 1), None);
        assert_eq!(value_at(&hourly.wind_speed_10m, 1), Some(5.0));
        assert_eq!(value_at(&hourly.temperature_2m, 0), None);
        assert_eq!(raw.utc_offset_seconds, 0);
    }

    #[test]
    fn common_len_is_minimum_of_present_columns() {
        let hourly = RawHourly {
            time: vec!["a".into(); 5],
            temperature_2m: Some(vec![Some(1.0); 5]),
            weather_code: Some(vec![Some(0); 4]),
            ..RawHourly::default()
        };
        assert_eq!(hourly.common_len(), 4);

        let daily = RawDaily {
            time: vec!["a".into(); 3],
            ..RawDaily::default()
        };
        assert_eq!(daily.common_len(), 3);
    }

    #[test]
    fn schema_mismatch_is_an_error() {
        let err = serde_json::from_str::<RawForecastResponse>(r#"{"latitude": "north"}"#);
        assert!(err.is_err());
    }
}
