use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::{condition::WeatherCondition, model::Coordinates};

/// One fetch worth of forecast data, one record per timestep.
///
/// Produced by [`normalize`](crate::normalize::normalize) and never mutated; a new fetch
/// yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedForecast {
    pub location: Coordinates,
    pub elevation: Option<f64>,
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub units: Units,
    pub current: Option<CurrentConditions>,
    pub hourly: Vec<HourlyRecord>,
    pub daily: Vec<DailyRecord>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Units {
    pub current: BTreeMap<String, String>,
    pub hourly: BTreeMap<String, String>,
    pub daily: BTreeMap<String, String>,
}

impl Units {
    /// Temperature unit, falling back to Celsius which is the upstream default.
    pub fn temperature(&self) -> &str {
        self.lookup(&["temperature_2m", "temperature_2m_max"])
            .unwrap_or("°C")
    }

    pub fn wind_speed(&self) -> &str {
        self.lookup(&["wind_speed_10m", "wind_speed_10m_max"])
            .unwrap_or("km/h")
    }

    pub fn precipitation(&self) -> &str {
        self.lookup(&["precipitation", "precipitation_sum"])
            .unwrap_or("mm")
    }

    pub fn pressure(&self) -> &str {
        self.lookup(&["surface_pressure", "pressure_msl"])
            .unwrap_or("hPa")
    }

    fn lookup(&self, keys: &[&str]) -> Option<&str> {
        [&self.current, &self.hourly, &self.daily]
            .into_iter()
            .flat_map(|section| keys.iter().filter_map(move |key| section.get(*key)))
            .map(String::as_str)
            .next()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub observed_at: DateTime<FixedOffset>,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub is_day: Option<bool>,
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
    pub showers: Option<f64>,
    pub snowfall: Option<f64>,
    pub weather_code: Option<i64>,
    pub cloud_cover: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub sea_level_pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub visibility: Option<f64>,
    pub uv_index: Option<f64>,
}

impl CurrentConditions {
    pub fn condition(&self) -> WeatherCondition {
        condition_of(self.weather_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    pub time: DateTime<FixedOffset>,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub visibility: Option<f64>,
    pub uv_index: Option<f64>,
    pub is_day: Option<bool>,
}

impl HourlyRecord {
    pub fn condition(&self) -> WeatherCondition {
        condition_of(self.weather_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub weather_code: Option<i64>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub apparent_temperature_max: Option<f64>,
    pub apparent_temperature_min: Option<f64>,
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
    /// Seconds of daylight as reported upstream.
    pub daylight_duration: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_gusts_max: Option<f64>,
    pub wind_direction_dominant: Option<f64>,
}

impl DailyRecord {
    pub fn condition(&self) -> WeatherCondition {
        condition_of(self.weather_code)
    }
}

fn condition_of(code: Option<i64>) -> WeatherCondition {
    code.map_or(WeatherCondition::Unknown, WeatherCondition::from_code)
}
