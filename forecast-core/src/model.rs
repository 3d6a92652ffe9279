use std::{fmt, str::FromStr};

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, UnknownPreset};

/// Open-Meteo does not serve more than this many forecast days.
pub const MAX_FORECAST_DAYS: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    fn validate(&self) -> Result<(), ForecastError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ForecastError::InvalidRequest(format!(
                "latitude {} is outside -90..=90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ForecastError::InvalidRequest(format!(
                "longitude {} is outside -180..=180",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Named sets of upstream variables, from a compact dashboard to a detailed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariablePreset {
    Minimal,
    #[default]
    Standard,
    Detailed,
}

impl VariablePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariablePreset::Minimal => "minimal",
            VariablePreset::Standard => "standard",
            VariablePreset::Detailed => "detailed",
        }
    }

    pub const fn all() -> &'static [VariablePreset] {
        &[
            VariablePreset::Minimal,
            VariablePreset::Standard,
            VariablePreset::Detailed,
        ]
    }

    pub fn current(&self) -> &'static [&'static str] {
        match self {
            VariablePreset::Minimal => &[
                "temperature_2m",
                "apparent_temperature",
                "is_day",
                "weather_code",
                "wind_speed_10m",
                "wind_direction_10m",
            ],
            VariablePreset::Standard => &[
                "temperature_2m",
                "relative_humidity_2m",
                "apparent_temperature",
                "is_day",
                "precipitation",
                "weather_code",
                "cloud_cover",
                "pressure_msl",
                "surface_pressure",
                "wind_speed_10m",
                "wind_direction_10m",
                "uv_index",
            ],
            VariablePreset::Detailed => &[
                "temperature_2m",
                "apparent_temperature",
                "relative_humidity_2m",
                "is_day",
                "precipitation",
                "rain",
                "showers",
                "snowfall",
                "weather_code",
                "cloud_cover",
                "surface_pressure",
                "wind_speed_10m",
                "wind_direction_10m",
                "wind_gusts_10m",
                "visibility",
                "uv_index",
            ],
        }
    }

    pub fn hourly(&self) -> &'static [&'static str] {
        match self {
            VariablePreset::Minimal => &["temperature_2m", "weather_code"],
            VariablePreset::Standard => &[
                "temperature_2m",
                "precipitation_probability",
                "weather_code",
            ],
            VariablePreset::Detailed => &[
                "temperature_2m",
                "apparent_temperature",
                "relative_humidity_2m",
                "precipitation_probability",
                "precipitation",
                "weather_code",
                "wind_speed_10m",
                "wind_direction_10m",
                "wind_gusts_10m",
                "surface_pressure",
                "cloud_cover",
                "visibility",
                "is_day",
            ],
        }
    }

    pub fn daily(&self) -> &'static [&'static str] {
        match self {
            VariablePreset::Minimal => &[
                "weather_code",
                "temperature_2m_max",
                "temperature_2m_min",
                "apparent_temperature_max",
                "uv_index_max",
                "sunrise",
                "sunset",
            ],
            VariablePreset::Standard => &[
                "weather_code",
                "temperature_2m_max",
                "temperature_2m_min",
                "sunrise",
                "sunset",
                "uv_index_max",
                "precipitation_probability_max",
                "wind_speed_10m_max",
            ],
            VariablePreset::Detailed => &[
                "weather_code",
                "temperature_2m_max",
                "temperature_2m_min",
                "apparent_temperature_max",
                "apparent_temperature_min",
                "sunrise",
                "sunset",
                "daylight_duration",
                "uv_index_max",
                "precipitation_sum",
                "precipitation_probability_max",
                "wind_speed_10m_max",
                "wind_gusts_10m_max",
                "wind_direction_10m_dominant",
            ],
        }
    }
}

impl fmt::Display for VariablePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariablePreset {
    type Err = UnknownPreset;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "minimal" => Ok(VariablePreset::Minimal),
            "standard" => Ok(VariablePreset::Standard),
            "detailed" => Ok(VariablePreset::Detailed),
            _ => Err(UnknownPreset(value.to_string())),
        }
    }
}

/// One forecast request. Built once, never mutated after being handed to a source.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastQuery {
    location: Coordinates,
    current: Vec<String>,
    hourly: Vec<String>,
    daily: Vec<String>,
    timezone: String,
    forecast_days: u8,
}

impl ForecastQuery {
    /// A query with no variables selected. Add sections with the `with_*` methods.
    pub fn new(location: Coordinates, timezone: impl Into<String>, forecast_days: u8) -> Self {
        Self {
            location,
            current: Vec::new(),
            hourly: Vec::new(),
            daily: Vec::new(),
            timezone: timezone.into(),
            forecast_days,
        }
    }

    pub fn from_preset(
        location: Coordinates,
        timezone: impl Into<String>,
        forecast_days: u8,
        preset: VariablePreset,
    ) -> Self {
        Self::new(location, timezone, forecast_days)
            .with_current(preset.current().iter().copied())
            .with_hourly(preset.hourly().iter().copied())
            .with_daily(preset.daily().iter().copied())
    }

    pub fn with_current<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hourly<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hourly = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_daily<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.daily = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn location(&self) -> Coordinates {
        self.location
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn hourly(&self) -> &[String] {
        &self.hourly
    }

    pub fn daily(&self) -> &[String] {
        &self.daily
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        self.location.validate()?;

        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast_days) {
            return Err(ForecastError::InvalidRequest(format!(
                "forecast_days {} is outside 1..={MAX_FORECAST_DAYS}",
                self.forecast_days
            )));
        }

        if self.timezone.trim().is_empty() {
            return Err(ForecastError::InvalidRequest(
                "timezone must not be empty".to_string(),
            ));
        }

        let sections = [
            ("current", &self.current),
            ("hourly", &self.hourly),
            ("daily", &self.daily),
        ];
        for (section, vars) in sections {
            if let Some(bad) = vars.iter().find(|v| !is_variable_name(v)) {
                return Err(ForecastError::InvalidRequest(format!(
                    "invalid {section} variable '{bad}'"
                )));
            }
        }

        Ok(())
    }

    /// Query parameters in upstream wire names. Empty sections are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.location.latitude.to_string()),
            ("longitude", self.location.longitude.to_string()),
        ];

        for (name, vars) in [
            ("current", &self.current),
            ("hourly", &self.hourly),
            ("daily", &self.daily),
        ] {
            if !vars.is_empty() {
                pairs.push((name, vars.join(",")));
            }
        }

        pairs.push(("timezone", self.timezone.clone()));
        pairs.push(("forecast_days", self.forecast_days.to_string()));
        pairs
    }

    /// Validate and serialize against `base_url`.
    pub fn to_url(&self, base_url: &str) -> Result<Url, ForecastError> {
        self.validate()?;

        Url::parse_with_params(base_url, self.query_pairs()).map_err(|err| {
            ForecastError::InvalidRequest(format!("cannot build URL from '{base_url}': {err}"))
        })
    }
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
