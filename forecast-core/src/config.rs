use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    model::{Coordinates, ForecastQuery, VariablePreset},
    normalize::NormalizeOptions,
};

/// A named place to forecast for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "Sapporo".to_string(),
            latitude: 43.0642,
            longitude: 141.3469,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// timezone = "Asia/Tokyo"
/// forecast_days = 7
/// preset = "standard"
///
/// [location]
/// name = "Sapporo"
/// latitude = 43.0642
/// longitude = 141.3469
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timezone: String,
    pub forecast_days: u8,
    pub preset: VariablePreset,
    /// Hourly records shown after the observation time.
    pub hourly_window: usize,
    /// Daily records shown.
    pub daily_limit: usize,
    /// Override for the forecast endpoint, e.g. a self-hosted Open-Meteo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "Asia/Tokyo".to_string(),
            forecast_days: 7,
            preset: VariablePreset::Standard,
            hourly_window: 24,
            daily_limit: 7,
            base_url: None,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;

        toml::from_str(&contents).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| ConfigError::CreateDir(parent.to_path_buf(), err))?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|err| ConfigError::Write(path.to_path_buf(), err))
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "forecast-dashboard", "forecast-cli")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Query for the configured location and preset.
    pub fn query(&self) -> ForecastQuery {
        self.query_with(self.preset)
    }

    pub fn query_with(&self, preset: VariablePreset) -> ForecastQuery {
        ForecastQuery::from_preset(
            self.location.coordinates(),
            self.timezone.clone(),
            self.forecast_days,
            preset,
        )
    }

    /// Dashboard options with the configured window and limit.
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            hourly_window: Some(self.hourly_window),
            daily_limit: Some(self.daily_limit),
            ..NormalizeOptions::dashboard()
        }
    }
}
