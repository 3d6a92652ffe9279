//! Core library for the `forecast` dashboard.
//!
//! This crate defines:
//! - The forecast query model and the Open-Meteo client behind the [`ForecastSource`] seam
//! - Normalization of the columnar API response into per-hour and per-day records
//! - Weather code classification and small derived display values
//! - A fetch session with explicit `Idle | Loading | Loaded | Failed` state
//! - Configuration handling
//!
//! It is used by `forecast-cli`, but has no dependency on any rendering layer.

pub mod condition;
pub mod config;
pub mod derived;
pub mod error;
pub mod forecast;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod raw;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub use condition::WeatherCondition;
pub use config::{Config, LocationConfig};
pub use error::{ConfigError, ForecastError};
pub use forecast::{CurrentConditions, DailyRecord, HourlyRecord, NormalizedForecast, Units};
pub use model::{Coordinates, ForecastQuery, MAX_FORECAST_DAYS, VariablePreset};
pub use normalize::{LocalZone, NormalizeOptions, Reference, normalize};
pub use provider::{ForecastSource, openmeteo::OpenMeteoClient};
pub use raw::RawForecastResponse;
pub use session::{ForecastSession, LoadState, RefreshOutcome};
