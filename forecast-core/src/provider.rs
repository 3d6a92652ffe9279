use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    Config, error::ForecastError, model::ForecastQuery, provider::openmeteo::OpenMeteoClient,
    raw::RawForecastResponse,
};

pub mod openmeteo;

/// Anything that can answer a [`ForecastQuery`] with a raw response.
///
/// A single call performs at most one request. Implementations do not retry or cache;
/// the caller decides whether to try again.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, query: &ForecastQuery) -> Result<RawForecastResponse, ForecastError>;
}

#[async_trait]
impl<S: ForecastSource + ?Sized> ForecastSource for Box<S> {
    async fn fetch(&self, query: &ForecastQuery) -> Result<RawForecastResponse, ForecastError> {
        (**self).fetch(query).await
    }
}

/// Construct the Open-Meteo client, honouring a configured base URL override.
pub fn source_from_config(config: &Config) -> OpenMeteoClient {
    match &config.base_url {
        Some(base_url) => OpenMeteoClient::new().with_base_url(base_url.clone()),
        None => OpenMeteoClient::new(),
    }
}
