use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{error::ForecastError, model::ForecastQuery, raw::RawForecastResponse};

use super::ForecastSource;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Client for the Open-Meteo forecast endpoint.
///
/// Holds no state besides the HTTP client, so one instance can be shared or cloned freely.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    base_url: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Error body shape, e.g. `{"error": true, "reason": "Latitude must be in range..."}`.
#[derive(Debug, Deserialize)]
struct OmErrorBody {
    reason: String,
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch(&self, query: &ForecastQuery) -> Result<RawForecastResponse, ForecastError> {
        let url = query.to_url(&self.base_url)?;
        debug!(%url, "requesting forecast");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ForecastError::Transport)?;

        let status = res.status();
        debug!(status = status.as_u16(), "forecast response received");

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ForecastError::Upstream {
                status: status.as_u16(),
                body: upstream_reason(&body),
            });
        }

        let body = res.text().await.map_err(ForecastError::Transport)?;
        serde_json::from_str(&body).map_err(ForecastError::Decode)
    }
}

fn upstream_reason(body: &str) -> String {
    match serde_json::from_str::<OmErrorBody>(body) {
        Ok(err) => err.reason,
        Err(_) => truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
