//! Fetch lifecycle for one dashboard screen.
//!
//! A [`ForecastSession`] owns one source and one query. [`ForecastSession::refresh`] moves it
//! through `Idle -> Loading -> Loaded | Failed`. Only one refresh runs at a time: a refresh
//! requested while another is outstanding is ignored. Dropping a refresh future before it
//! completes puts the session back into whatever state it was in before.

use std::{
    error::Error,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{info, warn};

use crate::{
    forecast::NormalizedForecast,
    model::ForecastQuery,
    normalize::{NormalizeOptions, normalize},
    provider::ForecastSource,
};

#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Arc<NormalizedForecast>),
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Loaded,
    Failed,
    /// Another refresh was already running; nothing was requested.
    AlreadyInFlight,
}

#[derive(Debug)]
pub struct ForecastSession<S> {
    source: S,
    query: ForecastQuery,
    options: NormalizeOptions,
    state: Mutex<LoadState>,
}

impl<S: ForecastSource> ForecastSession<S> {
    pub fn new(source: S, query: ForecastQuery, options: NormalizeOptions) -> Self {
        Self {
            source,
            query,
            options,
            state: Mutex::new(LoadState::Idle),
        }
    }

    pub fn query(&self) -> &ForecastQuery {
        &self.query
    }

    pub fn state(&self) -> LoadState {
        lock(&self.state).clone()
    }

    /// Latest successfully loaded forecast, if the session currently holds one.
    pub fn forecast(&self) -> Option<Arc<NormalizedForecast>> {
        match &*lock(&self.state) {
            LoadState::Loaded(forecast) => Some(Arc::clone(forecast)),
            _ => None,
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(in_flight) = InFlight::begin(&self.state) else {
            info!("refresh ignored, a fetch is already in flight");
            return RefreshOutcome::AlreadyInFlight;
        };

        match self.source.fetch(&self.query).await {
            Ok(raw) => {
                let forecast = normalize(&raw, &self.options);
                info!(
                    hourly = forecast.hourly.len(),
                    daily = forecast.daily.len(),
                    "forecast loaded"
                );
                in_flight.finish(LoadState::Loaded(Arc::new(forecast)));
                RefreshOutcome::Loaded
            }
            Err(err) => {
                warn!(error = %err, "forecast fetch failed");
                in_flight.finish(LoadState::Failed(failure_message(&err)));
                RefreshOutcome::Failed
            }
        }
    }
}

/// Display text of `err` followed by each of its causes, `": "` separated.
fn failure_message(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn lock(state: &Mutex<LoadState>) -> MutexGuard<'_, LoadState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks the session as loading for as long as it lives.
///
/// Restores the previous state on drop unless [`InFlight::finish`] was called.
struct InFlight<'a> {
    state: &'a Mutex<LoadState>,
    previous: Option<LoadState>,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a Mutex<LoadState>) -> Option<Self> {
        let mut current = lock(state);
        if current.is_loading() {
            return None;
        }
        let previous = std::mem::replace(&mut *current, LoadState::Loading);
        Some(Self {
            state,
            previous: Some(previous),
        })
    }

    fn finish(mut self, next: LoadState) {
        self.previous = None;
        *lock(self.state) = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *lock(self.state) = previous;
        }
    }
}
