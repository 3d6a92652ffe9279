use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, ForecastSession, LoadState, MAX_FORECAST_DAYS, RefreshOutcome, VariablePreset,
    provider::source_from_config,
};
use inquire::{CustomType, Select, Text};
use tracing::debug;

use crate::render::Dashboard;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Forecast dashboard")]
pub struct Cli {
    /// Log request and normalization details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and show the forecast for the configured location.
    Show {
        /// Variable preset: minimal, standard or detailed.
        #[arg(long)]
        preset: Option<VariablePreset>,

        /// Number of forecast days to request (1-16).
        #[arg(long)]
        days: Option<u8>,

        /// Print the normalized forecast as JSON instead of the dashboard.
        #[arg(long)]
        json: bool,
    },

    /// Interactively set location, timezone and preset.
    Configure,

    /// Print the path of the configuration file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Show { preset, days, json } => show(preset, days, json).await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                let path = Config::config_file_path()?;
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

async fn show(preset: Option<VariablePreset>, days: Option<u8>, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(days) = days {
        config.forecast_days = days;
    }
    let preset = preset.unwrap_or(config.preset);
    debug!(%preset, days = config.forecast_days, "showing forecast");

    let session = ForecastSession::new(
        source_from_config(&config),
        config.query_with(preset),
        config.normalize_options(),
    );

    if session.refresh().await == RefreshOutcome::AlreadyInFlight {
        bail!("A forecast request is already running");
    }

    let forecast = match session.state() {
        LoadState::Loaded(forecast) => forecast,
        LoadState::Failed(message) => {
            bail!("{message}\nHint: run `forecast show` again to retry.")
        }
        LoadState::Idle | LoadState::Loading => bail!("Forecast did not finish loading"),
    };

    if json {
        let out = serde_json::to_string_pretty(forecast.as_ref())
            .context("Failed to serialize forecast")?;
        println!("{out}");
    } else {
        print!("{}", Dashboard::new(&forecast, &config.location.name, Utc::now()));
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    config.location.name = Text::new("Location name:")
        .with_default(&config.location.name)
        .prompt()?;
    config.location.latitude = CustomType::<f64>::new("Latitude:")
        .with_default(config.location.latitude)
        .with_error_message("Please enter a number, e.g. 43.0642")
        .prompt()?;
    config.location.longitude = CustomType::<f64>::new("Longitude:")
        .with_default(config.location.longitude)
        .with_error_message("Please enter a number, e.g. 141.3469")
        .prompt()?;
    config.timezone = Text::new("Timezone (IANA name or \"auto\"):")
        .with_default(&config.timezone)
        .prompt()?;
    config.forecast_days = CustomType::<u8>::new(&format!("Forecast days (1-{MAX_FORECAST_DAYS}):"))
        .with_default(config.forecast_days)
        .with_error_message("Please enter a whole number of days")
        .prompt()?;

    let presets = VariablePreset::all().to_vec();
    let cursor = presets.iter().position(|p| *p == config.preset).unwrap_or(0);
    config.preset = Select::new("Dashboard detail:", presets)
        .with_starting_cursor(cursor)
        .prompt()?;

    config
        .query()
        .validate()
        .context("Configuration was not saved")?;

    let path = config.save().context("Failed to save configuration")?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
