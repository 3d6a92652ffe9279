use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by a [`ForecastSource`](crate::ForecastSource).
///
/// All variants are recoverable: the caller shows the message and may fetch again.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The query could not be turned into a valid request URL.
    #[error("Invalid forecast request: {0}")]
    InvalidRequest(String),

    /// The upstream answered with a status outside 200..=299.
    #[error("Forecast API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The body did not match the expected forecast schema.
    #[error("Failed to decode forecast response")]
    Decode(#[source] serde_json::Error),

    /// Connection, DNS, timeout or body-read failure.
    #[error("Failed to reach forecast API")]
    Transport(#[source] reqwest::Error),
}

impl ForecastError {
    /// HTTP status of an upstream failure, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForecastError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file: {}", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file: {}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Failed to serialize configuration to TOML")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to create config directory: {}", .0.display())]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to write config file: {}", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
}

#[derive(Debug, Error)]
#[error("Unknown preset '{0}'. Supported presets: minimal, standard, detailed.")]
pub struct UnknownPreset(pub String);

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn decode_cause_is_only_in_the_source_chain() {
        let cause = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let cause_text = cause.to_string();
        let err = ForecastError::Decode(cause);

        assert_eq!(err.to_string(), "Failed to decode forecast response");
        let source = err.source().expect("decode error has a source");
        assert_eq!(source.to_string(), cause_text);
    }

    #[test]
    fn upstream_message_includes_status_and_body() {
        let err = ForecastError::Upstream {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "Forecast API returned HTTP 503: maintenance");
        assert!(err.source().is_none());
    }
}
