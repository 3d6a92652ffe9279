//! WMO weather code classification.
//!
//! Open-Meteo reports sky and precipitation state as a WMO 4677 code. This module maps those
//! codes onto a small set of display categories. The mapping is total: any integer that is
//! not in [`WMO_CODES`] classifies as [`WeatherCondition::Unknown`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

use WeatherCondition::*;

/// Every documented code, its category and its WMO description. Each code appears once.
pub const WMO_CODES: &[(i64, WeatherCondition, &str)] = &[
    (0, Clear, "Clear sky"),
    (1, Clear, "Mainly clear"),
    (2, Cloudy, "Partly cloudy"),
    (3, Cloudy, "Overcast"),
    (45, Fog, "Fog"),
    (48, Fog, "Depositing rime fog"),
    (51, Drizzle, "Light drizzle"),
    (53, Drizzle, "Moderate drizzle"),
    (55, Drizzle, "Dense drizzle"),
    (56, Drizzle, "Light freezing drizzle"),
    (57, Drizzle, "Dense freezing drizzle"),
    (61, Rain, "Slight rain"),
    (63, Rain, "Moderate rain"),
    (65, Rain, "Heavy rain"),
    (66, Rain, "Light freezing rain"),
    (67, Rain, "Heavy freezing rain"),
    (71, Snow, "Slight snow fall"),
    (73, Snow, "Moderate snow fall"),
    (75, Snow, "Heavy snow fall"),
    (77, Snow, "Snow grains"),
    (80, Rain, "Slight rain showers"),
    (81, Rain, "Moderate rain showers"),
    (82, Rain, "Violent rain showers"),
    (85, Snow, "Slight snow showers"),
    (86, Snow, "Heavy snow showers"),
    (95, Thunderstorm, "Thunderstorm"),
    (96, Thunderstorm, "Thunderstorm with slight hail"),
    (99, Thunderstorm, "Thunderstorm with heavy hail"),
];

fn lookup(code: i64) -> Option<&'static (i64, WeatherCondition, &'static str)> {
    WMO_CODES.iter().find(|(known, _, _)| *known == code)
}

/// Fine-grained WMO description of `code`, or `"Unknown"`.
pub fn describe_code(code: i64) -> &'static str {
    lookup(code).map_or("Unknown", |(_, _, text)| *text)
}

impl WeatherCondition {
    pub fn from_code(code: i64) -> Self {
        lookup(code).map_or(Unknown, |(_, condition, _)| *condition)
    }

    pub fn label(self) -> &'static str {
        match self {
            Clear => "Clear",
            Cloudy => "Cloudy",
            Fog => "Fog",
            Drizzle => "Drizzle",
            Rain => "Rain",
            Snow => "Snow",
            Thunderstorm => "Thunderstorm",
            Unknown => "Unknown",
        }
    }

    /// SF Symbols style icon identifier.
    pub fn icon(self, is_day: bool) -> &'static str {
        match self {
            Clear if is_day => "sun.max.fill",
            Clear => "moon.stars.fill",
            Cloudy if is_day => "cloud.sun.fill",
            Cloudy => "cloud.moon.fill",
            Fog => "cloud.fog.fill",
            Drizzle => "cloud.drizzle.fill",
            Rain => "cloud.rain.fill",
            Snow => "cloud.snow.fill",
            Thunderstorm => "cloud.bolt.rain.fill",
            Unknown => "questionmark.circle.fill",
        }
    }

    /// Terminal-friendly glyph for the same category.
    pub fn glyph(self, is_day: bool) -> &'static str {
        match self {
            Clear if is_day => "\u{2600}",
            Clear => "\u{263E}",
            Cloudy => "\u{2601}",
            Fog => "\u{2592}",
            Drizzle => "\u{2026}",
            Rain => "\u{2602}",
            Snow => "\u{2744}",
            Thunderstorm => "\u{26A1}",
            Unknown => "?",
        }
    }

    /// Accent color as a hex string.
    pub fn color(self) -> &'static str {
        match self {
            Clear => "#FFD700",
            Cloudy => "#87CEEB",
            Fog => "#B0C4DE",
            Drizzle => "#778899",
            Rain => "#4682B4",
            Snow => "#E0FFFF",
            Thunderstorm => "#483D8B",
            Unknown => "#808080",
        }
    }
}
