//! Small display-oriented values computed from forecast fields.

use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

const COMPASS_8: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const COMPASS_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Index of the compass sector containing `degrees`, sectors centred on each point.
///
/// With 8 points, `NW` covers 292.5..337.5 and `N` starts at 337.5, so 337 is still `NW`.
fn compass_sector(degrees: f64, sectors: usize) -> usize {
    let width = 360.0 / sectors as f64;
    let normalized = degrees.rem_euclid(360.0);
    ((normalized / width).round() as usize) % sectors
}

/// Eight-point label for a meteorological wind direction (where the wind comes from).
pub fn compass_label(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "-";
    }
    COMPASS_8[compass_sector(degrees, COMPASS_8.len())]
}

pub fn compass_label_16(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "-";
    }
    COMPASS_16[compass_sector(degrees, COMPASS_16.len())]
}

/// WHO UV index exposure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UvRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvRisk {
    pub fn from_index(uv: f64) -> Self {
        match uv {
            uv if uv >= 11.0 => UvRisk::Extreme,
            uv if uv >= 8.0 => UvRisk::VeryHigh,
            uv if uv >= 6.0 => UvRisk::High,
            uv if uv >= 3.0 => UvRisk::Moderate,
            _ => UvRisk::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UvRisk::Low => "Low",
            UvRisk::Moderate => "Moderate",
            UvRisk::High => "High",
            UvRisk::VeryHigh => "Very high",
            UvRisk::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for UvRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fraction of the day between sunrise and sunset that has elapsed at `now`, in `0.0..=1.0`.
pub fn daylight_progress<A, B, C>(
    sunrise: &DateTime<A>,
    sunset: &DateTime<B>,
    now: &DateTime<C>,
) -> f64
where
    A: TimeZone,
    B: TimeZone,
    C: TimeZone,
{
    let rise = sunrise.timestamp();
    let set = sunset.timestamp();
    let now = now.timestamp();

    if set <= rise || now <= rise {
        return 0.0;
    }
    if now >= set {
        return 1.0;
    }
    (now - rise) as f64 / (set - rise) as f64
}

/// Hours between sunrise and sunset; zero when they are out of order.
pub fn daylight_hours<A: TimeZone, B: TimeZone>(sunrise: &DateTime<A>, sunset: &DateTime<B>) -> f64 {
    let seconds = sunset.timestamp() - sunrise.timestamp();
    seconds.max(0) as f64 / 3600.0
}

/// `12.3°C` style. Negative zero prints as `0.0`.
pub fn format_temperature(value: f64, unit: &str) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.1}{unit}")
}

/// "Feels like" text comparing apparent to actual temperature.
pub fn feels_like_summary(actual: f64, apparent: f64, unit: &str) -> String {
    let delta = apparent - actual;
    let comparison = if delta >= 1.0 {
        "warmer"
    } else if delta <= -1.0 {
        "colder"
    } else {
        "about the same"
    };
    format!(
        "Feels like {} ({comparison})",
        format_temperature(apparent, unit)
    )
}

/// Dew point in °C using the Magnus approximation.
pub fn dew_point(temperature_c: f64, humidity_pct: f64) -> Option<f64> {
    const A: f64 = 17.62;
    const B: f64 = 243.12;

    if !(humidity_pct > 0.0 && humidity_pct <= 100.0) {
        return None;
    }
    let gamma = (humidity_pct / 100.0).ln() + A * temperature_c / (B + temperature_c);
    Some(B * gamma / (A - gamma))
}
