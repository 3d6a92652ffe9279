//! Plain-text dashboard for a normalized forecast.

use std::fmt;

use chrono::{DateTime, Utc};
use forecast_core::{
    CurrentConditions, DailyRecord, HourlyRecord, NormalizedForecast,
    condition::describe_code,
    derived::{
        UvRisk, compass_label, daylight_progress, dew_point, feels_like_summary,
        format_temperature,
    },
};

const MISSING: &str = "-";

pub struct Dashboard<'a> {
    forecast: &'a NormalizedForecast,
    location_name: &'a str,
    now: DateTime<Utc>,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        forecast: &'a NormalizedForecast,
        location_name: &'a str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            forecast,
            location_name,
            now,
        }
    }

    fn temp(&self, value: Option<f64>) -> String {
        value.map_or_else(
            || MISSING.to_string(),
            |v| format_temperature(v, self.forecast.units.temperature()),
        )
    }

    fn write_current(
        &self,
        f: &mut fmt::Formatter<'_>,
        current: &CurrentConditions,
    ) -> fmt::Result {
        let units = &self.forecast.units;
        let is_day = current.is_day.unwrap_or(true);
        let condition = current.condition();
        let description = current.weather_code.map_or(MISSING, describe_code);

        writeln!(f, "Observed {}", current.observed_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(
            f,
            "Now  {} {} ({description})",
            condition.glyph(is_day),
            condition.label()
        )?;

        let feels = match (current.temperature, current.apparent_temperature) {
            (Some(actual), Some(apparent)) => {
                feels_like_summary(actual, apparent, units.temperature())
            }
            _ => String::new(),
        };
        writeln!(f, "  Temperature  {:<9} {feels}", self.temp(current.temperature))?;

        if let Some(humidity) = current.humidity {
            let dew = current
                .temperature
                .and_then(|t| dew_point(t, humidity))
                .map(|dp| format!("Dew point {}", format_temperature(dp, "°C")))
                .unwrap_or_default();
            writeln!(f, "  Humidity     {:<9} {dew}", format!("{humidity:.0}%"))?;
        }

        if let Some(speed) = current.wind_speed {
            let direction = current.wind_direction.map_or(MISSING, compass_label);
            let gusts = current
                .wind_gusts
                .map(|g| format!(" gusts {g:.1}"))
                .unwrap_or_default();
            writeln!(
                f,
                "  Wind         {speed:.1} {} {direction}{gusts}",
                units.wind_speed()
            )?;
        }

        if let Some(uv) = current.uv_index {
            writeln!(f, "  UV index     {uv:.1} ({})", UvRisk::from_index(uv))?;
        }

        if let Some(pressure) = current.surface_pressure.or(current.sea_level_pressure) {
            writeln!(f, "  Pressure     {pressure:.1} {}", units.pressure())?;
        }

        if let Some(cover) = current.cloud_cover {
            writeln!(f, "  Cloud cover  {cover:.0}%")?;
        }

        if let Some(precipitation) = current.precipitation {
            writeln!(
                f,
                "  Precip.      {precipitation:.1} {}",
                units.precipitation()
            )?;
        }

        Ok(())
    }

    fn write_hour(&self, f: &mut fmt::Formatter<'_>, hour: &HourlyRecord) -> fmt::Result {
        let condition = hour.condition();
        let pop = hour
            .precipitation_probability
            .map(|p| format!("{p:.0}%"))
            .unwrap_or_default();

        writeln!(
            f,
            "  {}  {} {:<13} {:>8}  {pop}",
            hour.time.format("%H:%M"),
            condition.glyph(hour.is_day.unwrap_or(true)),
            condition.label(),
            self.temp(hour.temperature),
        )
    }

    fn write_day(&self, f: &mut fmt::Formatter<'_>, day: &DailyRecord) -> fmt::Result {
        let condition = day.condition();
        write!(
            f,
            "  {}  {} {:<13} {:>8} / {:<8}",
            day.date.format("%a %m/%d"),
            condition.glyph(true),
            condition.label(),
            self.temp(day.temperature_min),
            self.temp(day.temperature_max),
        )?;

        if let Some(pop) = day.precipitation_probability_max {
            write!(f, "  {pop:>3.0}%")?;
        }
        if let Some(uv) = day.uv_index_max {
            write!(f, "  UV {uv:.1} {}", UvRisk::from_index(uv))?;
        }
        if let (Some(sunrise), Some(sunset)) = (day.sunrise, day.sunset) {
            write!(
                f,
                "  sun {}-{}",
                sunrise.format("%H:%M"),
                sunset.format("%H:%M")
            )?;
            if day.date == self.now.with_timezone(sunrise.offset()).date_naive() {
                let progress = daylight_progress(&sunrise, &sunset, &self.now);
                write!(f, " ({:.0}% of daylight elapsed)", progress * 100.0)?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forecast = self.forecast;
        writeln!(
            f,
            "{} ({:.2}, {:.2}) {}",
            self.location_name,
            forecast.location.latitude,
            forecast.location.longitude,
            forecast.timezone
        )?;

        match &forecast.current {
            Some(current) => self.write_current(f, current)?,
            None => writeln!(f, "Current conditions unavailable")?,
        }

        if !forecast.hourly.is_empty() {
            writeln!(f)?;
            writeln!(f, "Next {} hours", forecast.hourly.len())?;
            for hour in &forecast.hourly {
                self.write_hour(f, hour)?;
            }
        }

        if !forecast.daily.is_empty() {
            writeln!(f)?;
            writeln!(f, "Daily")?;
            for day in &forecast.daily {
                self.write_day(f, day)?;
            }
        }

        Ok(())
    }
}
