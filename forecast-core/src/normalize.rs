//! Columnar response to per-timestep records.
//!
//! Lenient by policy: misaligned tails are cut to the shortest column, and a record whose
//! timestamp does not parse is skipped instead of failing the whole forecast.
//!
//! Upstream timestamps carry no offset. They are local to the response's IANA timezone,
//! so each one is resolved against that zone's rules, and `utc_offset_seconds` is only the
//! fallback for names `chrono-tz` does not know.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::{
    forecast::{CurrentConditions, DailyRecord, HourlyRecord, NormalizedForecast, Units},
    model::Coordinates,
    raw::{RawCurrent, RawCurrentWeather, RawDaily, RawForecastResponse, RawHourly, text_at, value_at},
};

const LOCAL_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const LOCAL_SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timezone used to place offset-less upstream timestamps on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalZone {
    named: Option<Tz>,
    fallback: FixedOffset,
}

impl LocalZone {
    /// Zone for an IANA `name`, with `fallback` used when the name does not parse.
    pub fn new(name: Option<&str>, fallback: FixedOffset) -> Self {
        let named = name.and_then(|name| match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                debug!(timezone = name, "unknown timezone name, using fixed offset");
                None
            }
        });
        Self { named, fallback }
    }

    pub fn fixed(offset: FixedOffset) -> Self {
        Self {
            named: None,
            fallback: offset,
        }
    }

    /// Resolve a local wall-clock time.
    ///
    /// A time repeated by a backward shift resolves to its earlier instant, unless that is
    /// not after `previous`. A time skipped by a forward shift resolves at the fixed offset.
    fn resolve(
        &self,
        naive: &NaiveDateTime,
        previous: Option<DateTime<FixedOffset>>,
    ) -> Option<DateTime<FixedOffset>> {
        let Some(tz) = self.named else {
            return self.fallback.from_local_datetime(naive).single();
        };

        match tz.from_local_datetime(naive) {
            LocalResult::Single(at) => Some(at.fixed_offset()),
            LocalResult::Ambiguous(earlier, later) => {
                let earlier = earlier.fixed_offset();
                if previous.is_some_and(|prev| earlier <= prev) {
                    Some(later.fixed_offset())
                } else {
                    Some(earlier)
                }
            }
            LocalResult::None => self.fallback.from_local_datetime(naive).single(),
        }
    }
}

/// Where the hourly sequence should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reference {
    /// Keep every hour.
    #[default]
    Unbounded,
    /// Start at the current-conditions observation time, when the response has one.
    Observation,
    /// Start at a fixed instant, typically "now".
    Instant(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    pub reference: Reference,
    /// Maximum number of hourly records kept after the reference cut.
    pub hourly_window: Option<usize>,
    /// Maximum number of daily records kept.
    pub daily_limit: Option<usize>,
}

impl NormalizeOptions {
    /// What a dashboard screen shows: the next 24 hours from the observation and one week.
    pub fn dashboard() -> Self {
        Self {
            reference: Reference::Observation,
            hourly_window: Some(24),
            daily_limit: Some(7),
        }
    }
}

pub fn normalize(raw: &RawForecastResponse, options: &NormalizeOptions) -> NormalizedForecast {
    let offset = response_offset(raw);
    let zone = LocalZone::new(raw.timezone.as_deref(), offset);

    let current = match (&raw.current, &raw.current_weather) {
        (Some(current), _) => normalize_current(current, &zone),
        (None, Some(legacy)) => normalize_legacy_current(legacy, &zone),
        (None, None) => None,
    };

    let reference = match options.reference {
        Reference::Unbounded => None,
        Reference::Observation => current.as_ref().map(|c| c.observed_at.with_timezone(&Utc)),
        Reference::Instant(at) => Some(at),
    };

    let mut hourly = raw
        .hourly
        .as_ref()
        .map(|section| normalize_hourly(section, &zone))
        .unwrap_or_default();
    if let Some(reference) = reference {
        let start = hourly
            .iter()
            .position(|record| record.time.with_timezone(&Utc) >= reference)
            .unwrap_or(hourly.len());
        hourly.drain(..start);
    }
    if let Some(window) = options.hourly_window {
        hourly.truncate(window);
    }

    let mut daily = raw
        .daily
        .as_ref()
        .map(|section| normalize_daily(section, &zone))
        .unwrap_or_default();
    if let Some(limit) = options.daily_limit {
        daily.truncate(limit);
    }

    debug!(
        hourly = hourly.len(),
        daily = daily.len(),
        has_current = current.is_some(),
        "normalized forecast"
    );

    NormalizedForecast {
        location: Coordinates::new(raw.latitude, raw.longitude),
        elevation: raw.elevation,
        timezone: raw.timezone.clone().unwrap_or_else(|| "GMT".to_string()),
        utc_offset_seconds: offset.local_minus_utc(),
        units: Units {
            current: raw.current_units.clone().unwrap_or_default(),
            hourly: raw.hourly_units.clone().unwrap_or_default(),
            daily: raw.daily_units.clone().unwrap_or_default(),
        },
        current,
        hourly,
        daily,
    }
}

/// One record per aligned hour. Length is at most [`RawHourly::common_len`].
pub fn normalize_hourly(section: &RawHourly, zone: &LocalZone) -> Vec<HourlyRecord> {
    let len = section.common_len();
    if len < section.time.len() {
        debug!(time = section.time.len(), aligned = len, "hourly columns misaligned, trimming");
    }

    let mut previous = None;
    let records: Vec<HourlyRecord> = section.time[..len]
        .iter()
        .enumerate()
        .filter_map(|(i, raw_time)| {
            let time = parse_timestamp_after(raw_time, zone, previous)?;
            previous = Some(time);
            Some(HourlyRecord {
                time,
                temperature: value_at(&section.temperature_2m, i),
                apparent_temperature: value_at(&section.apparent_temperature, i),
                humidity: value_at(&section.relative_humidity_2m, i),
                precipitation_probability: value_at(&section.precipitation_probability, i),
                precipitation: value_at(&section.precipitation, i),
                weather_code: value_at(&section.weather_code, i),
                wind_speed: value_at(&section.wind_speed_10m, i),
                wind_direction: value_at(&section.wind_direction_10m, i),
                wind_gusts: value_at(&section.wind_gusts_10m, i),
                surface_pressure: value_at(&section.surface_pressure, i),
                cloud_cover: value_at(&section.cloud_cover, i),
                visibility: value_at(&section.visibility, i),
                uv_index: value_at(&section.uv_index, i),
                is_day: value_at(&section.is_day, i).map(|flag| flag != 0),
            })
        })
        .collect();

    if records.len() < len {
        warn!(dropped = len - records.len(), "skipped hourly records with unparseable time");
    }
    records
}

/// One record per aligned day. Length is at most [`RawDaily::common_len`].
pub fn normalize_daily(section: &RawDaily, zone: &LocalZone) -> Vec<DailyRecord> {
    let len = section.common_len();
    if len < section.time.len() {
        debug!(time = section.time.len(), aligned = len, "daily columns misaligned, trimming");
    }

    let records: Vec<DailyRecord> = section.time[..len]
        .iter()
        .enumerate()
        .filter_map(|(i, raw_date)| {
            let date = parse_date(raw_date, zone)?;
            Some(DailyRecord {
                date,
                weather_code: value_at(&section.weather_code, i),
                temperature_max: value_at(&section.temperature_2m_max, i),
                temperature_min: value_at(&section.temperature_2m_min, i),
                apparent_temperature_max: value_at(&section.apparent_temperature_max, i),
                apparent_temperature_min: value_at(&section.apparent_temperature_min, i),
                sunrise: text_at(&section.sunrise, i).and_then(|s| parse_timestamp(s, zone)),
                sunset: text_at(&section.sunset, i).and_then(|s| parse_timestamp(s, zone)),
                daylight_duration: value_at(&section.daylight_duration, i),
                uv_index_max: value_at(&section.uv_index_max, i),
                precipitation_sum: value_at(&section.precipitation_sum, i),
                precipitation_probability_max: value_at(&section.precipitation_probability_max, i),
                wind_speed_max: value_at(&section.wind_speed_10m_max, i),
                wind_gusts_max: value_at(&section.wind_gusts_10m_max, i),
                wind_direction_dominant: value_at(&section.wind_direction_10m_dominant, i),
            })
        })
        .collect();

    if records.len() < len {
        warn!(dropped = len - records.len(), "skipped daily records with unparseable date");
    }
    records
}

fn normalize_current(current: &RawCurrent, zone: &LocalZone) -> Option<CurrentConditions> {
    let Some(observed_at) = parse_timestamp(&current.time, zone) else {
        warn!(time = %current.time, "dropping current conditions with unparseable time");
        return None;
    };

    Some(CurrentConditions {
        observed_at,
        temperature: current.temperature_2m,
        apparent_temperature: current.apparent_temperature,
        humidity: current.relative_humidity_2m,
        is_day: current.is_day.map(|flag| flag != 0),
        precipitation: current.precipitation,
        rain: current.rain,
        showers: current.showers,
        snowfall: current.snowfall,
        weather_code: current.weather_code,
        cloud_cover: current.cloud_cover,
        surface_pressure: current.surface_pressure,
        sea_level_pressure: current.pressure_msl,
        wind_speed: current.wind_speed_10m,
        wind_direction: current.wind_direction_10m,
        wind_gusts: current.wind_gusts_10m,
        visibility: current.visibility,
        uv_index: current.uv_index,
    })
}

fn normalize_legacy_current(
    legacy: &RawCurrentWeather,
    zone: &LocalZone,
) -> Option<CurrentConditions> {
    let Some(observed_at) = parse_timestamp(&legacy.time, zone) else {
        warn!(time = %legacy.time, "dropping current weather with unparseable time");
        return None;
    };

    Some(CurrentConditions {
        observed_at,
        temperature: legacy.temperature,
        apparent_temperature: None,
        humidity: None,
        is_day: legacy.is_day.map(|flag| flag != 0),
        precipitation: None,
        rain: None,
        showers: None,
        snowfall: None,
        weather_code: legacy.weathercode,
        cloud_cover: None,
        surface_pressure: None,
        sea_level_pressure: None,
        wind_speed: legacy.windspeed,
        wind_direction: legacy.winddirection,
        wind_gusts: None,
        visibility: None,
        uv_index: None,
    })
}

fn response_offset(raw: &RawForecastResponse) -> FixedOffset {
    FixedOffset::east_opt(raw.utc_offset_seconds).unwrap_or_else(|| {
        warn!(offset = raw.utc_offset_seconds, "utc_offset_seconds out of range, using UTC");
        Utc.fix()
    })
}

/// Parse an upstream timestamp. Offset-less values are local to `zone`.
pub fn parse_timestamp(raw: &str, zone: &LocalZone) -> Option<DateTime<FixedOffset>> {
    parse_timestamp_after(raw, zone, None)
}

fn parse_timestamp_after(
    raw: &str,
    zone: &LocalZone,
    previous: Option<DateTime<FixedOffset>>,
) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    [LOCAL_MINUTE_FORMAT, LOCAL_SECOND_FORMAT]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| zone.resolve(&naive, previous))
}

fn parse_date(raw: &str, zone: &LocalZone) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(raw, zone).map(|ts| ts.date_naive()))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Timelike};

    use super::*;

    const FIXTURE: &str = include_str!("../testdata/sapporo_standard.json");

    fn fixture() -> RawForecastResponse {
        serde_json::from_str(FIXTURE).expect("fixture decodes")
    }

    fn jst() -> LocalZone {
        LocalZone::fixed(FixedOffset::east_opt(9 * 3600).expect("valid offset"))
    }

    fn berlin() -> LocalZone {
        LocalZone::new(
            Some("Europe/Berlin"),
            FixedOffset::east_opt(3600).expect("valid offset"),
        )
    }

    fn hourly(times: &[&str]) -> RawHourly {
        RawHourly {
            time: times.iter().map(|t| t.to_string()).collect(),
            ..RawHourly::default()
        }
    }

    #[test]
    fn length_is_minimum_of_columns() {
        let section = RawHourly {
            temperature_2m: Some(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]),
            weather_code: Some(vec![Some(0), Some(1), Some(2), Some(3)]),
            ..hourly(&[
                "2025-01-15T00:00",
                "2025-01-15T01:00",
                "2025-01-15T02:00",
                "2025-01-15T03:00",
                "2025-01-15T04:00",
            ])
        };

        let records = normalize_hourly(&section, &jst());
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].temperature, Some(4.0));
        assert_eq!(records[3].weather_code, Some(3));
    }

    #[test]
    fn unparseable_timestamps_are_dropped() {
        let section = RawHourly {
            temperature_2m: Some(vec![Some(1.0), Some(2.0), Some(3.0)]),
            ..hourly(&["2025-01-15T00:00", "yesterday", "2025-01-15T02:00"])
        };

        let records = normalize_hourly(&section, &jst());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].temperature, Some(3.0));
        assert_eq!(records[1].time.hour(), 2);
    }

    #[test]
    fn null_values_stay_in_place() {
        let section = RawHourly {
            temperature_2m: Some(vec![Some(1.0), None]),
            ..hourly(&["2025-01-15T00:00", "2025-01-15T01:00"])
        };

        let records = normalize_hourly(&section, &jst());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].temperature, None);
    }

    #[test]
    fn timestamps_carry_response_offset() {
        let parsed = parse_timestamp("2025-01-15T10:15", &jst()).expect("parses");
        assert_eq!(parsed.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(parsed.with_timezone(&Utc).hour(), 1);

        let with_seconds = parse_timestamp("2025-01-15T10:15:30", &jst()).expect("parses");
        assert_eq!(with_seconds.second(), 30);

        let rfc = parse_timestamp("2025-01-15T10:15:00Z", &jst()).expect("parses");
        assert_eq!(rfc.offset().local_minus_utc(), 0);

        assert!(parse_timestamp("15/01/2025", &jst()).is_none());
    }

    #[test]
    fn spring_forward_shifts_the_offset() {
        let raw: RawForecastResponse = serde_json::from_str(
            r#"{
                "latitude": 52.52,
                "longitude": 13.41,
                "utc_offset_seconds": 3600,
                "timezone": "Europe/Berlin",
                "hourly": {
                    "time": ["2025-03-29T12:00", "2025-03-30T12:00"],
                    "temperature_2m": [9.0, 11.0]
                }
            }"#,
        )
        .expect("payload decodes");

        let forecast = normalize(&raw, &NormalizeOptions::default());
        let [before, after] = forecast.hourly.as_slice() else {
            panic!("expected two hours, got {:?}", forecast.hourly);
        };

        assert_eq!(before.time.offset().local_minus_utc(), 3600);
        assert_eq!(after.time.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(after.time.hour(), 12);
        assert_eq!((after.time - before.time).num_hours(), 23);
    }

    #[test]
    fn repeated_hour_after_fall_back_stays_increasing() {
        let section = RawHourly {
            temperature_2m: Some(vec![Some(1.0); 4]),
            ..hourly(&[
                "2025-10-26T01:00",
                "2025-10-26T02:00",
                "2025-10-26T02:00",
                "2025-10-26T03:00",
            ])
        };

        let records = normalize_hourly(&section, &berlin());
        let offsets: Vec<i32> = records
            .iter()
            .map(|r| r.time.offset().local_minus_utc())
            .collect();
        assert_eq!(offsets, [7200, 7200, 3600, 3600]);
        for pair in records.windows(2) {
            assert_eq!(pair[1].time - pair[0].time, Duration::hours(1));
        }
    }

    #[test]
    fn unknown_zone_name_uses_fixed_offset() {
        let zone = LocalZone::new(
            Some("Mars/Olympus_Mons"),
            FixedOffset::east_opt(-5 * 3600).expect("valid offset"),
        );
        let parsed = parse_timestamp("2025-07-01T12:00", &zone).expect("parses");
        assert_eq!(parsed.offset().local_minus_utc(), -5 * 3600);

        let gmt = LocalZone::new(Some("GMT"), FixedOffset::east_opt(0).expect("valid offset"));
        let parsed = parse_timestamp("2025-07-01T12:00", &gmt).expect("parses");
        assert_eq!(parsed.with_timezone(&Utc).hour(), 12);
    }

    #[test]
    fn full_fixture_without_options_keeps_everything() {
        let forecast = normalize(&fixture(), &NormalizeOptions::default());

        assert_eq!(forecast.hourly.len(), 48);
        assert_eq!(forecast.daily.len(), 7);
        assert_eq!(forecast.timezone, "Asia/Tokyo");
        assert_eq!(forecast.units.temperature(), "°C");

        let current = forecast.current.expect("current conditions");
        assert_eq!(current.weather_code, Some(71));
        assert_eq!(current.is_day, Some(true));

        let first_day = &forecast.daily[0];
        assert_eq!(first_day.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        let sunrise = first_day.sunrise.expect("sunrise parsed");
        assert_eq!((sunrise.hour(), sunrise.minute()), (6, 58));
    }

    #[test]
    fn dashboard_window_starts_after_observation() {
        let forecast = normalize(&fixture(), &NormalizeOptions::dashboard());

        assert_eq!(forecast.hourly.len(), 24);
        assert_eq!(forecast.daily.len(), 7);

        // observation is 10:15 local, so the first hour shown is 11:00
        let first = &forecast.hourly[0];
        assert_eq!(first.time.hour(), 11);
        assert_eq!(forecast.hourly[23].time - first.time, Duration::hours(23));
    }

    #[test]
    fn instant_reference_past_the_end_yields_nothing() {
        let late = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let options = NormalizeOptions {
            reference: Reference::Instant(late),
            ..NormalizeOptions::default()
        };

        let forecast = normalize(&fixture(), &options);
        assert!(forecast.hourly.is_empty());
        assert_eq!(forecast.daily.len(), 7);
    }

    #[test]
    fn daily_limit_truncates() {
        let options = NormalizeOptions {
            daily_limit: Some(3),
            ..NormalizeOptions::default()
        };
        assert_eq!(normalize(&fixture(), &options).daily.len(), 3);
    }

    #[test]
    fn bad_sunrise_degrades_only_that_field() {
        let section = RawDaily {
            time: vec!["2025-01-15".into(), "2025-01-16".into()],
            sunrise: Some(vec![Some("06:58".into()), Some("2025-01-16T06:57".into())]),
            temperature_2m_max: Some(vec![Some(1.0), Some(2.0)]),
            ..RawDaily::default()
        };

        let records = normalize_daily(&section, &jst());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sunrise, None);
        assert_eq!(records[0].temperature_max, Some(1.0));
        assert!(records[1].sunrise.is_some());
    }

    #[test]
    fn unparseable_current_time_drops_current_only() {
        let mut raw = fixture();
        if let Some(current) = raw.current.as_mut() {
            current.time = "later".to_string();
        }

        let forecast = normalize(&raw, &NormalizeOptions::dashboard());
        assert!(forecast.current.is_none());
        // no observation to anchor on, so the window starts at the first hour
        assert_eq!(forecast.hourly[0].time.hour(), 0);
        assert_eq!(forecast.hourly.len(), 24);
    }

    #[test]
    fn legacy_current_weather_is_used_as_fallback() {
        let raw: RawForecastResponse = serde_json::from_str(
            r#"{
                "latitude": 43.06,
                "longitude": 141.35,
                "utc_offset_seconds": 32400,
                "current_weather": {
                    "time": "2025-01-15T10:00",
                    "temperature": -3.2,
                    "windspeed": 11.0,
                    "winddirection": 290.0,
                    "weathercode": 3,
                    "is_day": 1
                }
            }"#,
        )
        .expect("payload decodes");

        let forecast = normalize(&raw, &NormalizeOptions::default());
        let current = forecast.current.expect("current from legacy block");
        assert_eq!(current.temperature, Some(-3.2));
        assert_eq!(current.wind_direction, Some(290.0));
        assert_eq!(forecast.timezone, "GMT");
    }

    #[test]
    fn normalizing_twice_gives_the_same_result() {
        let raw = fixture();
        let options = NormalizeOptions::dashboard();
        assert_eq!(normalize(&raw, &options), normalize(&raw, &options));
    }
}
