//! # Source Collaborators
//!
//! This module gathers the four raw payloads the dashboard aggregates:
//!
//! - **Weather**: Open-Meteo forecast API (no API key), current temperature
//!   and weather code plus today's min/max, cached in `/tmp` with a short
//!   TTL so repeated runs during development don't hammer the API.
//! - **Calendar**: `khal list today 1d` subprocess output, one event per
//!   line with an optional leading `HH:MM` or `HH:MM-HH:MM` token.
//! - **To-dos**: a date-stamped markdown file (`<todos_dir>/<YYYY-MM-DD>.md`)
//!   where only checkbox lines (`- [ ]`, `- [x]`) count as tasks; headings
//!   and free-text notes are ignored.
//! - **Birthdays**: a JSON object mapping name to `{ day, month, year? }`.
//!
//! ## Partial-failure semantics
//!
//! Every loader returns `Result`; the caller logs failures and omits the
//! corresponding section. One unreachable source never aborts the run.
//! Timeouts are not imposed here: network and subprocess limits belong to
//! the collaborators themselves.
//!
//! ## Caching Strategy
//!
//! The weather cache lives at `/tmp/dashboard_weather.json` (cleared on
//! reboot), validated by file modification time against a 30-minute TTL.
//! Cache write failures are non-fatal; corrupt cache contents fall back to
//! a fresh fetch.

use crate::config::SourcesConfig;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::Command;
use std::{fs, io, path::Path, time::SystemTime};
use thiserror::Error;

/// Errors that can occur while gathering source data.
///
/// Any of these is recovered locally by omitting the affected section;
/// none of them is fatal to the dashboard run.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response or file content did not have the expected shape
    #[error("malformed payload: {0}")]
    Malformed(&'static str),

    /// File operations failed (missing file, permissions, corruption)
    #[error("source IO: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// External calendar tool exited unsuccessfully
    #[error("calendar tool failed: {0}")]
    Tool(String),
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// A structured weather reading for the configured location.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Human-readable place name (from configuration)
    pub location: String,
    /// Condition label, e.g. "Sunny" or "Rain"
    pub condition: String,
    /// Open-Meteo weather code, kept for glyph selection
    pub code: Option<u8>,
    /// Current temperature in °C
    pub temp_c: f32,
    /// Today's minimum in °C
    pub min_c: f32,
    /// Today's maximum in °C
    pub max_c: f32,
}

/// Weather cache file location. `/tmp` is cleared on reboot and costs no
/// permanent storage.
const WEATHER_CACHE: &str = "/tmp/dashboard_weather.json";

/// Cache time-to-live in seconds (30 minutes): fresh enough for a morning
/// briefing, long enough to absorb repeated development runs.
const WEATHER_TTL: u64 = 1800;

#[derive(Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Deserialize)]
struct CurrentBlock {
    temperature_2m: f32,
    weather_code: Option<u8>,
}

#[derive(Deserialize)]
struct DailyBlock {
    temperature_2m_max: Vec<f32>,
    temperature_2m_min: Vec<f32>,
}

/// Fetch the current weather reading, cache-first.
///
/// Checks for a valid cached reading before going to the network; a fresh
/// fetch is cached for future runs (cache write failures are ignored).
pub async fn fetch_weather(config: &SourcesConfig) -> Result<WeatherReading, SourceError> {
    if let Ok(reading) = load_weather_cache() {
        return Ok(reading);
    }

    let reading = fetch_open_meteo(config).await?;

    let _ = save_weather_cache(&reading);

    Ok(reading)
}

/// One Open-Meteo forecast request for the configured coordinates.
async fn fetch_open_meteo(config: &SourcesConfig) -> Result<WeatherReading, SourceError> {
    let response = reqwest::Client::new()
        .get("https://api.open-meteo.com/v1/forecast")
        .query(&[
            ("latitude", config.latitude.to_string()),
            ("longitude", config.longitude.to_string()),
            ("current", "temperature_2m,weather_code".to_string()),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min".to_string(),
            ),
            ("timezone", config.timezone.clone()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let forecast: ForecastResponse = response.json().await?;

    let max_c = *forecast
        .daily
        .temperature_2m_max
        .first()
        .ok_or(SourceError::Malformed("missing daily maximum"))?;
    let min_c = *forecast
        .daily
        .temperature_2m_min
        .first()
        .ok_or(SourceError::Malformed("missing daily minimum"))?;

    Ok(WeatherReading {
        location: config.location_name.clone(),
        condition: condition_label(forecast.current.weather_code).to_string(),
        code: forecast.current.weather_code,
        temp_c: forecast.current.temperature_2m,
        min_c,
        max_c,
    })
}

/// Map an Open-Meteo weather code to a condition label.
/// Codes per <https://open-meteo.com/en/docs>.
pub fn condition_label(code: Option<u8>) -> &'static str {
    match code {
        Some(0) => "Sunny",
        Some(1..=3) => "Partly cloudy",
        Some(45) | Some(48) => "Fog",
        Some(51..=57) => "Drizzle",
        Some(61..=67) | Some(80..=82) => "Rain",
        Some(71..=77) | Some(85) | Some(86) => "Snow",
        Some(95) | Some(96) | Some(99) => "Thunderstorm",
        _ => "Cloudy",
    }
}

/// Load the cached weather reading if still within TTL.
fn load_weather_cache() -> Result<WeatherReading, io::Error> {
    let meta = fs::metadata(WEATHER_CACHE)?;

    let age = SystemTime::now()
        .duration_since(meta.modified()?)
        .map_err(|_| io::Error::other("time error"))?
        .as_secs();

    if age > WEATHER_TTL {
        return Err(io::Error::other("stale"));
    }

    let data = fs::read(WEATHER_CACHE)?;
    let reading = serde_json::from_slice(&data)?;

    Ok(reading)
}

/// Persist a fresh reading for future runs. Non-fatal on failure.
fn save_weather_cache(reading: &WeatherReading) -> Result<(), io::Error> {
    let data = serde_json::to_vec(reading)?;
    fs::write(WEATHER_CACHE, data)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// One calendar event for today.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    /// Start time; `None` for all-day events
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub location: Option<String>,
}

/// Today's events via the `khal` command-line calendar.
pub fn load_calendar() -> Result<Vec<CalendarEvent>, SourceError> {
    let output = Command::new("khal").args(["list", "today", "1d"]).output()?;

    if !output.status.success() {
        return Err(SourceError::Tool(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(parse_khal_lines(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `khal list` output into events.
///
/// Day header lines ("Today, ...") and blank lines are skipped. A leading
/// `HH:MM` or `HH:MM-HH:MM` token becomes the start/end time; lines without
/// one are all-day events.
pub fn parse_khal_lines(raw: &str) -> Vec<CalendarEvent> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("Today,"))
        .filter_map(|line| {
            let (times, rest) = match line.split_once(' ') {
                Some((first, rest)) => (parse_time_token(first), rest.trim()),
                None => ((None, None), line),
            };

            let (start, end) = times;
            let title = if start.is_some() { rest } else { line };
            if title.is_empty() {
                return None;
            }

            Some(CalendarEvent {
                title: title.to_string(),
                start,
                end,
                location: None,
            })
        })
        .collect()
}

/// `"09:00"` → (start, None); `"09:00-10:30"` → (start, end); else (None, None).
fn parse_time_token(token: &str) -> (Option<NaiveTime>, Option<NaiveTime>) {
    let mut parts = token.splitn(2, '-');
    let start = parts
        .next()
        .and_then(|p| NaiveTime::parse_from_str(p, "%H:%M").ok());
    if start.is_none() {
        return (None, None);
    }
    let end = parts
        .next()
        .and_then(|p| NaiveTime::parse_from_str(p, "%H:%M").ok());
    (start, end)
}

// ---------------------------------------------------------------------------
// To-dos
// ---------------------------------------------------------------------------

/// One checklist line from today's to-do file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoLine {
    pub text: String,
    pub done: bool,
}

/// Read today's checklist. A missing file simply means no to-dos today.
pub fn load_todos(todos_dir: &str, date: NaiveDate) -> Result<Vec<TodoLine>, SourceError> {
    let path = Path::new(todos_dir).join(format!("{}.md", date.format("%Y-%m-%d")));
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(path)?;
    Ok(parse_todo_lines(&raw))
}

/// Keep only checkbox tasks; headings ("#"), blank lines and free-text
/// intro lines are not to-dos.
pub fn parse_todo_lines(raw: &str) -> Vec<TodoLine> {
    raw.lines()
        .map(str::trim)
        .filter_map(|line| {
            let (rest, done) = if let Some(rest) = line.strip_prefix("- [ ]") {
                (rest, false)
            } else if let Some(rest) = line
                .strip_prefix("- [x]")
                .or_else(|| line.strip_prefix("- [X]"))
            {
                (rest, true)
            } else {
                return None;
            };

            let text = rest.trim();
            if text.is_empty() {
                return None;
            }

            Some(TodoLine {
                text: text.to_string(),
                done,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Birthdays
// ---------------------------------------------------------------------------

/// One name/date record from the birthdays file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BirthdayRecord {
    pub name: String,
    pub day: u32,
    pub month: u32,
    /// Birth year, when known; enables an age annotation.
    pub year: Option<i32>,
}

#[derive(Deserialize)]
struct BirthdayEntry {
    day: u32,
    month: u32,
    #[serde(default)]
    year: Option<i32>,
}

/// Load the birthdays file: a JSON object mapping name to date parts.
pub fn load_birthdays(path: &str) -> Result<Vec<BirthdayRecord>, SourceError> {
    let raw = fs::read_to_string(path)?;
    let entries: HashMap<String, BirthdayEntry> = serde_json::from_str(&raw)?;

    Ok(entries
        .into_iter()
        .map(|(name, entry)| BirthdayRecord {
            name,
            day: entry.day,
            month: entry.month,
            year: entry.year,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_khal_lines() {
        let raw = "Today, 31.08.2026\n09:00-09:30 Standup\n14:00 Dentist\nHoliday planning\n\n";
        let events = parse_khal_lines(raw);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].title, "Standup");
        assert_eq!(
            events[0].start,
            Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );
        assert_eq!(
            events[0].end,
            Some(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
        );
        assert_eq!(events[1].title, "Dentist");
        assert_eq!(events[1].end, None);
        // No leading time token: all-day event, full line is the title
        assert_eq!(events[2].title, "Holiday planning");
        assert_eq!(events[2].start, None);
    }

    #[test]
    fn test_parse_todo_lines_keeps_only_checkboxes() {
        let raw = "# Today\n\nCarried over from yesterday:\n- [ ] water plants\n- [x] pay rent\n- [ ]   \n- random note\n";
        let todos = parse_todo_lines(raw);

        assert_eq!(
            todos,
            vec![
                TodoLine {
                    text: "water plants".to_string(),
                    done: false
                },
                TodoLine {
                    text: "pay rent".to_string(),
                    done: true
                },
            ]
        );
    }

    #[test]
    fn test_load_todos_missing_file_is_empty() {
        let todos =
            load_todos("/nonexistent/dir", NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()).unwrap();
        assert!(todos.is_empty());
    }

    #[test]
    fn test_load_birthdays() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Anna": {{"day": 3, "month": 9, "year": 1984}}, "Max": {{"day": 24, "month": 12}}}}"#
        )
        .unwrap();

        let mut records = load_birthdays(file.path().to_str().unwrap()).unwrap();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Anna");
        assert_eq!(records[0].year, Some(1984));
        assert_eq!(records[1].name, "Max");
        assert_eq!(records[1].year, None);
    }

    #[test]
    fn test_load_birthdays_missing_file() {
        assert!(load_birthdays("/nonexistent/birthdays.json").is_err());
    }

    #[test]
    fn test_condition_labels() {
        assert_eq!(condition_label(Some(0)), "Sunny");
        assert_eq!(condition_label(Some(2)), "Partly cloudy");
        assert_eq!(condition_label(Some(45)), "Fog");
        assert_eq!(condition_label(Some(63)), "Rain");
        assert_eq!(condition_label(Some(81)), "Rain");
        assert_eq!(condition_label(Some(75)), "Snow");
        assert_eq!(condition_label(Some(95)), "Thunderstorm");
        assert_eq!(condition_label(None), "Cloudy");
    }

    #[test]
    fn test_weather_cache_roundtrip() {
        let reading = WeatherReading {
            location: "Rathenow".to_string(),
            condition: "Sunny".to_string(),
            code: Some(0),
            temp_c: 18.0,
            min_c: 10.0,
            max_c: 20.0,
        };

        let temp_file = NamedTempFile::new().unwrap();
        let data = serde_json::to_vec(&reading).unwrap();
        fs::write(temp_file.path(), data).unwrap();

        let loaded: WeatherReading =
            serde_json::from_slice(&fs::read(temp_file.path()).unwrap()).unwrap();
        assert_eq!(loaded.condition, reading.condition);
        assert_eq!(loaded.temp_c, reading.temp_c);
    }
}
