//! # Data Normalizer
//!
//! Converts each raw source payload into a canonical [`Section`] and
//! assembles the per-run [`DashboardModel`]. This component performs no I/O:
//! it only reshapes data the source collaborators already produced.
//!
//! Per-kind rules:
//! - **Weather**: one item, `"<condition> <temp>°C"` with the min/max range
//!   as the secondary text. An absent reading omits the section.
//! - **Calendar**: one item per event, sorted by start time ascending with
//!   ties broken by title; all-day events (no start time) sort first. The
//!   secondary text is the start time, or the full `start-end` range when
//!   the event carries an end time.
//! - **To-dos**: pending items before done items, each group preserving
//!   file order.
//! - **Birthdays**: entries whose next occurrence falls within 7 days
//!   inclusive of today, sorted by proximity then name. The proximity label
//!   ("today", "tomorrow", "in N days") becomes the secondary text.

use crate::greeting::greeting;
use crate::sources::{BirthdayRecord, CalendarEvent, TodoLine, WeatherReading};
use crate::{DashboardModel, Glyph, Item, Section, SectionKind};
use chrono::{DateTime, Datelike, Local, NaiveDate};

/// Birthdays further out than this many days are not shown.
const BIRTHDAY_WINDOW_DAYS: i64 = 7;

/// Assemble the model in canonical order: greeting first, then weather,
/// calendar, todos, birthdays. Absent sources are omitted; the greeting is
/// always present, so even a run with every source empty still yields a
/// minimal briefing.
pub fn build_model(
    now: DateTime<Local>,
    location_name: &str,
    weather: Option<&WeatherReading>,
    events: &[CalendarEvent],
    todos: &[TodoLine],
    birthdays: &[BirthdayRecord],
) -> DashboardModel {
    let mut sections = vec![greeting_section(now, location_name)];

    sections.extend(weather_section(weather));
    sections.extend(calendar_section(events));
    sections.extend(todo_section(todos));
    sections.extend(birthday_section(birthdays, now.date_naive()));

    DashboardModel {
        sections,
        generated_at: now,
    }
}

/// The greeting section: greeting text plus a place/date subtitle.
pub fn greeting_section(now: DateTime<Local>, location_name: &str) -> Section {
    let date = now.format("%d.%m.%Y");
    let subtitle = if location_name.is_empty() {
        date.to_string()
    } else {
        format!("{} · {}", location_name, date)
    };

    Section {
        kind: SectionKind::Greeting,
        title: SectionKind::Greeting.title().to_string(),
        icon: None,
        items: vec![Item::with_secondary(greeting(now), subtitle)],
    }
}

/// One item: condition + current temperature, min/max as secondary text.
pub fn weather_section(reading: Option<&WeatherReading>) -> Option<Section> {
    let reading = reading?;

    let item = Item::with_secondary(
        format!("{} {:.1}°C", reading.condition, reading.temp_c),
        format!("{:.1}°C / {:.1}°C", reading.min_c, reading.max_c),
    );

    Some(Section {
        kind: SectionKind::Weather,
        title: SectionKind::Weather.title().to_string(),
        icon: Some(condition_glyph(reading.code)),
        items: vec![item],
    })
}

/// Events sorted by start time (all-day first), ties broken by title for
/// determinism.
pub fn calendar_section(events: &[CalendarEvent]) -> Option<Section> {
    if events.is_empty() {
        return None;
    }

    let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));

    let items = sorted
        .into_iter()
        .map(|event| {
            let primary = match &event.location {
                Some(location) => format!("{} @ {}", event.title, location),
                None => event.title.clone(),
            };
            Item {
                primary_text: primary,
                secondary_text: event.start.map(|start| match event.end {
                    Some(end) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
                    None => start.format("%H:%M").to_string(),
                }),
                done: false,
                days_until: None,
            }
        })
        .collect();

    Some(Section {
        kind: SectionKind::Calendar,
        title: SectionKind::Calendar.title().to_string(),
        icon: Some(SectionKind::Calendar.glyph()),
        items,
    })
}

/// Pending tasks before done tasks; the stable sort preserves file order
/// within each group.
pub fn todo_section(todos: &[TodoLine]) -> Option<Section> {
    if todos.is_empty() {
        return None;
    }

    let mut items: Vec<Item> = todos
        .iter()
        .map(|todo| Item {
            primary_text: todo.text.clone(),
            secondary_text: None,
            done: todo.done,
            days_until: None,
        })
        .collect();
    items.sort_by_key(|item| item.done);

    Some(Section {
        kind: SectionKind::Todos,
        title: SectionKind::Todos.title().to_string(),
        icon: Some(SectionKind::Todos.glyph()),
        items,
    })
}

/// Birthdays within the next 7 days inclusive, closest first.
///
/// A birthday that already passed this year is evaluated against next
/// year's occurrence. Invalid month/day combinations (e.g. Feb 30, or a
/// passed Feb 29 with a non-leap following year) are skipped.
pub fn birthday_section(records: &[BirthdayRecord], today: NaiveDate) -> Option<Section> {
    let mut upcoming: Vec<(i64, String, Option<i32>)> = records
        .iter()
        .filter_map(|record| {
            let next = NaiveDate::from_ymd_opt(today.year(), record.month, record.day)
                .filter(|date| *date >= today)
                .or_else(|| NaiveDate::from_ymd_opt(today.year() + 1, record.month, record.day))?;

            let days_until = (next - today).num_days();
            if days_until > BIRTHDAY_WINDOW_DAYS {
                return None;
            }

            let age = record.year.map(|born| next.year() - born);
            Some((days_until, record.name.clone(), age))
        })
        .collect();

    if upcoming.is_empty() {
        return None;
    }

    upcoming.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let items = upcoming
        .into_iter()
        .map(|(days_until, name, age)| {
            let primary = match age {
                Some(age) => format!("{} ({})", name, age),
                None => name,
            };
            Item {
                primary_text: primary,
                secondary_text: Some(proximity_label(days_until)),
                done: false,
                days_until: Some(days_until),
            }
        })
        .collect();

    Some(Section {
        kind: SectionKind::Birthdays,
        title: SectionKind::Birthdays.title().to_string(),
        icon: Some(SectionKind::Birthdays.glyph()),
        items,
    })
}

/// "today", "tomorrow", or "in N days".
fn proximity_label(days_until: i64) -> String {
    match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {} days", n),
    }
}

/// Map an Open-Meteo weather code to the glyph drawn on the weather card.
pub fn condition_glyph(code: Option<u8>) -> Glyph {
    match code {
        Some(0) => Glyph::Sun,
        Some(45) | Some(48) => Glyph::Fog,
        Some(51..=67) | Some(80..=82) => Glyph::Rain,
        Some(71..=77) | Some(85) | Some(86) => Glyph::Snow,
        Some(95) | Some(96) | Some(99) => Glyph::Storm,
        _ => Glyph::Cloud,
    }
}
