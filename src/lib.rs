//! # Morning Dashboard Core Library
//!
//! This library produces a single daily "briefing" artifact by aggregating
//! four independent data sources (weather, calendar, to-dos, birthdays) plus
//! a time-of-day greeting, and laying them out onto a fixed-size canvas.
//! When raster rendering is unavailable it degrades to a plain-text document
//! carrying the same information.
//!
//! ## Pipeline
//!
//! The run is a strict sequential chain, one process invocation, no state
//! kept between runs:
//!
//! 1. **Sources** ([`sources`]): fetch/read the four raw payloads. A failing
//!    source is logged and omitted, never fatal.
//! 2. **Normalizer** ([`normalize`]): raw payloads → canonical [`Section`]s
//!    in a fixed order, greeting first.
//! 3. **Capability detection** ([`capability`]): one side-effect-free probe
//!    deciding raster availability and icon usage.
//! 4. **Layout** ([`layout`]): pure function of (model, configuration,
//!    capabilities) computing card geometry, wrapping and truncation.
//! 5. **Render** ([`renderer`]): one of exactly two backends, PNG image or
//!    plain text, selected once at startup. Only artifact-production
//!    failures are fatal to the run.
//!
//! ## Core Types
//!
//! The canonical model lives at the crate root:
//! - [`SectionKind`]: closed enumeration of the five content blocks
//! - [`Item`]: one renderable line within a section
//! - [`Section`]: a titled, ordered block of items
//! - [`DashboardModel`]: the per-run aggregate, built once and read-only
//!
//! # Example
//! ```
//! use dashboard_lib::{Item, Section, SectionKind};
//!
//! let section = Section {
//!     kind: SectionKind::Todos,
//!     title: SectionKind::Todos.title().to_string(),
//!     icon: Some(SectionKind::Todos.glyph()),
//!     items: vec![Item::new("water the plants")],
//! };
//! assert_eq!(section.items[0].primary_text, "water the plants");
//! assert!(!section.items[0].done);
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod capability;
pub mod config;
pub mod greeting;
#[cfg(feature = "raster")]
pub mod image_renderer;
pub mod layout;
pub mod normalize;
pub mod renderer;
pub mod sources;

/// The five content blocks a dashboard can carry.
///
/// Canonical display order is fixed by [`DashboardModel`] construction:
/// greeting, weather, calendar, todos, birthdays. Per-kind branching in the
/// normalizer and layout engine matches exhaustively on this enum, so adding
/// a source kind is a compile-time-checked extension point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Greeting,
    Weather,
    Calendar,
    Todos,
    Birthdays,
}

impl SectionKind {
    /// Display heading for the section.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Greeting => "Greeting",
            SectionKind::Weather => "Weather",
            SectionKind::Calendar => "Calendar",
            SectionKind::Todos => "To-dos",
            SectionKind::Birthdays => "Birthdays (7 days)",
        }
    }

    /// Default glyph for the section. The weather section usually overrides
    /// this with a condition-specific glyph at normalization time.
    pub fn glyph(&self) -> Glyph {
        match self {
            SectionKind::Greeting => Glyph::Sun,
            SectionKind::Weather => Glyph::Cloud,
            SectionKind::Calendar => Glyph::Calendar,
            SectionKind::Todos => Glyph::Checklist,
            SectionKind::Birthdays => Glyph::Cake,
        }
    }
}

/// Identifier of a drawn icon. Glyphs are rendered from graphics primitives
/// by the image backend (no emoji, which show as boxes in many fonts); the
/// text backend ignores them entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glyph {
    Sun,
    Cloud,
    Fog,
    Rain,
    Snow,
    Storm,
    Calendar,
    Checklist,
    Cake,
}

/// One renderable line within a [`Section`].
///
/// Invariants:
/// - `primary_text` is never empty (the normalizer drops empty lines)
/// - `done` defaults to false and is meaningful only for to-dos
/// - `days_until` is meaningful only for birthdays and drives their ordering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Required main text of the line.
    pub primary_text: String,
    /// Optional annotation, e.g. a start time or a min/max range.
    pub secondary_text: Option<String>,
    /// Completion marker (to-dos only).
    pub done: bool,
    /// Whole days until the next occurrence (birthdays only).
    pub days_until: Option<i64>,
}

impl Item {
    /// Plain item with just a primary text.
    pub fn new(primary: impl Into<String>) -> Self {
        Item {
            primary_text: primary.into(),
            secondary_text: None,
            done: false,
            days_until: None,
        }
    }

    /// Item with a secondary annotation.
    pub fn with_secondary(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Item {
            primary_text: primary.into(),
            secondary_text: Some(secondary.into()),
            done: false,
            days_until: None,
        }
    }
}

/// A named block of content: one section of the dashboard.
///
/// At most one section per [`SectionKind`] exists in a model; `items`
/// preserves the order the normalizer assigned (source order, or the
/// per-kind sort documented in [`normalize`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    /// Glyph drawn before the title when icons are enabled.
    pub icon: Option<Glyph>,
    pub items: Vec<Item>,
}

/// The aggregate model: ordered sections plus the generation timestamp.
///
/// Constructed once per run by [`normalize::build_model`], read-only
/// thereafter, discarded after rendering. The section order is canonical:
/// greeting first, then weather, calendar, todos, birthdays, with absent
/// sources simply omitted.
#[derive(Clone, Debug)]
pub struct DashboardModel {
    pub sections: Vec<Section>,
    pub generated_at: DateTime<Local>,
}

impl DashboardModel {
    /// Look up a section by kind, if the source produced one.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}
