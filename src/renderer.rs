//! # Renderer Backends
//!
//! Exactly two interchangeable output strategies behind [`RenderBackend`]:
//! the PNG image backend (feature `raster`, see [`crate::image_renderer`])
//! and the plain-text backend defined here. The backend is chosen once at
//! startup by [`select_backend`], which is the single place the degradation
//! policy lives: without raster capability the text renderer is selected
//! unconditionally and the configured style/theme are ignored.
//!
//! Both backends share the item visibility policy ([`layout::split_items`],
//! covering the item limit and the card height budget, plus the `+N more`
//! marker), so they always carry the same information and differ only in
//! presentation.

use crate::capability::Capabilities;
use crate::config::Config;
use crate::layout::{item_prefix, split_items};
use crate::{DashboardModel, SectionKind};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors producing or writing the final artifact. Unlike source failures
/// these are fatal to the run.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The render surface could not be allocated
    #[error("render surface unavailable: {0}")]
    Surface(&'static str),

    /// PNG encoding failed
    #[error("image encode failed: {0}")]
    Encode(String),

    /// Writing the artifact failed
    #[error("artifact IO: {0}")]
    Io(#[from] std::io::Error),
}

/// The produced briefing artifact.
#[derive(Clone, Debug)]
pub enum Artifact {
    /// Encoded PNG bytes at the configured canvas dimensions
    Image(Vec<u8>),
    /// Plain-text document
    Text(String),
}

/// One output strategy. Implementations must be pure functions of
/// (model, configuration, capabilities); writing the artifact to disk is a
/// separate step ([`write_image_atomic`]).
pub trait RenderBackend {
    /// Short backend name for log lines.
    fn name(&self) -> &'static str;

    /// Produce the artifact for the given model.
    fn render(
        &self,
        model: &DashboardModel,
        config: &Config,
        capabilities: &Capabilities,
    ) -> Result<Artifact, RenderError>;
}

/// Choose the backend for this run. This is the entire degradation policy:
/// raster capability present → image backend, otherwise text, regardless of
/// the configured style/theme.
pub fn select_backend(capabilities: &Capabilities) -> Box<dyn RenderBackend> {
    #[cfg(feature = "raster")]
    {
        if capabilities.can_render_image {
            return Box::new(crate::image_renderer::ImageRenderer);
        }
    }
    #[cfg(not(feature = "raster"))]
    let _ = capabilities;

    Box::new(TextRenderer)
}

/// Formats the model as a human-readable plain-text document: greeting and
/// subtitle first, then one heading plus indented item lines per non-empty
/// section, separated by blank lines.
pub struct TextRenderer;

impl RenderBackend for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(
        &self,
        model: &DashboardModel,
        config: &Config,
        _capabilities: &Capabilities,
    ) -> Result<Artifact, RenderError> {
        let mut out = String::new();

        for section in &model.sections {
            if section.kind == SectionKind::Greeting {
                if let Some(item) = section.items.first() {
                    out.push_str(&item.primary_text);
                    out.push('\n');
                    if let Some(subtitle) = &item.secondary_text {
                        out.push_str(subtitle);
                        out.push('\n');
                    }
                }
                continue;
            }
            if section.items.is_empty() {
                continue;
            }

            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');

            let (visible, hidden) = split_items(&section.items, section.kind, config);
            for item in visible {
                let prefix = item_prefix(section.kind, item);
                match &item.secondary_text {
                    Some(secondary) => out.push_str(&format!(
                        "  - {}{}  ({})\n",
                        prefix, item.primary_text, secondary
                    )),
                    None => out.push_str(&format!("  - {}{}\n", prefix, item.primary_text)),
                }
            }
            if hidden > 0 {
                out.push_str(&format!("  … +{} more\n", hidden));
            }
        }

        Ok(Artifact::Text(out))
    }
}

/// Write the image artifact atomically: bytes go to a temporary file in the
/// destination directory, which is persisted over the final path only after
/// a complete write. On any failure no partial file is left in place.
pub fn write_image_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| RenderError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use crate::normalize::build_model;
    use crate::sources::{TodoLine, WeatherReading};
    use chrono::{Local, TimeZone};
    use std::fs;

    fn no_raster() -> Capabilities {
        Capabilities {
            can_render_image: false,
            has_icons: false,
        }
    }

    fn sample_model() -> DashboardModel {
        let now = Local.with_ymd_and_hms(2026, 8, 31, 7, 30, 0).unwrap();
        let weather = WeatherReading {
            location: "Rathenow".to_string(),
            condition: "Sunny".to_string(),
            code: Some(0),
            temp_c: 18.0,
            min_c: 10.0,
            max_c: 20.0,
        };
        let todos = vec![
            TodoLine {
                text: "pay rent".to_string(),
                done: true,
            },
            TodoLine {
                text: "water plants".to_string(),
                done: false,
            },
        ];
        build_model(now, "Rathenow", Some(&weather), &[], &todos, &[])
    }

    #[test]
    fn missing_raster_capability_forces_text_backend() {
        // Style/theme must not matter here: the capability decides alone
        let backend = select_backend(&no_raster());
        assert_eq!(backend.name(), "text");
    }

    #[cfg(feature = "raster")]
    #[test]
    fn raster_capability_selects_image_backend() {
        let capabilities = Capabilities {
            can_render_image: true,
            has_icons: true,
        };
        assert_eq!(select_backend(&capabilities).name(), "image");
    }

    #[test]
    fn text_render_carries_all_sections_in_order() {
        let config = Config::default();
        let artifact = TextRenderer
            .render(&sample_model(), &config, &no_raster())
            .unwrap();
        let Artifact::Text(text) = artifact else {
            panic!("expected text artifact");
        };

        let greeting = text.find("Good morning!").unwrap();
        let weather = text.find("Weather").unwrap();
        let todos = text.find("To-dos").unwrap();
        assert!(greeting < weather && weather < todos);

        assert!(text.contains("Sunny 18.0°C  (10.0°C / 20.0°C)"));
        // Pending before done
        let pending = text.find("[ ] water plants").unwrap();
        let done = text.find("[x] pay rent").unwrap();
        assert!(pending < done);
    }

    #[test]
    fn text_render_marks_hidden_items() {
        let now = Local.with_ymd_and_hms(2026, 8, 31, 7, 30, 0).unwrap();
        let todos: Vec<TodoLine> = (0..10)
            .map(|i| TodoLine {
                text: format!("task {}", i),
                done: false,
            })
            .collect();
        let model = build_model(now, "", None, &[], &todos, &[]);

        let config = Config::default(); // max_items_per_card = 8
        let Artifact::Text(text) = TextRenderer.render(&model, &config, &no_raster()).unwrap()
        else {
            panic!("expected text artifact");
        };
        assert!(text.contains("+2 more"));
    }

    #[test]
    fn greeting_only_model_still_renders() {
        let now = Local.with_ymd_and_hms(2026, 8, 31, 23, 0, 0).unwrap();
        let model = build_model(now, "Rathenow", None, &[], &[], &[]);

        let config = Config::default();
        let Artifact::Text(text) = TextRenderer.render(&model, &config, &no_raster()).unwrap()
        else {
            panic!("expected text artifact");
        };
        assert!(text.starts_with("Good night!"));
    }

    #[test]
    fn atomic_write_places_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.png");

        write_image_atomic(&path, b"not really a png").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"not really a png");
    }

    #[test]
    fn atomic_write_leaves_nothing_on_failure() {
        let path = Path::new("/nonexistent-dir/dashboard.png");
        assert!(write_image_atomic(path, b"bytes").is_err());
        assert!(!path.exists());
    }
}
