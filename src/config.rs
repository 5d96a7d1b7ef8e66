//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! dashboard-config.toml file, plus the three environment overrides the
//! dashboard honors at runtime:
//!
//! - `DASH_STYLE`: `cards` | `list` (default `cards`)
//! - `DASH_THEME`: `dark` | `light` (default `dark`)
//! - `DASH_ICONS`: `on` | `off` (default `on`)
//!
//! Unrecognized environment values fall back to the documented default
//! rather than erroring; a missing or invalid config file falls back to the
//! built-in defaults. Configuration is resolved once at startup and is
//! immutable for the run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Overall layout mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Cards,
    List,
}

/// Color palette selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

/// Application configuration loaded from dashboard-config.toml
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Output artifact configuration
    pub output: OutputConfig,
    /// Canvas dimensions
    pub canvas: CanvasConfig,
    /// Style, theme, icons and truncation limits
    pub layout: LayoutConfig,
    /// Data source locations
    pub sources: SourcesConfig,
}

/// Output artifact configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination path of the PNG artifact (image backend)
    pub image_path: String,
}

/// Canvas configuration. Text is always drawn with the built-in mono
/// faces; they are compiled into the binary, so there is no font file to
/// configure or probe for.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in pixels (portrait phone aspect by default)
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
}

/// Layout tuning. Style/theme/icons may be overridden by environment.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub style: Style,
    pub theme: Theme,
    /// Draw per-section glyphs before titles
    pub icons: bool,
    /// Items shown per section before the "+N more" marker
    pub max_items_per_card: usize,
    /// Wrapped lines kept per item before ellipsis truncation
    pub max_lines_per_item: usize,
    /// Hard clip for a card's pixel height (cards style)
    pub max_card_height: u32,
}

/// Data source configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Latitude for the weather forecast
    pub latitude: f64,
    /// Longitude for the weather forecast
    pub longitude: f64,
    /// IANA timezone passed to the forecast API
    pub timezone: String,
    /// Human-readable place name shown in the dashboard subtitle
    pub location_name: String,
    /// Directory holding date-stamped to-do files (YYYY-MM-DD.md)
    pub todos_dir: String,
    /// JSON file mapping name -> { day, month, year? }
    pub birthdays_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            image_path: "dashboard.png".to_string(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 1080,
            height: 2340,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            style: Style::Cards,
            theme: Theme::Dark,
            icons: true,
            max_items_per_card: 8,
            max_lines_per_item: 2,
            max_card_height: 560,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            latitude: 52.60,
            longitude: 12.34,
            timezone: "Europe/Berlin".to_string(),
            location_name: "Rathenow".to_string(),
            todos_dir: "todos".to_string(),
            birthdays_file: "birthdays.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: OutputConfig::default(),
            canvas: CanvasConfig::default(),
            layout: LayoutConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from dashboard-config.toml and apply environment
    /// overrides. Falls back to defaults if the file is missing or invalid.
    pub fn load() -> Self {
        let mut config = Self::load_from_path("dashboard-config.toml");
        config.apply_env_overrides();
        config
    }

    /// Load configuration from the given path without touching the
    /// environment. Falls back to defaults if the file is missing or invalid.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: invalid config file format: {}", e);
                    eprintln!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Apply `DASH_STYLE`, `DASH_THEME` and `DASH_ICONS` on top of the file
    /// configuration. Unset variables leave the file values untouched.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DASH_STYLE") {
            self.layout.style = parse_style(&v);
        }
        if let Ok(v) = std::env::var("DASH_THEME") {
            self.layout.theme = parse_theme(&v);
        }
        if let Ok(v) = std::env::var("DASH_ICONS") {
            self.layout.icons = parse_icons(&v);
        }
    }
}

/// `cards` or `list`; anything else resolves to the default (`cards`).
pub fn parse_style(value: &str) -> Style {
    match value.trim().to_ascii_lowercase().as_str() {
        "list" => Style::List,
        "cards" => Style::Cards,
        _ => Style::Cards,
    }
}

/// `dark` or `light`; anything else resolves to the default (`dark`).
pub fn parse_theme(value: &str) -> Theme {
    match value.trim().to_ascii_lowercase().as_str() {
        "light" => Theme::Light,
        "dark" => Theme::Dark,
        _ => Theme::Dark,
    }
}

/// Icons are on unless explicitly switched off.
pub fn parse_icons(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "off" | "0" | "false" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.canvas.width, 1080);
        assert_eq!(config.canvas.height, 2340);
        assert_eq!(config.layout.style, Style::Cards);
        assert_eq!(config.layout.theme, Theme::Dark);
        assert!(config.layout.icons);
        assert_eq!(config.layout.max_items_per_card, 8);
        assert_eq!(config.layout.max_lines_per_item, 2);
        assert_eq!(config.output.image_path, "dashboard.png");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.canvas.width, parsed.canvas.width);
        assert_eq!(config.layout.style, parsed.layout.style);
        assert_eq!(config.sources.todos_dir, parsed.sources.todos_dir);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: Config = toml::from_str("[layout]\nstyle = \"list\"\n").unwrap();
        assert_eq!(parsed.layout.style, Style::List);
        // Everything not mentioned stays at the default
        assert_eq!(parsed.layout.theme, Theme::Dark);
        assert_eq!(parsed.canvas.width, 1080);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        assert_eq!(config.canvas.width, 1080);
    }

    #[test]
    fn test_env_overrides_win_over_file_values() {
        // This test is the only one touching the DASH_* variables, so the
        // set/assert/remove sequence stays race-free under parallel runs
        std::env::set_var("DASH_STYLE", "list");
        std::env::set_var("DASH_THEME", "light");
        std::env::set_var("DASH_ICONS", "off");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.layout.style, Style::List);
        assert_eq!(config.layout.theme, Theme::Light);
        assert!(!config.layout.icons);

        std::env::remove_var("DASH_STYLE");
        std::env::remove_var("DASH_THEME");
        std::env::remove_var("DASH_ICONS");

        // Unset variables leave the file values untouched
        let mut config = Config::default();
        config.layout.style = Style::List;
        config.apply_env_overrides();
        assert_eq!(config.layout.style, Style::List);
        assert_eq!(config.layout.theme, Theme::Dark);
        assert!(config.layout.icons);
    }

    #[test]
    fn test_parse_style_fallback() {
        assert_eq!(parse_style("list"), Style::List);
        assert_eq!(parse_style(" CARDS "), Style::Cards);
        assert_eq!(parse_style("grid"), Style::Cards);
        assert_eq!(parse_style(""), Style::Cards);
    }

    #[test]
    fn test_parse_theme_fallback() {
        assert_eq!(parse_theme("light"), Theme::Light);
        assert_eq!(parse_theme("Dark"), Theme::Dark);
        assert_eq!(parse_theme("solarized"), Theme::Dark);
    }

    #[test]
    fn test_parse_icons() {
        assert!(parse_icons("on"));
        assert!(parse_icons("anything"));
        assert!(!parse_icons("off"));
        assert!(!parse_icons("0"));
        assert!(!parse_icons("FALSE"));
        assert!(!parse_icons("no"));
    }
}
