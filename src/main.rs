//! # Morning Dashboard Entry Point
//!
//! Gathers the day's sections (weather, calendar, to-dos, birthdays),
//! normalizes them into one model and renders the briefing artifact:
//! a PNG on disk, or plain text on stdout with `--text` or when the
//! raster backend is not compiled in.

// Test modules
#[cfg(test)]
mod tests;

use chrono::Local;
use dashboard_lib::renderer::{
    select_backend, write_image_atomic, Artifact, RenderBackend, TextRenderer,
};
use dashboard_lib::{capability, config::Config, normalize, sources};
use std::env;
use std::path::Path;

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    // Text mode: print the briefing to stdout instead of writing the image
    let text_mode = env::args().any(|arg| arg == "--text");

    let config = Config::load();

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    // Every source may fail independently; a failed source drops its
    // section from the briefing but never aborts the run.
    let weather = rt.block_on(async {
        sources::fetch_weather(&config.sources)
            .await
            .map_err(|error| {
                eprintln!("Weather fetch failed: {}", error);
                error
            })
            .ok()
    });

    let events = sources::load_calendar().unwrap_or_else(|error| {
        eprintln!("Calendar read failed: {}", error);
        Vec::new()
    });

    let today = Local::now();
    let todos = sources::load_todos(&config.sources.todos_dir, today.date_naive())
        .unwrap_or_else(|error| {
            eprintln!("To-do read failed: {}", error);
            Vec::new()
        });

    let birthdays =
        sources::load_birthdays(&config.sources.birthdays_file).unwrap_or_else(|error| {
            eprintln!("Birthday read failed: {}", error);
            Vec::new()
        });

    let model = normalize::build_model(
        today,
        &config.sources.location_name,
        weather.as_ref(),
        &events,
        &todos,
        &birthdays,
    );

    let capabilities = capability::detect(&config);
    let backend: Box<dyn RenderBackend> = if text_mode {
        Box::new(TextRenderer)
    } else {
        select_backend(&capabilities)
    };
    eprintln!("Rendering with {} backend", backend.name());

    // Producing or writing the artifact is the only fatal path
    match backend.render(&model, &config, &capabilities)? {
        Artifact::Image(bytes) => {
            let path = Path::new(&config.output.image_path);
            write_image_atomic(path, &bytes)?;
            eprintln!("Dashboard written to {}", path.display());
        }
        Artifact::Text(text) => {
            print!("{}", text);
        }
    }

    Ok(())
}
