//! # Capability Detection
//!
//! One startup probe deciding which rendering features are available. The
//! probe is side-effect-free and never fails: anything that cannot be
//! verified is reported as absent.
//!
//! `can_render_image` reflects whether the raster backend was compiled in
//! (cargo feature `raster`). When it is false the pipeline unconditionally
//! selects the text renderer and the configured style/theme are ignored;
//! that policy lives in [`crate::renderer::select_backend`], not scattered
//! through the layout code. Fonts are not a capability: the mono faces the
//! raster backend draws with are compiled into the binary.

use crate::config::Config;

/// Runtime-detected rendering facts, resolved once per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Raster drawing is available (feature `raster` compiled in)
    pub can_render_image: bool,
    /// Per-section glyphs will be drawn
    pub has_icons: bool,
}

/// Probe capabilities for this run.
pub fn detect(config: &Config) -> Capabilities {
    let can_render_image = cfg!(feature = "raster");

    Capabilities {
        can_render_image,
        // Icons only matter on the image path
        has_icons: config.layout.icons && can_render_image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn icons_follow_configuration() {
        let mut config = Config::default();
        config.layout.icons = false;
        assert!(!detect(&config).has_icons);

        config.layout.icons = true;
        let caps = detect(&config);
        assert_eq!(caps.has_icons, caps.can_render_image);
    }

    #[cfg(feature = "raster")]
    #[test]
    fn raster_feature_enables_image_rendering() {
        assert!(detect(&Config::default()).can_render_image);
    }
}
