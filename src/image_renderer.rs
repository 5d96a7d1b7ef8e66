//! # Image Renderer
//!
//! The raster backend: draws the laid-out dashboard onto an RGBA pixmap and
//! encodes it as PNG at the configured canvas dimensions. Drawing goes
//! through `embedded-graphics` (mono fonts and primitives) targeting a
//! `tiny-skia` pixmap, which also provides the PNG encoder.
//!
//! Built-in mono faces are small, so text is drawn through [`Scaled`], an
//! integer pixel-scaling adapter: every font pixel becomes an NxN block.
//! That keeps text metrics exact multiples of the font cell, which the
//! layout engine relies on for deterministic wrapping.
//!
//! Section glyphs are drawn from primitives rather than emoji (emoji render
//! as boxes in many fonts); each [`Glyph`] variant has a small hand-drawn
//! icon.

use crate::capability::Capabilities;
use crate::config::{Config, Style};
use crate::layout::{
    self, BlockPlan, LayoutPlan, Rgb, BODY_CHAR_W, CORNER_RADIUS_CARDS, HEADER_BAND,
    HEADER_BAND_LIST, HEADER_TOP, LINE_HEIGHT, MARGIN, PAD_X, TITLE_ADVANCE,
};
use crate::renderer::{Artifact, RenderBackend, RenderError};
use crate::{DashboardModel, Glyph, SectionKind};
use core::convert::Infallible;
use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_9X15},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Baseline, Text},
};
use tiny_skia::Pixmap;

/// Pixel scale for the greeting title (10x20 face -> 30x60 cells).
const TITLE_SCALE: i32 = 3;
/// Pixel scale for section headings (10x20 face -> 20x40 cells).
const HEADING_SCALE: i32 = 2;
/// Pixel scale for body text (9x15 face -> 18x30 cells, matching
/// [`layout::BODY_CHAR_W`]).
const BODY_SCALE: i32 = 2;
/// Edge length of a section glyph.
const ICON_SIZE: i32 = 40;

/// RGBA canvas owned by the image backend for the duration of one render.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Allocate a canvas filled with the background color.
    pub fn new(width: u32, height: u32, background: Rgb) -> Result<Self, RenderError> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::Surface("zero-sized canvas"))?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.0,
            background.1,
            background.2,
            255,
        ));
        Ok(Canvas { pixmap })
    }

    /// Encode the surface as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    /// Raw RGBA bytes, row-major. Test hook.
    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.pixmap.width() + x) * 4) as usize;
        let data = self.pixmap.data();
        [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.pixmap.width(), self.pixmap.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let width = self.pixmap.width() as i32;
        let height = self.pixmap.height() as i32;
        let data = self.pixmap.data_mut();

        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 && point.x < width && point.y < height {
                let idx = ((point.y * width + point.x) * 4) as usize;
                data[idx] = color.r();
                data[idx + 1] = color.g();
                data[idx + 2] = color.b();
                data[idx + 3] = 255;
            }
        }
        Ok(())
    }
}

/// Integer pixel scaler: every pixel drawn through this adapter becomes a
/// `factor`x`factor` block at `origin + point * factor` on the target.
struct Scaled<'a, T> {
    target: &'a mut T,
    origin: Point,
    factor: i32,
}

impl<T> OriginDimensions for Scaled<'_, T>
where
    T: Dimensions,
{
    fn size(&self) -> Size {
        let size = self.target.bounding_box().size;
        Size::new(
            size.width / self.factor as u32,
            size.height / self.factor as u32,
        )
    }
}

impl<T> DrawTarget for Scaled<'_, T>
where
    T: DrawTarget<Color = Rgb888, Error = Infallible>,
{
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let base = Point::new(
                self.origin.x + point.x * self.factor,
                self.origin.y + point.y * self.factor,
            );
            self.target.fill_solid(
                &Rectangle::new(base, Size::new(self.factor as u32, self.factor as u32)),
                color,
            )?;
        }
        Ok(())
    }
}

/// Draws the dashboard to a PNG at the configured dimensions.
pub struct ImageRenderer;

impl RenderBackend for ImageRenderer {
    fn name(&self) -> &'static str {
        "image"
    }

    fn render(
        &self,
        model: &DashboardModel,
        config: &Config,
        capabilities: &Capabilities,
    ) -> Result<Artifact, RenderError> {
        let plan = layout::plan(model, config, capabilities.has_icons);

        let mut canvas = Canvas::new(plan.width, plan.height, plan.palette.background)?;
        draw_header(&mut canvas, &plan);
        for block in &plan.blocks {
            draw_block(&mut canvas, &plan, block);
        }

        Ok(Artifact::Image(canvas.encode_png()?))
    }
}

fn color(rgb: Rgb) -> Rgb888 {
    Rgb888::new(rgb.0, rgb.1, rgb.2)
}

/// Draw a string with the given mono face at an integer scale.
fn draw_text(canvas: &mut Canvas, text: &str, x: i32, y: i32, font: &MonoFont, scale: i32, fill: Rgb888) {
    let style = MonoTextStyle::new(font, fill);
    let mut scaled = Scaled {
        target: canvas,
        origin: Point::new(x, y),
        factor: scale,
    };
    Text::with_baseline(text, Point::zero(), style, Baseline::Top)
        .draw(&mut scaled)
        .ok();
}

/// Greeting title and subtitle above the first block.
fn draw_header(canvas: &mut Canvas, plan: &LayoutPlan) {
    draw_text(
        canvas,
        &plan.header.greeting,
        MARGIN,
        HEADER_TOP,
        &FONT_10X20,
        TITLE_SCALE,
        color(plan.palette.primary),
    );
    if let Some(subtitle) = &plan.header.subtitle {
        draw_text(
            canvas,
            subtitle,
            MARGIN,
            HEADER_TOP + TITLE_ADVANCE,
            &FONT_9X15,
            BODY_SCALE,
            color(plan.palette.secondary),
        );
    }
}

/// One section block per the computed geometry.
fn draw_block(canvas: &mut Canvas, plan: &LayoutPlan, block: &BlockPlan) {
    let palette = plan.palette;
    let rect = block.rect;

    let header_band = match plan.style {
        Style::Cards => {
            // Alternate card background like the lower half of the board
            let fill = match block.kind {
                SectionKind::Todos | SectionKind::Birthdays => palette.card_alt,
                _ => palette.card,
            };
            RoundedRectangle::with_equal_corners(
                Rectangle::new(
                    Point::new(rect.x, rect.y),
                    Size::new(rect.w, rect.h),
                ),
                Size::new(CORNER_RADIUS_CARDS, CORNER_RADIUS_CARDS),
            )
            .into_styled(PrimitiveStyle::with_fill(color(fill)))
            .draw(canvas)
            .ok();
            HEADER_BAND
        }
        Style::List => {
            // Flat list: a divider under the heading instead of a background
            Line::new(
                Point::new(rect.x + PAD_X, rect.y + HEADER_BAND_LIST - 12),
                Point::new(rect.x + rect.w as i32 - PAD_X, rect.y + HEADER_BAND_LIST - 12),
            )
            .into_styled(PrimitiveStyle::with_stroke(color(palette.divider), 2))
            .draw(canvas)
            .ok();
            HEADER_BAND_LIST
        }
    };

    if let Some(glyph) = block.icon {
        draw_glyph(
            canvas,
            glyph,
            rect.x + PAD_X,
            rect.y + 22,
            ICON_SIZE,
            color(palette.primary),
            color(palette.secondary),
        );
    }
    draw_text(
        canvas,
        &block.title,
        rect.x + PAD_X + block.title_offset,
        rect.y + 26,
        &FONT_10X20,
        HEADING_SCALE,
        color(palette.primary),
    );

    for (i, line) in block.lines.iter().enumerate() {
        let y = rect.y + header_band + i as i32 * LINE_HEIGHT;
        let fill = if line.muted {
            color(palette.secondary)
        } else {
            color(palette.primary)
        };

        draw_text(
            canvas,
            &line.text,
            rect.x + PAD_X + line.indent,
            y,
            &FONT_9X15,
            BODY_SCALE,
            fill,
        );

        if let Some(secondary) = &line.secondary {
            let x = rect.x + rect.w as i32
                - PAD_X
                - secondary.chars().count() as i32 * BODY_CHAR_W;
            draw_text(
                canvas,
                secondary,
                x,
                y,
                &FONT_9X15,
                BODY_SCALE,
                color(palette.secondary),
            );
        }

        // Dividers between list entries
        if plan.style == Style::List && i + 1 < block.lines.len() {
            let divider_y = y + LINE_HEIGHT - 6;
            Line::new(
                Point::new(rect.x + PAD_X, divider_y),
                Point::new(rect.x + rect.w as i32 - PAD_X, divider_y),
            )
            .into_styled(PrimitiveStyle::with_stroke(color(palette.divider), 1))
            .draw(canvas)
            .ok();
        }
    }
}

/// Draw one primitive glyph at (x, y) with the given edge length.
fn draw_glyph(
    canvas: &mut Canvas,
    glyph: Glyph,
    x: i32,
    y: i32,
    size: i32,
    ink: Rgb888,
    muted: Rgb888,
) {
    let stroke = PrimitiveStyle::with_stroke(ink, 3);
    let stroke_muted = PrimitiveStyle::with_stroke(muted, 2);
    let cx = x + size / 2;
    let cy = y + size / 2;

    match glyph {
        Glyph::Sun => {
            let r = size * 22 / 100;
            Circle::new(Point::new(cx - r, cy - r), (2 * r) as u32)
                .into_styled(stroke)
                .draw(canvas)
                .ok();
            for i in 0..8 {
                let angle = i as f32 * std::f32::consts::FRAC_PI_4;
                let (sin, cos) = angle.sin_cos();
                let r1 = size as f32 * 0.34;
                let r2 = size as f32 * 0.46;
                Line::new(
                    Point::new(cx + (r1 * cos) as i32, cy + (r1 * sin) as i32),
                    Point::new(cx + (r2 * cos) as i32, cy + (r2 * sin) as i32),
                )
                .into_styled(stroke)
                .draw(canvas)
                .ok();
            }
        }
        Glyph::Cloud | Glyph::Rain | Glyph::Snow | Glyph::Storm => {
            draw_cloud_base(canvas, x, y, size, stroke);
            match glyph {
                Glyph::Rain => {
                    for i in 0..3 {
                        let rx = x + size * (30 + i * 18) / 100;
                        Line::new(
                            Point::new(rx, y + size * 74 / 100),
                            Point::new(rx - size / 10, y + size * 92 / 100),
                        )
                        .into_styled(stroke_muted)
                        .draw(canvas)
                        .ok();
                    }
                }
                Glyph::Snow => {
                    for i in 0..3 {
                        let rx = x + size * (30 + i * 18) / 100;
                        Circle::new(Point::new(rx, y + size * 80 / 100), 4)
                            .into_styled(PrimitiveStyle::with_fill(muted))
                            .draw(canvas)
                            .ok();
                    }
                }
                Glyph::Storm => {
                    Line::new(
                        Point::new(cx + size / 10, y + size * 70 / 100),
                        Point::new(cx - size / 10, y + size * 84 / 100),
                    )
                    .into_styled(stroke)
                    .draw(canvas)
                    .ok();
                    Line::new(
                        Point::new(cx - size / 10, y + size * 84 / 100),
                        Point::new(cx + size / 8, y + size * 96 / 100),
                    )
                    .into_styled(stroke)
                    .draw(canvas)
                    .ok();
                }
                _ => {}
            }
        }
        Glyph::Fog => {
            for i in 0..4 {
                let fy = y + size * (30 + i * 14) / 100;
                Line::new(
                    Point::new(x + size * 14 / 100, fy),
                    Point::new(x + size * 86 / 100, fy),
                )
                .into_styled(stroke_muted)
                .draw(canvas)
                .ok();
            }
        }
        Glyph::Calendar => {
            RoundedRectangle::with_equal_corners(
                Rectangle::new(
                    Point::new(x + size / 10, y + size / 5),
                    Size::new((size * 8 / 10) as u32, (size * 7 / 10) as u32),
                ),
                Size::new(4, 4),
            )
            .into_styled(stroke)
            .draw(canvas)
            .ok();
            Line::new(
                Point::new(x + size / 10, y + size * 2 / 5),
                Point::new(x + size * 9 / 10, y + size * 2 / 5),
            )
            .into_styled(stroke)
            .draw(canvas)
            .ok();
            // Binding rings
            for rx in [x + size * 3 / 10, x + size * 7 / 10] {
                Line::new(Point::new(rx, y + size / 10), Point::new(rx, y + size * 3 / 10))
                    .into_styled(stroke)
                    .draw(canvas)
                    .ok();
            }
        }
        Glyph::Checklist => {
            RoundedRectangle::with_equal_corners(
                Rectangle::new(
                    Point::new(x + size / 10, y + size / 10),
                    Size::new((size * 8 / 10) as u32, (size * 8 / 10) as u32),
                ),
                Size::new(6, 6),
            )
            .into_styled(stroke)
            .draw(canvas)
            .ok();
            Line::new(
                Point::new(x + size * 28 / 100, cy),
                Point::new(x + size * 45 / 100, y + size * 68 / 100),
            )
            .into_styled(stroke)
            .draw(canvas)
            .ok();
            Line::new(
                Point::new(x + size * 45 / 100, y + size * 68 / 100),
                Point::new(x + size * 75 / 100, y + size * 30 / 100),
            )
            .into_styled(stroke)
            .draw(canvas)
            .ok();
        }
        Glyph::Cake => {
            RoundedRectangle::with_equal_corners(
                Rectangle::new(
                    Point::new(x + size / 10, cy),
                    Size::new((size * 8 / 10) as u32, (size * 4 / 10) as u32),
                ),
                Size::new(6, 6),
            )
            .into_styled(stroke)
            .draw(canvas)
            .ok();
            for rx in [x + size * 3 / 10, cx, x + size * 7 / 10] {
                Line::new(Point::new(rx, cy), Point::new(rx, y + size / 4))
                    .into_styled(stroke)
                    .draw(canvas)
                    .ok();
                Circle::new(Point::new(rx - 2, y + size / 7), 5)
                    .into_styled(PrimitiveStyle::with_fill(muted))
                    .draw(canvas)
                    .ok();
            }
        }
    }
}

/// Shared cloud outline for the cloud-family glyphs.
fn draw_cloud_base(canvas: &mut Canvas, x: i32, y: i32, size: i32, stroke: PrimitiveStyle<Rgb888>) {
    let base_y = y + size * 46 / 100;
    Circle::new(Point::new(x + size * 18 / 100, base_y - size * 13 / 100), (size * 26 / 100) as u32)
        .into_styled(stroke)
        .draw(canvas)
        .ok();
    Circle::new(Point::new(x + size * 36 / 100, base_y - size * 22 / 100), (size * 32 / 100) as u32)
        .into_styled(stroke)
        .draw(canvas)
        .ok();
    Circle::new(Point::new(x + size * 56 / 100, base_y - size * 13 / 100), (size * 26 / 100) as u32)
        .into_styled(stroke)
        .draw(canvas)
        .ok();
    Line::new(
        Point::new(x + size * 20 / 100, y + size * 64 / 100),
        Point::new(x + size * 80 / 100, y + size * 64 / 100),
    )
    .into_styled(stroke)
    .draw(canvas)
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::build_model;
    use crate::sources::{TodoLine, WeatherReading};
    use chrono::{Local, TimeZone};

    fn capabilities(icons: bool) -> Capabilities {
        Capabilities {
            can_render_image: true,
            has_icons: icons,
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
        let todos = vec![TodoLine {
            text: "water plants".to_string(),
            done: false,
        }];
        build_model(now, "Rathenow", Some(&weather), &[], &todos, &[])
    }

    #[test]
    fn canvas_clips_out_of_bounds_pixels() {
        let mut canvas = Canvas::new(10, 10, Rgb(0, 0, 0)).unwrap();
        canvas
            .draw_iter([
                Pixel(Point::new(5, 5), Rgb888::new(255, 0, 0)),
                Pixel(Point::new(-1, 0), Rgb888::new(255, 0, 0)),
                Pixel(Point::new(10, 10), Rgb888::new(255, 0, 0)),
            ])
            .unwrap();

        assert_eq!(canvas.pixel(5, 5), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn zero_sized_canvas_is_a_surface_error() {
        assert!(matches!(
            Canvas::new(0, 10, Rgb(0, 0, 0)),
            Err(RenderError::Surface(_))
        ));
    }

    #[test]
    fn scaled_adapter_draws_blocks() {
        let mut canvas = Canvas::new(20, 20, Rgb(0, 0, 0)).unwrap();
        let mut scaled = Scaled {
            target: &mut canvas,
            origin: Point::new(4, 4),
            factor: 2,
        };
        scaled
            .draw_iter([Pixel(Point::new(1, 1), Rgb888::new(0, 255, 0))])
            .unwrap();

        // (1,1) at factor 2 from origin (4,4) covers pixels (6..8, 6..8)
        assert_eq!(canvas.pixel(6, 6), [0, 255, 0, 255]);
        assert_eq!(canvas.pixel(7, 7), [0, 255, 0, 255]);
        assert_eq!(canvas.pixel(8, 8), [0, 0, 0, 255]);
    }

    #[test]
    fn render_produces_png_bytes() {
        let mut config = Config::default();
        // Small canvas keeps the test fast
        config.canvas.width = 360;
        config.canvas.height = 780;

        let artifact = ImageRenderer
            .render(&sample_model(), &config, &capabilities(true))
            .unwrap();
        let Artifact::Image(bytes) = artifact else {
            panic!("expected image artifact");
        };
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn render_works_with_icons_off() {
        let mut config = Config::default();
        config.canvas.width = 360;
        config.canvas.height = 780;

        let artifact = ImageRenderer
            .render(&sample_model(), &config, &capabilities(false))
            .unwrap();
        assert!(matches!(artifact, Artifact::Image(_)));
    }

    #[test]
    fn every_glyph_draws_without_panicking() {
        let mut canvas = Canvas::new(64, 64, Rgb(0, 0, 0)).unwrap();
        for glyph in [
            Glyph::Sun,
            Glyph::Cloud,
            Glyph::Fog,
            Glyph::Rain,
            Glyph::Snow,
            Glyph::Storm,
            Glyph::Calendar,
            Glyph::Checklist,
            Glyph::Cake,
        ] {
            draw_glyph(
                &mut canvas,
                glyph,
                12,
                12,
                40,
                Rgb888::new(230, 236, 245),
                Rgb888::new(160, 170, 190),
            );
        }
    }
}
