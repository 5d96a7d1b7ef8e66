//! # Layout Engine
//!
//! Computes section geometry for the image backend: where each block sits on
//! the canvas, how item text wraps, and what gets truncated. The layout is a
//! pure function of (model, configuration, icon capability): palettes and
//! font metrics are static tables, and nothing here reads ambient state or
//! performs I/O, so every geometry decision is directly testable.
//!
//! ## Geometry model
//!
//! Text is drawn with built-in mono faces through an integer pixel scaler
//! (see [`crate::image_renderer`]), which makes wrapping deterministic: the
//! body glyph cell is [`BODY_CHAR_W`] pixels wide and every item line
//! advances [`LINE_HEIGHT`] pixels.
//!
//! - Style `cards`: each section is a rounded block; blocks stack vertically
//!   with a fixed gap. Block height grows with the wrapped line count and is
//!   clipped to `max_card_height`; items beyond `max_items_per_card` (or
//!   beyond the height budget) collapse into a `+N more` line.
//! - Style `list`: one flat vertical flow, headers as separators, no block
//!   backgrounds and no height clipping beyond the item limit.
//!
//! Toggling icons changes only the title x-offset of a block
//! ([`ICON_OFFSET`]); positions, heights and wrap points are unaffected, so
//! the icon switch never reflows unrelated content.

use crate::config::{Config, Style, Theme};
use crate::{DashboardModel, Glyph, Item, SectionKind};

/// Outer canvas margin in pixels.
pub const MARGIN: i32 = 48;
/// Vertical gap between blocks.
pub const GAP: i32 = 22;
/// Horizontal padding inside a block.
pub const PAD_X: i32 = 34;
/// Bottom padding inside a block.
pub const PAD_BOTTOM: i32 = 30;
/// Top of the greeting header (leaves room for phone status areas).
pub const HEADER_TOP: i32 = 210;
/// Vertical advance after the greeting title.
pub const TITLE_ADVANCE: i32 = 80;
/// Vertical advance after the subtitle.
pub const SUBTITLE_ADVANCE: i32 = 58;
/// Vertical advance per item line.
pub const LINE_HEIGHT: i32 = 44;
/// Title band height inside a card.
pub const HEADER_BAND: i32 = 86;
/// Title band height in list style.
pub const HEADER_BAND_LIST: i32 = 60;
/// Title x-shift when a glyph is drawn before it.
pub const ICON_OFFSET: i32 = 56;
/// Body glyph cell width (9x15 face at 2x scale).
pub const BODY_CHAR_W: i32 = 18;
/// Corner radius for cards style.
pub const CORNER_RADIUS_CARDS: u32 = 34;

/// One RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Fixed palette for a theme. A static lookup table, never computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub card: Rgb,
    pub card_alt: Rgb,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub divider: Rgb,
    pub accent: Rgb,
}

/// Palette lookup per theme.
pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            background: Rgb(13, 16, 22),
            card: Rgb(24, 30, 42),
            card_alt: Rgb(28, 36, 52),
            primary: Rgb(245, 246, 250),
            secondary: Rgb(175, 183, 196),
            divider: Rgb(55, 64, 82),
            accent: Rgb(10, 132, 255),
        },
        Theme::Light => Palette {
            background: Rgb(242, 242, 247),
            card: Rgb(255, 255, 255),
            card_alt: Rgb(255, 255, 255),
            primary: Rgb(18, 18, 20),
            secondary: Rgb(90, 90, 100),
            divider: Rgb(199, 199, 204),
            accent: Rgb(0, 122, 255),
        },
    }
}

/// Pixel rectangle of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

/// One laid-out text line inside a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedLine {
    pub text: String,
    /// Right-aligned annotation (cards style only; list inlines it).
    pub secondary: Option<String>,
    /// Drawn in the secondary color (done to-dos, "+N more" markers).
    pub muted: bool,
    /// Hanging-indent offset in pixels for wrapped continuations.
    pub indent: i32,
}

/// Geometry and content of one section block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockPlan {
    pub kind: SectionKind,
    pub title: String,
    /// Glyph to draw before the title; `None` when icons are off.
    pub icon: Option<Glyph>,
    /// Title x-shift; the only geometry that depends on the icon toggle.
    pub title_offset: i32,
    pub rect: Rect,
    pub lines: Vec<PlannedLine>,
}

/// The greeting header drawn above the blocks.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct HeaderPlan {
    pub greeting: String,
    pub subtitle: Option<String>,
}

/// Complete layout for one canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    pub style: Style,
    pub palette: Palette,
    pub width: u32,
    pub height: u32,
    pub header: HeaderPlan,
    pub blocks: Vec<BlockPlan>,
}

/// Compute the full layout. `icons` is the resolved capability, not the raw
/// configuration flag.
pub fn plan(model: &DashboardModel, config: &Config, icons: bool) -> LayoutPlan {
    let style = config.layout.style;
    let width = config.canvas.width;
    let block_w = width as i32 - 2 * MARGIN;
    let text_cols = ((block_w - 2 * PAD_X) / BODY_CHAR_W).max(1) as usize;

    let header = model
        .section(SectionKind::Greeting)
        .and_then(|s| s.items.first())
        .map(|item| HeaderPlan {
            greeting: item.primary_text.clone(),
            subtitle: item.secondary_text.clone(),
        })
        .unwrap_or_default();

    let header_band = match style {
        Style::Cards => HEADER_BAND,
        Style::List => HEADER_BAND_LIST,
    };

    let mut blocks = Vec::new();
    let mut y = HEADER_TOP + TITLE_ADVANCE + SUBTITLE_ADVANCE;

    for section in &model.sections {
        if section.kind == SectionKind::Greeting || section.items.is_empty() {
            continue;
        }

        let (shown, hidden_total) = split_items(&section.items, section.kind, config);

        let mut lines: Vec<PlannedLine> = Vec::new();
        for item in shown {
            lines.extend(layout_item(
                item,
                section.kind,
                style,
                text_cols,
                config.layout.max_lines_per_item,
            ));
        }
        if hidden_total > 0 {
            lines.push(PlannedLine {
                text: format!("+{} more", hidden_total),
                secondary: None,
                muted: true,
                indent: 0,
            });
        }

        let h = (header_band + lines.len() as i32 * LINE_HEIGHT + PAD_BOTTOM) as u32;
        blocks.push(BlockPlan {
            kind: section.kind,
            title: section.title.clone(),
            icon: if icons { section.icon } else { None },
            title_offset: if icons && section.icon.is_some() {
                ICON_OFFSET
            } else {
                0
            },
            rect: Rect {
                x: MARGIN,
                y,
                w: block_w as u32,
                h,
            },
            lines,
        });

        y += h as i32 + GAP;
    }

    LayoutPlan {
        style,
        palette: palette(config.layout.theme),
        width,
        height: config.canvas.height,
        header,
        blocks,
    }
}

/// Wrap and truncate one item into planned lines.
fn layout_item(
    item: &Item,
    kind: SectionKind,
    style: Style,
    text_cols: usize,
    max_lines: usize,
) -> Vec<PlannedLine> {
    let prefix = item_prefix(kind, item);

    let (text, wrap_cols, secondary) = match style {
        // Cards: secondary right-aligned on the first line, so the first
        // line's wrap width shrinks by its length plus a 2-column gap.
        Style::Cards => {
            let reserve = item
                .secondary_text
                .as_ref()
                .map(|s| s.chars().count() + 2)
                .unwrap_or(0);
            (
                format!("{}{}", prefix, item.primary_text),
                text_cols.saturating_sub(reserve).max(8),
                item.secondary_text.clone(),
            )
        }
        // List: secondary inlined after the primary text.
        Style::List => {
            let text = match &item.secondary_text {
                Some(secondary) => {
                    format!("{}{}  ({})", prefix, item.primary_text, secondary)
                }
                None => format!("{}{}", prefix, item.primary_text),
            };
            (text, text_cols, None)
        }
    };

    let wrapped = truncate_lines(wrap(&text, wrap_cols), max_lines, wrap_cols);
    let hang = prefix.chars().count() as i32 * BODY_CHAR_W;

    wrapped
        .into_iter()
        .enumerate()
        .map(|(i, line)| PlannedLine {
            text: line,
            secondary: if i == 0 { secondary.clone() } else { None },
            muted: item.done,
            indent: if i == 0 { 0 } else { hang },
        })
        .collect()
}

/// Visible prefix for an item line. Only to-dos carry a checkbox; `done`
/// has no meaning elsewhere.
pub fn item_prefix(kind: SectionKind, item: &Item) -> &'static str {
    match kind {
        SectionKind::Todos => {
            if item.done {
                "[x] "
            } else {
                "[ ] "
            }
        }
        _ => "",
    }
}

/// Split a section's items into the shown slice and the hidden count under
/// the configured style and truncation limits: the per-card item limit and,
/// for cards, the card height budget. Both renderer backends go through
/// this, so the text and image artifacts always carry the same items.
pub fn split_items<'a>(
    items: &'a [Item],
    kind: SectionKind,
    config: &Config,
) -> (&'a [Item], usize) {
    let style = config.layout.style;
    let block_w = config.canvas.width as i32 - 2 * MARGIN;
    let text_cols = ((block_w - 2 * PAD_X) / BODY_CHAR_W).max(1) as usize;

    let header_band = match style {
        Style::Cards => HEADER_BAND,
        Style::List => HEADER_BAND_LIST,
    };
    // Cards are clipped to max_card_height; the flat list only limits items.
    let line_budget = match style {
        Style::Cards => {
            ((config.layout.max_card_height as i32 - header_band - PAD_BOTTOM) / LINE_HEIGHT)
                .max(1) as usize
        }
        Style::List => usize::MAX,
    };

    let (visible, hidden) = visible_items(items, config.layout.max_items_per_card);

    let mut shown = 0;
    let mut used = 0;
    for (idx, item) in visible.iter().enumerate() {
        let item_lines =
            layout_item(item, kind, style, text_cols, config.layout.max_lines_per_item).len();

        // Keep one line of slack for the "+N more" marker unless this item
        // is the last one overall and fits completely.
        let is_last = idx + 1 == visible.len() && hidden == 0;
        let limit = if is_last {
            line_budget
        } else {
            line_budget.saturating_sub(1)
        };
        if used + item_lines > limit {
            break;
        }

        used += item_lines;
        shown += 1;
    }

    (&visible[..shown], hidden + (visible.len() - shown))
}

/// Split a section's items at the per-card limit. Returns the visible slice
/// and the count of hidden items.
pub fn visible_items(items: &[Item], max_items: usize) -> (&[Item], usize) {
    let max_items = max_items.max(1);
    if items.len() > max_items {
        (&items[..max_items], items.len() - max_items)
    } else {
        (items, 0)
    }
}

/// Greedy word wrap to `max_cols` character columns. Words longer than a
/// full line are hard-split.
pub fn wrap(text: &str, max_cols: usize) -> Vec<String> {
    let max_cols = max_cols.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len <= max_cols {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len <= max_cols {
            current.push_str(word);
            current_len = word_len;
        } else {
            // Hard-split an overlong word
            let mut chars = word.chars().peekable();
            while chars.peek().is_some() {
                let chunk: String = chars.by_ref().take(max_cols).collect();
                let chunk_len = chunk.chars().count();
                if chunk_len == max_cols {
                    lines.push(chunk);
                } else {
                    current = chunk;
                    current_len = chunk_len;
                }
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Keep at most `max_lines`, marking truncation with an ellipsis on the
/// last kept line.
pub fn truncate_lines(mut lines: Vec<String>, max_lines: usize, max_cols: usize) -> Vec<String> {
    let max_lines = max_lines.max(1);
    if lines.len() <= max_lines {
        return lines;
    }

    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let keep: String = last.chars().take(max_cols.saturating_sub(1)).collect();
        *last = format!("{}…", keep);
    }
    lines
}
