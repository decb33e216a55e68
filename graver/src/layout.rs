//! Glyph-run measurement.
//!
//! Arranges a sequence of already-fetched glyph slots onto lines,
//! applying the wrapping mode and optional kerning, and reports
//! per-line geometry plus the overall bounds. Positioning only; no
//! drawing happens here.

use crate::font::{GlyphSlot, LineMetrics};

/// Wrapping behavior for [`measure`].
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct LayoutFlags(u8);

impl LayoutFlags {
    /// Break lines at whitespace when a maximum width is exceeded.
    pub const WORD_WRAP: Self = Self(1 << 0);
    /// Honor explicit newline characters.
    pub const LINE_WRAP: Self = Self(1 << 1);
    /// Measure only up to the first whitespace character.
    pub const SINGLE_WORD: Self = Self(1 << 2);
    /// Measure only the first character.
    pub const SINGLE_CHAR: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for LayoutFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Options controlling a measurement pass.
#[derive(Copy, Clone, Default, Debug)]
pub struct LayoutOptions {
    pub flags: LayoutFlags,
    /// Wrap limit in pixels; unlimited when absent.
    pub max_width: Option<f32>,
    /// Apply pair kerning between consecutive glyphs on a line.
    pub kerning: bool,
}

/// One laid-out line: a half-open glyph range and its pixel geometry.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct LineRecord {
    pub start: usize,
    pub end: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The result of measuring a glyph run.
#[derive(Clone, Default, Debug)]
pub struct TextMetrics {
    pub lines: Vec<LineRecord>,
    /// Width of the widest line.
    pub width: f32,
    /// Total height of all lines.
    pub height: f32,
    /// Number of glyphs consumed before measurement stopped.
    pub glyph_count: usize,
}

/// Arranges `glyphs` onto lines.
///
/// `kerning` supplies the pixel adjustment for a character pair; it is
/// consulted only when the options ask for kerning, and never across a
/// line break.
pub fn measure(
    glyphs: &[GlyphSlot],
    line_metrics: &LineMetrics,
    options: &LayoutOptions,
    mut kerning: impl FnMut(char, char) -> f32,
) -> TextMetrics {
    let flags = options.flags;
    let line_height = line_metrics.line_height;
    let mut metrics = TextMetrics::default();
    let mut push_line = |metrics: &mut TextMetrics, start: usize, end: usize, width: f32| {
        let y = metrics.lines.len() as f32 * line_height;
        metrics.lines.push(LineRecord {
            start,
            end,
            x: 0.0,
            y,
            width,
            height: line_height,
        });
        metrics.width = metrics.width.max(width);
    };

    let mut index = 0;
    let mut start = 0;
    let mut x = 0.0f32;
    let mut previous: Option<char> = None;
    // Last whitespace seen on the current line and the width before it.
    let mut break_point: Option<(usize, f32)> = None;
    while index < glyphs.len() {
        let slot = &glyphs[index];
        let character = slot.character;
        if character == '\n' || character == '\r' {
            if flags.contains(LayoutFlags::LINE_WRAP) {
                push_line(&mut metrics, start, index, x);
                let mut next = index + 1;
                if character == '\r'
                    && glyphs.get(next).map(|g| g.character) == Some('\n')
                {
                    next += 1;
                }
                start = next;
                index = next;
                x = 0.0;
                previous = None;
                break_point = None;
            } else {
                // Without line wrapping a break character is invisible.
                index += 1;
            }
            continue;
        }
        if flags.contains(LayoutFlags::SINGLE_WORD) && character.is_whitespace() {
            break;
        }
        let mut step = slot.advance;
        if options.kerning {
            if let Some(previous) = previous {
                step += kerning(previous, character);
            }
        }
        if flags.contains(LayoutFlags::WORD_WRAP) {
            if let Some(limit) = options.max_width {
                if x + step > limit && index > start {
                    // Break at the last whitespace; a single oversized
                    // word breaks right here instead.
                    let (break_index, width) = match break_point {
                        Some((at, width)) if at > start => (at, width),
                        _ => (index, x),
                    };
                    push_line(&mut metrics, start, break_index, width);
                    start = if glyphs[break_index].character.is_whitespace() {
                        break_index + 1
                    } else {
                        break_index
                    };
                    index = start;
                    x = 0.0;
                    previous = None;
                    break_point = None;
                    continue;
                }
            }
        }
        if character.is_whitespace() {
            break_point = Some((index, x));
        }
        x += step;
        previous = Some(character);
        index += 1;
        if flags.contains(LayoutFlags::SINGLE_CHAR) {
            break;
        }
    }
    if index > start || metrics.lines.is_empty() {
        push_line(&mut metrics, start, index, x);
    }
    metrics.height = metrics.lines.len() as f32 * line_height;
    metrics.glyph_count = index;
    metrics
}
