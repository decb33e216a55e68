//! The font facade.
//!
//! [`Font`] owns the parsed tables, the hinting instance and a glyph
//! cache keyed by (scale, character). It answers the questions text
//! rendering asks: "give me the outline for this character at this
//! size", "how far apart do these two characters sit" and "how tall is
//! a line".

use std::collections::HashMap;
use std::io::{Read, Seek};

use graver_types::Point;
use read_sfnt::{FontFile, ReadError};

use crate::error::DrawError;
use crate::hint::HintInstance;
use crate::layout::{self, LayoutOptions, TextMetrics};
use crate::outline::{PointFlags, ScaledOutline};
use crate::raster::{Rasterizer, Span};
use crate::scaler::scale_glyph;

/// Pixel sizes at or below this render unhinted; grid fitting at tiny
/// sizes distorts more than it helps.
const HINT_THRESHOLD_PX: f32 = 12.0;

/// A font size in integer points at a display density.
///
/// The rendered pixel size is `points * dpi / 64`, following the
/// classic 1/64th-point device mapping.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Size {
    points: u32,
    dpi: u32,
}

impl Size {
    pub fn new(points: u32) -> Self {
        Self { points, dpi: 96 }
    }

    pub fn with_dpi(points: u32, dpi: u32) -> Self {
        Self { points, dpi }
    }

    pub fn points(self) -> u32 {
        self.points
    }

    pub fn dpi(self) -> u32 {
        self.dpi
    }

    /// The em square in device pixels, before any integer rounding the
    /// font requests.
    pub fn pixels(self) -> f32 {
        (self.points * self.dpi) as f32 / 64.0
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(12)
    }
}

/// Style classification from the `OS/2` selection flags.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub oblique: bool,
}

/// Vertical line spacing in pixels.
///
/// When the font sets `USE_TYPO_METRICS` the triplet comes straight
/// from the typographic fields; otherwise ascent and descent are the
/// win values and the gap is whatever the larger of the `hhea` and win
/// heights leaves over. Either way `line_height` is the sum of the
/// three.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct LineMetrics {
    pub ascent: f32,
    /// Extent below the baseline, as a positive magnitude.
    pub descent: f32,
    pub line_gap: f32,
    pub line_height: f32,
}

/// One character's outline, scaled and hinted, ready to rasterize.
///
/// Points are in pixels with y growing upward from the baseline; the
/// last four are the phantom points. `contour_ends` covers only the
/// real outline, so the phantoms never rasterize.
#[derive(Clone, Default, Debug)]
pub struct GlyphSlot {
    pub character: char,
    pub points: Vec<Point<f32>>,
    pub flags: Vec<PointFlags>,
    pub contour_ends: Vec<u16>,
    /// Ink bounds over the real outline points.
    pub min: Point<f32>,
    pub max: Point<f32>,
    /// Pixel cell covering the ink.
    pub width: u32,
    pub height: u32,
    /// Horizontal advance in pixels, after hinting.
    pub advance: f32,
    /// Distance from the line's top (the ascent line) down to the top
    /// of this glyph's ink.
    pub vertical_offset: f32,
    /// The font's x height at this size.
    pub x_height: f32,
}

impl GlyphSlot {
    fn new(character: char, outline: &ScaledOutline, ascent: f32, x_height: f32) -> Self {
        let real = outline.real_point_count();
        let points: Vec<Point<f32>> = outline
            .points
            .iter()
            .map(|p| p.map(|v| v as f32 / 64.0))
            .collect();
        let mut min = Point::new(f32::MAX, f32::MAX);
        let mut max = Point::new(f32::MIN, f32::MIN);
        for point in &points[..real] {
            min = Point::new(min.x.min(point.x), min.y.min(point.y));
            max = Point::new(max.x.max(point.x), max.y.max(point.y));
        }
        if real == 0 {
            min = Point::new(0.0, 0.0);
            max = Point::new(0.0, 0.0);
        }
        let phantom = &points[real..];
        Self {
            character,
            flags: outline.flags.clone(),
            contour_ends: outline.contour_ends.clone(),
            min,
            max,
            width: (max.x.ceil() - min.x.floor()).max(0.0) as u32,
            height: (max.y.ceil() - min.y.floor()).max(0.0) as u32,
            advance: phantom[1].x - phantom[0].x,
            vertical_offset: ascent - max.y,
            x_height,
            points,
        }
    }

    /// A slot for a character the font does not map: no outline, no
    /// advance, sized by the x height alone.
    fn placeholder(character: char, ascent: f32, x_height: f32) -> Self {
        Self {
            character,
            max: Point::new(0.0, x_height),
            height: x_height.ceil().max(0.0) as u32,
            vertical_offset: ascent - x_height,
            x_height,
            ..Default::default()
        }
    }

    /// Rasterizes the outline into coverage spans over the slot's
    /// `width` by `height` pixel cell.
    pub fn rasterize<'a>(&self, rasterizer: &'a mut Rasterizer) -> &'a [Span] {
        let real = self.points.len().saturating_sub(4);
        let origin = Point::new(self.min.x.floor(), self.min.y.floor());
        let placed: Vec<Point<f32>> = self.points[..real].iter().map(|p| *p - origin).collect();
        rasterizer.process(
            &placed,
            &self.flags[..real],
            &self.contour_ends,
            self.width,
            self.height,
            true,
        )
    }
}

/// A loaded font plus the per-size rendering state.
///
/// The parsed tables are immutable after load; the glyph cache and the
/// hinting instance are not, so a `Font` belongs to one thread at a
/// time.
pub struct Font {
    file: FontFile,
    hinter: HintInstance,
    cache: HashMap<(i32, char), GlyphSlot>,
    size: Size,
    pixel_size: f32,
    /// Font units to 26.6 pixels, as a 16.16 factor.
    scale: i32,
    /// Scale the hinter was last configured for; zero means never.
    hinter_scale: i32,
    hinter_ok: bool,
    hinting_enabled: bool,
    kerning_enabled: bool,
}

impl Font {
    /// Loads a font from a seekable byte source at the default size.
    pub fn load<R: Read + Seek>(source: R) -> Result<Self, ReadError> {
        let file = FontFile::read(source)?;
        let hinter = HintInstance::new(&file);
        let mut font = Self {
            file,
            hinter,
            cache: HashMap::new(),
            size: Size::default(),
            pixel_size: 0.0,
            scale: 0,
            hinter_scale: 0,
            hinter_ok: false,
            hinting_enabled: true,
            kerning_enabled: true,
        };
        font.set_size(Size::default());
        Ok(font)
    }

    /// Loads a font held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<Self, ReadError> {
        Self::load(std::io::Cursor::new(data))
    }

    /// The parsed tables.
    pub fn file(&self) -> &FontFile {
        &self.file
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// The em square in device pixels, after integer rounding when the
    /// font requests it.
    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn units_per_em(&self) -> u16 {
        self.file.head.units_per_em
    }

    /// Changes the rendering size. The glyph cache is dropped whenever
    /// the effective scale changes.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        let mut pixels = size.pixels();
        if self.file.head.integer_ppem() {
            pixels = pixels.round();
        }
        let upem = self.file.head.units_per_em as f64;
        let scale = (pixels as f64 * 64.0 * 65536.0 / upem).round() as i32;
        if scale != self.scale {
            self.cache.clear();
        }
        self.pixel_size = pixels;
        self.scale = scale;
    }

    pub fn set_hinting(&mut self, enabled: bool) {
        if enabled != self.hinting_enabled {
            self.hinting_enabled = enabled;
            self.cache.clear();
        }
    }

    pub fn set_kerning(&mut self, enabled: bool) {
        self.kerning_enabled = enabled;
    }

    pub fn style(&self) -> Style {
        Style {
            bold: self.file.os2.is_bold(),
            italic: self.file.os2.is_italic(),
            oblique: self.file.os2.is_oblique(),
        }
    }

    pub fn family_name(&self) -> Option<&str> {
        self.file.name.as_ref()?.family.as_deref()
    }

    pub fn subfamily_name(&self) -> Option<&str> {
        self.file.name.as_ref()?.subfamily.as_deref()
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.file.post.map(|post| post.is_fixed_pitch).unwrap_or(false)
    }

    pub fn line_metrics(&self) -> LineMetrics {
        let os2 = &self.file.os2;
        let (ascent, descent, gap) = if os2.use_typo_metrics() {
            (
                os2.typo_ascender as i32,
                -(os2.typo_descender as i32),
                os2.typo_line_gap as i32,
            )
        } else {
            let hhea = &self.file.hhea;
            let hhea_height = hhea.ascender as i32 - hhea.descender as i32 + hhea.line_gap as i32;
            let win_height = os2.win_ascent as i32 + os2.win_descent as i32;
            let gap = hhea_height.max(win_height) - win_height;
            (os2.win_ascent as i32, os2.win_descent as i32, gap)
        };
        LineMetrics {
            ascent: self.to_pixels(ascent),
            descent: self.to_pixels(descent),
            line_gap: self.to_pixels(gap),
            line_height: self.to_pixels(ascent + descent + gap),
        }
    }

    pub fn x_height(&self) -> f32 {
        self.to_pixels(self.x_height_units())
    }

    /// Baseline-relative underline position, negative below.
    pub fn underline_position(&self) -> f32 {
        let upem = self.file.head.units_per_em as i32;
        let value = match self.file.post {
            Some(post) if post.underline_position != 0 => post.underline_position as i32,
            _ => -(upem / 10),
        };
        self.to_pixels(value)
    }

    pub fn underline_thickness(&self) -> f32 {
        let upem = self.file.head.units_per_em as i32;
        let value = match self.file.post {
            Some(post) if post.underline_thickness != 0 => post.underline_thickness as i32,
            _ => upem / 14,
        };
        self.to_pixels(value)
    }

    pub fn strikeout_position(&self) -> f32 {
        let value = match self.file.os2.strikeout_position {
            0 => self.x_height_units() / 2,
            v => v as i32,
        };
        self.to_pixels(value)
    }

    pub fn strikeout_size(&self) -> f32 {
        let value = match self.file.os2.strikeout_size {
            0 => self.file.head.units_per_em as i32 / 14,
            v => v as i32,
        };
        self.to_pixels(value)
    }

    /// The outline for a character at the current size, hinted when
    /// eligible. Slots are cached until the size changes.
    pub fn glyph(&mut self, character: char) -> Result<&GlyphSlot, DrawError> {
        let key = (self.scale, character);
        if !self.cache.contains_key(&key) {
            let slot = self.build_slot(character)?;
            self.cache.insert(key, slot);
        }
        Ok(&self.cache[&key])
    }

    /// The kerning adjustment between two characters in whole pixels,
    /// zero when disabled, unmapped or not kerned.
    pub fn kerning(&self, left: char, right: char) -> i32 {
        if !self.kerning_enabled {
            return 0;
        }
        let Some(kern) = &self.file.kern else {
            return 0;
        };
        let (Some(left), Some(right)) = (
            self.file.cmap.map(left as u32),
            self.file.cmap.map(right as u32),
        ) else {
            return 0;
        };
        self.to_pixels(kern.get(left, right) as i32).round() as i32
    }

    /// Measures a text run with the current size and kerning settings.
    pub fn measure(&mut self, text: &str, options: &LayoutOptions) -> Result<TextMetrics, DrawError> {
        let mut glyphs = Vec::new();
        for character in text.chars() {
            glyphs.push(self.glyph(character)?.clone());
        }
        let line = self.line_metrics();
        Ok(layout::measure(&glyphs, &line, options, |left, right| {
            self.kerning(left, right) as f32
        }))
    }

    fn build_slot(&mut self, character: char) -> Result<GlyphSlot, DrawError> {
        let line = self.line_metrics();
        let Some(glyph_id) = self.file.cmap.map(character as u32) else {
            return Ok(GlyphSlot::placeholder(
                character,
                line.ascent,
                self.x_height(),
            ));
        };
        let composed = scale_glyph(&self.file, glyph_id, self.scale)?;
        let mut outline = composed.outline;
        if self.hint_eligible() && !outline.instructions.is_empty() {
            self.prepare_hinter();
            if self.hinter_ok {
                if let Err(err) = self.hinter.hint(&mut outline) {
                    log::warn!("hinting {character:?} failed, rendering unhinted: {err}");
                    outline.points = outline.original.clone();
                    for flags in outline.flags.iter_mut() {
                        flags.untouch_x();
                        flags.untouch_y();
                    }
                }
            }
        }
        Ok(GlyphSlot::new(
            character,
            &outline,
            line.ascent,
            self.x_height(),
        ))
    }

    fn hint_eligible(&self) -> bool {
        self.hinting_enabled && self.pixel_size > HINT_THRESHOLD_PX
    }

    /// Runs the font and control value programs for the current scale,
    /// once per scale change. Failure here disables hinting for the
    /// instance rather than failing glyph requests.
    fn prepare_hinter(&mut self) {
        if self.hinter_scale == self.scale {
            return;
        }
        self.hinter_scale = self.scale;
        let ppem = self.pixel_size.round() as i32;
        match self.hinter.reconfigure(self.scale, ppem) {
            Ok(()) => self.hinter_ok = true,
            Err(err) => {
                log::warn!("font programs failed, hinting disabled: {err}");
                self.hinter_ok = false;
            }
        }
    }

    fn x_height_units(&self) -> i32 {
        match self.file.os2.x_height {
            0 => self.file.head.units_per_em as i32 / 2,
            v => v as i32,
        }
    }

    fn to_pixels(&self, units: i32) -> f32 {
        units as f32 * self.pixel_size / self.file.head.units_per_em as f32
    }
}

#[cfg(test)]
mod tests {
    use super::{Font, Size};
    use crate::raster::Rasterizer;
    use pretty_assertions::assert_eq;
    use sfnt_test_data as data;

    fn font_at(data: Vec<u8>, points: u32) -> Font {
        let mut font = Font::from_vec(data).unwrap();
        font.set_size(Size::new(points));
        font
    }

    #[test]
    fn glyph_at_16_points_is_24_pixels() {
        // 16pt at 96dpi is a 24 pixel em; the square spans the full em.
        let mut font = font_at(data::minimal_font(), 16);
        assert_eq!(font.pixel_size(), 24.0);
        let slot = font.glyph('A').unwrap();
        assert_eq!(slot.points.len(), 8);
        assert_eq!(slot.contour_ends, vec![3]);
        assert_eq!((slot.width, slot.height), (24, 24));
        assert_eq!(slot.advance, 24.0);
        assert_eq!(slot.max.y, 24.0);
    }

    #[test]
    fn unmapped_character_gets_x_height_placeholder() {
        let mut font = font_at(data::minimal_font(), 16);
        // x height is 500 font units: 12 pixels at 24 ppem.
        let slot = font.glyph('Z').unwrap();
        assert!(slot.points.is_empty());
        assert_eq!(slot.width, 0);
        assert_eq!(slot.height, 12);
        assert_eq!(slot.advance, 0.0);
    }

    #[test]
    fn size_change_rescales_cached_glyphs() {
        let mut font = font_at(data::minimal_font(), 16);
        assert_eq!(font.glyph('A').unwrap().width, 24);
        font.set_size(Size::new(32));
        assert_eq!(font.glyph('A').unwrap().width, 48);
        font.set_size(Size::new(16));
        assert_eq!(font.glyph('A').unwrap().width, 24);
    }

    #[test]
    fn kerning_scales_and_rounds() {
        let mut font = font_at(data::kerned_font(-100), 16);
        // -100 font units at 24 ppem is -2.4 pixels.
        assert_eq!(font.kerning('A', 'A'), -2);
        assert_eq!(font.kerning('A', 'Z'), 0);
        font.set_kerning(false);
        assert_eq!(font.kerning('A', 'A'), 0);
    }

    #[test]
    fn line_metrics_without_typo_flag_use_win_values() {
        let font = font_at(data::minimal_font(), 16);
        let line = font.line_metrics();
        // hhea height 800 + 200 + 90 beats win 820 + 210; the excess
        // becomes the gap.
        assert_eq!(line.ascent, 820.0 * 24.0 / 1000.0);
        assert_eq!(line.descent, 210.0 * 24.0 / 1000.0);
        assert_eq!(line.line_gap, 60.0 * 24.0 / 1000.0);
        assert_eq!(line.line_height, 1090.0 * 24.0 / 1000.0);
        assert_eq!(
            line.ascent + line.descent,
            line.line_height - line.line_gap
        );
    }

    #[test]
    fn typo_flag_switches_line_metrics() {
        let square = data::simple_glyph(
            &[&[(0, 0, true), (1000, 0, true), (1000, 1000, true), (0, 1000, true)]],
            &[],
        );
        let (glyf, loca) = data::glyf_and_loca(&[Vec::new(), square]);
        let bytes = data::build_font(&[
            (b"head", data::head(1000)),
            (b"maxp", data::maxp(2)),
            (b"hhea", data::hhea(800, -200, 90, 2)),
            (b"hmtx", data::hmtx(&[(500, 0), (1000, 0)])),
            (b"OS/2", data::os2(0x80 | 0x40, 500)),
            (b"cmap", data::cmap(&[('A' as u32, 1)])),
            (b"loca", loca),
            (b"glyf", glyf),
        ]);
        let font = font_at(bytes, 16);
        let line = font.line_metrics();
        assert_eq!(line.ascent, 800.0 * 24.0 / 1000.0);
        assert_eq!(line.descent, 200.0 * 24.0 / 1000.0);
        assert_eq!(line.line_gap, 90.0 * 24.0 / 1000.0);
        assert_eq!(line.line_height, 1090.0 * 24.0 / 1000.0);
    }

    #[test]
    fn failed_glyph_program_falls_back_to_unhinted() {
        // POP with nothing on the stack aborts the glyph program.
        let bytes = data::minimal_font_with_programs(&[0x21], &[], &[], &[]);
        let mut font = font_at(bytes, 16);
        let slot = font.glyph('A').unwrap();
        assert_eq!((slot.width, slot.height), (24, 24));
        assert_eq!(slot.advance, 24.0);
    }

    #[test]
    fn small_sizes_skip_hinting() {
        // The same broken program is never executed at 12 pixels.
        let bytes = data::minimal_font_with_programs(&[0x21], &[], &[], &[]);
        let mut font = font_at(bytes, 8);
        assert_eq!(font.pixel_size(), 12.0);
        let slot = font.glyph('A').unwrap();
        assert_eq!((slot.width, slot.height), (12, 12));
    }

    #[test]
    fn glyph_program_moves_the_outline() {
        // Shift point 0 by one pixel along y.
        let program = [
            0xB1, 0, 64, // PUSHB[1] point 0, distance 1.0
            0x00, // SVTCA[0]: freedom and projection to y
            0x38, // SHPIX
        ];
        let bytes = data::minimal_font_with_programs(&program, &[], &[], &[]);
        let mut font = font_at(bytes, 16);
        let slot = font.glyph('A').unwrap();
        assert_eq!(slot.points[0].y, 1.0);
        assert_eq!(slot.points[0].x, 0.0);
    }

    #[test]
    fn slot_rasterizes_to_its_own_cell() {
        let mut font = font_at(data::minimal_font(), 16);
        let slot = font.glyph('A').unwrap().clone();
        let mut rasterizer = Rasterizer::new();
        let spans = slot.rasterize(&mut rasterizer);
        let covered: f32 = spans
            .iter()
            .map(|span| span.len() as f32 * span.alpha as f32 / 255.0)
            .sum();
        assert_eq!(covered, (slot.width * slot.height) as f32);
    }

    #[test]
    fn style_and_names_are_exposed() {
        let font = font_at(data::minimal_font(), 16);
        let style = font.style();
        assert!(!style.bold && !style.italic && !style.oblique);
        assert_eq!(font.family_name(), None);
        assert!(!font.is_fixed_pitch());
        // No post table: computed defaults from the 1000 unit em.
        assert_eq!(font.underline_position(), -100.0 * 24.0 / 1000.0);
        assert_eq!(font.underline_thickness(), (1000 / 14) as f32 * 24.0 / 1000.0);
    }
}
