//! The `glyf` (glyph outline data) table.

use std::io::{Read, Seek};

use graver_types::{F2Dot14, GlyphId, Point, Tag};

use crate::{FontStream, ReadError};

use super::loca::Loca;

pub const TAG: Tag = Tag::new(b"glyf");

// Simple glyph flag bits.
const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

// Composite component flag bits.
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const ROUND_XY_TO_GRID: u16 = 0x0004;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;
const USE_MY_METRICS: u16 = 0x0200;
const SCALED_COMPONENT_OFFSET: u16 = 0x0800;
const UNSCALED_COMPONENT_OFFSET: u16 = 0x1000;

/// A decoded glyph record.
#[derive(Clone, Debug)]
pub enum Glyph {
    /// A glyph with no outline, such as a space.
    Empty,
    Simple(SimpleGlyph),
    Composite(CompositeGlyph),
}

/// An outline defined by its own points and contours.
#[derive(Clone, Default, Debug)]
pub struct SimpleGlyph {
    /// Index of the last point of each contour, strictly increasing.
    pub contour_ends: Vec<u16>,
    pub points: Vec<Point<i32>>,
    pub on_curve: Vec<bool>,
    pub instructions: Vec<u8>,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

/// An outline assembled from transformed child glyphs.
#[derive(Clone, Default, Debug)]
pub struct CompositeGlyph {
    pub components: Vec<Component>,
    pub instructions: Vec<u8>,
    pub y_max: i16,
}

/// Placement of a component relative to its parent.
#[derive(Copy, Clone, Debug)]
pub enum Anchor {
    /// Literal offsets in the child's coordinate space.
    Offset { x: i16, y: i16 },
    /// Align a point already composed into the parent with a point of
    /// the child.
    Points { parent: u16, child: u16 },
}

/// One child reference inside a composite glyph.
#[derive(Clone, Debug)]
pub struct Component {
    pub glyph_id: GlyphId,
    pub anchor: Anchor,
    /// 2x2 transform in row order: xx, yx, xy, yy.
    pub transform: [F2Dot14; 4],
    pub round_to_grid: bool,
    pub scaled_offset: bool,
    pub use_my_metrics: bool,
}

/// All glyph outlines, indexed by glyph id and decoded at load.
///
/// Components store child glyph ids rather than outlines; the scaler
/// resolves them recursively with a depth cap.
#[derive(Clone, Debug)]
pub struct GlyphTable {
    glyphs: Vec<Glyph>,
}

impl GlyphTable {
    pub fn read<R: Read + Seek>(
        stream: &mut FontStream<R>,
        table_offset: u32,
        loca: &Loca,
        num_glyphs: u16,
    ) -> Result<Self, ReadError> {
        let mut glyphs = Vec::with_capacity(num_glyphs as usize);
        for raw_id in 0..num_glyphs {
            let glyph_id = GlyphId::new(raw_id);
            let glyph = match loca.range(glyph_id)? {
                None => Glyph::Empty,
                Some((start, _)) => {
                    stream.seek(table_offset as u64 + start as u64)?;
                    read_glyph(stream, glyph_id, num_glyphs)?
                }
            };
            glyphs.push(glyph);
        }
        Ok(Self { glyphs })
    }

    pub fn glyph(&self, glyph_id: GlyphId) -> Result<&Glyph, ReadError> {
        self.glyphs
            .get(glyph_id.to_usize())
            .ok_or(ReadError::InvalidGlyphId(glyph_id))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

fn read_glyph<R: Read + Seek>(
    stream: &mut FontStream<R>,
    glyph_id: GlyphId,
    num_glyphs: u16,
) -> Result<Glyph, ReadError> {
    let num_contours = stream.read_i16()?;
    let x_min = stream.read_i16()?;
    let y_min = stream.read_i16()?;
    let x_max = stream.read_i16()?;
    let y_max = stream.read_i16()?;
    if num_contours > 0 {
        let mut glyph = read_simple(stream, glyph_id, num_contours as usize)?;
        glyph.x_min = x_min;
        glyph.y_min = y_min;
        glyph.x_max = x_max;
        glyph.y_max = y_max;
        Ok(Glyph::Simple(glyph))
    } else if num_contours == -1 {
        let mut glyph = read_composite(stream, glyph_id, num_glyphs)?;
        glyph.y_max = y_max;
        Ok(Glyph::Composite(glyph))
    } else if num_contours == 0 {
        Ok(Glyph::Empty)
    } else {
        Err(ReadError::InvalidContourCount(glyph_id, num_contours))
    }
}

fn read_simple<R: Read + Seek>(
    stream: &mut FontStream<R>,
    glyph_id: GlyphId,
    num_contours: usize,
) -> Result<SimpleGlyph, ReadError> {
    let mut contour_ends = Vec::with_capacity(num_contours);
    let mut previous: Option<u16> = None;
    for _ in 0..num_contours {
        let end = stream.read_u16()?;
        if previous.map(|p| end <= p).unwrap_or(false) {
            return Err(ReadError::UnorderedContourEndpoints(glyph_id));
        }
        previous = Some(end);
        contour_ends.push(end);
    }
    let num_points = contour_ends.last().map(|end| *end as usize + 1).unwrap_or(0);
    let instruction_length = stream.read_u16()?;
    let instructions = stream.read_bytes(instruction_length as usize)?;
    // Run length encoded flags: a set repeat bit means the next byte
    // counts further copies of the same flag.
    let mut flags = Vec::with_capacity(num_points);
    while flags.len() < num_points {
        let flag = stream.read_u8()?;
        flags.push(flag);
        if flag & REPEAT != 0 {
            let count = stream.read_u8()? as usize;
            for _ in 0..count.min(num_points - flags.len()) {
                flags.push(flag);
            }
        }
    }
    // Coordinates are running deltas, x for all points then y. Short
    // form is an unsigned byte with a separate sign flag; the
    // same-or-positive flag doubles as "repeat previous" for the long
    // form.
    let mut points = vec![Point::new(0i32, 0i32); num_points];
    let mut x = 0i32;
    for (point, flag) in points.iter_mut().zip(&flags) {
        if flag & X_SHORT != 0 {
            let delta = stream.read_u8()? as i32;
            x += if flag & X_SAME_OR_POSITIVE != 0 {
                delta
            } else {
                -delta
            };
        } else if flag & X_SAME_OR_POSITIVE == 0 {
            x += stream.read_i16()? as i32;
        }
        point.x = x;
    }
    let mut y = 0i32;
    for (point, flag) in points.iter_mut().zip(&flags) {
        if flag & Y_SHORT != 0 {
            let delta = stream.read_u8()? as i32;
            y += if flag & Y_SAME_OR_POSITIVE != 0 {
                delta
            } else {
                -delta
            };
        } else if flag & Y_SAME_OR_POSITIVE == 0 {
            y += stream.read_i16()? as i32;
        }
        point.y = y;
    }
    let on_curve = flags.iter().map(|flag| flag & ON_CURVE != 0).collect();
    Ok(SimpleGlyph {
        contour_ends,
        points,
        on_curve,
        instructions,
        ..Default::default()
    })
}

fn read_composite<R: Read + Seek>(
    stream: &mut FontStream<R>,
    glyph_id: GlyphId,
    num_glyphs: u16,
) -> Result<CompositeGlyph, ReadError> {
    let mut components = Vec::new();
    let mut have_instructions = false;
    loop {
        let flags = stream.read_u16()?;
        let child_id = stream.read_u16()?;
        if child_id >= num_glyphs {
            return Err(ReadError::InvalidGlyphId(GlyphId::new(child_id)));
        }
        let (arg1, arg2) = if flags & ARG_1_AND_2_ARE_WORDS != 0 {
            (stream.read_i16()?, stream.read_i16()?)
        } else if flags & ARGS_ARE_XY_VALUES != 0 {
            (stream.read_u8()? as i8 as i16, stream.read_u8()? as i8 as i16)
        } else {
            (stream.read_u8()? as i16, stream.read_u8()? as i16)
        };
        let anchor = if flags & ARGS_ARE_XY_VALUES != 0 {
            Anchor::Offset { x: arg1, y: arg2 }
        } else {
            Anchor::Points {
                parent: arg1 as u16,
                child: arg2 as u16,
            }
        };
        let transform = if flags & WE_HAVE_A_SCALE != 0 {
            let scale = F2Dot14::from_i16_bits(stream.read_i16()?);
            [scale, F2Dot14::ZERO, F2Dot14::ZERO, scale]
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            let x = F2Dot14::from_i16_bits(stream.read_i16()?);
            let y = F2Dot14::from_i16_bits(stream.read_i16()?);
            [x, F2Dot14::ZERO, F2Dot14::ZERO, y]
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            let xx = F2Dot14::from_i16_bits(stream.read_i16()?);
            let yx = F2Dot14::from_i16_bits(stream.read_i16()?);
            let xy = F2Dot14::from_i16_bits(stream.read_i16()?);
            let yy = F2Dot14::from_i16_bits(stream.read_i16()?);
            [xx, yx, xy, yy]
        } else {
            [F2Dot14::ONE, F2Dot14::ZERO, F2Dot14::ZERO, F2Dot14::ONE]
        };
        // The explicit unscaled flag wins when a font sets both.
        let scaled_offset = flags & SCALED_COMPONENT_OFFSET != 0
            && flags & UNSCALED_COMPONENT_OFFSET == 0;
        components.push(Component {
            glyph_id: GlyphId::new(child_id),
            anchor,
            transform,
            round_to_grid: flags & ROUND_XY_TO_GRID != 0,
            scaled_offset,
            use_my_metrics: flags & USE_MY_METRICS != 0,
        });
        if flags & MORE_COMPONENTS == 0 {
            have_instructions = flags & WE_HAVE_INSTRUCTIONS != 0;
            break;
        }
    }
    if components.is_empty() {
        return Err(ReadError::InvalidContourCount(glyph_id, -1));
    }
    let instructions = if have_instructions {
        let length = stream.read_u16()?;
        stream.read_bytes(length as usize)?
    } else {
        Vec::new()
    };
    Ok(CompositeGlyph {
        components,
        instructions,
        ..Default::default()
    })
}
