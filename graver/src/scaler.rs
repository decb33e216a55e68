//! Glyph composition and scaling.
//!
//! Resolves a glyph id to a flat point list in font units (recursing
//! through composites), appends the four phantom points and scales
//! everything to 26.6 pixels. Hinting happens afterwards, in the font
//! facade, so a failed glyph program can fall back to the outline
//! produced here.

use graver_types::{F2Dot14, GlyphId, Point};
use read_sfnt::tables::glyf::{Anchor, CompositeGlyph, Glyph, SimpleGlyph};
use read_sfnt::FontFile;

use crate::error::DrawError;
use crate::outline::{PointFlags, ScaledOutline};

/// Composite nesting bound; beyond this a font is cyclic or hostile.
const MAX_COMPOSITE_DEPTH: u8 = 8;

/// A composed, scaled, not yet hinted glyph with its metrics in font
/// units.
#[derive(Clone, Default, Debug)]
pub(crate) struct ComposedGlyph {
    pub outline: ScaledOutline,
    pub advance: i32,
    pub left_side_bearing: i32,
    pub vertical_advance: i32,
    pub y_max: i32,
}

/// Accumulates one glyph's flattened outline in font units.
#[derive(Default)]
struct Composition {
    points: Vec<Point<i32>>,
    flags: Vec<PointFlags>,
    contour_ends: Vec<u16>,
    /// Glyph whose metrics apply, honoring USE_MY_METRICS.
    metrics_glyph: GlyphId,
}

/// Composes and scales one glyph.
///
/// `scale` converts font units to 26.6 pixels as a 16.16 factor.
pub(crate) fn scale_glyph(
    font: &FontFile,
    glyph_id: GlyphId,
    scale: i32,
) -> Result<ComposedGlyph, DrawError> {
    let mut composition = Composition {
        metrics_glyph: glyph_id,
        ..Default::default()
    };
    let mut instructions = Vec::new();
    let mut is_composite = false;
    let mut y_max = 0;
    if let Some(glyf) = &font.glyf {
        match glyf.glyph(glyph_id)? {
            Glyph::Empty => {}
            Glyph::Simple(simple) => {
                append_simple(&mut composition, simple);
                instructions = simple.instructions.clone();
                y_max = simple.y_max as i32;
            }
            Glyph::Composite(composite) => {
                append_composite(font, &mut composition, glyph_id, composite, 0)?;
                instructions = composite.instructions.clone();
                is_composite = true;
                y_max = composite.y_max as i32;
            }
        }
    }
    let metrics = font.hmtx.get(composition.metrics_glyph)?;
    let advance = metrics.advance as i32;
    let left_side_bearing = metrics.side_bearing as i32;
    // Vertical metrics come from vmtx when present, otherwise they are
    // synthesized from the typographic extents with the bearing
    // adjusted to the glyph's top edge.
    let (vertical_advance, top_side_bearing) = match (&font.vhea, &font.vmtx) {
        (Some(_), Some(vmtx)) => {
            let vertical = vmtx.get(composition.metrics_glyph)?;
            (vertical.advance as i32, vertical.side_bearing as i32)
        }
        _ => {
            let ascender = font.os2.typo_ascender as i32;
            let descender = font.os2.typo_descender as i32;
            (ascender - descender, ascender - y_max)
        }
    };
    let x_min = x_min_of(font, glyph_id)?;
    let Composition {
        mut points,
        mut flags,
        contour_ends,
        ..
    } = composition;
    // Phantom points: horizontal origin and advance edge on the
    // baseline, then the vertical pair.
    let pp1 = Point::new(x_min - left_side_bearing, 0);
    points.push(pp1);
    points.push(Point::new(pp1.x + advance, 0));
    points.push(Point::new(0, y_max + top_side_bearing));
    points.push(Point::new(0, y_max + top_side_bearing - vertical_advance));
    flags.resize(points.len(), PointFlags::off_curve());
    let scaled: Vec<Point<i32>> = points
        .iter()
        .map(|p| Point::new(fixed_mul(p.x, scale), fixed_mul(p.y, scale)))
        .collect();
    Ok(ComposedGlyph {
        outline: ScaledOutline {
            unscaled: points,
            original: scaled.clone(),
            points: scaled,
            flags,
            contour_ends,
            instructions,
            is_composite,
        },
        advance,
        left_side_bearing,
        vertical_advance,
        y_max,
    })
}

fn x_min_of(font: &FontFile, glyph_id: GlyphId) -> Result<i32, DrawError> {
    Ok(match &font.glyf {
        Some(glyf) => match glyf.glyph(glyph_id)? {
            Glyph::Simple(simple) => simple.x_min as i32,
            _ => 0,
        },
        None => 0,
    })
}

fn append_simple(composition: &mut Composition, glyph: &SimpleGlyph) {
    let base = composition.points.len() as u16;
    composition.points.extend_from_slice(&glyph.points);
    composition.flags.extend(glyph.on_curve.iter().map(|on| {
        if *on {
            PointFlags::on_curve()
        } else {
            PointFlags::off_curve()
        }
    }));
    composition
        .contour_ends
        .extend(glyph.contour_ends.iter().map(|end| end + base));
}

fn append_composite(
    font: &FontFile,
    composition: &mut Composition,
    glyph_id: GlyphId,
    glyph: &CompositeGlyph,
    depth: u8,
) -> Result<(), DrawError> {
    if depth >= MAX_COMPOSITE_DEPTH {
        return Err(DrawError::RecursionLimitExceeded(glyph_id));
    }
    let glyf = match &font.glyf {
        Some(glyf) => glyf,
        None => return Ok(()),
    };
    for component in &glyph.components {
        // Compose the child on its own, then transform and place it.
        let mut child = Composition::default();
        match glyf.glyph(component.glyph_id)? {
            Glyph::Empty => {}
            Glyph::Simple(simple) => append_simple(&mut child, simple),
            Glyph::Composite(nested) => {
                append_composite(font, &mut child, component.glyph_id, nested, depth + 1)?
            }
        }
        for point in child.points.iter_mut() {
            *point = transform_point(*point, &component.transform);
        }
        let offset = match component.anchor {
            Anchor::Offset { x, y } => {
                let offset = Point::new(x as i32, y as i32);
                if component.scaled_offset {
                    transform_point(offset, &component.transform)
                } else {
                    offset
                }
            }
            Anchor::Points { parent, child: child_index } => {
                let parent_point = composition
                    .points
                    .get(parent as usize)
                    .copied()
                    .ok_or(DrawError::InvalidAnchorPoint(glyph_id, parent))?;
                let child_point = child
                    .points
                    .get(child_index as usize)
                    .copied()
                    .ok_or(DrawError::InvalidAnchorPoint(glyph_id, child_index))?;
                parent_point - child_point
            }
        };
        let base = composition.points.len() as u16;
        composition
            .points
            .extend(child.points.iter().map(|p| *p + offset));
        composition.flags.extend_from_slice(&child.flags);
        composition
            .contour_ends
            .extend(child.contour_ends.iter().map(|end| end + base));
        if component.use_my_metrics {
            composition.metrics_glyph = component.glyph_id;
        }
    }
    Ok(())
}

fn transform_point(point: Point<i32>, transform: &[F2Dot14; 4]) -> Point<i32> {
    let [xx, yx, xy, yy] = transform.map(|v| v.to_bits());
    Point::new(
        mul14(point.x, xx) + mul14(point.y, xy),
        mul14(point.x, yx) + mul14(point.y, yy),
    )
}

fn mul14(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64 + 0x2000) >> 14) as i32
}

/// 16.16 multiply, for applying the scale factor.
fn fixed_mul(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64 + 0x8000) >> 16) as i32
}

#[cfg(test)]
mod tests {
    use super::scale_glyph;
    use crate::error::DrawError;
    use graver_types::{GlyphId, Point};
    use read_sfnt::FontFile;

    use sfnt_test_data::{composite_font, cyclic_composite_font, minimal_font};

    /// 16 * 96 / 64 = 24 pixel em at 1000 units per em.
    const SCALE: i32 = ((24 * 64) << 16) / 1000;

    #[test]
    fn square_glyph_scales_and_gains_phantoms() {
        let font = FontFile::from_vec(minimal_font()).unwrap();
        let glyph = scale_glyph(&font, GlyphId::new(1), SCALE).unwrap();
        // Four real points plus four phantoms.
        assert_eq!(glyph.outline.points.len(), 8);
        assert_eq!(glyph.outline.contour_ends, vec![3]);
        assert_eq!(glyph.advance, 1000);
        // 1000 font units at 24ppem is exactly 24 pixels: 1536 in
        // 26.6.
        assert_eq!(glyph.outline.points[2], Point::new(1536, 1536));
        // Phantom 2 encodes the advance edge.
        let phantom = glyph.outline.phantom();
        assert_eq!(phantom[1].x, 1536);
        // No hinting ran: working points equal originals.
        assert_eq!(glyph.outline.points, glyph.outline.original);
    }

    #[test]
    fn empty_glyph_has_only_phantoms() {
        let font = FontFile::from_vec(minimal_font()).unwrap();
        let glyph = scale_glyph(&font, GlyphId::new(0), SCALE).unwrap();
        assert_eq!(glyph.outline.points.len(), 4);
        assert!(glyph.outline.contour_ends.is_empty());
    }

    #[test]
    fn composite_places_offset_and_anchored_children() {
        let font = FontFile::from_vec(composite_font()).unwrap();
        let glyph = scale_glyph(&font, GlyphId::new(2), SCALE).unwrap();
        // Two copies of the three point child plus phantoms.
        assert_eq!(glyph.outline.real_point_count(), 6);
        // First child at literal offset (100, 0) in font units.
        assert_eq!(glyph.outline.unscaled[0], Point::new(100, 0));
        // Second child anchored: its point 0 lands on composed point
        // 1, which is (100, 0) + (100, 0).
        assert_eq!(glyph.outline.unscaled[3], Point::new(200, 0));
        assert!(glyph.outline.is_composite);
    }

    #[test]
    fn scaled_component_offset_transforms_the_offset() {
        let font = FontFile::from_vec(composite_font()).unwrap();
        // Glyph 3 applies a half scale with SCALED_COMPONENT_OFFSET;
        // the (100, 0) offset shrinks along with the outline.
        let glyph = scale_glyph(&font, GlyphId::new(3), SCALE).unwrap();
        assert_eq!(glyph.outline.unscaled[0], Point::new(50, 0));
        // Child point (100, 0) is halved then offset by (50, 0).
        assert_eq!(glyph.outline.unscaled[1], Point::new(100, 0));
    }

    #[test]
    fn cyclic_composite_is_fatal() {
        let font = FontFile::from_vec(cyclic_composite_font()).unwrap();
        assert!(matches!(
            scale_glyph(&font, GlyphId::new(1), SCALE),
            Err(DrawError::RecursionLimitExceeded(_))
        ));
    }
}
