//! Scanline rasterization of outlines into coverage spans.
//!
//! The rasterizer flattens an outline into line segments, accumulates
//! their signed area into per-scanline cell chains, and sweeps each
//! chain into horizontal spans carrying an 8-bit coverage value.
//! Winding-correct filling falls out of the signed accumulation: a
//! figure-eight cancels where its loops oppose and doubles where they
//! agree, with the doubled coverage clamped at full.

mod cell;
mod decompose;

use graver_types::Point;

use crate::outline::PointFlags;

use cell::CellBuffer;

/// Spans with less coverage than this are dropped outright.
const ALPHA_EPSILON: f32 = 1e-4;

/// A horizontal run of pixels sharing one coverage value.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Span {
    /// First covered pixel column.
    pub x: i32,
    /// One past the last covered pixel column.
    pub end: i32,
    /// Pixel row, top-down.
    pub y: i32,
    /// Sign of the accumulated winding, +1 or -1.
    pub direction: i8,
    /// Coverage quantized to 0..=255.
    pub alpha: u8,
}

impl Span {
    pub fn len(&self) -> u32 {
        (self.end - self.x).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.x
    }
}

/// Reusable rasterizer working state.
///
/// All buffers are cleared at the start of every call, so repeated
/// rasterization of the same outline produces identical spans. One
/// instance serves one thread; share nothing, clone freely.
#[derive(Default)]
pub struct Rasterizer {
    cells: CellBuffer,
    normalized: Vec<Point<f32>>,
    spans: Vec<Span>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterizes an outline into coverage spans.
    ///
    /// With `glyph_space` set, coordinates are taken as already placed
    /// in the raster frame with y growing upward, and output rows are
    /// flipped to the raster's top-down order. Otherwise the outline
    /// is first translated so its own minimum lands at the origin.
    pub fn process(
        &mut self,
        points: &[Point<f32>],
        flags: &[PointFlags],
        contour_ends: &[u16],
        width: u32,
        height: u32,
        glyph_space: bool,
    ) -> &[Span] {
        self.spans.clear();
        if width == 0 || height == 0 || points.is_empty() {
            return &self.spans;
        }
        self.normalized.clear();
        if glyph_space {
            self.normalized.extend_from_slice(points);
        } else {
            let min_x = points.iter().map(|p| p.x).fold(f32::MAX, f32::min);
            let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
            self.normalized
                .extend(points.iter().map(|p| Point::new(p.x - min_x, p.y - min_y)));
        }
        self.cells.reset(width, height);
        let cells = &mut self.cells;
        decompose::decompose(&self.normalized, flags, contour_ends, |from, to| {
            cells.line(from, to)
        });
        self.cells.finish();
        self.sweep(glyph_space);
        &self.spans
    }

    /// Walks each scanline's cell chain, emitting gap spans at the
    /// running coverage and single-pixel spans at each cell.
    fn sweep(&mut self, flip: bool) {
        let width = self.cells.width();
        let height = self.cells.height();
        for row in 0..height {
            let out_y = if flip { height - 1 - row } else { row };
            let mut link = self.cells.head(row as usize);
            let mut x = 0;
            let mut cover = 0.0f32;
            while link != -1 {
                let cell = *self.cells.cell(link);
                if cell.x > x && cover != 0.0 {
                    self.emit(x, cell.x, out_y, cover);
                }
                cover += cell.cover;
                let alpha = cover - cell.area / 2.0;
                self.emit(cell.x, cell.x + 1, out_y, alpha);
                x = cell.x + 1;
                link = cell.next;
            }
            if x < width && cover != 0.0 {
                self.emit(x, width, out_y, cover);
            }
        }
    }

    fn emit(&mut self, x: i32, end: i32, y: i32, value: f32) {
        let magnitude = value.abs().min(1.0);
        if magnitude < ALPHA_EPSILON || end <= x {
            return;
        }
        self.spans.push(Span {
            x,
            end,
            y,
            direction: if value < 0.0 { -1 } else { 1 },
            alpha: (magnitude * 255.0).round() as u8,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{Rasterizer, Span};
    use crate::outline::PointFlags;
    use graver_types::Point;

    fn polygon(points: &[(f32, f32)]) -> (Vec<Point<f32>>, Vec<PointFlags>, Vec<u16>) {
        (
            points.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
            vec![PointFlags::on_curve(); points.len()],
            vec![points.len() as u16 - 1],
        )
    }

    fn coverage_sum(spans: &[Span]) -> f32 {
        spans
            .iter()
            .map(|span| span.len() as f32 * span.alpha as f32 / 255.0)
            .sum()
    }

    #[test]
    fn integer_square_covers_exact_area() {
        let (points, flags, ends) = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let mut rasterizer = Rasterizer::new();
        let spans = rasterizer.process(&points, &flags, &ends, 4, 4, false);
        assert_eq!(coverage_sum(spans), 16.0);
        // Left edge cell, interior gap and right edge cell per row,
        // all fully opaque.
        assert_eq!(spans.len(), 12);
        for span in spans {
            assert_eq!(span.alpha, 255);
        }
        let mut row_cover = [0u32; 4];
        for span in spans {
            row_cover[span.y as usize] += span.len();
        }
        assert_eq!(row_cover, [4, 4, 4, 4]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let (points, flags, ends) =
            polygon(&[(0.2, 0.3), (3.7, 0.1), (3.9, 3.8), (0.4, 3.6)]);
        let mut rasterizer = Rasterizer::new();
        let first: Vec<Span> = rasterizer
            .process(&points, &flags, &ends, 4, 4, false)
            .to_vec();
        let second: Vec<Span> = rasterizer
            .process(&points, &flags, &ends, 4, 4, false)
            .to_vec();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn fractional_edges_produce_partial_coverage() {
        let (points, flags, ends) = polygon(&[(0.5, 0.0), (3.5, 0.0), (3.5, 1.0), (0.5, 1.0)]);
        let mut rasterizer = Rasterizer::new();
        // The shape self-origins: x 0.5..3.5 stays put (min y is 0).
        let spans = rasterizer.process(&points, &flags, &ends, 4, 1, false);
        let total = coverage_sum(spans);
        assert!((total - 3.0).abs() < 0.02, "covered {total}");
        // Edge pixels at half coverage.
        let edge = spans.iter().find(|span| span.x == 0).unwrap();
        assert_eq!(edge.alpha, 128);
    }

    #[test]
    fn winding_direction_is_reported() {
        let (points, flags, ends) = polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let mut rasterizer = Rasterizer::new();
        let counter: Vec<Span> = rasterizer
            .process(&points, &flags, &ends, 2, 2, false)
            .to_vec();
        let (points, flags, ends) = polygon(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]);
        let clockwise: Vec<Span> = rasterizer
            .process(&points, &flags, &ends, 2, 2, false)
            .to_vec();
        // Signed accumulation measures area to the right of upward
        // edges, so the counter-clockwise loop reads negative.
        assert!(counter.iter().all(|span| span.direction == -1));
        assert!(clockwise.iter().all(|span| span.direction == 1));
        assert_eq!(coverage_sum(&counter), coverage_sum(&clockwise));
    }

    #[test]
    fn figure_eight_doubles_where_loops_agree() {
        // Two same-direction loops sharing the column x 1..2: the
        // winding adds there but the reported coverage clamps at one,
        // unlike an even-odd rule which would erase the overlap.
        let points: Vec<Point<f32>> = [
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (0.0, 2.0),
            (1.0, 0.0),
            (3.0, 0.0),
            (3.0, 2.0),
            (1.0, 2.0),
        ]
        .iter()
        .map(|(x, y)| Point::new(*x, *y))
        .collect();
        let flags = vec![PointFlags::on_curve(); 8];
        let ends = vec![3u16, 7];
        let mut rasterizer = Rasterizer::new();
        let spans = rasterizer.process(&points, &flags, &ends, 3, 2, false);
        // Full 3x2 box covered despite the overlap.
        assert_eq!(coverage_sum(spans), 6.0);
        // Opposite-direction overlap cancels instead.
        let points: Vec<Point<f32>> = [
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (0.0, 2.0),
            (1.0, 0.0),
            (1.0, 2.0),
            (3.0, 2.0),
            (3.0, 0.0),
        ]
        .iter()
        .map(|(x, y)| Point::new(*x, *y))
        .collect();
        let spans = rasterizer.process(&points, &flags, &ends, 3, 2, false);
        // The shared column cancels to zero, leaving two single
        // columns.
        assert_eq!(coverage_sum(spans), 4.0);
    }

    #[test]
    fn glyph_space_flips_rows() {
        // A square occupying the bottom half in y-up glyph space lands
        // in the bottom rows of the top-down raster.
        let (points, flags, ends) = polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        let mut rasterizer = Rasterizer::new();
        let spans = rasterizer.process(&points, &flags, &ends, 2, 2, true);
        assert!(spans.iter().all(|span| span.y == 1));
    }

    #[test]
    fn zero_sized_raster_is_empty() {
        let (points, flags, ends) = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let mut rasterizer = Rasterizer::new();
        assert!(rasterizer
            .process(&points, &flags, &ends, 0, 4, false)
            .is_empty());
    }
}
