//! Signed-area cell accumulation.
//!
//! Each cell records the coverage contributions of every line segment
//! crossing one pixel of one scanline: `cover` is the net vertical
//! crossing (in pixel heights) and `area` is the trapezoidal horizontal
//! weighting `dy * (fx0 + fx1)` summed over segments. Cells on a
//! scanline form a singly linked chain ordered by x, rooted in a
//! per-scanline head array.

use graver_types::Point;

/// Index value marking the end of a chain.
const NIL: i32 = -1;

#[derive(Copy, Clone, Debug)]
pub(super) struct Cell {
    pub x: i32,
    pub next: i32,
    pub cover: f32,
    pub area: f32,
}

/// The cell under accumulation; retired into the chains when a segment
/// moves to a different pixel.
#[derive(Copy, Clone)]
struct ActiveCell {
    x: i32,
    y: i32,
    cover: f32,
    area: f32,
}

/// Reusable cell storage for one rasterization pass.
#[derive(Default)]
pub(super) struct CellBuffer {
    cells: Vec<Cell>,
    /// Chain head per scanline, NIL when empty.
    heads: Vec<i32>,
    active: Option<ActiveCell>,
    width: i32,
    height: i32,
}

impl CellBuffer {
    /// Clears all state from the previous pass and sizes the scanline
    /// table.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.cells.clear();
        self.heads.clear();
        self.heads.resize(height as usize, NIL);
        self.active = None;
        self.width = width as i32;
        self.height = height as i32;
    }

    pub fn head(&self, row: usize) -> i32 {
        self.heads.get(row).copied().unwrap_or(NIL)
    }

    pub fn cell(&self, index: i32) -> &Cell {
        &self.cells[index as usize]
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Accumulates one line segment.
    pub fn line(&mut self, from: Point<f32>, to: Point<f32>) {
        if from.y == to.y {
            // Horizontal segments carry no vertical crossing and a
            // zero trapezoid in this formulation.
            return;
        }
        // Normalize to ascending y, remembering the winding sign.
        let (a, b, sign) = if to.y > from.y {
            (from, to, 1.0f32)
        } else {
            (to, from, -1.0f32)
        };
        let dxdy = (b.x - a.x) / (b.y - a.y);
        let mut y = a.y;
        let mut x = a.x;
        while y < b.y {
            let row = y.floor();
            let next_y = (row + 1.0).min(b.y);
            let next_x = a.x + (next_y - a.y) * dxdy;
            self.row_piece(row as i32, x, y, next_x, next_y, sign);
            x = next_x;
            y = next_y;
        }
    }

    /// Retires the active cell so the chains are complete.
    pub fn finish(&mut self) {
        if let Some(active) = self.active.take() {
            self.retire(active);
        }
    }

    /// Accumulates the part of a segment inside one scanline row,
    /// splitting it at pixel boundaries.
    fn row_piece(&mut self, row: i32, x0: f32, y0: f32, x1: f32, y1: f32, sign: f32) {
        if row < 0 || row >= self.height {
            return;
        }
        let total_dy = y1 - y0;
        let dx = x1 - x0;
        if dx == 0.0 {
            let (ex, fx) = self.clamp_column(x0.floor() as i32, x0 - x0.floor());
            self.accumulate(ex, row, total_dy * sign, fx, fx);
            return;
        }
        let dydx = total_dy / dx;
        let mut cx = x0;
        let mut cy = y0;
        loop {
            // Current column, stepping off an exact boundary when
            // moving left.
            let ex = if dx < 0.0 && cx == cx.floor() {
                cx as i32 - 1
            } else {
                cx.floor() as i32
            };
            let boundary = if dx > 0.0 { ex as f32 + 1.0 } else { ex as f32 };
            let done = if dx > 0.0 {
                boundary >= x1
            } else {
                boundary <= x1
            };
            let (px, py) = if done {
                (x1, y1)
            } else {
                (boundary, y0 + (boundary - x0) * dydx)
            };
            let dy = py - cy;
            let base = ex as f32;
            let (fx0, fx1) = if ex < 0 {
                (0.0, 0.0)
            } else if ex >= self.width {
                (1.0, 1.0)
            } else {
                (cx - base, px - base)
            };
            let ex = ex.clamp(0, self.width - 1);
            self.accumulate(ex, row, dy * sign, fx0, fx1);
            if done {
                break;
            }
            cx = px;
            cy = py;
        }
    }

    /// Keeps columns inside the raster. Out-of-range cells collapse to
    /// the nearest edge with their horizontal weight pinned there, so
    /// coverage from geometry left of the raster still propagates.
    fn clamp_column(&self, ex: i32, fx: f32) -> (i32, f32) {
        if ex < 0 {
            (0, 0.0)
        } else if ex >= self.width {
            (self.width - 1, 1.0)
        } else {
            (ex, fx)
        }
    }

    fn accumulate(&mut self, ex: i32, row: i32, dy: f32, fx0: f32, fx1: f32) {
        match &mut self.active {
            Some(active) if active.x == ex && active.y == row => {
                active.cover += dy;
                active.area += dy * (fx0 + fx1);
            }
            _ => {
                if let Some(previous) = self.active.take() {
                    self.retire(previous);
                }
                self.active = Some(ActiveCell {
                    x: ex,
                    y: row,
                    cover: dy,
                    area: dy * (fx0 + fx1),
                });
            }
        }
    }

    /// Inserts a finished cell into its scanline chain, keeping the
    /// chain x-ordered and merging duplicates.
    fn retire(&mut self, active: ActiveCell) {
        if active.cover == 0.0 && active.area == 0.0 {
            return;
        }
        let row = active.y as usize;
        let mut link = self.heads[row];
        let mut previous = NIL;
        while link != NIL {
            let cell = &mut self.cells[link as usize];
            if cell.x == active.x {
                cell.cover += active.cover;
                cell.area += active.area;
                return;
            }
            if cell.x > active.x {
                break;
            }
            previous = link;
            link = cell.next;
        }
        let index = self.cells.len() as i32;
        self.cells.push(Cell {
            x: active.x,
            next: link,
            cover: active.cover,
            area: active.area,
        });
        if previous == NIL {
            self.heads[row] = index;
        } else {
            self.cells[previous as usize].next = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CellBuffer;
    use graver_types::Point;

    fn chain(buffer: &CellBuffer, row: usize) -> Vec<(i32, f32, f32)> {
        let mut out = Vec::new();
        let mut link = buffer.head(row);
        while link != -1 {
            let cell = buffer.cell(link);
            out.push((cell.x, cell.cover, cell.area));
            link = cell.next;
        }
        out
    }

    #[test]
    fn vertical_edge_fills_one_cell_per_row() {
        let mut buffer = CellBuffer::default();
        buffer.reset(4, 2);
        buffer.line(Point::new(1.5, 0.0), Point::new(1.5, 2.0));
        buffer.finish();
        for row in 0..2 {
            let cells = chain(&buffer, row);
            assert_eq!(cells.len(), 1);
            let (x, cover, area) = cells[0];
            assert_eq!(x, 1);
            assert_eq!(cover, 1.0);
            assert_eq!(area, 1.0); // dy * (0.5 + 0.5)
        }
    }

    #[test]
    fn downward_edge_has_negative_cover() {
        let mut buffer = CellBuffer::default();
        buffer.reset(4, 1);
        buffer.line(Point::new(2.0, 1.0), Point::new(2.0, 0.0));
        buffer.finish();
        let cells = chain(&buffer, 0);
        assert_eq!(cells, vec![(2, -1.0, 0.0)]);
    }

    #[test]
    fn diagonal_splits_across_columns() {
        let mut buffer = CellBuffer::default();
        buffer.reset(2, 1);
        // From (0,0) to (2,1): half the rise in each column.
        buffer.line(Point::new(0.0, 0.0), Point::new(2.0, 1.0));
        buffer.finish();
        let cells = chain(&buffer, 0);
        assert_eq!(cells.len(), 2);
        let (x0, cover0, area0) = cells[0];
        assert_eq!(x0, 0);
        assert!((cover0 - 0.5).abs() < 1e-6);
        // Crosses its column from fx 0 to 1: area = 0.5 * (0 + 1).
        assert!((area0 - 0.5).abs() < 1e-6);
        let (x1, cover1, _) = cells[1];
        assert_eq!(x1, 1);
        assert!((cover1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn same_cell_contributions_merge() {
        let mut buffer = CellBuffer::default();
        buffer.reset(2, 1);
        buffer.line(Point::new(0.25, 0.0), Point::new(0.25, 1.0));
        buffer.line(Point::new(0.75, 1.0), Point::new(0.75, 0.0));
        buffer.finish();
        let cells = chain(&buffer, 0);
        assert_eq!(cells.len(), 1);
        let (_, cover, area) = cells[0];
        assert_eq!(cover, 0.0);
        // +1 * 0.5 and -1 * 1.5.
        assert!((area - -1.0).abs() < 1e-6);
    }

    #[test]
    fn reset_clears_previous_pass() {
        let mut buffer = CellBuffer::default();
        buffer.reset(2, 1);
        buffer.line(Point::new(0.5, 0.0), Point::new(0.5, 1.0));
        buffer.finish();
        assert_ne!(buffer.head(0), -1);
        buffer.reset(2, 1);
        assert_eq!(buffer.head(0), -1);
    }
}
