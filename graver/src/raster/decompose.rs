//! Contour decomposition and quadratic flattening.
//!
//! Walks a TrueType point/flag sequence, resolving the implied
//! on-curve midpoints between consecutive control points, and emits
//! straight line segments; quadratic arcs are adaptively subdivided
//! until flat.

use graver_types::Point;

use crate::outline::PointFlags;

/// Chord deviation below which an arc is drawn as a line, in pixels.
const FLATNESS: f32 = 0.25;
/// Subdivision depth bound; each level divides the deviation by four,
/// so this is far beyond any real contour.
const MAX_SPLIT_DEPTH: u8 = 16;

/// Emits each contour of the outline as closed line-segment loops.
pub(super) fn decompose(
    points: &[Point<f32>],
    flags: &[PointFlags],
    contour_ends: &[u16],
    mut emit: impl FnMut(Point<f32>, Point<f32>),
) {
    let mut start = 0usize;
    for end in contour_ends {
        let end = *end as usize;
        if end >= points.len() {
            break;
        }
        decompose_contour(&points[start..=end], &flags[start..=end], &mut emit);
        start = end + 1;
    }
}

fn decompose_contour(
    points: &[Point<f32>],
    flags: &[PointFlags],
    emit: &mut impl FnMut(Point<f32>, Point<f32>),
) {
    if points.len() < 2 {
        return;
    }
    let on_curve = |index: usize| flags[index].is_on_curve();
    // Establish the starting on-curve point: the first point, else the
    // last, else the midpoint of the two (both being controls).
    let last = points.len() - 1;
    let (start_point, first_index) = if on_curve(0) {
        (points[0], 1)
    } else if on_curve(last) {
        (points[last], 0)
    } else {
        (midpoint(points[0], points[last]), 0)
    };
    let mut current = start_point;
    let mut pending_control: Option<Point<f32>> = None;
    for index in first_index..points.len() {
        let point = points[index];
        if on_curve(index) {
            match pending_control.take() {
                Some(control) => flatten_quad(current, control, point, 0, emit),
                None => emit(current, point),
            }
            current = point;
        } else if let Some(control) = pending_control.replace(point) {
            // Two controls in a row imply an on-curve midpoint.
            let implied = midpoint(control, point);
            flatten_quad(current, control, implied, 0, emit);
            current = implied;
        }
    }
    // Close the contour back to the start.
    match pending_control {
        Some(control) => flatten_quad(current, control, start_point, 0, emit),
        None => {
            if current != start_point {
                emit(current, start_point);
            }
        }
    }
}

/// Adaptive de Casteljau subdivision: the deviation of the control
/// point from the chord midpoint shrinks by four per split.
fn flatten_quad(
    p0: Point<f32>,
    control: Point<f32>,
    p1: Point<f32>,
    depth: u8,
    emit: &mut impl FnMut(Point<f32>, Point<f32>),
) {
    let deviation_x = (p0.x + p1.x - 2.0 * control.x).abs();
    let deviation_y = (p0.y + p1.y - 2.0 * control.y).abs();
    if depth >= MAX_SPLIT_DEPTH || deviation_x.max(deviation_y) <= FLATNESS {
        emit(p0, p1);
        return;
    }
    let a = midpoint(p0, control);
    let b = midpoint(control, p1);
    let middle = midpoint(a, b);
    flatten_quad(p0, a, middle, depth + 1, emit);
    flatten_quad(middle, b, p1, depth + 1, emit);
}

fn midpoint(a: Point<f32>, b: Point<f32>) -> Point<f32> {
    Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}
