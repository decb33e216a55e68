//! Glyph and twilight zones.

use graver_types::Point;

use crate::outline::PointFlags;

use super::{error::HintErrorKind, math};

use HintErrorKind::{InvalidPointIndex, InvalidPointRange};

/// Selects one of the two point zones.
///
/// The twilight zone holds scratch points with no backing outline; the
/// glyph zone holds the real outline being hinted.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[repr(u8)]
pub enum ZonePointer {
    Twilight = 0,
    #[default]
    Glyph = 1,
}

impl ZonePointer {
    pub fn is_twilight(self) -> bool {
        self == Self::Twilight
    }
}

impl TryFrom<i32> for ZonePointer {
    type Error = HintErrorKind;

    fn try_from(value: i32) -> Result<Self, HintErrorKind> {
        match value {
            0 => Ok(Self::Twilight),
            1 => Ok(Self::Glyph),
            _ => Err(HintErrorKind::InvalidZoneIndex(value)),
        }
    }
}

/// Point storage for one zone.
///
/// `unscaled` holds font units, `original` the scaled positions before
/// any instruction ran, and `points` the working positions the
/// instructions move. Twilight points have no font unit backing and
/// read as zero there.
#[derive(Clone, Default, Debug)]
pub struct Zone {
    pub unscaled: Vec<Point<i32>>,
    pub original: Vec<Point<i32>>,
    pub points: Vec<Point<i32>>,
    pub flags: Vec<PointFlags>,
    pub contour_ends: Vec<u16>,
}

impl Zone {
    /// A twilight zone of `count` zeroed points forming one contour.
    pub fn twilight(count: usize) -> Self {
        Self {
            unscaled: Vec::new(),
            original: vec![Point::default(); count],
            points: vec![Point::default(); count],
            flags: vec![PointFlags::default(); count],
            contour_ends: vec![count.saturating_sub(1) as u16],
        }
    }

    pub fn point(&self, index: usize) -> Result<Point<i32>, HintErrorKind> {
        self.points
            .get(index)
            .copied()
            .ok_or(InvalidPointIndex(index))
    }

    pub fn point_mut(&mut self, index: usize) -> Result<&mut Point<i32>, HintErrorKind> {
        self.points.get_mut(index).ok_or(InvalidPointIndex(index))
    }

    pub fn original(&self, index: usize) -> Result<Point<i32>, HintErrorKind> {
        self.original
            .get(index)
            .copied()
            .ok_or(InvalidPointIndex(index))
    }

    pub fn original_mut(&mut self, index: usize) -> Result<&mut Point<i32>, HintErrorKind> {
        self.original.get_mut(index).ok_or(InvalidPointIndex(index))
    }

    pub fn unscaled(&self, index: usize) -> Point<i32> {
        self.unscaled.get(index).copied().unwrap_or_default()
    }

    pub fn flags(&self, index: usize) -> Result<PointFlags, HintErrorKind> {
        self.flags
            .get(index)
            .copied()
            .ok_or(InvalidPointIndex(index))
    }

    pub fn flags_mut(&mut self, index: usize) -> Result<&mut PointFlags, HintErrorKind> {
        self.flags.get_mut(index).ok_or(InvalidPointIndex(index))
    }

    pub fn contour_end(&self, index: usize) -> Result<u16, HintErrorKind> {
        self.contour_ends
            .get(index)
            .copied()
            .ok_or(HintErrorKind::InvalidContourIndex(index))
    }

    pub fn is_touched(&self, index: usize, x_axis: bool) -> Result<bool, HintErrorKind> {
        let flags = self.flags(index)?;
        Ok(if x_axis {
            flags.is_touched_x()
        } else {
            flags.is_touched_y()
        })
    }

    /// Interpolates untouched points between touched neighbors along
    /// one axis, contour by contour. A contour with no touched point
    /// is left alone; one with a single touched point is shifted
    /// rigidly by that point's displacement.
    pub fn interpolate_untouched(&mut self, x_axis: bool) -> Result<(), HintErrorKind> {
        let mut point = 0;
        for contour in 0..self.contour_ends.len() {
            let first_point = point;
            let mut end_point = self.contour_end(contour)? as usize;
            if end_point >= self.points.len() {
                end_point = self.points.len().saturating_sub(1);
            }
            while point <= end_point && !self.is_touched(point, x_axis)? {
                point += 1;
            }
            if point > end_point {
                continue;
            }
            let first_touched = point;
            let mut last_touched = point;
            point += 1;
            while point <= end_point {
                if self.is_touched(point, x_axis)? {
                    self.iup_interpolate(x_axis, last_touched + 1, point - 1, last_touched, point)?;
                    last_touched = point;
                }
                point += 1;
            }
            if last_touched == first_touched {
                self.iup_shift(x_axis, first_point, end_point, first_touched)?;
            } else {
                self.iup_interpolate(
                    x_axis,
                    last_touched + 1,
                    end_point,
                    last_touched,
                    first_touched,
                )?;
                if first_touched > 0 {
                    self.iup_interpolate(
                        x_axis,
                        first_point,
                        first_touched - 1,
                        last_touched,
                        first_touched,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Shifts `p1..=p2` (excluding `reference`) by the reference
    /// point's displacement.
    fn iup_shift(
        &mut self,
        x_axis: bool,
        p1: usize,
        p2: usize,
        reference: usize,
    ) -> Result<(), HintErrorKind> {
        if p1 > p2 || !(p1..=p2).contains(&reference) {
            return Ok(());
        }
        macro_rules! shift {
            ($coord:ident) => {
                let delta =
                    self.point(reference)?.$coord - self.original(reference)?.$coord;
                if delta != 0 {
                    for index in p1..=p2 {
                        if index != reference {
                            self.points
                                .get_mut(index)
                                .ok_or(InvalidPointIndex(index))?
                                .$coord += delta;
                        }
                    }
                }
            };
        }
        if x_axis {
            shift!(x);
        } else {
            shift!(y);
        }
        Ok(())
    }

    /// Interpolates `p1..=p2` between the two touched reference
    /// points. Points whose original position lies outside the
    /// reference span are shifted with the nearer reference instead.
    fn iup_interpolate(
        &mut self,
        x_axis: bool,
        p1: usize,
        p2: usize,
        mut ref1: usize,
        mut ref2: usize,
    ) -> Result<(), HintErrorKind> {
        if p1 > p2 {
            return Ok(());
        }
        if ref1 >= self.points.len() || ref2 >= self.points.len() {
            return Ok(());
        }
        macro_rules! interpolate {
            ($coord:ident) => {
                let mut orus1 = self.unscaled(ref1).$coord;
                let mut orus2 = self.unscaled(ref2).$coord;
                if orus1 > orus2 {
                    core::mem::swap(&mut orus1, &mut orus2);
                    core::mem::swap(&mut ref1, &mut ref2);
                }
                let org1 = self.original(ref1)?.$coord;
                let org2 = self.original(ref2)?.$coord;
                let cur1 = self.point(ref1)?.$coord;
                let cur2 = self.point(ref2)?.$coord;
                let delta1 = cur1 - org1;
                let delta2 = cur2 - org2;
                if p2 >= self.points.len() || p2 >= self.original.len() {
                    return Err(InvalidPointRange(p1, p2 + 1));
                }
                if cur1 == cur2 || orus1 == orus2 {
                    for index in p1..=p2 {
                        let original = self.original[index].$coord;
                        self.points[index].$coord = if original <= org1 {
                            original + delta1
                        } else if original >= org2 {
                            original + delta2
                        } else {
                            cur1
                        };
                    }
                } else {
                    let scale = math::div(cur2 - cur1, orus2 - orus1);
                    for index in p1..=p2 {
                        let original = self.original[index].$coord;
                        self.points[index].$coord = if original <= org1 {
                            original + delta1
                        } else if original >= org2 {
                            original + delta2
                        } else {
                            cur1 + math::mul(self.unscaled(index).$coord - orus1, scale)
                        };
                    }
                }
            };
        }
        if x_axis {
            interpolate!(x);
        } else {
            interpolate!(y);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Zone;
    use crate::outline::PointFlags;
    use graver_types::Point;

    fn zone(
        unscaled: &[(i32, i32)],
        original: &[(i32, i32)],
        points: &[(i32, i32)],
        touched_x: &[usize],
    ) -> Zone {
        let mut flags = vec![PointFlags::on_curve(); points.len()];
        for index in touched_x {
            flags[*index].touch_x();
        }
        Zone {
            unscaled: unscaled.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
            original: original.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
            points: points.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
            flags,
            contour_ends: vec![points.len() as u16 - 1],
        }
    }

    #[test]
    fn no_touched_points_leaves_contour_unmoved() {
        let mut zone = zone(
            &[(0, 0), (500, 0), (1000, 0)],
            &[(0, 0), (32, 0), (64, 0)],
            &[(0, 0), (32, 0), (64, 0)],
            &[],
        );
        zone.interpolate_untouched(true).unwrap();
        assert_eq!(zone.points, zone.original);
    }

    #[test]
    fn single_touched_point_shifts_whole_contour() {
        let mut zone = zone(
            &[(0, 0), (500, 0), (1000, 0)],
            &[(0, 0), (32, 0), (64, 0)],
            &[(10, 0), (32, 0), (64, 0)],
            &[0],
        );
        zone.interpolate_untouched(true).unwrap();
        let xs: Vec<i32> = zone.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10, 42, 74]);
    }

    #[test]
    fn two_touched_points_interpolate_between() {
        // Reference points at both ends moved +4 and +16; the middle
        // point sits halfway in font units and lands halfway between
        // the moved references.
        let mut zone = zone(
            &[(0, 0), (500, 0), (1000, 0)],
            &[(0, 0), (32, 0), (64, 0)],
            &[(4, 0), (32, 0), (80, 0)],
            &[0, 2],
        );
        zone.interpolate_untouched(true).unwrap();
        assert_eq!(zone.points[1].x, 42);
    }

    #[test]
    fn points_outside_reference_span_shift_with_nearer_edge() {
        let mut zone = zone(
            &[(0, 0), (250, 0), (1000, 0), (1500, 0)],
            &[(0, 0), (16, 0), (64, 0), (96, 0)],
            &[(8, 0), (16, 0), (64, 0), (96, 0)],
            &[0, 2],
        );
        // Touched: 0 (moved +8) and 2 (unmoved). Point 3 lies beyond
        // reference 2 in the original space, so it follows its delta.
        zone.interpolate_untouched(true).unwrap();
        assert_eq!(zone.points[3].x, 96);
        // Point 1 interpolates between the references: a quarter of
        // the span in font units, so a quarter of the current span.
        assert_eq!(zone.points[1].x, 22);
    }
}
