//! Scaled outline representation shared by the scaler, hinter and
//! rasterizer.

use graver_types::Point;

/// Per-point state: the on-curve bit from the font plus the hinting
/// touch markers.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct PointFlags(u8);

impl PointFlags {
    const ON_CURVE: u8 = 0x01;
    const TOUCHED_X: u8 = 0x08;
    const TOUCHED_Y: u8 = 0x10;

    pub fn on_curve() -> Self {
        Self(Self::ON_CURVE)
    }

    pub fn off_curve() -> Self {
        Self(0)
    }

    pub fn is_on_curve(self) -> bool {
        self.0 & Self::ON_CURVE != 0
    }

    pub fn flip_on_curve(&mut self) {
        self.0 ^= Self::ON_CURVE;
    }

    pub fn set_on_curve(&mut self) {
        self.0 |= Self::ON_CURVE;
    }

    pub fn clear_on_curve(&mut self) {
        self.0 &= !Self::ON_CURVE;
    }

    pub fn is_touched_x(self) -> bool {
        self.0 & Self::TOUCHED_X != 0
    }

    pub fn is_touched_y(self) -> bool {
        self.0 & Self::TOUCHED_Y != 0
    }

    pub fn touch_x(&mut self) {
        self.0 |= Self::TOUCHED_X;
    }

    pub fn touch_y(&mut self) {
        self.0 |= Self::TOUCHED_Y;
    }

    pub fn untouch_x(&mut self) {
        self.0 &= !Self::TOUCHED_X;
    }

    pub fn untouch_y(&mut self) {
        self.0 &= !Self::TOUCHED_Y;
    }
}

/// A composed glyph outline scaled to a pixel size.
///
/// The last four points are the phantom points encoding horizontal and
/// vertical origin and advance; they are scaled and hinted along with
/// the real outline but excluded from the contour list.
#[derive(Clone, Default, Debug)]
pub struct ScaledOutline {
    /// Composed points in font units, including phantoms.
    pub unscaled: Vec<Point<i32>>,
    /// Scaled points in 26.6 pixels, before hinting.
    pub original: Vec<Point<i32>>,
    /// Scaled points in 26.6 pixels; hinting adjusts these in place.
    pub points: Vec<Point<i32>>,
    pub flags: Vec<PointFlags>,
    /// Index of the last point of each contour.
    pub contour_ends: Vec<u16>,
    /// The glyph program, empty when the glyph carries no hints.
    pub instructions: Vec<u8>,
    pub is_composite: bool,
}

impl ScaledOutline {
    /// Number of points excluding the four phantoms.
    pub fn real_point_count(&self) -> usize {
        self.points.len().saturating_sub(4)
    }

    /// The four phantom points in 26.6 pixels.
    pub fn phantom(&self) -> &[Point<i32>] {
        let start = self.real_point_count();
        &self.points[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::PointFlags;

    #[test]
    fn touch_markers_are_independent() {
        let mut flags = PointFlags::on_curve();
        flags.touch_x();
        assert!(flags.is_touched_x());
        assert!(!flags.is_touched_y());
        flags.touch_y();
        flags.untouch_x();
        assert!(!flags.is_touched_x());
        assert!(flags.is_touched_y());
        assert!(flags.is_on_curve());
    }

    #[test]
    fn flip_toggles_only_the_curve_bit() {
        let mut flags = PointFlags::off_curve();
        flags.touch_x();
        flags.flip_on_curve();
        assert!(flags.is_on_curve());
        assert!(flags.is_touched_x());
        flags.flip_on_curve();
        assert!(!flags.is_on_curve());
    }
}
