//! Graphics state for the hinting interpreter.

use graver_types::Point;

use super::{
    error::HintErrorKind,
    math,
    round::RoundState,
    zone::{Zone, ZonePointer},
};

/// The axis a projection or movement resolves to, used to take the
/// cheap path when a vector is axis aligned.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum CoordAxis {
    #[default]
    Both,
    X,
    Y,
}

/// Graphics state that survives between interpreter runs.
///
/// The control value program establishes these values once per scale
/// change; every glyph program starts from that snapshot.
#[derive(Copy, Clone, Debug)]
pub struct RetainedGraphicsState {
    pub auto_flip: bool,
    /// 26.6; defaults to 17/16 pixel.
    pub control_value_cutin: i32,
    pub single_width_cutin: i32,
    pub single_width: i32,
    pub delta_base: u16,
    pub delta_shift: u16,
    /// Bit 0 inhibits grid fitting entirely, bit 1 ignores the CVT
    /// program's state changes.
    pub instruct_control: u8,
    /// 26.6; defaults to one pixel.
    pub min_distance: i32,
    pub scan_control: bool,
    pub scan_type: i32,
    /// Font units to 26.6 pixels, as a 16.16 factor.
    pub scale: i32,
    pub ppem: i32,
}

impl Default for RetainedGraphicsState {
    fn default() -> Self {
        Self {
            auto_flip: true,
            control_value_cutin: 68,
            single_width_cutin: 0,
            single_width: 0,
            delta_base: 9,
            delta_shift: 3,
            instruct_control: 0,
            min_distance: 64,
            scan_control: false,
            scan_type: 0,
            scale: 0,
            ppem: 0,
        }
    }
}

impl RetainedGraphicsState {
    pub fn new(scale: i32, ppem: i32) -> Self {
        Self {
            scale,
            ppem,
            ..Default::default()
        }
    }
}

/// The full interpreter state: retained values, vectors, reference
/// points, zone pointers and the two zones themselves.
#[derive(Default, Debug)]
pub struct GraphicsState {
    pub retained: RetainedGraphicsState,
    /// Unit vectors in 2.14.
    pub proj_vector: Point<i32>,
    pub proj_axis: CoordAxis,
    pub dual_proj_vector: Point<i32>,
    pub dual_proj_axis: CoordAxis,
    pub freedom_vector: Point<i32>,
    pub freedom_axis: CoordAxis,
    /// Cached freedom . projection dot product in 2.14.
    pub fdotp: i32,
    pub round_state: RoundState,
    pub rp0: usize,
    pub rp1: usize,
    pub rp2: usize,
    pub loop_counter: u32,
    pub zp0: ZonePointer,
    pub zp1: ZonePointer,
    pub zp2: ZonePointer,
    /// Twilight and glyph zones, in that order.
    pub zones: [Zone; 2],
    pub is_composite: bool,
}

impl GraphicsState {
    pub fn new(retained: RetainedGraphicsState, twilight: Zone, glyph: Zone) -> Self {
        let mut state = Self {
            retained,
            zones: [twilight, glyph],
            ..Default::default()
        };
        state.reset_volatile();
        state
    }

    /// Resets everything the control value program does not own:
    /// vectors, round state, reference points, loop counter and zone
    /// pointers. Called before each program run.
    pub fn reset_volatile(&mut self) {
        let axis_vector = Point::new(0x4000, 0);
        self.proj_vector = axis_vector;
        self.dual_proj_vector = axis_vector;
        self.freedom_vector = axis_vector;
        self.round_state = RoundState::default();
        self.rp0 = 0;
        self.rp1 = 0;
        self.rp2 = 0;
        self.loop_counter = 1;
        self.zp0 = ZonePointer::default();
        self.zp1 = ZonePointer::default();
        self.zp2 = ZonePointer::default();
        self.update_projection_state();
    }

    /// Recomputes the cached axis classification and the freedom to
    /// projection dot product. Must run whenever a vector changes.
    pub fn update_projection_state(&mut self) {
        if self.freedom_vector.x == 0x4000 {
            self.fdotp = self.proj_vector.x;
        } else if self.freedom_vector.y == 0x4000 {
            self.fdotp = self.proj_vector.y;
        } else {
            let px = self.proj_vector.x;
            let py = self.proj_vector.y;
            let fx = self.freedom_vector.x;
            let fy = self.freedom_vector.y;
            self.fdotp = (px * fx + py * fy) >> 14;
        }
        self.proj_axis = axis_of(self.proj_vector);
        self.dual_proj_axis = axis_of(self.dual_proj_vector);
        self.freedom_axis = if self.fdotp == 0x4000 {
            axis_of(self.freedom_vector)
        } else {
            CoordAxis::Both
        };
        // A nearly orthogonal pair would blow up the division in
        // move_point; clamp like the reference rasterizer does.
        if self.fdotp.abs() < 0x400 {
            self.fdotp = 0x4000;
        }
    }

    /// Measures the distance between two points along the projection
    /// vector.
    pub fn project(&self, v1: Point<i32>, v2: Point<i32>) -> i32 {
        match self.proj_axis {
            CoordAxis::X => v1.x - v2.x,
            CoordAxis::Y => v1.y - v2.y,
            CoordAxis::Both => math::dot14(
                v1.x - v2.x,
                v1.y - v2.y,
                self.proj_vector.x,
                self.proj_vector.y,
            ),
        }
    }

    /// Measures along the dual projection vector, which tracks the
    /// original (pre-instruction) outline.
    pub fn dual_project(&self, v1: Point<i32>, v2: Point<i32>) -> i32 {
        match self.dual_proj_axis {
            CoordAxis::X => v1.x - v2.x,
            CoordAxis::Y => v1.y - v2.y,
            CoordAxis::Both => math::dot14(
                v1.x - v2.x,
                v1.y - v2.y,
                self.dual_proj_vector.x,
                self.dual_proj_vector.y,
            ),
        }
    }

    pub fn round(&self, distance: i32) -> i32 {
        self.round_state.round(distance)
    }

    pub fn zone(&self, pointer: ZonePointer) -> &Zone {
        &self.zones[pointer as usize]
    }

    pub fn zone_mut(&mut self, pointer: ZonePointer) -> &mut Zone {
        &mut self.zones[pointer as usize]
    }

    pub fn zp0(&self) -> &Zone {
        self.zone(self.zp0)
    }

    pub fn zp0_mut(&mut self) -> &mut Zone {
        self.zone_mut(self.zp0)
    }

    pub fn zp1(&self) -> &Zone {
        self.zone(self.zp1)
    }

    pub fn zp1_mut(&mut self) -> &mut Zone {
        self.zone_mut(self.zp1)
    }

    pub fn zp2(&self) -> &Zone {
        self.zone(self.zp2)
    }

    pub fn zp2_mut(&mut self) -> &mut Zone {
        self.zone_mut(self.zp2)
    }

    /// Moves a working point the given projected distance along the
    /// freedom vector, marking touch flags for the affected axes.
    pub fn move_point(
        &mut self,
        zone: ZonePointer,
        index: usize,
        distance: i32,
    ) -> Result<(), HintErrorKind> {
        let fv = self.freedom_vector;
        let fdotp = self.fdotp;
        let axis = self.freedom_axis;
        let zone = self.zone_mut(zone);
        match axis {
            CoordAxis::X => {
                zone.point_mut(index)?.x += distance;
                zone.flags_mut(index)?.touch_x();
            }
            CoordAxis::Y => {
                zone.point_mut(index)?.y += distance;
                zone.flags_mut(index)?.touch_y();
            }
            CoordAxis::Both => {
                if fv.x != 0 {
                    zone.point_mut(index)?.x += math::mul_div(distance, fv.x, fdotp);
                    zone.flags_mut(index)?.touch_x();
                }
                if fv.y != 0 {
                    zone.point_mut(index)?.y += math::mul_div(distance, fv.y, fdotp);
                    zone.flags_mut(index)?.touch_y();
                }
            }
        }
        Ok(())
    }

    /// Moves an original point without touching flags; used for
    /// twilight bookkeeping.
    pub fn move_original(
        &mut self,
        zone: ZonePointer,
        index: usize,
        distance: i32,
    ) -> Result<(), HintErrorKind> {
        let fv = self.freedom_vector;
        let fdotp = self.fdotp;
        let axis = self.freedom_axis;
        let point = self.zone_mut(zone).original_mut(index)?;
        match axis {
            CoordAxis::X => point.x += distance,
            CoordAxis::Y => point.y += distance,
            CoordAxis::Both => {
                if fv.x != 0 {
                    point.x += math::mul_div(distance, fv.x, fdotp);
                }
                if fv.y != 0 {
                    point.y += math::mul_div(distance, fv.y, fdotp);
                }
            }
        }
        Ok(())
    }

    /// Moves a point in the zone referenced by zp2 by an explicit
    /// delta; shared by the shift instructions.
    pub fn move_zp2_point(
        &mut self,
        index: usize,
        dx: i32,
        dy: i32,
        touch: bool,
    ) -> Result<(), HintErrorKind> {
        let fv = self.freedom_vector;
        let zone = self.zp2_mut();
        if fv.x != 0 {
            zone.point_mut(index)?.x += dx;
            if touch {
                zone.flags_mut(index)?.touch_x();
            }
        }
        if fv.y != 0 {
            zone.point_mut(index)?.y += dy;
            if touch {
                zone.flags_mut(index)?.touch_y();
            }
        }
        Ok(())
    }

    /// The displacement of the reference point selected by the low bit
    /// of a shift opcode, resolved along the freedom vector.
    pub fn point_displacement(
        &self,
        opcode: u8,
    ) -> Result<PointDisplacement, HintErrorKind> {
        let (zone, index) = if opcode & 1 != 0 {
            (self.zp0, self.rp1)
        } else {
            (self.zp1, self.rp2)
        };
        let zone_data = self.zone(zone);
        let distance = self.project(zone_data.point(index)?, zone_data.original(index)?);
        let fv = self.freedom_vector;
        Ok(PointDisplacement {
            zone,
            index,
            dx: math::mul_div(distance, fv.x, self.fdotp),
            dy: math::mul_div(distance, fv.y, self.fdotp),
        })
    }
}

fn axis_of(vector: Point<i32>) -> CoordAxis {
    if vector.x == 0x4000 {
        CoordAxis::X
    } else if vector.y == 0x4000 {
        CoordAxis::Y
    } else {
        CoordAxis::Both
    }
}

/// Result of [`GraphicsState::point_displacement`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PointDisplacement {
    pub zone: ZonePointer,
    pub index: usize,
    pub dx: i32,
    pub dy: i32,
}
