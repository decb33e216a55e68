//! Graphics state instructions: vectors, reference points, zone
//! pointers, rounding and the assorted scalar controls.

use graver_types::Point;

use super::{
    super::{
        math,
        round::RoundMode,
        zone::ZonePointer,
        HintErrorKind,
    },
    Engine, OpResult,
};

impl Engine<'_> {
    /// SVTCA, SPVTCA, SFVTCA (0x00 - 0x05): sets vectors to a
    /// coordinate axis. Odd opcodes select the x axis, even the y
    /// axis; the group selects which vectors are affected.
    pub(super) fn op_svtca(&mut self, opcode: u8) -> OpResult {
        let x = ((opcode as i32 & 1) << 14) as i32;
        let y = x ^ 0x4000;
        let vector = Point::new(x, y);
        if opcode < 0x04 {
            self.graphics.proj_vector = vector;
            self.graphics.dual_proj_vector = vector;
        }
        if opcode & 2 == 0 {
            self.graphics.freedom_vector = vector;
        }
        self.graphics.update_projection_state();
        Ok(())
    }

    /// SPVTL, SFVTL (0x06 - 0x09): sets a vector parallel (or, for odd
    /// opcodes, perpendicular) to the line between two points.
    pub(super) fn op_svtl(&mut self, opcode: u8) -> OpResult {
        let index1 = self.value_stack.pop_usize()?;
        let index2 = self.value_stack.pop_usize()?;
        let p1 = self.graphics.zp1().point(index2)?;
        let p2 = self.graphics.zp2().point(index1)?;
        let vector = line_vector(p1, p2, opcode);
        if opcode <= 0x07 {
            self.graphics.proj_vector = vector;
            self.graphics.dual_proj_vector = vector;
        } else {
            self.graphics.freedom_vector = vector;
        }
        self.graphics.update_projection_state();
        Ok(())
    }

    /// SDPVTL (0x86 - 0x87): dual projection vector from the original
    /// positions of two points, projection vector from their current
    /// positions.
    pub(super) fn op_sdpvtl(&mut self, opcode: u8) -> OpResult {
        let p1 = self.value_stack.pop_usize()?;
        let p2 = self.value_stack.pop_usize()?;
        let original1 = self.graphics.zp1().original(p2)?;
        let original2 = self.graphics.zp2().original(p1)?;
        self.graphics.dual_proj_vector = line_vector(original1, original2, opcode);
        let current1 = self.graphics.zp1().point(p2)?;
        let current2 = self.graphics.zp2().point(p1)?;
        self.graphics.proj_vector = line_vector(current1, current2, opcode);
        self.graphics.update_projection_state();
        Ok(())
    }

    /// SPVFS (0x0A): projection vector from stack components in 2.14.
    pub(super) fn op_spvfs(&mut self) -> OpResult {
        let y = self.value_stack.pop()? as i16 as i32;
        let x = self.value_stack.pop()? as i16 as i32;
        let vector = math::normalize14(x, y);
        self.graphics.proj_vector = vector;
        self.graphics.dual_proj_vector = vector;
        self.graphics.update_projection_state();
        Ok(())
    }

    /// SFVFS (0x0B): freedom vector from stack components in 2.14.
    pub(super) fn op_sfvfs(&mut self) -> OpResult {
        let y = self.value_stack.pop()? as i16 as i32;
        let x = self.value_stack.pop()? as i16 as i32;
        self.graphics.freedom_vector = math::normalize14(x, y);
        self.graphics.update_projection_state();
        Ok(())
    }

    /// GPV (0x0C)
    pub(super) fn op_gpv(&mut self) -> OpResult {
        let vector = self.graphics.proj_vector;
        self.value_stack.push(vector.x)?;
        self.value_stack.push(vector.y)
    }

    /// GFV (0x0D)
    pub(super) fn op_gfv(&mut self) -> OpResult {
        let vector = self.graphics.freedom_vector;
        self.value_stack.push(vector.x)?;
        self.value_stack.push(vector.y)
    }

    /// SFVTPV (0x0E)
    pub(super) fn op_sfvtpv(&mut self) -> OpResult {
        self.graphics.freedom_vector = self.graphics.proj_vector;
        self.graphics.update_projection_state();
        Ok(())
    }

    pub(super) fn op_srp0(&mut self) -> OpResult {
        self.graphics.rp0 = self.value_stack.pop_usize()?;
        Ok(())
    }

    pub(super) fn op_srp1(&mut self) -> OpResult {
        self.graphics.rp1 = self.value_stack.pop_usize()?;
        Ok(())
    }

    pub(super) fn op_srp2(&mut self) -> OpResult {
        self.graphics.rp2 = self.value_stack.pop_usize()?;
        Ok(())
    }

    pub(super) fn op_szp0(&mut self) -> OpResult {
        self.graphics.zp0 = ZonePointer::try_from(self.value_stack.pop()?)?;
        Ok(())
    }

    pub(super) fn op_szp1(&mut self) -> OpResult {
        self.graphics.zp1 = ZonePointer::try_from(self.value_stack.pop()?)?;
        Ok(())
    }

    pub(super) fn op_szp2(&mut self) -> OpResult {
        self.graphics.zp2 = ZonePointer::try_from(self.value_stack.pop()?)?;
        Ok(())
    }

    /// SZPS (0x16): sets all three zone pointers at once.
    pub(super) fn op_szps(&mut self) -> OpResult {
        let zone = ZonePointer::try_from(self.value_stack.pop()?)?;
        self.graphics.zp0 = zone;
        self.graphics.zp1 = zone;
        self.graphics.zp2 = zone;
        Ok(())
    }

    /// SLOOP (0x17): the counter consumed by the looping point
    /// instructions. Negative values are malformed bytecode.
    pub(super) fn op_sloop(&mut self) -> OpResult {
        let count = self.value_stack.pop()?;
        if count < 0 {
            return Err(HintErrorKind::NegativeLoopCounter);
        }
        self.graphics.loop_counter = (count as u32).min(0xFFFF);
        Ok(())
    }

    pub(super) fn op_rtg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::Grid;
        Ok(())
    }

    pub(super) fn op_rthg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::HalfGrid;
        Ok(())
    }

    pub(super) fn op_rtdg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::DoubleGrid;
        Ok(())
    }

    pub(super) fn op_rdtg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::DownToGrid;
        Ok(())
    }

    pub(super) fn op_rutg(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::UpToGrid;
        Ok(())
    }

    pub(super) fn op_roff(&mut self) -> OpResult {
        self.graphics.round_state.mode = RoundMode::Off;
        Ok(())
    }

    /// SROUND (0x76) and S45ROUND (0x77): decodes the packed
    /// period/phase/threshold selector. The selector works on a 2.14
    /// "gridPeriod" that is shifted down to 26.6 at the end.
    pub(super) fn op_sround(&mut self) -> OpResult {
        self.set_super_round(0x4000, RoundMode::Super)
    }

    pub(super) fn op_s45round(&mut self) -> OpResult {
        // sqrt(2)/2 in 2.14.
        self.set_super_round(0x2D41, RoundMode::Super45)
    }

    fn set_super_round(&mut self, grid_period: i32, mode: RoundMode) -> OpResult {
        let selector = self.value_stack.pop()?;
        let round = &mut self.graphics.round_state;
        round.mode = mode;
        round.period = match selector & 0xC0 {
            0x00 => grid_period / 2,
            0x40 => grid_period,
            0x80 => grid_period * 2,
            _ => grid_period,
        };
        round.phase = match selector & 0x30 {
            0x00 => 0,
            0x10 => round.period / 4,
            0x20 => round.period / 2,
            _ => round.period * 3 / 4,
        };
        round.threshold = if selector & 0x0F == 0 {
            round.period - 1
        } else {
            ((selector & 0x0F) - 4) * round.period / 8
        };
        round.period >>= 8;
        round.phase >>= 8;
        round.threshold >>= 8;
        Ok(())
    }

    pub(super) fn op_smd(&mut self) -> OpResult {
        self.graphics.retained.min_distance = self.value_stack.pop()?;
        Ok(())
    }

    pub(super) fn op_scvtci(&mut self) -> OpResult {
        self.graphics.retained.control_value_cutin = self.value_stack.pop()?;
        Ok(())
    }

    pub(super) fn op_sswci(&mut self) -> OpResult {
        self.graphics.retained.single_width_cutin = self.value_stack.pop()?;
        Ok(())
    }

    /// SSW (0x1F): the single width is given in font units and stored
    /// scaled.
    pub(super) fn op_ssw(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        self.graphics.retained.single_width = math::mul(value, self.graphics.retained.scale);
        Ok(())
    }

    pub(super) fn op_flipon(&mut self) -> OpResult {
        self.graphics.retained.auto_flip = true;
        Ok(())
    }

    pub(super) fn op_flipoff(&mut self) -> OpResult {
        self.graphics.retained.auto_flip = false;
        Ok(())
    }

    pub(super) fn op_sdb(&mut self) -> OpResult {
        self.graphics.retained.delta_base = self.value_stack.pop()? as u16;
        Ok(())
    }

    pub(super) fn op_sds(&mut self) -> OpResult {
        self.graphics.retained.delta_shift = self.value_stack.pop()?.clamp(0, 6) as u16;
        Ok(())
    }

    /// SCANCTRL (0x85): dropout control threshold flags. Recorded but
    /// not consumed by the anti-aliased rasterizer.
    pub(super) fn op_scanctrl(&mut self) -> OpResult {
        let flags = self.value_stack.pop()? as u16;
        let threshold = flags & 0xFF;
        let control = &mut self.graphics.retained.scan_control;
        if threshold == 0xFF {
            *control = true;
        } else if threshold == 0 {
            *control = false;
        } else {
            let ppem = self.graphics.retained.ppem;
            if flags & 0x100 != 0 && ppem <= threshold as i32 {
                *control = true;
            }
            if flags & 0x800 != 0 && ppem > threshold as i32 {
                *control = false;
            }
        }
        Ok(())
    }

    /// SCANTYPE (0x8D)
    pub(super) fn op_scantype(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        if value >= 0 {
            self.graphics.retained.scan_type = value & 0xFFFF;
        }
        Ok(())
    }

    /// INSTCTRL (0x8E): toggles one of the instruction control bits.
    /// Selector 1 inhibits grid fitting, selector 2 discards the
    /// control value program's state changes.
    pub(super) fn op_instctrl(&mut self) -> OpResult {
        let selector = self.value_stack.pop()?;
        let value = self.value_stack.pop()?;
        if !(1..=3).contains(&selector) {
            return Ok(());
        }
        let mask = 1 << (selector - 1);
        if value != 0 && value != mask {
            return Ok(());
        }
        let control = &mut self.graphics.retained.instruct_control;
        *control &= !(mask as u8);
        *control |= value as u8;
        Ok(())
    }
}

/// Direction between two points as a 2.14 unit vector, rotated a
/// quarter turn counter-clockwise for perpendicular variants (odd
/// opcodes). Coincident points fall back to the x axis.
fn line_vector(p1: Point<i32>, p2: Point<i32>, opcode: u8) -> Point<i32> {
    let mut dx = p1.x - p2.x;
    let mut dy = p1.y - p2.y;
    let mut opcode = opcode;
    if dx == 0 && dy == 0 {
        dx = 0x4000;
        opcode = 0;
    }
    if opcode & 1 != 0 {
        let tmp = dy;
        dy = dx;
        dx = -tmp;
    }
    math::normalize14(dx, dy)
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockState;
    use crate::hint::{program::Program, round::RoundMode, zone::ZonePointer};
    use graver_types::Point;

    #[test]
    fn svtca_selects_axis_and_vectors() {
        let mut state = MockState::new();
        // SFVTCA[1]: freedom vector to x axis only, then SPVTCA[0]:
        // projection to y axis.
        let bytecode = [0x05, 0x02];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.graphics.freedom_vector, Point::new(0x4000, 0));
        assert_eq!(state.graphics.proj_vector, Point::new(0, 0x4000));
        assert_eq!(state.graphics.dual_proj_vector, Point::new(0, 0x4000));
    }

    #[test]
    fn spvtl_sets_vector_along_line() {
        let mut state = MockState::new();
        // Points 0 and 1 lie along (64, 32); SPVTL[0] parallel.
        let bytecode = [0xB1, 1, 0, 0x06];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        let vector = state.graphics.proj_vector;
        // Direction (64, 32) normalized: (2, 1)/sqrt(5).
        assert!((vector.x - 14654).abs() <= 1, "x was {}", vector.x);
        assert!((vector.y - 7327).abs() <= 1, "y was {}", vector.y);
    }

    #[test]
    fn szps_sets_all_pointers() {
        let mut state = MockState::new();
        let bytecode = [0xB0, 0, 0x16];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.graphics.zp0, ZonePointer::Twilight);
        assert_eq!(state.graphics.zp1, ZonePointer::Twilight);
        assert_eq!(state.graphics.zp2, ZonePointer::Twilight);
    }

    #[test]
    fn invalid_zone_is_an_error() {
        let mut state = MockState::new();
        let bytecode = [0xB0, 9, 0x13];
        assert!(state.engine(&bytecode).run(Program::Glyph).is_err());
    }

    #[test]
    fn sround_decodes_selector() {
        let mut state = MockState::new();
        // Selector 0x54: period = grid, phase = period/4, threshold
        // from the low nibble (4 means zero eighths).
        let bytecode = [0xB0, 0x54, 0x76];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        let round = state.graphics.round_state;
        assert_eq!(round.mode, RoundMode::Super);
        assert_eq!(round.period, 64);
        assert_eq!(round.phase, 16);
        assert_eq!(round.threshold, 0);
    }

    #[test]
    fn instctrl_sets_inhibit_bit() {
        let mut state = MockState::new();
        // value 1, selector 1: sets bit 0.
        let bytecode = [0xB1, 1, 1, 0x8E];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.graphics.retained.instruct_control, 1);
    }
}
