//! Point movement and measurement instructions.

use super::{
    super::{math, zone::ZonePointer, HintErrorKind},
    Engine, OpResult,
};

impl Engine<'_> {
    /// GC\[a\] (0x46 - 0x47): projects a point's current (a=0) or
    /// original (a=1) position onto the relevant vector.
    pub(super) fn op_gc(&mut self, opcode: u8) -> OpResult {
        let index = self.value_stack.pop_usize()?;
        let origin = Default::default();
        let value = if opcode & 1 != 0 {
            self.graphics
                .dual_project(self.graphics.zp2().original(index)?, origin)
        } else {
            self.graphics.project(self.graphics.zp2().point(index)?, origin)
        };
        self.value_stack.push(value)
    }

    /// SCFS (0x48): moves a point so its projected coordinate equals
    /// the popped value.
    pub(super) fn op_scfs(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        let index = self.value_stack.pop_usize()?;
        let projected = self
            .graphics
            .project(self.graphics.zp2().point(index)?, Default::default());
        self.graphics
            .move_point(self.graphics.zp2, index, value.wrapping_sub(projected))?;
        if self.graphics.zp2.is_twilight() {
            let point = self.graphics.zp2().point(index)?;
            *self.graphics.zp2_mut().original_mut(index)? = point;
        }
        Ok(())
    }

    /// MD\[a\] (0x49 - 0x4A): measures the distance between two points
    /// in the current (a=1) or original (a=0) outline.
    pub(super) fn op_md(&mut self, opcode: u8) -> OpResult {
        let a = self.value_stack.pop_usize()?;
        let b = self.value_stack.pop_usize()?;
        let gs = &self.graphics;
        let distance = if opcode & 1 != 0 {
            gs.project(gs.zp0().point(b)?, gs.zp1().point(a)?)
        } else if gs.zp0.is_twilight() || gs.zp1.is_twilight() {
            gs.dual_project(gs.zp0().original(b)?, gs.zp1().original(a)?)
        } else {
            // Both zones are real outline points: measure in font
            // units and scale.
            math::mul(
                gs.dual_project(gs.zp0().unscaled(b), gs.zp1().unscaled(a)),
                gs.retained.scale,
            )
        };
        self.value_stack.push(distance)
    }

    /// MDAP\[a\] (0x2E - 0x2F): touches a point, optionally rounding
    /// it onto the grid along the projection vector.
    pub(super) fn op_mdap(&mut self, opcode: u8) -> OpResult {
        let point = self.value_stack.pop_usize()?;
        let distance = if opcode & 1 != 0 {
            let current = self
                .graphics
                .project(self.graphics.zp0().point(point)?, Default::default());
            self.graphics.round(current) - current
        } else {
            0
        };
        self.graphics.move_point(self.graphics.zp0, point, distance)?;
        self.graphics.rp0 = point;
        self.graphics.rp1 = point;
        Ok(())
    }

    /// MIAP\[a\] (0x3E - 0x3F): moves a point to a control value table
    /// position, with the cut-in guard when a=1.
    pub(super) fn op_miap(&mut self, opcode: u8) -> OpResult {
        let cvt_entry = self.value_stack.pop_usize()?;
        let point = self.value_stack.pop_usize()?;
        let mut distance = self.cvt_get(cvt_entry)?;
        if self.graphics.zp0.is_twilight() {
            // Twilight points spring into existence at the CVT
            // position.
            let fv = self.graphics.freedom_vector;
            let zone = self.graphics.zp0_mut();
            let original = zone.original_mut(point)?;
            original.x = math::mul14(distance, fv.x);
            original.y = math::mul14(distance, fv.y);
            let original = *original;
            *zone.point_mut(point)? = original;
        }
        let original_distance = self
            .graphics
            .project(self.graphics.zp0().point(point)?, Default::default());
        if opcode & 1 != 0 {
            let delta = distance.wrapping_sub(original_distance).wrapping_abs();
            if delta > self.graphics.retained.control_value_cutin {
                distance = original_distance;
            }
            distance = self.graphics.round(distance);
        }
        self.graphics
            .move_point(self.graphics.zp0, point, distance.wrapping_sub(original_distance))?;
        self.graphics.rp0 = point;
        self.graphics.rp1 = point;
        Ok(())
    }

    /// MDRP\[abcde\] (0xC0 - 0xDF): moves a point relative to rp0 so
    /// their distance matches the original outline, subject to single
    /// width substitution, rounding and minimum distance per the
    /// opcode flag bits.
    pub(super) fn op_mdrp(&mut self, opcode: u8) -> OpResult {
        let point = self.value_stack.pop_usize()?;
        let gs = &self.graphics;
        let mut original_distance =
            if gs.zp0.is_twilight() || gs.zp1.is_twilight() {
                gs.dual_project(gs.zp1().original(point)?, gs.zp0().original(gs.rp0)?)
            } else {
                math::mul(
                    gs.dual_project(gs.zp1().unscaled(point), gs.zp0().unscaled(gs.rp0)),
                    gs.retained.scale,
                )
            };
        let cutin = gs.retained.single_width_cutin;
        let single = gs.retained.single_width;
        if cutin > 0
            && original_distance < single + cutin
            && original_distance > single - cutin
        {
            original_distance = if original_distance >= 0 { single } else { -single };
        }
        let mut distance = if opcode & 4 != 0 {
            gs.round(original_distance)
        } else {
            original_distance
        };
        if opcode & 8 != 0 {
            let min_distance = gs.retained.min_distance;
            if original_distance >= 0 {
                distance = distance.max(min_distance);
            } else if distance > -min_distance {
                distance = -min_distance;
            }
        }
        let current_distance = gs.project(gs.zp1().point(point)?, gs.zp0().point(gs.rp0)?);
        self.graphics
            .move_point(self.graphics.zp1, point, distance.wrapping_sub(current_distance))?;
        self.graphics.rp1 = self.graphics.rp0;
        self.graphics.rp2 = point;
        if opcode & 16 != 0 {
            self.graphics.rp0 = point;
        }
        Ok(())
    }

    /// MIRP\[abcde\] (0xE0 - 0xFF): like MDRP but the target distance
    /// comes from the control value table, with auto-flip and the
    /// control value cut-in.
    pub(super) fn op_mirp(&mut self, opcode: u8) -> OpResult {
        let cvt_index = self.value_stack.pop()?;
        let point = self.value_stack.pop_usize()?;
        // Index -1 is tolerated as a zero distance.
        let mut cvt_distance = if cvt_index == -1 {
            0
        } else {
            self.cvt_get(cvt_index as usize)?
        };
        let cutin = self.graphics.retained.single_width_cutin;
        let single = self.graphics.retained.single_width;
        if (cvt_distance - single).abs() < cutin {
            cvt_distance = if cvt_distance >= 0 { single } else { -single };
        }
        if self.graphics.zp1.is_twilight() {
            let fv = self.graphics.freedom_vector;
            let base = self.graphics.zp0().original(self.graphics.rp0)?;
            let zone = self.graphics.zp1_mut();
            let original = zone.original_mut(point)?;
            original.x = base.x + math::mul14(cvt_distance, fv.x);
            original.y = base.y + math::mul14(cvt_distance, fv.y);
            let original = *original;
            *zone.point_mut(point)? = original;
        }
        let gs = &self.graphics;
        let original_distance =
            gs.dual_project(gs.zp1().original(point)?, gs.zp0().original(gs.rp0)?);
        let current_distance = gs.project(gs.zp1().point(point)?, gs.zp0().point(gs.rp0)?);
        if gs.retained.auto_flip && (original_distance ^ cvt_distance) < 0 {
            cvt_distance = -cvt_distance;
        }
        let mut distance = if opcode & 4 != 0 {
            if self.graphics.zp0 == self.graphics.zp1 {
                let delta = (cvt_distance - original_distance).abs();
                if delta > self.graphics.retained.control_value_cutin {
                    cvt_distance = original_distance;
                }
            }
            self.graphics.round(cvt_distance)
        } else {
            cvt_distance
        };
        if opcode & 8 != 0 {
            let min_distance = self.graphics.retained.min_distance;
            if original_distance >= 0 {
                distance = distance.max(min_distance);
            } else if distance > -min_distance {
                distance = -min_distance;
            }
        }
        self.graphics
            .move_point(self.graphics.zp1, point, distance.wrapping_sub(current_distance))?;
        self.graphics.rp1 = self.graphics.rp0;
        self.graphics.rp2 = point;
        if opcode & 16 != 0 {
            self.graphics.rp0 = point;
        }
        Ok(())
    }

    /// MSIRP\[a\] (0x3A - 0x3B): like MIRP with the distance taken
    /// from the stack; unaffected by round state and cut-in.
    pub(super) fn op_msirp(&mut self, opcode: u8) -> OpResult {
        let distance = self.value_stack.pop()?;
        let point = self.value_stack.pop_usize()?;
        if self.graphics.zp1.is_twilight() {
            let base = self.graphics.zp0().original(self.graphics.rp0)?;
            *self.graphics.zp1_mut().point_mut(point)? = base;
            self.graphics
                .move_original(self.graphics.zp1, point, distance)?;
            let original = self.graphics.zp1().original(point)?;
            *self.graphics.zp1_mut().point_mut(point)? = original;
        }
        let current = self
            .graphics
            .project(self.graphics.zp1().point(point)?, self.graphics.zp0().point(self.graphics.rp0)?);
        self.graphics
            .move_point(self.graphics.zp1, point, distance.wrapping_sub(current))?;
        self.graphics.rp1 = self.graphics.rp0;
        self.graphics.rp2 = point;
        if opcode & 1 != 0 {
            self.graphics.rp0 = point;
        }
        Ok(())
    }

    /// SHP\[a\] (0x32 - 0x33): shifts points by the displacement of a
    /// reference point. Consumes the loop counter.
    pub(super) fn op_shp(&mut self, opcode: u8) -> OpResult {
        let displacement = self.graphics.point_displacement(opcode)?;
        let count = self.graphics.loop_counter;
        self.graphics.loop_counter = 1;
        for _ in 0..count {
            let point = self.value_stack.pop_usize()?;
            self.graphics
                .move_zp2_point(point, displacement.dx, displacement.dy, true)?;
        }
        Ok(())
    }

    /// SHC\[a\] (0x34 - 0x35): shifts a whole contour, leaving the
    /// reference point itself in place.
    pub(super) fn op_shc(&mut self, opcode: u8) -> OpResult {
        let contour = self.value_stack.pop_usize()?;
        let displacement = self.graphics.point_displacement(opcode)?;
        let bound = if self.graphics.zp2.is_twilight() {
            1
        } else {
            self.graphics.zp2().contour_ends.len()
        };
        if contour >= bound {
            return Err(HintErrorKind::InvalidContourIndex(contour));
        }
        let start = if contour > 0 {
            self.graphics.zp2().contour_end(contour - 1)? as usize + 1
        } else {
            0
        };
        let end = if self.graphics.zp2.is_twilight() {
            self.graphics.zp2().points.len()
        } else {
            self.graphics.zp2().contour_end(contour)? as usize + 1
        };
        for index in start..end {
            if displacement.zone != self.graphics.zp2 || displacement.index != index {
                self.graphics
                    .move_zp2_point(index, displacement.dx, displacement.dy, true)?;
            }
        }
        Ok(())
    }

    /// SHZ\[a\] (0x36 - 0x37): shifts every point in a zone without
    /// touching.
    pub(super) fn op_shz(&mut self, opcode: u8) -> OpResult {
        ZonePointer::try_from(self.value_stack.pop()?)?;
        let displacement = self.graphics.point_displacement(opcode)?;
        let end = if self.graphics.zp2.is_twilight() {
            self.graphics.zp2().points.len()
        } else if let Some(last) = self.graphics.zp2().contour_ends.last() {
            *last as usize + 1
        } else {
            0
        };
        for index in 0..end {
            if displacement.zone != self.graphics.zp2 || displacement.index != index {
                self.graphics
                    .move_zp2_point(index, displacement.dx, displacement.dy, false)?;
            }
        }
        Ok(())
    }

    /// SHPIX (0x38): shifts points by a pixel amount along the freedom
    /// vector. Consumes the loop counter.
    pub(super) fn op_shpix(&mut self) -> OpResult {
        let amount = self.value_stack.pop()?;
        let dx = math::mul14(amount, self.graphics.freedom_vector.x);
        let dy = math::mul14(amount, self.graphics.freedom_vector.y);
        let count = self.graphics.loop_counter;
        self.graphics.loop_counter = 1;
        for _ in 0..count {
            let point = self.value_stack.pop_usize()?;
            self.graphics.move_zp2_point(point, dx, dy, true)?;
        }
        Ok(())
    }

    /// IP (0x39): interpolates points to preserve their original
    /// relationship to rp1 and rp2. Consumes the loop counter.
    pub(super) fn op_ip(&mut self) -> OpResult {
        let gs = &self.graphics;
        let in_twilight =
            gs.zp0.is_twilight() || gs.zp1.is_twilight() || gs.zp2.is_twilight();
        let orus_base = if in_twilight {
            gs.zp0().original(gs.rp1)?
        } else {
            gs.zp0().unscaled(gs.rp1)
        };
        let current_base = gs.zp0().point(gs.rp1)?;
        let old_range = if in_twilight {
            gs.dual_project(gs.zp1().original(gs.rp2)?, orus_base)
        } else {
            gs.dual_project(gs.zp1().unscaled(gs.rp2), orus_base)
        };
        let current_range = gs.project(gs.zp1().point(gs.rp2)?, current_base);
        let count = self.graphics.loop_counter;
        self.graphics.loop_counter = 1;
        for _ in 0..count {
            let point = self.value_stack.pop_usize()?;
            let gs = &self.graphics;
            let original_distance = if in_twilight {
                gs.dual_project(gs.zp2().original(point)?, orus_base)
            } else {
                gs.dual_project(gs.zp2().unscaled(point), orus_base)
            };
            let current_distance = gs.project(gs.zp2().point(point)?, current_base);
            let new_distance = if original_distance == 0 {
                0
            } else if old_range != 0 {
                math::mul_div(original_distance, current_range, old_range)
            } else {
                original_distance
            };
            self.graphics.move_point(
                self.graphics.zp2,
                point,
                new_distance.wrapping_sub(current_distance),
            )?;
        }
        Ok(())
    }

    /// ALIGNRP (0x3C): moves points until their projected distance to
    /// rp0 is zero. Consumes the loop counter.
    pub(super) fn op_alignrp(&mut self) -> OpResult {
        let count = self.graphics.loop_counter;
        self.graphics.loop_counter = 1;
        for _ in 0..count {
            let point = self.value_stack.pop_usize()?;
            let distance = self.graphics.project(
                self.graphics.zp1().point(point)?,
                self.graphics.zp0().point(self.graphics.rp0)?,
            );
            self.graphics
                .move_point(self.graphics.zp1, point, -distance)?;
        }
        Ok(())
    }

    /// ALIGNPTS (0x27): moves two points to their projected midpoint.
    pub(super) fn op_alignpts(&mut self) -> OpResult {
        let p2 = self.value_stack.pop_usize()?;
        let p1 = self.value_stack.pop_usize()?;
        let distance = self.graphics.project(
            self.graphics.zp0().point(p2)?,
            self.graphics.zp1().point(p1)?,
        ) / 2;
        self.graphics.move_point(self.graphics.zp1, p1, distance)?;
        self.graphics.move_point(self.graphics.zp0, p2, -distance)?;
        Ok(())
    }

    /// ISECT (0x0F): places a point at the intersection of two lines.
    /// Nearly parallel lines (within about three degrees) fall back to
    /// the average of all four endpoints.
    pub(super) fn op_isect(&mut self) -> OpResult {
        let b1 = self.value_stack.pop_usize()?;
        let b0 = self.value_stack.pop_usize()?;
        let a1 = self.value_stack.pop_usize()?;
        let a0 = self.value_stack.pop_usize()?;
        let point = self.value_stack.pop_usize()?;
        let (pa0, pa1) = {
            let zone = self.graphics.zp1();
            (zone.point(a0)?, zone.point(a1)?)
        };
        let (pb0, pb1) = {
            let zone = self.graphics.zp0();
            (zone.point(b0)?, zone.point(b1)?)
        };
        let dbx = pb1.x - pb0.x;
        let dby = pb1.y - pb0.y;
        let dax = pa1.x - pa0.x;
        let day = pa1.y - pa0.y;
        let dx = pb0.x - pa0.x;
        let dy = pb0.y - pa0.y;
        let discriminant =
            math::mul_div(dax, -dby, 0x40) + math::mul_div(day, dbx, 0x40);
        let dot_product = math::mul_div(dax, dbx, 0x40) + math::mul_div(day, dby, 0x40);
        // The discriminant test keeps the division well conditioned:
        // 19 * |disc| > |dot| is sin(angle) > 1/19.
        if 19 * discriminant.abs() > dot_product.abs() {
            let value = math::mul_div(dx, -dby, 0x40) + math::mul_div(dy, dbx, 0x40);
            let x = math::mul_div(value, dax, discriminant);
            let y = math::mul_div(value, day, discriminant);
            let target = self.graphics.zp2_mut().point_mut(point)?;
            target.x = pa0.x + x;
            target.y = pa0.y + y;
        } else {
            let target = self.graphics.zp2_mut().point_mut(point)?;
            target.x = (pa0.x + pa1.x + pb0.x + pb1.x) / 4;
            target.y = (pa0.y + pa1.y + pb0.y + pb1.y) / 4;
        }
        let flags = self.graphics.zp2_mut().flags_mut(point)?;
        flags.touch_x();
        flags.touch_y();
        Ok(())
    }

    /// UTP (0x29): clears touch markers along the freedom vector.
    pub(super) fn op_utp(&mut self) -> OpResult {
        let point = self.value_stack.pop_usize()?;
        let fv = self.graphics.freedom_vector;
        let flags = self.graphics.zp0_mut().flags_mut(point)?;
        if fv.x != 0 {
            flags.untouch_x();
        }
        if fv.y != 0 {
            flags.untouch_y();
        }
        Ok(())
    }

    /// FLIPPT (0x80): toggles the on-curve flag of points in the glyph
    /// zone. Consumes the loop counter.
    pub(super) fn op_flippt(&mut self) -> OpResult {
        let count = self.graphics.loop_counter;
        self.graphics.loop_counter = 1;
        for _ in 0..count {
            let point = self.value_stack.pop_usize()?;
            self.graphics
                .zone_mut(ZonePointer::Glyph)
                .flags_mut(point)?
                .flip_on_curve();
        }
        Ok(())
    }

    /// FLIPRGON (0x81)
    pub(super) fn op_fliprgon(&mut self) -> OpResult {
        self.flip_range(true)
    }

    /// FLIPRGOFF (0x82)
    pub(super) fn op_fliprgoff(&mut self) -> OpResult {
        self.flip_range(false)
    }

    fn flip_range(&mut self, on: bool) -> OpResult {
        let high = self.value_stack.pop_usize()?;
        let low = self.value_stack.pop_usize()?;
        if low > high {
            return Err(HintErrorKind::InvalidPointRange(low, high));
        }
        let zone = self.graphics.zone_mut(ZonePointer::Glyph);
        let flags = zone
            .flags
            .get_mut(low..=high)
            .ok_or(HintErrorKind::InvalidPointRange(low, high + 1))?;
        for flag in flags {
            if on {
                flag.set_on_curve();
            } else {
                flag.clear_on_curve();
            }
        }
        Ok(())
    }

    /// IUP\[a\] (0x30 - 0x31): interpolates untouched points in the
    /// glyph zone; a=1 selects the x axis.
    pub(super) fn op_iup(&mut self, opcode: u8) -> OpResult {
        let x_axis = opcode & 1 != 0;
        self.graphics
            .zone_mut(ZonePointer::Glyph)
            .interpolate_untouched(x_axis)
    }
}
