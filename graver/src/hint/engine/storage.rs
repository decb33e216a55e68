//! Storage area and control value table access.

use super::{
    super::{math, HintErrorKind},
    Engine, OpResult,
};

impl Engine<'_> {
    /// WS (0x42)
    pub(super) fn op_ws(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        let index = self.value_stack.pop_usize()?;
        *self
            .storage
            .get_mut(index)
            .ok_or(HintErrorKind::InvalidStorageIndex(index))? = value;
        Ok(())
    }

    /// RS (0x43)
    pub(super) fn op_rs(&mut self) -> OpResult {
        let index = self.value_stack.pop_usize()?;
        let value = *self
            .storage
            .get(index)
            .ok_or(HintErrorKind::InvalidStorageIndex(index))?;
        self.value_stack.push(value)
    }

    /// WCVTP (0x44): writes a value already in pixel units.
    pub(super) fn op_wcvtp(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        let index = self.value_stack.pop_usize()?;
        *self
            .cvt
            .get_mut(index)
            .ok_or(HintErrorKind::InvalidCvtIndex(index))? = value;
        Ok(())
    }

    /// WCVTF (0x70): writes a value in font units, scaling it first.
    pub(super) fn op_wcvtf(&mut self) -> OpResult {
        let value = self.value_stack.pop()?;
        let index = self.value_stack.pop_usize()?;
        *self
            .cvt
            .get_mut(index)
            .ok_or(HintErrorKind::InvalidCvtIndex(index))? =
            math::mul(value, self.graphics.retained.scale);
        Ok(())
    }

    /// RCVT (0x45): an out-of-range read yields zero rather than an
    /// error, matching widespread rasterizer behavior that fonts rely
    /// on.
    pub(super) fn op_rcvt(&mut self) -> OpResult {
        let index = self.value_stack.pop_usize()?;
        let value = self.cvt.get(index).copied().unwrap_or(0);
        self.value_stack.push(value)
    }

    pub(super) fn cvt_get(&self, index: usize) -> Result<i32, HintErrorKind> {
        self.cvt
            .get(index)
            .copied()
            .ok_or(HintErrorKind::InvalidCvtIndex(index))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockState;
    use crate::hint::program::Program;

    #[test]
    fn storage_round_trip() {
        let mut state = MockState::new();
        // WS 3 <- 123, then RS 3.
        let bytecode = [0xB1, 3, 123, 0x42, 0xB0, 3, 0x43];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 123);
    }

    #[test]
    fn storage_index_is_checked() {
        let mut state = MockState::new();
        let bytecode = [0xB0, 200, 0x43];
        assert!(state.engine(&bytecode).run(Program::Glyph).is_err());
    }

    #[test]
    fn wcvtf_scales_by_instance() {
        let mut state = MockState::new();
        // 1000 font units at scale 640/1000 pixels: one em is 10px.
        let bytecode = [0xB9, 0, 2, 0x03, 0xE8, 0x70, 0xB0, 2, 0x45];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 640);
    }

    #[test]
    fn rcvt_out_of_range_reads_zero() {
        let mut state = MockState::new();
        let bytecode = [0xB0, 99, 0x45];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 0);
    }
}
