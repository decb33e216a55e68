//! Applying the round state to stack values.

use super::{Engine, OpResult};

impl Engine<'_> {
    /// ROUND\[ab\] (0x68 - 0x6B): rounds per the round state. The
    /// engine-characteristic distance adjustments encoded in the low
    /// bits apply to monochrome output only and are identity here.
    pub(super) fn op_round(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.value_stack.apply_unary(|a| Ok(round_state.round(a)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockState;
    use crate::hint::program::Program;

    #[test]
    fn round_applies_round_state() {
        let mut state = MockState::new();
        // RDTG; PUSHB 95; ROUND
        let bytecode = [0x7D, 0xB0, 95, 0x68];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 64);
    }

    #[test]
    fn nround_passes_values_through() {
        let mut state = MockState::new();
        let bytecode = [0xB0, 95, 0x6C];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 95);
    }
}
