//! Arithmetic on 26.6 stack values.

use super::{
    super::{math, HintErrorKind},
    Engine, OpResult,
};

impl Engine<'_> {
    /// DIV (0x62): truncating 26.6 division; dividing by zero is a
    /// hard error rather than a silent zero.
    pub(super) fn op_div(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| {
            if b == 0 {
                Err(HintErrorKind::DivideByZero)
            } else {
                Ok(math::mul_div_no_round(a, 64, b))
            }
        })
    }

    /// MUL (0x63): 26.6 product through a 64-bit intermediate.
    pub(super) fn op_mul(&mut self) -> OpResult {
        self.value_stack.apply_binary(|a, b| Ok(math::mul_div(a, b, 64)))
    }

    /// FLOOR (0x66)
    pub(super) fn op_floor(&mut self) -> OpResult {
        self.value_stack.apply_unary(|a| Ok(math::floor(a)))
    }

    /// CEILING (0x67)
    pub(super) fn op_ceiling(&mut self) -> OpResult {
        self.value_stack.apply_unary(|a| Ok(math::ceil(a)))
    }

    /// ODD (0x56): rounds per the round state, then tests whether the
    /// result is an odd number of pixels.
    pub(super) fn op_odd(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.value_stack
            .apply_unary(|a| Ok((round_state.round(a) & 127 == 64) as i32))
    }

    /// EVEN (0x57)
    pub(super) fn op_even(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.value_stack
            .apply_unary(|a| Ok((round_state.round(a) & 127 == 0) as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockState;
    use crate::hint::{error::HintErrorKind, program::Program};

    #[test]
    fn div_by_zero_is_fatal() {
        let mut state = MockState::new();
        // PUSHB[1] 64 0; DIV
        let bytecode = [0xB1, 64, 0, 0x62];
        let err = state.engine(&bytecode).run(Program::Glyph).unwrap_err();
        assert_eq!(err.kind, HintErrorKind::DivideByZero);
        assert_eq!(err.opcode, Some(0x62));
    }

    #[test]
    fn div_truncates_toward_zero() {
        let mut state = MockState::new();
        // 127/64 divided by 2 is 63/64 after truncation.
        let bytecode = [0xB1, 127, 128, 0x62];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 63);
    }

    #[test]
    fn mul_of_large_values_does_not_overflow() {
        let mut state = MockState::new();
        // PUSHW[1] 0x4000 0x4000; MUL: 256.0 * 256.0 = 65536.0 whose
        // raw product would overflow 32 bits without the wide
        // intermediate.
        let bytecode = [0xB9, 0x40, 0x00, 0x40, 0x00, 0x63];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 65536 * 64);
    }

    #[test]
    fn comparison_and_logic() {
        let mut state = MockState::new();
        // PUSHB[1] 3 5; LT -> 1; PUSHB[0] 0; AND -> 0; NOT -> 1
        let bytecode = [0xB1, 3, 5, 0x50, 0xB0, 0, 0x5A, 0x5C];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 1);
    }

    #[test]
    fn odd_and_even_round_first() {
        let mut state = MockState::new();
        // 96 rounds to 128 (2 pixels): even.
        let bytecode = [0xB0, 96, 0x57];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 1);
        // 33 rounds to 64 (1 pixel): odd.
        let bytecode = [0xB0, 33, 0x56];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 1);
    }
}
