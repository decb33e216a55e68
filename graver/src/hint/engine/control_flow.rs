//! Branching, jumps, calls and definitions.

use super::{
    super::{
        call_stack::CallRecord,
        definition::Definition,
        opcodes as op,
        HintErrorKind,
    },
    skip_instruction, Engine, OpResult,
};

impl Engine<'_> {
    /// IF (0x58): a false condition skips to the matching ELSE or EIF,
    /// honoring nesting and stepping over push payloads.
    pub(super) fn op_if(&mut self) -> OpResult {
        if self.value_stack.pop()? != 0 {
            return Ok(());
        }
        let bytecode = self.programs[self.program as usize];
        let mut depth = 1u32;
        let mut pc = self.pc;
        loop {
            let (opcode, next) = skip_instruction(bytecode, pc)?;
            pc = next;
            match opcode {
                op::IF => depth += 1,
                op::ELSE if depth == 1 => break,
                op::EIF => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        self.pc = pc;
        Ok(())
    }

    /// ELSE (0x1B): reached only after a taken branch; skips its body.
    pub(super) fn op_else(&mut self) -> OpResult {
        let bytecode = self.programs[self.program as usize];
        let mut depth = 1u32;
        let mut pc = self.pc;
        loop {
            let (opcode, next) = skip_instruction(bytecode, pc)?;
            pc = next;
            match opcode {
                op::IF => depth += 1,
                op::EIF => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        self.pc = pc;
        Ok(())
    }

    /// JMPR (0x1C)
    pub(super) fn op_jmpr(&mut self, ins_pc: usize) -> OpResult {
        let offset = self.value_stack.pop()?;
        self.jump(ins_pc, offset)
    }

    /// JROT (0x78)
    pub(super) fn op_jrot(&mut self, ins_pc: usize) -> OpResult {
        let condition = self.value_stack.pop()?;
        let offset = self.value_stack.pop()?;
        if condition != 0 {
            self.jump(ins_pc, offset)?;
        }
        Ok(())
    }

    /// JROF (0x79)
    pub(super) fn op_jrof(&mut self, ins_pc: usize) -> OpResult {
        let condition = self.value_stack.pop()?;
        let offset = self.value_stack.pop()?;
        if condition == 0 {
            self.jump(ins_pc, offset)?;
        }
        Ok(())
    }

    fn jump(&mut self, ins_pc: usize, offset: i32) -> OpResult {
        // An offset of zero re-executes the jump forever.
        if offset == 0 {
            return Err(HintErrorKind::InvalidJump);
        }
        let target = ins_pc as i64 + offset as i64;
        let limit = self.programs[self.program as usize].len() as i64;
        if !(0..=limit).contains(&target) {
            return Err(HintErrorKind::InvalidJump);
        }
        // Inside a function body, jumping past the ENDF would leak out
        // of the definition.
        if let Some(record) = self.call_stack.peek_mut() {
            if target > record.definition.end as i64 {
                return Err(HintErrorKind::InvalidJump);
            }
        }
        self.pc = target as usize;
        Ok(())
    }

    /// CALL (0x2B)
    pub(super) fn op_call(&mut self) -> OpResult {
        let key = self.value_stack.pop()?;
        let definition = self.functions.get(key)?;
        self.invoke(definition, 1)
    }

    /// LOOPCALL (0x2A): calls a function a counted number of times. A
    /// non-positive count is a no-op.
    pub(super) fn op_loopcall(&mut self) -> OpResult {
        let key = self.value_stack.pop()?;
        let count = self.value_stack.pop()?;
        if count <= 0 {
            return Ok(());
        }
        let definition = self.functions.get(key)?;
        self.invoke(definition, count as u32)
    }

    fn invoke(&mut self, definition: Definition, count: u32) -> OpResult {
        self.call_stack.push(CallRecord {
            caller_program: self.program,
            return_pc: self.pc,
            current_count: count,
            definition,
        })?;
        self.program = definition.program;
        self.pc = definition.start as usize;
        Ok(())
    }

    /// ENDF (0x2D): returns from a call, looping back to the function
    /// start while LOOPCALL iterations remain.
    pub(super) fn op_endf(&mut self) -> OpResult {
        let record = self
            .call_stack
            .peek_mut()
            .ok_or(HintErrorKind::CallStackUnderflow)?;
        if record.current_count > 1 {
            record.current_count -= 1;
            self.pc = record.definition.start as usize;
        } else {
            let record = self.call_stack.pop()?;
            self.program = record.caller_program;
            self.pc = record.return_pc;
        }
        Ok(())
    }

    /// FDEF (0x2C)
    pub(super) fn op_fdef(&mut self) -> OpResult {
        let key = self.value_stack.pop()?;
        let (start, end) = self.scan_definition_body()?;
        self.functions.define(
            key,
            Definition {
                program: self.program,
                start,
                end,
                key,
                is_active: true,
            },
        )
    }

    /// IDEF (0x89): binds a body to an otherwise undefined opcode.
    pub(super) fn op_idef(&mut self) -> OpResult {
        let key = self.value_stack.pop()?;
        let (start, end) = self.scan_definition_body()?;
        self.instruction_defs.define(
            key,
            Definition {
                program: self.program,
                start,
                end,
                key,
                is_active: true,
            },
        )
    }

    /// Locates the matching ENDF and leaves the interpreter positioned
    /// after it. Definitions cannot nest and are forbidden in glyph
    /// programs.
    fn scan_definition_body(&mut self) -> Result<(u32, u32), HintErrorKind> {
        if !self.definitions_allowed {
            return Err(HintErrorKind::DefinitionInGlyphProgram);
        }
        let bytecode = self.programs[self.program as usize];
        let start = self.pc as u32;
        let mut pc = self.pc;
        loop {
            let (opcode, next) = skip_instruction(bytecode, pc)?;
            pc = next;
            match opcode {
                op::FDEF | op::IDEF => return Err(HintErrorKind::NestedDefinition),
                op::ENDF => break,
                _ => {}
            }
        }
        self.pc = pc;
        Ok((start, pc as u32))
    }

    /// Opcodes outside the defined set dispatch through the
    /// instruction definition table.
    pub(super) fn op_unknown(&mut self, opcode: u8) -> OpResult {
        match self.instruction_defs.get(opcode as i32) {
            Ok(definition) => self.invoke(definition, 1),
            Err(_) => Err(HintErrorKind::UnhandledOpcode(opcode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockState;
    use crate::hint::{error::HintErrorKind, program::Program};

    #[test]
    fn if_skips_false_branch_with_nesting() {
        let mut state = MockState::new();
        // PUSHB 0; IF; PUSHB 1; IF; EIF; PUSHB 99; ELSE; PUSHB 7; EIF
        let bytecode = [
            0xB0, 0, 0x58, 0xB0, 1, 0x58, 0x59, 0xB0, 99, 0x1B, 0xB0, 7, 0x59,
        ];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 7);
        assert!(state.value_stack.is_empty());
    }

    #[test]
    fn taken_branch_skips_else_body() {
        let mut state = MockState::new();
        let bytecode = [0xB0, 1, 0x58, 0xB0, 42, 0x1B, 0xB0, 7, 0x59];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 42);
        assert!(state.value_stack.is_empty());
    }

    #[test]
    fn if_skip_steps_over_push_payloads() {
        let mut state = MockState::new();
        // The false branch contains a PUSHB payload byte 0x59 that
        // must not be mistaken for an EIF.
        let bytecode = [0xB0, 0, 0x58, 0xB0, 0x59, 0x59, 0xB0, 5, 0x59];
        state.engine(&bytecode).run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 5);
    }

    #[test]
    fn function_definition_and_call() {
        let mut state = MockState::new();
        // fpgm: PUSHB 0; FDEF; PUSHB 40; ENDF
        let fpgm = [0xB0, 0, 0x2C, 0xB0, 40, 0x2D];
        // glyph: PUSHB 2 0; LOOPCALL function 0 twice
        let glyph = [0xB1, 2, 0, 0x2A];
        let mut engine = state.engine(&[]);
        engine.programs = [&fpgm, &[], &glyph];
        engine.run(Program::Font).unwrap();
        engine.run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 40);
        assert_eq!(state.value_stack.pop().unwrap(), 40);
        assert!(state.value_stack.is_empty());
    }

    #[test]
    fn definitions_forbidden_in_glyph_programs() {
        let mut state = MockState::new();
        let bytecode = [0xB0, 0, 0x2C, 0x2D];
        let err = state.engine(&bytecode).run(Program::Glyph).unwrap_err();
        assert_eq!(err.kind, HintErrorKind::DefinitionInGlyphProgram);
    }

    #[test]
    fn recursive_calls_hit_the_call_stack_ceiling() {
        let mut state = MockState::new();
        // Function 0 calls itself.
        let fpgm = [0xB0, 0, 0x2C, 0xB0, 0, 0x2B, 0x2D];
        let glyph = [0xB0, 0, 0x2B];
        let mut engine = state.engine(&[]);
        engine.programs = [&fpgm, &[], &glyph];
        engine.run(Program::Font).unwrap();
        let err = engine.run(Program::Glyph).unwrap_err();
        assert_eq!(err.kind, HintErrorKind::CallStackOverflow);
    }

    #[test]
    fn infinite_jump_exhausts_budget() {
        let mut state = MockState::new();
        // PUSHW -3; JMPR jumps back to the push forever.
        let bytecode = [0xB8, 0xFF, 0xFD, 0x1C];
        let err = state.engine(&bytecode).run(Program::Glyph).unwrap_err();
        assert_eq!(err.kind, HintErrorKind::ExceededExecutionBudget);
    }

    #[test]
    fn undefined_opcode_is_an_error() {
        let mut state = MockState::new();
        let bytecode = [0xA3];
        let err = state.engine(&bytecode).run(Program::Glyph).unwrap_err();
        assert_eq!(err.kind, HintErrorKind::UnhandledOpcode(0xA3));
    }

    #[test]
    fn instruction_definition_binds_an_opcode() {
        let mut state = MockState::new();
        // fpgm: IDEF 0xA3 with body PUSHB 11.
        let fpgm = [0xB0, 0xA3, 0x89, 0xB0, 11, 0x2D];
        let glyph = [0xA3];
        let mut engine = state.engine(&[]);
        engine.programs = [&fpgm, &[], &glyph];
        engine.run(Program::Font).unwrap();
        engine.run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 11);
    }
}
