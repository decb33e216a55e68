//! The bytecode interpreter.
//!
//! [`Engine`] executes one program over borrowed interpreter state.
//! Instructions are grouped into submodules by the area of state they
//! touch; dispatch itself is a single flat match, which keeps the
//! shared mutable state visible in one place.

mod arith;
mod control_flow;
mod delta;
mod graphics;
mod misc;
mod outline;
mod round;
mod stack;
mod storage;

use super::{
    call_stack::CallStack,
    definition::DefinitionTable,
    error::{HintError, HintErrorKind},
    graphics::GraphicsState,
    opcodes as op,
    program::Program,
    value_stack::ValueStack,
};

/// Instruction budget per program run; orders of magnitude above what
/// legitimate hinting executes.
const MAX_RUN_INSTRUCTIONS: usize = 1_000_000;

pub(super) type OpResult = Result<(), HintErrorKind>;

/// Executes TrueType programs against borrowed interpreter state.
pub struct Engine<'a> {
    /// Font, control value and glyph bytecode, indexed by [`Program`].
    pub(super) programs: [&'a [u8]; 3],
    pub(super) graphics: &'a mut GraphicsState,
    pub(super) value_stack: &'a mut ValueStack,
    pub(super) call_stack: CallStack,
    pub(super) functions: &'a mut DefinitionTable,
    pub(super) instruction_defs: &'a mut DefinitionTable,
    pub(super) cvt: &'a mut [i32],
    pub(super) storage: &'a mut [i32],
    pub(super) program: Program,
    /// Offset of the next instruction to execute.
    pub(super) pc: usize,
    pub(super) definitions_allowed: bool,
    instruction_count: usize,
}

impl<'a> Engine<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        programs: [&'a [u8]; 3],
        graphics: &'a mut GraphicsState,
        value_stack: &'a mut ValueStack,
        functions: &'a mut DefinitionTable,
        instruction_defs: &'a mut DefinitionTable,
        cvt: &'a mut [i32],
        storage: &'a mut [i32],
    ) -> Self {
        Self {
            programs,
            graphics,
            value_stack,
            call_stack: CallStack::default(),
            functions,
            instruction_defs,
            cvt,
            storage,
            program: Program::Font,
            pc: 0,
            definitions_allowed: false,
            instruction_count: 0,
        }
    }

    /// Runs one program to completion.
    pub fn run(&mut self, program: Program) -> Result<(), HintError> {
        self.program = program;
        self.definitions_allowed = program != Program::Glyph;
        self.pc = 0;
        self.call_stack.clear();
        self.value_stack.clear();
        self.graphics.reset_volatile();
        loop {
            let bytecode = self.programs[self.program as usize];
            if self.pc >= bytecode.len() {
                if !self.call_stack.is_empty() {
                    return Err(self.error(self.pc, None, HintErrorKind::UnexpectedEndOfBytecode));
                }
                break;
            }
            let ins_pc = self.pc;
            let opcode = bytecode[ins_pc];
            self.instruction_count += 1;
            if self.instruction_count > MAX_RUN_INSTRUCTIONS {
                return Err(self.error(
                    ins_pc,
                    Some(opcode),
                    HintErrorKind::ExceededExecutionBudget,
                ));
            }
            let length = instruction_length(bytecode, ins_pc)
                .map_err(|kind| self.error(ins_pc, Some(opcode), kind))?;
            self.pc = ins_pc + length;
            self.dispatch(opcode, ins_pc)
                .map_err(|kind| self.error(ins_pc, Some(opcode), kind))?;
        }
        Ok(())
    }

    fn error(&self, pc: usize, opcode: Option<u8>, kind: HintErrorKind) -> HintError {
        HintError {
            program: self.program,
            pc,
            opcode,
            kind,
        }
    }

    fn dispatch(&mut self, opcode: u8, ins_pc: usize) -> OpResult {
        match opcode {
            op::SVTCA0..=op::SFVTCA1 => self.op_svtca(opcode),
            op::SPVTL0..=op::SFVTL1 => self.op_svtl(opcode),
            op::SPVFS => self.op_spvfs(),
            op::SFVFS => self.op_sfvfs(),
            op::GPV => self.op_gpv(),
            op::GFV => self.op_gfv(),
            op::SFVTPV => self.op_sfvtpv(),
            op::ISECT => self.op_isect(),
            op::SRP0 => self.op_srp0(),
            op::SRP1 => self.op_srp1(),
            op::SRP2 => self.op_srp2(),
            op::SZP0 => self.op_szp0(),
            op::SZP1 => self.op_szp1(),
            op::SZP2 => self.op_szp2(),
            op::SZPS => self.op_szps(),
            op::SLOOP => self.op_sloop(),
            op::RTG => self.op_rtg(),
            op::RTHG => self.op_rthg(),
            op::SMD => self.op_smd(),
            op::ELSE => self.op_else(),
            op::JMPR => self.op_jmpr(ins_pc),
            op::SCVTCI => self.op_scvtci(),
            op::SSWCI => self.op_sswci(),
            op::SSW => self.op_ssw(),
            op::DUP => self.value_stack.dup(),
            op::POP => self.value_stack.pop().map(|_| ()),
            op::CLEAR => {
                self.value_stack.clear();
                Ok(())
            }
            op::SWAP => self.value_stack.swap(),
            op::DEPTH => {
                let depth = self.value_stack.len() as i32;
                self.value_stack.push(depth)
            }
            op::CINDEX => self.value_stack.copy_index(),
            op::MINDEX => self.value_stack.move_index(),
            op::ALIGNPTS => self.op_alignpts(),
            op::UTP => self.op_utp(),
            op::LOOPCALL => self.op_loopcall(),
            op::CALL => self.op_call(),
            op::FDEF => self.op_fdef(),
            op::ENDF => self.op_endf(),
            op::MDAP0 | op::MDAP1 => self.op_mdap(opcode),
            op::IUP0 | op::IUP1 => self.op_iup(opcode),
            op::SHP0 | op::SHP1 => self.op_shp(opcode),
            op::SHC0 | op::SHC1 => self.op_shc(opcode),
            op::SHZ0 | op::SHZ1 => self.op_shz(opcode),
            op::SHPIX => self.op_shpix(),
            op::IP => self.op_ip(),
            op::MSIRP0 | op::MSIRP1 => self.op_msirp(opcode),
            op::ALIGNRP => self.op_alignrp(),
            op::RTDG => self.op_rtdg(),
            op::MIAP0 | op::MIAP1 => self.op_miap(opcode),
            op::NPUSHB | op::NPUSHW | op::PUSHB000..=op::PUSHW111 => self.op_push(ins_pc),
            op::WS => self.op_ws(),
            op::RS => self.op_rs(),
            op::WCVTP => self.op_wcvtp(),
            op::RCVT => self.op_rcvt(),
            op::GC0 | op::GC1 => self.op_gc(opcode),
            op::SCFS => self.op_scfs(),
            op::MD0 | op::MD1 => self.op_md(opcode),
            op::MPPEM => self.op_mppem(),
            op::MPS => self.op_mps(),
            op::FLIPON => self.op_flipon(),
            op::FLIPOFF => self.op_flipoff(),
            op::DEBUG => self.op_debug(),
            op::LT => self.value_stack.apply_binary(|a, b| Ok((a < b) as i32)),
            op::LTEQ => self.value_stack.apply_binary(|a, b| Ok((a <= b) as i32)),
            op::GT => self.value_stack.apply_binary(|a, b| Ok((a > b) as i32)),
            op::GTEQ => self.value_stack.apply_binary(|a, b| Ok((a >= b) as i32)),
            op::EQ => self.value_stack.apply_binary(|a, b| Ok((a == b) as i32)),
            op::NEQ => self.value_stack.apply_binary(|a, b| Ok((a != b) as i32)),
            op::ODD => self.op_odd(),
            op::EVEN => self.op_even(),
            op::IF => self.op_if(),
            op::EIF => Ok(()),
            op::AND => self
                .value_stack
                .apply_binary(|a, b| Ok((a != 0 && b != 0) as i32)),
            op::OR => self
                .value_stack
                .apply_binary(|a, b| Ok((a != 0 || b != 0) as i32)),
            op::NOT => self.value_stack.apply_unary(|a| Ok((a == 0) as i32)),
            op::DELTAP1 | op::DELTAP2 | op::DELTAP3 => self.op_deltap(opcode),
            op::SDB => self.op_sdb(),
            op::SDS => self.op_sds(),
            op::ADD => self.value_stack.apply_binary(|a, b| Ok(a.wrapping_add(b))),
            op::SUB => self.value_stack.apply_binary(|a, b| Ok(a.wrapping_sub(b))),
            op::DIV => self.op_div(),
            op::MUL => self.op_mul(),
            op::ABS => self.value_stack.apply_unary(|a| Ok(a.wrapping_abs())),
            op::NEG => self.value_stack.apply_unary(|a| Ok(a.wrapping_neg())),
            op::FLOOR => self.op_floor(),
            op::CEILING => self.op_ceiling(),
            op::ROUND00..=op::ROUND11 => self.op_round(),
            op::NROUND00..=op::NROUND11 => Ok(()),
            op::WCVTF => self.op_wcvtf(),
            op::DELTAC1 | op::DELTAC2 | op::DELTAC3 => self.op_deltac(opcode),
            op::SROUND => self.op_sround(),
            op::S45ROUND => self.op_s45round(),
            op::JROT => self.op_jrot(ins_pc),
            op::JROF => self.op_jrof(ins_pc),
            op::ROFF => self.op_roff(),
            op::RUTG => self.op_rutg(),
            op::RDTG => self.op_rdtg(),
            op::SANGW => self.op_sangw(),
            op::AA => self.op_aa(),
            op::FLIPPT => self.op_flippt(),
            op::FLIPRGON => self.op_fliprgon(),
            op::FLIPRGOFF => self.op_fliprgoff(),
            op::SCANCTRL => self.op_scanctrl(),
            op::SDPVTL0 | op::SDPVTL1 => self.op_sdpvtl(opcode),
            op::GETINFO => self.op_getinfo(),
            op::IDEF => self.op_idef(),
            op::ROLL => self.value_stack.roll(),
            op::MAX => self.value_stack.apply_binary(|a, b| Ok(a.max(b))),
            op::MIN => self.value_stack.apply_binary(|a, b| Ok(a.min(b))),
            op::SCANTYPE => self.op_scantype(),
            op::INSTCTRL => self.op_instctrl(),
            op::MDRP00000..=op::MDRP11111 => self.op_mdrp(opcode),
            op::MIRP00000..=op::MIRP11111 => self.op_mirp(opcode),
            _ => self.op_unknown(opcode),
        }
    }
}

/// Total encoded length of the instruction at `pc`, including inline
/// push payloads.
fn instruction_length(bytecode: &[u8], pc: usize) -> Result<usize, HintErrorKind> {
    let opcode = bytecode[pc];
    let length = match opcode {
        op::NPUSHB => {
            let count = *bytecode
                .get(pc + 1)
                .ok_or(HintErrorKind::UnexpectedEndOfBytecode)? as usize;
            2 + count
        }
        op::NPUSHW => {
            let count = *bytecode
                .get(pc + 1)
                .ok_or(HintErrorKind::UnexpectedEndOfBytecode)? as usize;
            2 + 2 * count
        }
        op::PUSHB000..=op::PUSHB111 => 1 + (opcode - op::PUSHB000) as usize + 1,
        op::PUSHW000..=op::PUSHW111 => 1 + 2 * ((opcode - op::PUSHW000) as usize + 1),
        _ => 1,
    };
    if pc + length > bytecode.len() {
        return Err(HintErrorKind::UnexpectedEndOfBytecode);
    }
    Ok(length)
}

/// Advances over one instruction without executing it; used by the
/// branch and definition scans.
pub(super) fn skip_instruction(
    bytecode: &[u8],
    pc: usize,
) -> Result<(u8, usize), HintErrorKind> {
    if pc >= bytecode.len() {
        return Err(HintErrorKind::UnexpectedEndOfBytecode);
    }
    let opcode = bytecode[pc];
    Ok((opcode, pc + instruction_length(bytecode, pc)?))
}

#[cfg(test)]
pub(super) mod tests {
    use super::super::{
        call_stack::CallStack,
        definition::DefinitionTable,
        graphics::{GraphicsState, RetainedGraphicsState},
        program::Program,
        value_stack::ValueStack,
        zone::Zone,
    };
    use super::Engine;
    use crate::outline::PointFlags;
    use graver_types::Point;

    /// Backing state for an engine under test: a ten point glyph zone
    /// on a 10 ppem instance.
    pub(in super::super) struct MockState {
        pub graphics: GraphicsState,
        pub value_stack: ValueStack,
        pub functions: DefinitionTable,
        pub instruction_defs: DefinitionTable,
        pub cvt: Vec<i32>,
        pub storage: Vec<i32>,
    }

    impl MockState {
        pub fn new() -> Self {
            let count = 10;
            let glyph = Zone {
                unscaled: (0..count as i32)
                    .map(|i| Point::new(i * 100, i * 50))
                    .collect(),
                original: (0..count as i32).map(|i| Point::new(i * 64, i * 32)).collect(),
                points: (0..count as i32).map(|i| Point::new(i * 64, i * 32)).collect(),
                flags: vec![PointFlags::off_curve(); count],
                contour_ends: vec![count as u16 - 1],
            };
            let retained = RetainedGraphicsState {
                // 16 26.6 pixels per 1000 font units
                scale: 0x0001_0000 * 64 * 10 / 1000,
                ppem: 10,
                ..Default::default()
            };
            Self {
                graphics: GraphicsState::new(retained, Zone::twilight(4), glyph),
                value_stack: ValueStack::new(64),
                functions: DefinitionTable::new(8),
                instruction_defs: DefinitionTable::new(8),
                cvt: vec![0; 8],
                storage: vec![0; 8],
            }
        }

        pub fn engine<'a>(&'a mut self, bytecode: &'a [u8]) -> Engine<'a> {
            let mut engine = Engine::new(
                [&[], &[], bytecode],
                &mut self.graphics,
                &mut self.value_stack,
                &mut self.functions,
                &mut self.instruction_defs,
                &mut self.cvt,
                &mut self.storage,
            );
            engine.program = Program::Glyph;
            engine.call_stack = CallStack::default();
            engine
        }
    }

    #[test]
    fn push_and_arith_program() {
        let mut state = MockState::new();
        // PUSHB[1] 64 32; ADD
        let bytecode = [0xB1, 64, 32, 0x60];
        let mut engine = state.engine(&bytecode);
        engine.run(Program::Glyph).unwrap();
        assert_eq!(state.value_stack.pop().unwrap(), 96);
    }

    #[test]
    fn truncated_push_payload_is_an_error() {
        let mut state = MockState::new();
        // NPUSHB declares four bytes but only two follow.
        let truncated = [0x40, 4, 1, 2];
        let mut engine = state.engine(&truncated);
        assert!(engine.run(Program::Glyph).is_err());
    }
}
