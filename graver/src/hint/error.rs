//! Hinting error definitions.

use super::program::Program;

/// Errors that may occur while interpreting TrueType bytecode.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HintErrorKind {
    UnexpectedEndOfBytecode,
    UnhandledOpcode(u8),
    DefinitionInGlyphProgram,
    NestedDefinition,
    InvalidDefinition(usize),
    ValueStackOverflow,
    ValueStackUnderflow,
    CallStackOverflow,
    CallStackUnderflow,
    InvalidPointIndex(usize),
    InvalidPointRange(usize, usize),
    InvalidContourIndex(usize),
    InvalidCvtIndex(usize),
    InvalidStorageIndex(usize),
    DivideByZero,
    InvalidZoneIndex(i32),
    NegativeLoopCounter,
    InvalidJump,
    ExceededExecutionBudget,
}

impl core::fmt::Display for HintErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnexpectedEndOfBytecode => write!(f, "unexpected end of bytecode"),
            Self::UnhandledOpcode(opcode) => write!(f, "unhandled opcode 0x{opcode:02X}"),
            Self::DefinitionInGlyphProgram => {
                write!(f, "function or instruction definition in glyph program")
            }
            Self::NestedDefinition => write!(f, "nested function or instruction definition"),
            Self::InvalidDefinition(key) => write!(f, "definition {key} not found"),
            Self::ValueStackOverflow => write!(f, "value stack overflow"),
            Self::ValueStackUnderflow => write!(f, "value stack underflow"),
            Self::CallStackOverflow => write!(f, "call stack overflow"),
            Self::CallStackUnderflow => write!(f, "call stack underflow"),
            Self::InvalidPointIndex(index) => write!(f, "point index {index} out of bounds"),
            Self::InvalidPointRange(start, end) => {
                write!(f, "point range {start}..{end} out of bounds")
            }
            Self::InvalidContourIndex(index) => write!(f, "contour index {index} out of bounds"),
            Self::InvalidCvtIndex(index) => write!(f, "cvt index {index} out of bounds"),
            Self::InvalidStorageIndex(index) => {
                write!(f, "storage index {index} out of bounds")
            }
            Self::DivideByZero => write!(f, "attempt to divide by zero"),
            Self::InvalidZoneIndex(index) => write!(f, "invalid zone index {index}"),
            Self::NegativeLoopCounter => write!(f, "negative loop counter"),
            Self::InvalidJump => write!(f, "jump target out of bounds"),
            Self::ExceededExecutionBudget => write!(f, "too many instructions executed"),
        }
    }
}

/// A hinting failure with the location where it occurred.
#[derive(Copy, Clone, Debug)]
pub struct HintError {
    pub program: Program,
    pub pc: usize,
    pub opcode: Option<u8>,
    pub kind: HintErrorKind,
}

impl core::fmt::Display for HintError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let program = match self.program {
            Program::Font => "fpgm",
            Program::ControlValue => "prep",
            Program::Glyph => "glyf",
        };
        write!(f, "{program}@{}", self.pc)?;
        if let Some(opcode) = self.opcode {
            write!(f, ":0x{opcode:02X}")?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for HintError {}
