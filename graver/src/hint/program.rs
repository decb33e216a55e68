//! Bytecode program identifiers.

/// The three bytecode streams a font can carry.
///
/// Each runs with different permissions: the font program may define
/// functions, the control value program may define functions and sets
/// the retained graphics state, and glyph programs may do neither.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[repr(u8)]
pub enum Program {
    /// The `fpgm` table, run once at instance setup.
    #[default]
    Font = 0,
    /// The `prep` table, run on every scale change.
    ControlValue = 1,
    /// Instructions embedded in a glyph record.
    Glyph = 2,
}
