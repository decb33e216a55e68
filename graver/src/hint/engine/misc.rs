//! Measurement queries and the odds and ends.

use super::{Engine, OpResult};

/// Rasterizer version reported by GETINFO.
const ENGINE_VERSION: i32 = 35;

impl Engine<'_> {
    /// MPPEM (0x4B)
    pub(super) fn op_mppem(&mut self) -> OpResult {
        self.value_stack.push(self.graphics.retained.ppem)
    }

    /// MPS (0x4C): this engine always works at ppem == point size, as
    /// version 35 rasterizers did.
    pub(super) fn op_mps(&mut self) -> OpResult {
        self.value_stack.push(self.graphics.retained.ppem)
    }

    /// GETINFO (0x88): a fixed capability word. The engine identifies
    /// as a version 35 grayscale rasterizer; rotation, stretching and
    /// variations are never active.
    pub(super) fn op_getinfo(&mut self) -> OpResult {
        let selector = self.value_stack.pop()?;
        let mut result = 0;
        if selector & 1 != 0 {
            result = ENGINE_VERSION;
        }
        if selector & 32 != 0 {
            result |= 1 << 12;
        }
        self.value_stack.push(result)
    }

    /// DEBUG (0x4F): pops and ignores its argument.
    pub(super) fn op_debug(&mut self) -> OpResult {
        self.value_stack.pop()?;
        Ok(())
    }

    /// SANGW (0x7E): angle weights predate this instruction set
    /// version; pop and ignore.
    pub(super) fn op_sangw(&mut self) -> OpResult {
        self.value_stack.pop()?;
        Ok(())
    }

    /// AA (0x7F): likewise obsolete.
    pub(super) fn op_aa(&mut self) -> OpResult {
        self.value_stack.pop()?;
        Ok(())
    }
}
