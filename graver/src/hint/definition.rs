//! Function and instruction definitions.

use super::{error::HintErrorKind, program::Program};

/// A function (`FDEF`) or instruction (`IDEF`) body recorded by the
/// font or control value program.
#[derive(Copy, Clone, Default, Debug)]
pub struct Definition {
    pub program: Program,
    /// Offset of the first instruction after the defining opcode.
    pub start: u32,
    /// Offset of the matching `ENDF`.
    pub end: u32,
    /// The function number or the opcode being defined.
    pub key: i32,
    pub is_active: bool,
}

/// A fixed-capacity table of definitions keyed by function number or
/// opcode.
#[derive(Clone, Default, Debug)]
pub struct DefinitionTable {
    entries: Vec<Definition>,
}

impl DefinitionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![Definition::default(); capacity],
        }
    }

    pub fn reset(&mut self, capacity: usize) {
        self.entries.clear();
        self.entries.resize(capacity, Definition::default());
    }

    /// Records a definition in the slot matching its key. Function
    /// numbers index directly; instruction definitions take the first
    /// free slot.
    pub fn define(&mut self, key: i32, definition: Definition) -> Result<(), HintErrorKind> {
        let index = if self
            .entries
            .get(key as usize)
            .map(|entry| !entry.is_active || entry.key == key)
            .unwrap_or(false)
        {
            key as usize
        } else {
            self.entries
                .iter()
                .position(|entry| !entry.is_active)
                .ok_or(HintErrorKind::InvalidDefinition(key as usize))?
        };
        self.entries[index] = definition;
        Ok(())
    }

    pub fn get(&self, key: i32) -> Result<Definition, HintErrorKind> {
        // Fast path: definitions usually live at their own index.
        if let Some(entry) = self.entries.get(key as usize) {
            if entry.is_active && entry.key == key {
                return Ok(*entry);
            }
        }
        self.entries
            .iter()
            .find(|entry| entry.is_active && entry.key == key)
            .copied()
            .ok_or(HintErrorKind::InvalidDefinition(key.max(0) as usize))
    }
}
