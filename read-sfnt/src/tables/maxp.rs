//! The `maxp` (maximum profile) table.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"maxp");

const VERSION_1_0: u32 = 0x0001_0000;

// Defensive ceilings for the interpreter limits. Real fonts sit far
// below these; a value above one of them means a corrupt or hostile
// file rather than an unusually complex font.
const MAX_TWILIGHT_POINTS: u16 = 4096;
const MAX_STORAGE: u16 = 16384;
const MAX_FUNCTION_DEFS: u16 = 4096;
const MAX_INSTRUCTION_DEFS: u16 = 1024;
const MAX_STACK_ELEMENTS: u16 = 32768;

/// The maximum profile table: glyph count and interpreter limits.
#[derive(Copy, Clone, Debug)]
pub struct Maxp {
    pub num_glyphs: u16,
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

impl Maxp {
    pub fn read<R: Read + Seek>(stream: &mut FontStream<R>) -> Result<Self, ReadError> {
        let version = stream.read_u32()?;
        if version != VERSION_1_0 {
            return Err(ReadError::InvalidTableVersion(TAG, version));
        }
        let num_glyphs = stream.read_u16()?;
        let max_points = stream.read_u16()?;
        let max_contours = stream.read_u16()?;
        let max_composite_points = stream.read_u16()?;
        let max_composite_contours = stream.read_u16()?;
        let _max_zones = stream.read_u16()?;
        let max_twilight_points = stream.read_u16()?;
        let max_storage = stream.read_u16()?;
        let max_function_defs = stream.read_u16()?;
        let max_instruction_defs = stream.read_u16()?;
        let max_stack_elements = stream.read_u16()?;
        let max_size_of_instructions = stream.read_u16()?;
        let max_component_elements = stream.read_u16()?;
        let max_component_depth = stream.read_u16()?;
        for (what, value, limit) in [
            ("twilight point count", max_twilight_points, MAX_TWILIGHT_POINTS),
            ("storage area size", max_storage, MAX_STORAGE),
            ("function definition count", max_function_defs, MAX_FUNCTION_DEFS),
            (
                "instruction definition count",
                max_instruction_defs,
                MAX_INSTRUCTION_DEFS,
            ),
            ("stack depth", max_stack_elements, MAX_STACK_ELEMENTS),
        ] {
            if value > limit {
                return Err(ReadError::LimitExceeded {
                    what,
                    value: value as u32,
                    limit: limit as u32,
                });
            }
        }
        Ok(Self {
            num_glyphs,
            max_points,
            max_contours,
            max_composite_points,
            max_composite_contours,
            max_twilight_points,
            max_storage,
            max_function_defs,
            max_instruction_defs,
            max_stack_elements,
            max_size_of_instructions,
            max_component_elements,
            max_component_depth,
        })
    }
}
