//! The `cvt `, `fpgm` and `prep` (hinting data) tables.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

pub const CVT_TAG: Tag = Tag::new(b"cvt ");
pub const FPGM_TAG: Tag = Tag::new(b"fpgm");
pub const PREP_TAG: Tag = Tag::new(b"prep");

/// Unscaled control values in font units.
#[derive(Clone, Default, Debug)]
pub struct ControlValues {
    pub values: Vec<i16>,
}

impl ControlValues {
    pub fn read<R: Read + Seek>(
        stream: &mut FontStream<R>,
        table_length: u32,
    ) -> Result<Self, ReadError> {
        let count = table_length as usize / 2;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(stream.read_i16()?);
        }
        Ok(Self { values })
    }
}

/// Reads a raw bytecode table (`fpgm` or `prep`).
pub fn read_bytecode<R: Read + Seek>(
    stream: &mut FontStream<R>,
    table_length: u32,
) -> Result<Vec<u8>, ReadError> {
    stream.read_bytes(table_length as usize)
}
