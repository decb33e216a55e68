//! The `head` (font header) table.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"head");

const MAGIC: u32 = 0x5F0F_3CF5;

/// `flags` bit 3: force ppem to an integer for all internal scaler math.
const INTEGER_PPEM: u16 = 1 << 3;

/// The font header table.
#[derive(Clone, Debug)]
pub struct Head {
    pub flags: u16,
    pub units_per_em: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    /// 0 for short (`u16 * 2`) loca offsets, 1 for long (`u32`).
    pub index_to_loc_format: i16,
}

impl Head {
    pub fn read<R: Read + Seek>(stream: &mut FontStream<R>) -> Result<Self, ReadError> {
        let _version = stream.read_u32()?;
        let _font_revision = stream.read_u32()?;
        let _checksum_adjustment = stream.read_u32()?;
        let magic = stream.read_u32()?;
        if magic != MAGIC {
            return Err(ReadError::InvalidMagic(magic));
        }
        let flags = stream.read_u16()?;
        let units_per_em = stream.read_u16()?;
        if units_per_em == 0 {
            return Err(ReadError::InvalidUnitsPerEm);
        }
        // created and modified timestamps
        stream.skip(16)?;
        let x_min = stream.read_i16()?;
        let y_min = stream.read_i16()?;
        let x_max = stream.read_i16()?;
        let y_max = stream.read_i16()?;
        let mac_style = stream.read_u16()?;
        let lowest_rec_ppem = stream.read_u16()?;
        let _font_direction_hint = stream.read_i16()?;
        let index_to_loc_format = stream.read_i16()?;
        if !(0..=1).contains(&index_to_loc_format) {
            return Err(ReadError::InvalidTableVersion(
                TAG,
                index_to_loc_format as u32,
            ));
        }
        let _glyph_data_format = stream.read_i16()?;
        Ok(Self {
            flags,
            units_per_em,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            index_to_loc_format,
        })
    }

    /// True when the font asks for pixel sizes to be rounded to whole
    /// pixels before scaling.
    pub fn integer_ppem(&self) -> bool {
        self.flags & INTEGER_PPEM != 0
    }
}
