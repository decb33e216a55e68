//! The SFNT table directory.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

/// Classic TrueType version tag (`0x00010000`).
const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
/// Apple's `true` version tag.
const SFNT_VERSION_TRUE: u32 = u32::from_be_bytes(*b"true");
/// Font collection header tag.
const TTC_TAG: u32 = u32::from_be_bytes(*b"ttcf");

/// Upper bound on the table count; real fonts carry a few dozen.
const MAX_TABLES: u16 = 512;

/// A single entry in the table directory.
#[derive(Copy, Clone, Debug)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// The parsed table directory of one font face.
///
/// Collection (`ttcf`) headers are recognized, but only the first face
/// is loaded.
#[derive(Debug)]
pub struct TableDirectory {
    records: Vec<TableRecord>,
}

impl TableDirectory {
    pub fn read<R: Read + Seek>(stream: &mut FontStream<R>) -> Result<Self, ReadError> {
        let mut version = stream.read_u32()?;
        if version == TTC_TAG {
            // TTC header: version, num fonts, per-face offsets.
            let _ttc_version = stream.read_u32()?;
            let num_fonts = stream.read_u32()?;
            if num_fonts == 0 {
                return Err(ReadError::EmptyCollection);
            }
            let first_face = stream.read_u32()?;
            stream.seek(first_face as u64)?;
            version = stream.read_u32()?;
        }
        if version != SFNT_VERSION_TRUETYPE && version != SFNT_VERSION_TRUE {
            return Err(ReadError::InvalidSfntVersion(version));
        }
        let num_tables = stream.read_u16()?;
        if num_tables > MAX_TABLES {
            return Err(ReadError::LimitExceeded {
                what: "table count",
                value: num_tables as u32,
                limit: MAX_TABLES as u32,
            });
        }
        let _search_range = stream.read_u16()?;
        let _entry_selector = stream.read_u16()?;
        let _range_shift = stream.read_u16()?;
        let mut records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            records.push(TableRecord {
                tag: Tag::from_u32(stream.read_u32()?),
                checksum: stream.read_u32()?,
                offset: stream.read_u32()?,
                length: stream.read_u32()?,
            });
        }
        Ok(Self { records })
    }

    /// Looks up a table by tag.
    pub fn get(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|record| record.tag == tag)
    }

    /// Looks up a table whose absence is fatal.
    pub fn require(&self, tag: Tag) -> Result<&TableRecord, ReadError> {
        self.get(tag).ok_or(ReadError::MissingRequiredTable(tag))
    }

    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }
}
