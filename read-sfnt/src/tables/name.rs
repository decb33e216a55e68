//! The `name` (naming) table.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"name");

// Name identifiers decoded into [`NameTable`].
const FAMILY: u16 = 1;
const SUBFAMILY: u16 = 2;
const UNIQUE_ID: u16 = 3;
const FULL_NAME: u16 = 4;
const VERSION: u16 = 5;
const DESCRIPTION: u16 = 10;
const TYPOGRAPHIC_FAMILY: u16 = 16;
const TYPOGRAPHIC_SUBFAMILY: u16 = 17;

/// A fixed set of font naming strings.
///
/// Strings are taken only from Unicode-platform or Microsoft
/// Unicode-encoded records and decoded as UTF-16BE; legacy Macintosh
/// encodings are skipped.
#[derive(Clone, Default, Debug)]
pub struct NameTable {
    pub family: Option<String>,
    pub subfamily: Option<String>,
    pub unique_id: Option<String>,
    pub full_name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub typographic_family: Option<String>,
    pub typographic_subfamily: Option<String>,
}

impl NameTable {
    pub fn read<R: Read + Seek>(
        stream: &mut FontStream<R>,
        table_offset: u32,
    ) -> Result<Self, ReadError> {
        let _format = stream.read_u16()?;
        let count = stream.read_u16()?;
        let string_offset = stream.read_u16()?;
        let mut records = Vec::new();
        for _ in 0..count {
            let platform = stream.read_u16()?;
            let encoding = stream.read_u16()?;
            let _language = stream.read_u16()?;
            let name_id = stream.read_u16()?;
            let length = stream.read_u16()?;
            let offset = stream.read_u16()?;
            let is_unicode = platform == 0 || (platform == 3 && (encoding == 1 || encoding == 10));
            if is_unicode {
                records.push((name_id, length, offset));
            }
        }
        let mut table = Self::default();
        for (name_id, length, offset) in records {
            let slot = match name_id {
                FAMILY => &mut table.family,
                SUBFAMILY => &mut table.subfamily,
                UNIQUE_ID => &mut table.unique_id,
                FULL_NAME => &mut table.full_name,
                VERSION => &mut table.version,
                DESCRIPTION => &mut table.description,
                TYPOGRAPHIC_FAMILY => &mut table.typographic_family,
                TYPOGRAPHIC_SUBFAMILY => &mut table.typographic_subfamily,
                _ => continue,
            };
            if slot.is_some() {
                continue;
            }
            stream.seek(table_offset as u64 + string_offset as u64 + offset as u64)?;
            let bytes = stream.read_bytes(length as usize)?;
            *slot = Some(decode_utf16_be(&bytes));
        }
        Ok(table)
    }
}

fn decode_utf16_be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::NameTable;
    use crate::FontStream;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
    }

    #[test]
    fn extracts_unicode_records() {
        let family = utf16("Test Sans");
        let subfamily = utf16("Bold");
        let mac_name = b"Legacy".to_vec();
        let mut strings = Vec::new();
        let family_offset = strings.len() as u16;
        strings.extend_from_slice(&family);
        let subfamily_offset = strings.len() as u16;
        strings.extend_from_slice(&subfamily);
        let mac_offset = strings.len() as u16;
        strings.extend_from_slice(&mac_name);

        let mut data = Vec::new();
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&3u16.to_be_bytes());
        let string_offset = 6 + 3 * 12;
        data.extend_from_slice(&(string_offset as u16).to_be_bytes());
        // (platform, encoding, language, id, length, offset)
        for record in [
            (3u16, 1u16, 0x409u16, 1u16, family.len() as u16, family_offset),
            (3, 1, 0x409, 2, subfamily.len() as u16, subfamily_offset),
            // Macintosh Roman record for the family: must be ignored.
            (1, 0, 0, 1, mac_name.len() as u16, mac_offset),
        ] {
            data.extend_from_slice(&record.0.to_be_bytes());
            data.extend_from_slice(&record.1.to_be_bytes());
            data.extend_from_slice(&record.2.to_be_bytes());
            data.extend_from_slice(&record.3.to_be_bytes());
            data.extend_from_slice(&record.4.to_be_bytes());
            data.extend_from_slice(&record.5.to_be_bytes());
        }
        data.extend_from_slice(&strings);

        let mut stream = FontStream::from_vec(data);
        let name = NameTable::read(&mut stream, 0).unwrap();
        assert_eq!(name.family.as_deref(), Some("Test Sans"));
        assert_eq!(name.subfamily.as_deref(), Some("Bold"));
        assert_eq!(name.full_name, None);
    }
}
