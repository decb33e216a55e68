//! The `cmap` (character to glyph index mapping) table.

use std::io::{Read, Seek};

use graver_types::{GlyphId, Tag};

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"cmap");

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MICROSOFT: u16 = 3;
const ENCODING_MS_UNICODE_BMP: u16 = 1;
const ENCODING_MS_UNICODE_FULL: u16 = 10;
const ENCODING_UNICODE_2_0_FULL: u16 = 4;

/// One segment of a format 4 subtable. Ranges are end-inclusive.
#[derive(Copy, Clone, Debug)]
struct Segment {
    start: u16,
    end: u16,
    delta: i16,
    /// Raw `idRangeOffset` word; zero selects the delta rule.
    range_offset: u16,
}

/// Unicode code point to glyph index mapping.
///
/// Built from the best Unicode-capable subtable: a full repertoire
/// encoding when present, otherwise a BMP one. Only format 4 subtables
/// are decoded; a font whose chosen subtable uses another format does
/// not load.
#[derive(Clone, Debug)]
pub struct CharacterMap {
    segments: Vec<Segment>,
    glyph_ids: Vec<u16>,
}

impl CharacterMap {
    pub fn read<R: Read + Seek>(
        stream: &mut FontStream<R>,
        table_offset: u32,
        table_length: u32,
    ) -> Result<Self, ReadError> {
        let _version = stream.read_u16()?;
        let num_subtables = stream.read_u16()?;
        // (platform, encoding, offset) triples, best score wins.
        let mut best: Option<(u32, u32)> = None;
        for _ in 0..num_subtables {
            let platform = stream.read_u16()?;
            let encoding = stream.read_u16()?;
            let offset = stream.read_u32()?;
            let score = match (platform, encoding) {
                (PLATFORM_MICROSOFT, ENCODING_MS_UNICODE_FULL) => 2,
                (PLATFORM_UNICODE, ENCODING_UNICODE_2_0_FULL) => 2,
                (PLATFORM_MICROSOFT, ENCODING_MS_UNICODE_BMP) => 1,
                (PLATFORM_UNICODE, _) => 1,
                _ => continue,
            };
            if best.map(|(s, _)| s < score).unwrap_or(true) {
                best = Some((score, offset));
            }
        }
        let (_, subtable_offset) = best.ok_or(ReadError::NoUnicodeCmap)?;
        stream.seek(table_offset as u64 + subtable_offset as u64)?;
        let format = stream.read_u16()?;
        if format != 4 {
            return Err(ReadError::UnsupportedCmapFormat(format));
        }
        Self::read_format4(stream, table_length.saturating_sub(subtable_offset))
    }

    fn read_format4<R: Read + Seek>(
        stream: &mut FontStream<R>,
        bytes_left: u32,
    ) -> Result<Self, ReadError> {
        let length = stream.read_u16()?.min(bytes_left.min(u16::MAX as u32) as u16);
        let _language = stream.read_u16()?;
        let seg_count_x2 = stream.read_u16()?;
        let seg_count = (seg_count_x2 / 2) as usize;
        let _search_range = stream.read_u16()?;
        let _entry_selector = stream.read_u16()?;
        let _range_shift = stream.read_u16()?;
        let mut segments = vec![
            Segment {
                start: 0,
                end: 0,
                delta: 0,
                range_offset: 0
            };
            seg_count
        ];
        for segment in segments.iter_mut() {
            segment.end = stream.read_u16()?;
        }
        let _reserved_pad = stream.read_u16()?;
        for segment in segments.iter_mut() {
            segment.start = stream.read_u16()?;
        }
        for segment in segments.iter_mut() {
            segment.delta = stream.read_i16()?;
        }
        for segment in segments.iter_mut() {
            segment.range_offset = stream.read_u16()?;
        }
        // The glyph id array fills whatever the length field leaves
        // after the four parallel arrays.
        let consumed = 16 + 8 * seg_count as u32;
        let id_count = (length as u32).saturating_sub(consumed) / 2;
        let mut glyph_ids = Vec::with_capacity(id_count as usize);
        for _ in 0..id_count {
            glyph_ids.push(stream.read_u16()?);
        }
        Ok(Self {
            segments,
            glyph_ids,
        })
    }

    /// Maps a code point to its glyph index, or `None` when the font
    /// carries no glyph for it.
    pub fn map(&self, codepoint: u32) -> Option<GlyphId> {
        if codepoint > u16::MAX as u32 {
            return None;
        }
        let c = codepoint as u16;
        // Segments are sorted by end code; find the first that could
        // contain c.
        let index = self.segments.partition_point(|segment| segment.end < c);
        let (i, segment) = self.segments.get(index).map(|s| (index, s))?;
        if c < segment.start {
            return None;
        }
        let glyph = if segment.range_offset == 0 {
            (c as i32 + segment.delta as i32) as u16
        } else {
            // The offset is relative to the idRangeOffset word itself;
            // the glyph id array begins right after that array.
            let words_from_range_offset =
                segment.range_offset as usize / 2 + (c - segment.start) as usize;
            let index = words_from_range_offset.checked_sub(self.segments.len() - i)?;
            let raw = self.glyph_ids.get(index).copied()?;
            if raw == 0 {
                return None;
            }
            (raw as i32 + segment.delta as i32) as u16
        };
        (glyph != 0).then(|| GlyphId::new(glyph))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::CharacterMap;
    use crate::{FontStream, ReadError};
    use graver_types::GlyphId;

    /// Builds a cmap with a single Microsoft BMP format 4 subtable.
    pub(crate) fn cmap_bytes(
        segments: &[(u16, u16, i16, u16)],
        glyph_ids: &[u16],
    ) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&3u16.to_be_bytes()); // platform
        data.extend_from_slice(&1u16.to_be_bytes()); // encoding
        data.extend_from_slice(&12u32.to_be_bytes()); // subtable offset
        let length = 16 + 8 * segments.len() + 2 * glyph_ids.len();
        data.extend_from_slice(&4u16.to_be_bytes()); // format
        data.extend_from_slice(&(length as u16).to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes()); // language
        data.extend_from_slice(&(segments.len() as u16 * 2).to_be_bytes());
        data.extend_from_slice(&[0; 6]); // search fields
        for (_, end, _, _) in segments {
            data.extend_from_slice(&end.to_be_bytes());
        }
        data.extend_from_slice(&0u16.to_be_bytes()); // reserved pad
        for (start, _, _, _) in segments {
            data.extend_from_slice(&start.to_be_bytes());
        }
        for (_, _, delta, _) in segments {
            data.extend_from_slice(&delta.to_be_bytes());
        }
        for (_, _, _, range_offset) in segments {
            data.extend_from_slice(&range_offset.to_be_bytes());
        }
        for id in glyph_ids {
            data.extend_from_slice(&id.to_be_bytes());
        }
        data
    }

    fn map_of(segments: &[(u16, u16, i16, u16)], glyph_ids: &[u16]) -> CharacterMap {
        let data = cmap_bytes(segments, glyph_ids);
        let length = data.len() as u32;
        let mut stream = FontStream::from_vec(data);
        CharacterMap::read(&mut stream, 0, length).unwrap()
    }

    #[test]
    fn delta_rule() {
        // 'A'..='Z' maps to glyphs 1..=26.
        let map = map_of(&[(65, 90, -64, 0), (0xFFFF, 0xFFFF, 1, 0)], &[]);
        assert_eq!(map.map('A' as u32), Some(GlyphId::new(1)));
        assert_eq!(map.map('Z' as u32), Some(GlyphId::new(26)));
        assert_eq!(map.map('a' as u32), None);
        assert_eq!(map.map(64), None);
    }

    #[test]
    fn indirect_rule() {
        // One segment covering 100..=102 with a range offset pointing
        // at the first word of the glyph id array. Two segments total,
        // so from segment 0 the array starts 2 words past its
        // idRangeOffset slot.
        let map = map_of(
            &[(100, 102, 0, 4), (0xFFFF, 0xFFFF, 1, 0)],
            &[7, 0, 9],
        );
        assert_eq!(map.map(100), Some(GlyphId::new(7)));
        // Explicit zero in the glyph array means unmapped.
        assert_eq!(map.map(101), None);
        assert_eq!(map.map(102), Some(GlyphId::new(9)));
    }

    #[test]
    fn indirect_rule_applies_delta() {
        let map = map_of(&[(100, 100, 5, 4), (0xFFFF, 0xFFFF, 1, 0)], &[7, 0]);
        assert_eq!(map.map(100), Some(GlyphId::new(12)));
    }

    #[test]
    fn non_bmp_codepoints_are_unmapped() {
        let map = map_of(&[(0xFFFF, 0xFFFF, 1, 0)], &[]);
        assert_eq!(map.map(0x1F600), None);
    }

    #[test]
    fn rejects_unsupported_format() {
        let mut data = cmap_bytes(&[(0xFFFF, 0xFFFF, 1, 0)], &[]);
        data[12..14].copy_from_slice(&6u16.to_be_bytes());
        let length = data.len() as u32;
        let mut stream = FontStream::from_vec(data);
        assert!(matches!(
            CharacterMap::read(&mut stream, 0, length),
            Err(ReadError::UnsupportedCmapFormat(6))
        ));
    }

    #[test]
    fn rejects_missing_unicode_subtable() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes()); // Macintosh platform
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&12u32.to_be_bytes());
        let mut stream = FontStream::from_vec(data);
        assert!(matches!(
            CharacterMap::read(&mut stream, 0, 12),
            Err(ReadError::NoUnicodeCmap)
        ));
    }
}
