//! The `loca` (glyph location index) table.

use std::io::{Read, Seek};

use graver_types::{GlyphId, Tag};

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"loca");

/// Byte offsets of each glyph within the `glyf` table.
///
/// Holds one entry more than the glyph count; equal consecutive
/// offsets mark a glyph with no outline.
#[derive(Clone, Debug)]
pub struct Loca {
    offsets: Vec<u32>,
}

impl Loca {
    pub fn read<R: Read + Seek>(
        stream: &mut FontStream<R>,
        num_glyphs: u16,
        index_to_loc_format: i16,
    ) -> Result<Self, ReadError> {
        let count = num_glyphs as usize + 1;
        let mut offsets = Vec::with_capacity(count);
        if index_to_loc_format == 0 {
            for _ in 0..count {
                offsets.push(stream.read_u16()? as u32 * 2);
            }
        } else {
            for _ in 0..count {
                offsets.push(stream.read_u32()?);
            }
        }
        Ok(Self { offsets })
    }

    /// The byte range of a glyph's outline data, or `None` when the
    /// glyph is intentionally empty.
    pub fn range(&self, glyph_id: GlyphId) -> Result<Option<(u32, u32)>, ReadError> {
        let index = glyph_id.to_usize();
        let start = *self
            .offsets
            .get(index)
            .ok_or(ReadError::InvalidGlyphId(glyph_id))?;
        let end = *self
            .offsets
            .get(index + 1)
            .ok_or(ReadError::InvalidGlyphId(glyph_id))?;
        if start >= end {
            Ok(None)
        } else {
            Ok(Some((start, end)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Loca;
    use crate::FontStream;
    use graver_types::GlyphId;

    #[test]
    fn short_offsets_are_doubled() {
        let mut data = Vec::new();
        for v in [0u16, 0, 10, 10] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        let mut stream = FontStream::from_vec(data);
        let loca = Loca::read(&mut stream, 3, 0).unwrap();
        // Glyph 0 is empty, glyph 1 spans 0..20, glyph 2 is empty.
        assert_eq!(loca.range(GlyphId::new(0)).unwrap(), None);
        assert_eq!(loca.range(GlyphId::new(1)).unwrap(), Some((0, 20)));
        assert_eq!(loca.range(GlyphId::new(2)).unwrap(), None);
        assert!(loca.range(GlyphId::new(3)).is_err());
    }

    #[test]
    fn long_offsets_are_raw() {
        let mut data = Vec::new();
        for v in [0u32, 100] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        let mut stream = FontStream::from_vec(data);
        let loca = Loca::read(&mut stream, 1, 1).unwrap();
        assert_eq!(loca.range(GlyphId::new(0)).unwrap(), Some((0, 100)));
    }
}
