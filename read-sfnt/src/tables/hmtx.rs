//! The `hmtx` and `vmtx` (per-glyph metrics) tables.

use std::io::{Read, Seek};

use graver_types::{GlyphId, Tag};

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"hmtx");
pub const VERTICAL_TAG: Tag = Tag::new(b"vmtx");

/// Advance and front side bearing for one glyph.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct MetricsEntry {
    pub advance: u16,
    pub side_bearing: i16,
}

/// Per-glyph metrics in one direction.
#[derive(Clone, Debug)]
pub struct MetricsTable {
    entries: Vec<MetricsEntry>,
}

impl MetricsTable {
    /// Reads one entry per glyph. When fewer long metrics exist than
    /// glyphs, the tail records carry only a side bearing and reuse the
    /// last advance (the standard monospace compaction).
    pub fn read<R: Read + Seek>(
        stream: &mut FontStream<R>,
        number_of_long_metrics: u16,
        num_glyphs: u16,
    ) -> Result<Self, ReadError> {
        let num_long = number_of_long_metrics.min(num_glyphs) as usize;
        let mut entries = Vec::with_capacity(num_glyphs as usize);
        let mut advance = 0;
        for _ in 0..num_long {
            advance = stream.read_u16()?;
            let side_bearing = stream.read_i16()?;
            entries.push(MetricsEntry {
                advance,
                side_bearing,
            });
        }
        for _ in num_long..num_glyphs as usize {
            let side_bearing = stream.read_i16()?;
            entries.push(MetricsEntry {
                advance,
                side_bearing,
            });
        }
        Ok(Self { entries })
    }

    pub fn get(&self, glyph_id: GlyphId) -> Result<MetricsEntry, ReadError> {
        self.entries
            .get(glyph_id.to_usize())
            .copied()
            .ok_or(ReadError::InvalidGlyphId(glyph_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{MetricsEntry, MetricsTable};
    use crate::FontStream;
    use graver_types::GlyphId;

    pub(crate) fn hmtx_bytes(long: &[(u16, i16)], short: &[i16]) -> Vec<u8> {
        let mut data = Vec::new();
        for (advance, bearing) in long {
            data.extend_from_slice(&advance.to_be_bytes());
            data.extend_from_slice(&bearing.to_be_bytes());
        }
        for bearing in short {
            data.extend_from_slice(&bearing.to_be_bytes());
        }
        data
    }

    #[test]
    fn monospace_tail_reuses_last_advance() {
        let data = hmtx_bytes(&[(500, 10), (600, 20)], &[30, 40]);
        let mut stream = FontStream::from_vec(data);
        let hmtx = MetricsTable::read(&mut stream, 2, 4).unwrap();
        assert_eq!(
            hmtx.get(GlyphId::new(1)).unwrap(),
            MetricsEntry {
                advance: 600,
                side_bearing: 20
            }
        );
        assert_eq!(
            hmtx.get(GlyphId::new(3)).unwrap(),
            MetricsEntry {
                advance: 600,
                side_bearing: 40
            }
        );
    }

    #[test]
    fn out_of_range_glyph_is_an_error() {
        let mut stream = FontStream::from_vec(hmtx_bytes(&[(500, 10)], &[]));
        let hmtx = MetricsTable::read(&mut stream, 1, 1).unwrap();
        assert!(hmtx.get(GlyphId::new(9)).is_err());
    }
}
