//! The `hhea` and `vhea` (metrics header) tables.
//!
//! Both tables share one layout, differing only in which axis the
//! fields describe, so a single type covers horizontal and vertical
//! headers.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"hhea");
pub const VERTICAL_TAG: Tag = Tag::new(b"vhea");

/// Header for a set of per-glyph metrics.
#[derive(Copy, Clone, Debug)]
pub struct MetricsHeader {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub max_advance: u16,
    /// Number of full (advance + bearing) records in the matching
    /// `hmtx`/`vmtx` table.
    pub number_of_long_metrics: u16,
}

impl MetricsHeader {
    pub fn read<R: Read + Seek>(
        stream: &mut FontStream<R>,
        num_glyphs: u16,
    ) -> Result<Self, ReadError> {
        let _version = stream.read_u32()?;
        let ascender = stream.read_i16()?;
        let descender = stream.read_i16()?;
        let line_gap = stream.read_i16()?;
        let max_advance = stream.read_u16()?;
        // min bearings, max extent, caret slope/offset, reserved, format
        stream.skip(22)?;
        let number_of_long_metrics = stream.read_u16()?;
        if number_of_long_metrics == 0 || number_of_long_metrics > num_glyphs {
            return Err(ReadError::InvalidMetricCount(number_of_long_metrics));
        }
        Ok(Self {
            ascender,
            descender,
            line_gap,
            max_advance,
            number_of_long_metrics,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::MetricsHeader;
    use crate::{FontStream, ReadError};

    pub(crate) fn hhea_bytes(
        ascender: i16,
        descender: i16,
        line_gap: i16,
        num_long: u16,
    ) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0x00010000u32.to_be_bytes());
        data.extend_from_slice(&ascender.to_be_bytes());
        data.extend_from_slice(&descender.to_be_bytes());
        data.extend_from_slice(&line_gap.to_be_bytes());
        data.extend_from_slice(&1000u16.to_be_bytes()); // max advance
        data.extend_from_slice(&[0; 22]);
        data.extend_from_slice(&num_long.to_be_bytes());
        data
    }

    #[test]
    fn reads_fields() {
        let mut stream = FontStream::from_vec(hhea_bytes(800, -200, 90, 3));
        let hhea = MetricsHeader::read(&mut stream, 4).unwrap();
        assert_eq!(hhea.ascender, 800);
        assert_eq!(hhea.descender, -200);
        assert_eq!(hhea.line_gap, 90);
        assert_eq!(hhea.number_of_long_metrics, 3);
    }

    #[test]
    fn rejects_metric_count_above_glyph_count() {
        let mut stream = FontStream::from_vec(hhea_bytes(800, -200, 90, 5));
        assert!(matches!(
            MetricsHeader::read(&mut stream, 4),
            Err(ReadError::InvalidMetricCount(5))
        ));
    }
}
