//! The `OS/2` (metrics and style) table.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"OS/2");

// fsSelection bits.
const ITALIC: u16 = 1 << 0;
const BOLD: u16 = 1 << 5;
const USE_TYPO_METRICS: u16 = 1 << 7;
const OBLIQUE: u16 = 1 << 9;

/// Windows metrics and style classification.
#[derive(Clone, Debug)]
pub struct Os2 {
    pub weight_class: u16,
    pub width_class: u16,
    pub strikeout_size: i16,
    pub strikeout_position: i16,
    pub fs_selection: u16,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
    /// Present from version 2 onward; zero when the font predates it.
    pub x_height: i16,
    pub cap_height: i16,
}

impl Os2 {
    pub fn read<R: Read + Seek>(stream: &mut FontStream<R>) -> Result<Self, ReadError> {
        let version = stream.read_u16()?;
        let _avg_char_width = stream.read_i16()?;
        let weight_class = stream.read_u16()?;
        let width_class = stream.read_u16()?;
        let _fs_type = stream.read_u16()?;
        // subscript and superscript size/position
        stream.skip(16)?;
        let strikeout_size = stream.read_i16()?;
        let strikeout_position = stream.read_i16()?;
        let _family_class = stream.read_i16()?;
        // panose, unicode ranges, vendor id
        stream.skip(10 + 16 + 4)?;
        let fs_selection = stream.read_u16()?;
        let _first_char_index = stream.read_u16()?;
        let _last_char_index = stream.read_u16()?;
        let typo_ascender = stream.read_i16()?;
        let typo_descender = stream.read_i16()?;
        let typo_line_gap = stream.read_i16()?;
        let win_ascent = stream.read_u16()?;
        let win_descent = stream.read_u16()?;
        let mut x_height = 0;
        let mut cap_height = 0;
        if version >= 2 {
            // code page ranges
            stream.skip(8)?;
            x_height = stream.read_i16()?;
            cap_height = stream.read_i16()?;
        }
        Ok(Self {
            weight_class,
            width_class,
            strikeout_size,
            strikeout_position,
            fs_selection,
            typo_ascender,
            typo_descender,
            typo_line_gap,
            win_ascent,
            win_descent,
            x_height,
            cap_height,
        })
    }

    pub fn is_bold(&self) -> bool {
        self.fs_selection & BOLD != 0
    }

    pub fn is_italic(&self) -> bool {
        self.fs_selection & ITALIC != 0
    }

    pub fn is_oblique(&self) -> bool {
        self.fs_selection & OBLIQUE != 0
    }

    /// True when line spacing should come from the typographic triplet
    /// rather than the legacy win/hhea values.
    pub fn use_typo_metrics(&self) -> bool {
        self.fs_selection & USE_TYPO_METRICS != 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Os2;
    use crate::FontStream;

    pub(crate) fn os2_bytes(fs_selection: u16, x_height: i16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_be_bytes()); // version
        data.extend_from_slice(&500i16.to_be_bytes()); // avg char width
        data.extend_from_slice(&400u16.to_be_bytes()); // weight
        data.extend_from_slice(&5u16.to_be_bytes()); // width
        data.extend_from_slice(&0u16.to_be_bytes()); // fsType
        data.extend_from_slice(&[0; 16]); // sub/superscript
        data.extend_from_slice(&50i16.to_be_bytes()); // strikeout size
        data.extend_from_slice(&250i16.to_be_bytes()); // strikeout position
        data.extend_from_slice(&0i16.to_be_bytes()); // family class
        data.extend_from_slice(&[0; 30]); // panose, ranges, vendor
        data.extend_from_slice(&fs_selection.to_be_bytes());
        data.extend_from_slice(&0x20u16.to_be_bytes()); // first char
        data.extend_from_slice(&0xFFu16.to_be_bytes()); // last char
        data.extend_from_slice(&800i16.to_be_bytes()); // typo ascender
        data.extend_from_slice(&(-200i16).to_be_bytes()); // typo descender
        data.extend_from_slice(&90i16.to_be_bytes()); // typo line gap
        data.extend_from_slice(&820u16.to_be_bytes()); // win ascent
        data.extend_from_slice(&210u16.to_be_bytes()); // win descent
        data.extend_from_slice(&[0; 8]); // code pages
        data.extend_from_slice(&x_height.to_be_bytes());
        data.extend_from_slice(&700i16.to_be_bytes()); // cap height
        data
    }

    #[test]
    fn reads_style_and_metrics() {
        let mut stream = FontStream::from_vec(os2_bytes(0x21, 500));
        let os2 = Os2::read(&mut stream).unwrap();
        assert!(os2.is_bold());
        assert!(os2.is_italic());
        assert!(!os2.use_typo_metrics());
        assert_eq!(os2.typo_ascender, 800);
        assert_eq!(os2.win_descent, 210);
        assert_eq!(os2.x_height, 500);
        assert_eq!(os2.cap_height, 700);
    }
}
