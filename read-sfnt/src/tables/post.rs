//! The `post` (PostScript information) table.

use std::io::{Read, Seek};

use graver_types::Tag;

use crate::{FontStream, ReadError};

pub const TAG: Tag = Tag::new(b"post");

/// Underline metrics and the fixed pitch flag.
///
/// Only the version-independent header is decoded; glyph names are not
/// needed for rendering.
#[derive(Copy, Clone, Debug)]
pub struct Post {
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: bool,
}

impl Post {
    pub fn read<R: Read + Seek>(stream: &mut FontStream<R>) -> Result<Self, ReadError> {
        let _version = stream.read_u32()?;
        let _italic_angle = stream.read_i32()?;
        let underline_position = stream.read_i16()?;
        let underline_thickness = stream.read_i16()?;
        let is_fixed_pitch = stream.read_u32()? != 0;
        Ok(Self {
            underline_position,
            underline_thickness,
            is_fixed_pitch,
        })
    }
}
