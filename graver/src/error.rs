//! Drawing error definitions.

use graver_types::GlyphId;
use read_sfnt::ReadError;

use crate::hint::HintError;

/// Errors that may occur when scaling or rendering a glyph.
#[derive(Debug)]
pub enum DrawError {
    /// The underlying font data could not be read.
    Read(ReadError),
    /// A composite glyph nested deeper than the recursion cap, which
    /// in practice means a cyclic component reference.
    RecursionLimitExceeded(GlyphId),
    /// A composite component anchored to a point index that does not
    /// exist.
    InvalidAnchorPoint(GlyphId, u16),
    /// The font or control value program failed, leaving no usable
    /// hinting state.
    Hint(HintError),
}

impl core::fmt::Display for DrawError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Read(err) => write!(f, "{err}"),
            Self::RecursionLimitExceeded(glyph_id) => {
                write!(f, "composite glyph {glyph_id} exceeded the recursion limit")
            }
            Self::InvalidAnchorPoint(glyph_id, index) => {
                write!(f, "invalid anchor point {index} in composite glyph {glyph_id}")
            }
            Self::Hint(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DrawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReadError> for DrawError {
    fn from(err: ReadError) -> Self {
        Self::Read(err)
    }
}

impl From<HintError> for DrawError {
    fn from(err: HintError) -> Self {
        Self::Hint(err)
    }
}
