//! Glyph identifiers.

/// A 16-bit glyph identifier.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct GlyphId(u16);

impl GlyphId {
    /// The identifier reserved for unmapped characters.
    pub const NOTDEF: Self = Self(0);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn to_u16(self) -> u16 {
        self.0
    }

    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for GlyphId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl core::fmt::Display for GlyphId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
