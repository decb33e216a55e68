//! Font parsing error definitions.

use graver_types::{GlyphId, Tag};

/// Errors that may occur when parsing a font file.
#[derive(Debug)]
pub enum ReadError {
    /// The underlying byte source failed.
    Io(std::io::Error),
    /// More bytes were requested than remain in the source.
    UnexpectedEof,
    /// The outer container is not a recognized TrueType flavor.
    InvalidSfntVersion(u32),
    /// A TTC header with no faces.
    EmptyCollection,
    /// A table the renderer cannot work without is absent.
    MissingRequiredTable(Tag),
    /// A table carries a version this implementation does not decode.
    InvalidTableVersion(Tag, u32),
    /// The `head` table magic did not match.
    InvalidMagic(u32),
    /// `head.units_per_em` was zero.
    InvalidUnitsPerEm,
    /// A count field exceeded its defensive cap.
    LimitExceeded {
        what: &'static str,
        value: u32,
        limit: u32,
    },
    /// No Unicode-capable `cmap` subtable exists.
    NoUnicodeCmap,
    /// The selected `cmap` subtable uses an unimplemented format.
    UnsupportedCmapFormat(u16),
    /// A glyph's contour end points were not strictly increasing.
    UnorderedContourEndpoints(GlyphId),
    /// A glyph header carried an invalid contour count.
    InvalidContourCount(GlyphId, i16),
    /// A glyph or component referenced an out-of-range glyph index.
    InvalidGlyphId(GlyphId),
    /// A metrics header declared zero long metrics or more than the
    /// glyph count.
    InvalidMetricCount(u16),
    /// An offset or length pointed outside its table.
    OutOfBounds(Tag),
}

impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::UnexpectedEof => write!(f, "unexpected end of stream"),
            Self::InvalidSfntVersion(version) => {
                write!(f, "unrecognized sfnt version 0x{version:08X}")
            }
            Self::EmptyCollection => write!(f, "font collection contains no faces"),
            Self::MissingRequiredTable(tag) => write!(f, "required table '{tag}' is missing"),
            Self::InvalidTableVersion(tag, version) => {
                write!(f, "table '{tag}' has unsupported version 0x{version:08X}")
            }
            Self::InvalidMagic(magic) => write!(f, "bad head table magic 0x{magic:08X}"),
            Self::InvalidUnitsPerEm => write!(f, "units per em must be nonzero"),
            Self::LimitExceeded { what, value, limit } => {
                write!(f, "{what} is {value}, exceeding the limit of {limit}")
            }
            Self::NoUnicodeCmap => write!(f, "no unicode capable cmap subtable"),
            Self::UnsupportedCmapFormat(format) => {
                write!(f, "cmap subtable format {format} is not supported")
            }
            Self::UnorderedContourEndpoints(glyph_id) => {
                write!(f, "glyph {glyph_id} has unordered contour end points")
            }
            Self::InvalidContourCount(glyph_id, count) => {
                write!(f, "glyph {glyph_id} has invalid contour count {count}")
            }
            Self::InvalidGlyphId(glyph_id) => {
                write!(f, "glyph index {glyph_id} is out of range")
            }
            Self::InvalidMetricCount(count) => {
                write!(f, "long metric count {count} is invalid")
            }
            Self::OutOfBounds(tag) => {
                write!(f, "offset out of bounds while reading table '{tag}'")
            }
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(err)
        }
    }
}
