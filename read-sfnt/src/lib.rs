//! Reading TrueType font files.
//!
//! This crate decodes the SFNT container and the tables needed for
//! glyph rendering into owned, validated structures. It is strict
//! about structure: a font with a malformed required table does not
//! load at all. Optional data that is merely absent or zero-valued is
//! replaced with documented defaults instead.

mod directory;
mod error;
mod font;
mod stream;

pub mod tables;

pub use directory::{TableDirectory, TableRecord};
pub use error::ReadError;
pub use font::FontFile;
pub use stream::FontStream;

/// Re-export of the scalar types crate.
pub use graver_types as types;
