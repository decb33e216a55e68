//! Scalar types shared by the font parsing and scaling crates.

mod fixed;
mod glyph_id;
mod point;
mod tag;

pub use fixed::{F26Dot6, F2Dot14, Fixed};
pub use glyph_id::GlyphId;
pub use point::Point;
pub use tag::Tag;
