//! TrueType glyph scaling, hinting and rasterization.
//!
//! This crate turns the tables decoded by [`read_sfnt`] into pixels:
//! the scaler composes and scales glyph outlines, the hinting
//! interpreter executes the font's embedded bytecode to align points
//! with the pixel grid, and the rasterizer converts outlines into
//! anti-aliased horizontal coverage spans.
//!
//! A [`Font`] is the entry point for text work: it caches hinted
//! glyphs per (size, character) pair and answers kerning and line
//! metric queries. The [`raster::Rasterizer`] is independent of fonts
//! and accepts any point/contour outline.

mod error;
mod font;
mod layout;
mod outline;
mod scaler;

pub mod hint;
pub mod raster;

pub use error::DrawError;
pub use font::{Font, GlyphSlot, LineMetrics, Size, Style};
pub use layout::{LayoutFlags, LayoutOptions, LineRecord, TextMetrics};
pub use outline::{PointFlags, ScaledOutline};
pub use raster::{Rasterizer, Span};

/// Re-exports of the lower layers.
pub use graver_types as types;
pub use read_sfnt;
