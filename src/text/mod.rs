//! # Text Layout
//!
//! Shaping, break opportunities, and cutting shaped paragraphs into lines.
//!
//! A paragraph is shaped once with [`TextShaper`]. [`ShapingLineBreaker`] then
//! hands out one line at a time, reusing that result and reshaping only the
//! edges of a line that falls inside a ligature or kerned pair.

pub mod break_iterator;
pub mod line_breaker;
pub mod shaping;

pub use break_iterator::{LineBreakIterator, LineBreakType};
pub use line_breaker::{ShapedLine, ShapingLineBreaker};
pub use shaping::{ShapeResult, ShapedGlyph, Shaper, TextShaper};
