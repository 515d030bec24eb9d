//! # Linebox
//!
//! Line breaking over shaped text, and the immutable fragment tree layout
//! produces from it.
//!
//! A paragraph is shaped once. The line breaker then cuts lines out of that
//! single shaping result, reshaping only the few glyphs at a line edge that
//! sit inside a ligature or a kerned pair. Layout stacks the lines and
//! blocks into fragmentainers of fixed size; whatever does not fit continues
//! in the next one from a break token.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]         — Document tree: nodes, styles, fonts
//!       ↓
//!   [layout_object] — Styled tree the fragments point back to
//!       ↓
//!   [layout]        — Block stacking, floats, fragmentation
//!       ↓               ↑ lines from
//!   [text]          — Shaping, break opportunities, ShapingLineBreaker
//!       ↓
//!   [fragment]      — Immutable physical fragment tree
//! ```

pub mod error;
pub mod font;
pub mod fragment;
pub mod geometry;
pub mod layout;
pub mod layout_object;
pub mod model;
pub mod style;
pub mod text;

use std::sync::Arc;

use error::LayoutError;
use font::FontContext;
use fragment::PhysicalFragment;
use layout::LayoutEngine;
use model::Document;

/// Lay out a document into one root fragment per fragmentainer.
///
/// Fails only if one of the document's custom fonts cannot be loaded.
pub fn layout(document: &Document) -> Result<Vec<Arc<PhysicalFragment>>, LayoutError> {
    let font_context = font_context_for(document)?;
    Ok(LayoutEngine::new().layout(document, &font_context))
}

/// Lay out a document described as JSON and return its fragment tree as
/// JSON, one root fragment per fragmentainer.
pub fn layout_json(json: &str) -> Result<String, LayoutError> {
    let document: Document = serde_json::from_str(json)?;
    let fragments = layout(&document)?;
    serde_json::to_string_pretty(&fragments).map_err(LayoutError::Serialize)
}

/// A font context with the document's custom fonts registered.
pub fn font_context_for(document: &Document) -> Result<FontContext, LayoutError> {
    let mut font_context = FontContext::new();
    for entry in &document.fonts {
        let data = entry.decode()?;
        font_context
            .registry_mut()
            .register(&entry.family, entry.weight, entry.italic, data)?;
    }
    Ok(font_context)
}
