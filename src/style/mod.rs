//! # Style System
//!
//! A CSS-like style model for layout objects. Only the properties that feed
//! block stacking and line breaking are modelled: box edges, width, floats,
//! typography, and the text properties that change break opportunities.
//!
//! Input styles (`Style`) have every property optional. `Style::resolve`
//! cascades them against the parent's `ResolvedStyle`, inheriting text
//! properties and defaulting everything else.

use serde::{Deserialize, Serialize};

use crate::geometry::BoxStrut;
use crate::text::break_iterator::LineBreakType;

/// The complete set of style properties for a node, as written in the input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    // ── Box Model ──────────────────────────────────────────────
    /// Explicit width.
    pub width: Option<Dimension>,
    /// Padding inside the box.
    #[serde(default)]
    pub padding: Option<BoxStrut>,
    /// Margin outside the box. Vertical margins collapse.
    #[serde(default)]
    pub margin: Option<BoxStrut>,
    /// Takes the box out of flow and anchors it to the parent's edge.
    pub float: Option<FloatType>,

    // ── Typography ─────────────────────────────────────────────
    /// Font family name.
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
    /// Font weight (100-900).
    pub font_weight: Option<u32>,
    /// Font style.
    pub font_style: Option<FontStyle>,
    /// Line height as a multiplier of font size.
    pub line_height: Option<f64>,
    /// Letter spacing in points.
    pub letter_spacing: Option<f64>,
    /// Whether the shaper may form ligatures.
    pub font_variant_ligatures: Option<FontVariantLigatures>,

    // ── Line Breaking ──────────────────────────────────────────
    /// CSS `word-break`.
    pub word_break: Option<LineBreakType>,
    /// CSS `hyphens`.
    pub hyphens: Option<Hyphens>,
    /// BCP 47 language tag; selects hyphenation patterns.
    pub lang: Option<String>,
}

/// A dimension that can be points, percentage, or auto.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Dimension {
    /// Fixed size in points (1/72 inch).
    Pt(f64),
    /// Percentage of the containing block's width.
    Percent(f64),
    /// Size determined by the containing block.
    Auto,
}

impl Dimension {
    /// Resolve this dimension given a parent size. Returns None for Auto.
    pub fn resolve(&self, parent_size: f64) -> Option<f64> {
        match self {
            Dimension::Pt(v) => Some(*v),
            Dimension::Percent(p) => Some(parent_size * p / 100.0),
            Dimension::Auto => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::Oblique)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontVariantLigatures {
    #[default]
    Normal,
    None,
}

/// CSS `hyphens`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hyphens {
    /// Never hyphenate, soft hyphens included.
    None,
    /// Break at soft hyphens (U+00AD) only.
    #[default]
    Manual,
    /// Break at soft hyphens and dictionary syllable boundaries.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatType {
    Left,
    Right,
}

/// Resolved style: all values are concrete.
/// This is what layout and the line breaker work with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    // Box model
    pub width: Option<f64>,
    pub padding: BoxStrut,
    pub margin: BoxStrut,
    pub float: Option<FloatType>,

    // Text
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u32,
    pub font_style: FontStyle,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub font_variant_ligatures: FontVariantLigatures,
    pub word_break: LineBreakType,
    pub hyphens: Hyphens,
    pub lang: Option<String>,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Style::default().resolve(None, 0.0)
    }
}

impl ResolvedStyle {
    /// Height of one line box in points.
    pub fn computed_line_height(&self) -> f64 {
        self.font_size * self.line_height
    }
}

impl Style {
    /// Resolve this style against a parent's resolved style and the
    /// containing block's width.
    pub fn resolve(&self, parent: Option<&ResolvedStyle>, available_width: f64) -> ResolvedStyle {
        let parent_font_family = parent
            .map(|p| p.font_family.clone())
            .unwrap_or_else(|| "Helvetica".to_string());

        ResolvedStyle {
            width: self.width.and_then(|d| d.resolve(available_width)),
            padding: self.padding.unwrap_or_default(),
            margin: self.margin.unwrap_or_default(),
            float: self.float,

            font_family: self.font_family.clone().unwrap_or(parent_font_family),
            font_size: self
                .font_size
                .unwrap_or(parent.map(|p| p.font_size).unwrap_or(12.0)),
            font_weight: self
                .font_weight
                .unwrap_or(parent.map(|p| p.font_weight).unwrap_or(400)),
            font_style: self
                .font_style
                .unwrap_or(parent.map(|p| p.font_style).unwrap_or_default()),
            line_height: self
                .line_height
                .unwrap_or(parent.map(|p| p.line_height).unwrap_or(1.4)),
            letter_spacing: self
                .letter_spacing
                .unwrap_or(parent.map(|p| p.letter_spacing).unwrap_or(0.0)),
            font_variant_ligatures: self
                .font_variant_ligatures
                .unwrap_or(parent.map(|p| p.font_variant_ligatures).unwrap_or_default()),
            word_break: self
                .word_break
                .unwrap_or(parent.map(|p| p.word_break).unwrap_or_default()),
            hyphens: self
                .hyphens
                .unwrap_or(parent.map(|p| p.hyphens).unwrap_or_default()),
            lang: self
                .lang
                .clone()
                .or_else(|| parent.and_then(|p| p.lang.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = ResolvedStyle::default();
        assert_eq!(style.font_family, "Helvetica");
        assert_eq!(style.font_size, 12.0);
        assert_eq!(style.hyphens, Hyphens::Manual);
        assert_eq!(style.word_break, LineBreakType::Normal);
        assert!(style.lang.is_none());
    }

    #[test]
    fn test_text_properties_inherit() {
        let parent = Style {
            font_size: Some(20.0),
            lang: Some("de".to_string()),
            hyphens: Some(Hyphens::Auto),
            margin: Some(BoxStrut::uniform(10.0)),
            ..Default::default()
        }
        .resolve(None, 500.0);
        let child = Style::default().resolve(Some(&parent), 500.0);
        assert_eq!(child.font_size, 20.0);
        assert_eq!(child.lang.as_deref(), Some("de"));
        assert_eq!(child.hyphens, Hyphens::Auto);
        // Box properties don't inherit
        assert_eq!(child.margin, BoxStrut::default());
    }

    #[test]
    fn test_percent_width() {
        let style = Style {
            width: Some(Dimension::Percent(50.0)),
            ..Default::default()
        }
        .resolve(None, 300.0);
        assert_eq!(style.width, Some(150.0));
    }

    #[test]
    fn test_line_height() {
        let style = Style {
            font_size: Some(10.0),
            line_height: Some(1.5),
            ..Default::default()
        }
        .resolve(None, 0.0);
        assert!((style.computed_line_height() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let style: Style = serde_json::from_str(
            r#"{ "fontSize": 9, "wordBreak": "KeepAll", "hyphens": "Auto", "float": "Left" }"#,
        )
        .unwrap();
        assert_eq!(style.font_size, Some(9.0));
        assert_eq!(style.word_break, Some(LineBreakType::KeepAll));
        assert_eq!(style.hyphens, Some(Hyphens::Auto));
        assert_eq!(style.float, Some(FloatType::Left));
    }
}
