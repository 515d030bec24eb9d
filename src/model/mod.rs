//! # Document Model
//!
//! The input representation for layout. A document is a tree of nodes, each
//! with a kind, style properties, and children, laid out into a sequence of
//! equally sized fragmentainers (pages or columns).
//!
//! Block nodes stack vertically; text nodes hold one paragraph each and are
//! broken into lines. A block with `float` set is taken out of the flow and
//! recorded as a positioned float of its parent.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::style::Style;

/// A complete document ready for layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The top-level nodes, laid out in order.
    pub children: Vec<Node>,

    /// Size of every fragmentainer the content flows into.
    #[serde(default)]
    pub fragmentainer: FragmentainerConfig,

    /// Custom fonts to register before layout.
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

/// Dimensions of a page or column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentainerConfig {
    /// Inline size in points.
    pub width: f64,
    /// Block size in points. Without one, everything lands in a single
    /// fragmentainer of unbounded height.
    #[serde(default)]
    pub height: Option<f64>,
}

impl Default for FragmentainerConfig {
    fn default() -> Self {
        // A4 portrait.
        Self {
            width: 595.28,
            height: Some(841.89),
        }
    }
}

/// A custom font to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter", "Roboto").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
    /// Font weight (100-900). Defaults to 400.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Whether this is an italic variant.
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u32 {
    400
}

impl FontEntry {
    /// Decode the font bytes from `src`.
    pub fn decode(&self) -> Result<Vec<u8>, LayoutError> {
        use base64::Engine;

        let encoded = match self.src.strip_prefix("data:") {
            Some(uri) => {
                let comma = uri.find(',').ok_or_else(|| {
                    LayoutError::Font(format!(
                        "invalid data URI for '{}': missing comma",
                        self.family
                    ))
                })?;
                &uri[comma + 1..]
            }
            None => self.src.as_str(),
        };
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| LayoutError::Font(format!("base64 decode error for '{}': {e}", self.family)))
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// What kind of node this is.
    pub kind: NodeKind,

    /// Style properties for this node.
    #[serde(default)]
    pub style: Style,

    /// Child nodes. Text nodes ignore theirs.
    #[serde(default)]
    pub children: Vec<Node>,

    /// A unique identifier for this node (optional, useful for debugging).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The different kinds of nodes in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// A block container, analogous to a `<div>`.
    Block,

    /// A paragraph of text.
    Text { content: String },
}

impl Node {
    pub fn block(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Block,
            style: Style::default(),
            children,
            id: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text {
                content: content.into(),
            },
            style: Style::default(),
            children: Vec::new(),
            id: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let json = r#"{
            "fragmentainer": { "width": 200 },
            "children": [
                { "kind": { "type": "Text", "content": "Hello" } },
                { "kind": { "type": "Block" }, "style": { "margin": { "top": 4, "right": 0, "bottom": 4, "left": 0 } } }
            ]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.fragmentainer.width, 200.0);
        assert!(doc.fragmentainer.height.is_none());
        assert_eq!(doc.children.len(), 2);
        assert!(matches!(
            &doc.children[0].kind,
            NodeKind::Text { content } if content == "Hello"
        ));
        assert!(doc.fonts.is_empty());
    }

    #[test]
    fn test_default_fragmentainer_is_a4() {
        let doc: Document = serde_json::from_str(r#"{ "children": [] }"#).unwrap();
        assert!((doc.fragmentainer.width - 595.28).abs() < 1e-9);
        assert_eq!(doc.fragmentainer.height, Some(841.89));
    }

    #[test]
    fn test_font_entry_decode() {
        let entry = FontEntry {
            family: "Test".to_string(),
            src: "data:font/ttf;base64,AAEC".to_string(),
            weight: 400,
            italic: false,
        };
        assert_eq!(entry.decode().unwrap(), vec![0, 1, 2]);

        let raw = FontEntry {
            src: "AAEC".to_string(),
            ..entry.clone()
        };
        assert_eq!(raw.decode().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_font_entry_decode_errors() {
        let entry = FontEntry {
            family: "Broken".to_string(),
            src: "data:font/ttf;base64".to_string(),
            weight: 400,
            italic: false,
        };
        assert!(matches!(entry.decode(), Err(LayoutError::Font(_))));

        let entry = FontEntry {
            src: "not base64!".to_string(),
            ..entry
        };
        assert!(matches!(entry.decode(), Err(LayoutError::Font(_))));
    }
}
