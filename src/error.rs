//! Structured error types for the layout pipeline.
//!
//! Only the outer surface (document parsing, font registration, fragment
//! serialization) has recoverable errors. Line breaking and fragment
//! construction operate on pre-validated data and treat bad input as a bug.

use thiserror::Error;

/// The unified error type returned by the public entry points.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// JSON input failed to parse as a valid document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// A font could not be decoded or parsed.
    #[error("Font error: {0}")]
    Font(String),
    /// The fragment tree could not be serialized.
    #[error("Failed to serialize fragment tree: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::Parse { source: e, hint }
    }
}
