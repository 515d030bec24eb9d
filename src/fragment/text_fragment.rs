use std::sync::Arc;

use serde::Serialize;

use super::FragmentBase;
use crate::geometry::PhysicalSize;
use crate::layout_object::LayoutObjectId;
use crate::text::ShapeResult;

/// A shaped run of text on one line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalTextFragment {
    #[serde(flatten)]
    pub(super) base: FragmentBase,
    text: String,
    start_offset: usize,
    end_offset: usize,
    shape_result: Arc<ShapeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hyphen: Option<ShapeResult>,
}

impl PhysicalTextFragment {
    /// `text` is the content of `shape_result`'s range; `hyphen` is drawn
    /// after it when the line was hyphenated.
    pub fn new(
        layout_object: LayoutObjectId,
        size: PhysicalSize,
        text: String,
        shape_result: Arc<ShapeResult>,
        hyphen: Option<ShapeResult>,
    ) -> Self {
        Self {
            base: FragmentBase::new(layout_object, size, None),
            start_offset: shape_result.start_offset(),
            end_offset: shape_result.end_offset(),
            text,
            shape_result,
            hyphen,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Char offset of the run in its paragraph.
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn shape_result(&self) -> &ShapeResult {
        &self.shape_result
    }

    pub fn hyphen(&self) -> Option<&ShapeResult> {
        self.hyphen.as_ref()
    }

    pub fn is_hyphenated(&self) -> bool {
        self.hyphen.is_some()
    }
}
