use std::sync::Arc;

use serde::Serialize;

use super::{teardown_contents, FragmentBase, PhysicalFragment};
use crate::geometry::PhysicalSize;
use crate::layout_object::LayoutObjectId;

/// Ascent and descent of a line box around its baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LineHeightMetrics {
    pub ascent: f64,
    pub descent: f64,
}

impl LineHeightMetrics {
    pub fn new(ascent: f64, descent: f64) -> Self {
        Self { ascent, descent }
    }

    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// One line of a paragraph.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLineBoxFragment {
    #[serde(flatten)]
    pub(super) base: FragmentBase,
    pub(super) children: Vec<Arc<PhysicalFragment>>,
    metrics: LineHeightMetrics,
}

impl PhysicalLineBoxFragment {
    pub fn new(
        layout_object: LayoutObjectId,
        size: PhysicalSize,
        children: Vec<Arc<PhysicalFragment>>,
        metrics: LineHeightMetrics,
    ) -> Self {
        Self {
            base: FragmentBase::new(layout_object, size, None),
            children,
            metrics,
        }
    }

    pub fn children(&self) -> &[Arc<PhysicalFragment>] {
        &self.children
    }

    pub fn metrics(&self) -> LineHeightMetrics {
        self.metrics
    }

    /// Distance from the top of the line box to the baseline.
    pub fn baseline(&self) -> f64 {
        self.metrics.ascent
    }
}

impl Drop for PhysicalLineBoxFragment {
    fn drop(&mut self) {
        teardown_contents(&mut self.children, &mut Vec::new());
    }
}
