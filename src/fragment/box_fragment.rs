use std::sync::Arc;

use serde::Serialize;

use super::{teardown_contents, FloatingObject, FragmentBase, PhysicalFragment};
use crate::geometry::{LogicalOffset, MarginStrut, PhysicalSize};

/// A block container: in-flow children plus the floats anchored to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalBoxFragment {
    #[serde(flatten)]
    pub(super) base: FragmentBase,
    overflow: PhysicalSize,
    pub(super) children: Vec<Arc<PhysicalFragment>>,
    pub(super) positioned_floats: Vec<Arc<FloatingObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bfc_offset: Option<LogicalOffset>,
    end_margin_strut: MarginStrut,
}

impl PhysicalBoxFragment {
    /// Takes ownership of the complete child and float lists; a box
    /// fragment is never built up incrementally.
    pub fn new(
        base: FragmentBase,
        overflow: PhysicalSize,
        children: Vec<Arc<PhysicalFragment>>,
        positioned_floats: Vec<Arc<FloatingObject>>,
        bfc_offset: Option<LogicalOffset>,
        end_margin_strut: MarginStrut,
    ) -> Self {
        debug_assert!(children.iter().all(|child| child.is_placed()));
        Self {
            base,
            overflow,
            children,
            positioned_floats,
            bfc_offset,
            end_margin_strut,
        }
    }

    /// Size of the area covered by the children, at least the box size.
    pub fn overflow(&self) -> PhysicalSize {
        self.overflow
    }

    pub fn children(&self) -> &[Arc<PhysicalFragment>] {
        &self.children
    }

    pub fn positioned_floats(&self) -> &[Arc<FloatingObject>] {
        &self.positioned_floats
    }

    pub fn bfc_offset(&self) -> Option<LogicalOffset> {
        self.bfc_offset
    }

    /// Trailing margins not yet collapsed, for the next sibling.
    pub fn end_margin_strut(&self) -> MarginStrut {
        self.end_margin_strut
    }
}

impl Drop for PhysicalBoxFragment {
    fn drop(&mut self) {
        teardown_contents(&mut self.children, &mut self.positioned_floats);
    }
}
