use std::sync::Arc;

use serde::Serialize;

use super::PhysicalFragment;
use crate::geometry::{BoxStrut, LogicalOffset};
use crate::style::FloatType;

/// A float positioned inside its parent's block formatting context.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatingObject {
    /// The float's own box fragment, placed relative to the parent.
    pub fragment: Arc<PhysicalFragment>,
    pub float_type: FloatType,
    pub margins: BoxStrut,
    /// Margin-box position within the formatting context.
    pub bfc_offset: LogicalOffset,
}

impl FloatingObject {
    pub fn new(
        fragment: Arc<PhysicalFragment>,
        float_type: FloatType,
        margins: BoxStrut,
        bfc_offset: LogicalOffset,
    ) -> Self {
        Self {
            fragment,
            float_type,
            margins,
            bfc_offset,
        }
    }
}
