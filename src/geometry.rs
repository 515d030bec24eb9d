//! # Geometry
//!
//! Sizes, offsets and struts used by the fragment tree. All lengths are in
//! points. Physical values are in the coordinate space of the page (x grows
//! right, y grows down); logical values are relative to a block formatting
//! context and assume a horizontal writing mode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: f64,
    pub height: f64,
}

impl PhysicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The smallest size containing both `self` and `other`.
    pub fn union(&self, other: &PhysicalSize) -> PhysicalSize {
        PhysicalSize {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

impl fmt::Display for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Position of a fragment relative to its parent's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalOffset {
    pub left: f64,
    pub top: f64,
}

impl PhysicalOffset {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

impl fmt::Display for PhysicalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.left, self.top)
    }
}

/// Offset within a block formatting context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalOffset {
    pub inline_offset: f64,
    pub block_offset: f64,
}

impl LogicalOffset {
    pub fn new(inline_offset: f64, block_offset: f64) -> Self {
        Self {
            inline_offset,
            block_offset,
        }
    }

    pub fn to_physical(self) -> PhysicalOffset {
        PhysicalOffset::new(self.inline_offset, self.block_offset)
    }
}

impl std::ops::Add for LogicalOffset {
    type Output = LogicalOffset;

    fn add(self, rhs: LogicalOffset) -> LogicalOffset {
        LogicalOffset::new(
            self.inline_offset + rhs.inline_offset,
            self.block_offset + rhs.block_offset,
        )
    }
}

/// Four edge values (margins, padding, borders).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxStrut {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl BoxStrut {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn with_top(mut self, top: f64) -> Self {
        self.top = top;
        self
    }

    pub fn with_bottom(mut self, bottom: f64) -> Self {
        self.bottom = bottom;
        self
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Adjoining vertical margins that have not been resolved yet.
///
/// Positive and negative margins are tracked separately: the collapsed
/// margin is the largest positive margin plus the most negative one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginStrut {
    pub positive_margin: f64,
    pub negative_margin: f64,
}

impl MarginStrut {
    pub fn append(&mut self, margin: f64) {
        if margin < 0.0 {
            self.negative_margin = self.negative_margin.min(margin);
        } else {
            self.positive_margin = self.positive_margin.max(margin);
        }
    }

    pub fn with(mut self, margin: f64) -> Self {
        self.append(margin);
        self
    }

    pub fn sum(&self) -> f64 {
        self.positive_margin + self.negative_margin
    }

    pub fn is_empty(&self) -> bool {
        self.positive_margin == 0.0 && self.negative_margin == 0.0
    }
}
