use std::mem;
use std::sync::Arc;

use super::{BreakToken, FloatingObject, FragmentBase, PhysicalBoxFragment, PhysicalFragment};
use crate::geometry::{BoxStrut, LogicalOffset, MarginStrut, PhysicalSize};
use crate::layout_object::LayoutObjectId;
use crate::style::FloatType;

/// Collects the children of a box fragment while its layout runs.
///
/// Children are placed as they are added. [`to_box_fragment`] moves the
/// collected lists into the new fragment and leaves the builder's own lists
/// empty, so nothing added afterwards can reach a finished fragment.
///
/// [`to_box_fragment`]: FragmentBuilder::to_box_fragment
#[derive(Debug)]
pub struct FragmentBuilder {
    layout_object: LayoutObjectId,
    size: PhysicalSize,
    overflow: PhysicalSize,
    children: Vec<Arc<PhysicalFragment>>,
    positioned_floats: Vec<Arc<FloatingObject>>,
    bfc_offset: Option<LogicalOffset>,
    end_margin_strut: MarginStrut,
    break_token: Option<Arc<BreakToken>>,
}

impl FragmentBuilder {
    pub fn new(layout_object: LayoutObjectId) -> Self {
        Self {
            layout_object,
            size: PhysicalSize::default(),
            overflow: PhysicalSize::default(),
            children: Vec::new(),
            positioned_floats: Vec::new(),
            bfc_offset: None,
            end_margin_strut: MarginStrut::default(),
            break_token: None,
        }
    }

    pub fn set_inline_size(&mut self, inline_size: f64) -> &mut Self {
        self.size.width = inline_size;
        self
    }

    pub fn set_block_size(&mut self, block_size: f64) -> &mut Self {
        self.size.height = block_size;
        self
    }

    pub fn set_bfc_offset(&mut self, bfc_offset: LogicalOffset) -> &mut Self {
        self.bfc_offset = Some(bfc_offset);
        self
    }

    pub fn set_end_margin_strut(&mut self, strut: MarginStrut) -> &mut Self {
        self.end_margin_strut = strut;
        self
    }

    pub fn set_break_token(&mut self, token: BreakToken) -> &mut Self {
        self.break_token = Some(Arc::new(token));
        self
    }

    /// Place `fragment` at `offset` within this box and take ownership of it.
    pub fn add_child(&mut self, mut fragment: PhysicalFragment, offset: LogicalOffset) -> &mut Self {
        let physical = offset.to_physical();
        fragment.place(physical);
        self.include_overflow(physical.left, physical.top, fragment.size());
        self.children.push(Arc::new(fragment));
        self
    }

    /// Place a float's box at `offset` within this box and record it.
    pub fn add_floating_object(
        &mut self,
        mut fragment: PhysicalFragment,
        float_type: FloatType,
        margins: BoxStrut,
        offset: LogicalOffset,
        bfc_offset: LogicalOffset,
    ) -> &mut Self {
        let physical = offset.to_physical();
        fragment.place(physical);
        self.include_overflow(physical.left, physical.top, fragment.size());
        self.positioned_floats.push(Arc::new(FloatingObject::new(
            Arc::new(fragment),
            float_type,
            margins,
            bfc_offset,
        )));
        self
    }

    pub fn children(&self) -> &[Arc<PhysicalFragment>] {
        &self.children
    }

    pub fn positioned_floats(&self) -> &[Arc<FloatingObject>] {
        &self.positioned_floats
    }

    fn include_overflow(&mut self, left: f64, top: f64, size: PhysicalSize) {
        self.overflow = self
            .overflow
            .union(&PhysicalSize::new(left + size.width, top + size.height));
    }

    /// Build the box fragment, moving the collected children into it.
    pub fn to_box_fragment(&mut self) -> PhysicalFragment {
        let overflow = self.overflow.union(&self.size);
        let fragment = PhysicalBoxFragment::new(
            FragmentBase::new(self.layout_object, self.size, self.break_token.take()),
            overflow,
            mem::take(&mut self.children),
            mem::take(&mut self.positioned_floats),
            self.bfc_offset,
            self.end_margin_strut,
        );
        self.overflow = PhysicalSize::default();
        PhysicalFragment::Box(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{LineHeightMetrics, PhysicalLineBoxFragment};
    use crate::layout_object::LayoutTree;

    fn line(width: f64) -> PhysicalFragment {
        let tree = LayoutTree::new(100.0);
        PhysicalFragment::LineBox(PhysicalLineBoxFragment::new(
            tree.root(),
            PhysicalSize::new(width, 10.0),
            Vec::new(),
            LineHeightMetrics::new(8.0, 2.0),
        ))
    }

    fn float_box() -> PhysicalFragment {
        let tree = LayoutTree::new(100.0);
        FragmentBuilder::new(tree.root())
            .set_inline_size(20.0)
            .set_block_size(20.0)
            .to_box_fragment()
    }

    #[test]
    fn test_children_are_placed() {
        let tree = LayoutTree::new(100.0);
        let mut builder = FragmentBuilder::new(tree.root());
        builder.add_child(line(50.0), LogicalOffset::new(0.0, 10.0));
        let fragment = builder.set_inline_size(100.0).set_block_size(20.0).to_box_fragment();
        let child = &fragment.children()[0];
        assert!(child.is_placed());
        assert_eq!(child.offset().map(|o| o.top), Some(10.0));
    }

    #[test]
    fn test_builder_is_emptied_by_construction() {
        let tree = LayoutTree::new(100.0);
        let mut builder = FragmentBuilder::new(tree.root());
        builder
            .add_child(line(50.0), LogicalOffset::new(0.0, 0.0))
            .add_child(line(60.0), LogicalOffset::new(0.0, 10.0))
            .add_floating_object(
                float_box(),
                FloatType::Left,
                BoxStrut::default(),
                LogicalOffset::default(),
                LogicalOffset::default(),
            );
        let fragment = builder.to_box_fragment();

        assert!(builder.children().is_empty());
        assert!(builder.positioned_floats().is_empty());

        // Adding to the builder again does not reach the finished fragment.
        builder.add_child(line(70.0), LogicalOffset::new(0.0, 20.0));
        let box_fragment = fragment.as_box().unwrap();
        assert_eq!(box_fragment.children().len(), 2);
        assert_eq!(box_fragment.positioned_floats().len(), 1);
        assert_eq!(box_fragment.children()[1].size().width, 60.0);
    }

    #[test]
    fn test_overflow_covers_children() {
        let tree = LayoutTree::new(100.0);
        let mut builder = FragmentBuilder::new(tree.root());
        builder
            .set_inline_size(100.0)
            .set_block_size(15.0)
            .add_child(line(140.0), LogicalOffset::new(0.0, 10.0));
        let fragment = builder.to_box_fragment();
        let overflow = fragment.as_box().unwrap().overflow();
        assert_eq!(overflow, PhysicalSize::new(140.0, 20.0));
        assert_eq!(fragment.size(), PhysicalSize::new(100.0, 15.0));
    }

    #[test]
    fn test_break_token_moves_to_fragment() {
        let tree = LayoutTree::new(100.0);
        let mut builder = FragmentBuilder::new(tree.root());
        builder.set_break_token(BreakToken::Inline {
            layout_object: tree.root(),
            text_offset: 12,
        });
        let fragment = builder.to_box_fragment();
        assert!(matches!(
            fragment.break_token().map(|t| t.as_ref()),
            Some(BreakToken::Inline { text_offset: 12, .. })
        ));
        assert!(builder.to_box_fragment().break_token().is_none());
    }
}
