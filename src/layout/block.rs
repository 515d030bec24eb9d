//! # Block Layout
//!
//! Stacks the children of a block container top to bottom.
//!
//! Vertical margins between siblings collapse through a [`MarginStrut`]. A
//! box without bottom padding hands its last child's margins out through its
//! end margin strut, so they collapse with whatever follows the box.
//!
//! Floats are taken out of the flow and recorded as positioned floats of
//! their parent. Floats sharing a block offset line up along their edge; one
//! that does not fit beside them drops below. They do not shorten lines.
//!
//! When the fragmentainer runs out, the box ends with a [`BreakToken::Block`]
//! naming the child to resume at.

use super::{layout_child, ConstraintSpace, LayoutContext};
use crate::fragment::{BreakToken, FragmentBuilder, PhysicalFragment};
use crate::geometry::{LogicalOffset, MarginStrut, PhysicalSize};
use crate::layout_object::{LayoutObjectId, LayoutObjectKind};
use crate::style::FloatType;

pub struct BlockLayoutAlgorithm<'a> {
    context: &'a LayoutContext<'a>,
    layout_object: LayoutObjectId,
    space: &'a ConstraintSpace,
    break_token: Option<&'a BreakToken>,
}

impl<'a> BlockLayoutAlgorithm<'a> {
    pub fn new(
        context: &'a LayoutContext<'a>,
        layout_object: LayoutObjectId,
        space: &'a ConstraintSpace,
        break_token: Option<&'a BreakToken>,
    ) -> Self {
        Self {
            context,
            layout_object,
            space,
            break_token,
        }
    }

    /// Lay out the container and as many children as fit.
    ///
    /// Returns `None` if nothing fits and the box is not at the start of the
    /// fragmentainer, so the caller can push it to the next one.
    pub fn layout(&self) -> Option<PhysicalFragment> {
        let tree = self.context.tree;
        let object = tree.get(self.layout_object);
        let style = &object.style;

        let (start_index, mut resume_token, consumed_block_size) = match self.break_token {
            None => (0, None, 0.0),
            Some(BreakToken::Block {
                layout_object,
                child_index,
                child_break_token,
                consumed_block_size,
            }) => {
                assert_eq!(
                    *layout_object, self.layout_object,
                    "break token belongs to another layout object"
                );
                (*child_index, child_break_token.clone(), *consumed_block_size)
            }
            Some(token) => panic!("block layout cannot resume from {token:?}"),
        };
        let is_resumed = self.break_token.is_some();

        if let Some(limit) = self.space.fragmentainer_block_size {
            if limit <= 0.0 && !self.space.is_new_fragmentainer {
                return None;
            }
        }

        let content_width = tree.content_width(self.layout_object, self.space.available_inline_size);
        let padding = style.padding;
        let mut builder = FragmentBuilder::new(self.layout_object);
        let mut floats = FloatPlacer::new(content_width);
        let mut block_offset = if is_resumed { 0.0 } else { padding.top };
        let mut strut = MarginStrut::default();
        let mut placed = 0usize;
        let mut outgoing = None;

        for (index, &child) in tree.children(self.layout_object).iter().enumerate().skip(start_index) {
            let incoming = if index == start_index {
                resume_token.take()
            } else {
                None
            };
            let child_style = tree.style(child);

            if let Some(float_type) = child_style.float {
                self.place_float(&mut builder, &mut floats, child, float_type, block_offset + strut.sum());
                continue;
            }

            let margin = child_style.margin;
            // A resumed child already had its top margin applied.
            if incoming.is_none() {
                strut.append(margin.top);
            }
            let child_top = block_offset + strut.sum();
            let inline_offset = padding.left + margin.left;
            let child_space = ConstraintSpace {
                available_inline_size: content_width,
                fragmentainer_block_size: self.space.fragmentainer_block_size.map(|limit| limit - child_top),
                bfc_offset: self.space.bfc_offset + LogicalOffset::new(inline_offset, child_top),
                is_new_fragmentainer: self.space.is_new_fragmentainer && placed == 0,
            };

            let Some(fragment) = layout_child(self.context, child, &child_space, incoming.as_deref())
            else {
                if placed == 0 && !self.space.is_new_fragmentainer {
                    return None;
                }
                outgoing = Some(BreakToken::Block {
                    layout_object: self.layout_object,
                    child_index: index,
                    child_break_token: None,
                    consumed_block_size: consumed_block_size + block_offset,
                });
                break;
            };

            let child_break = fragment.break_token().cloned();
            let end_strut = fragment
                .as_box()
                .map(|box_fragment| box_fragment.end_margin_strut())
                .unwrap_or_default();
            let height = fragment.size().height;
            builder.add_child(fragment, LogicalOffset::new(inline_offset, child_top));
            placed += 1;
            block_offset = child_top + height;

            if let Some(token) = child_break {
                outgoing = Some(BreakToken::Block {
                    layout_object: self.layout_object,
                    child_index: index,
                    child_break_token: Some(token),
                    consumed_block_size: consumed_block_size + block_offset,
                });
                break;
            }
            strut = end_strut.with(margin.bottom);
        }

        let mut end_margin_strut = MarginStrut::default();
        if outgoing.is_none() {
            let is_root = object.kind == LayoutObjectKind::Root;
            if padding.bottom > 0.0 || is_root {
                block_offset += strut.sum() + padding.bottom;
            } else {
                end_margin_strut = strut;
            }
            if is_root {
                // The root establishes the formatting context, so it grows
                // to contain its floats.
                block_offset = block_offset.max(floats.bottom());
            }
        }

        if let Some(token) = &outgoing {
            log::debug!(
                "block {:?} breaks with token depth {}",
                self.layout_object,
                token.depth()
            );
            builder.set_break_token(token.clone());
        }
        builder
            .set_inline_size(content_width + padding.horizontal())
            .set_block_size(block_offset)
            .set_bfc_offset(self.space.bfc_offset)
            .set_end_margin_strut(end_margin_strut);
        Some(builder.to_box_fragment())
    }

    fn place_float(
        &self,
        builder: &mut FragmentBuilder,
        floats: &mut FloatPlacer,
        child: LayoutObjectId,
        float_type: FloatType,
        block_offset: f64,
    ) {
        let padding = self.context.tree.style(self.layout_object).padding;
        let margin = self.context.tree.style(child).margin;
        // Floats are monolithic and establish their own formatting context.
        let float_space = ConstraintSpace {
            available_inline_size: floats.available,
            fragmentainer_block_size: None,
            bfc_offset: LogicalOffset::default(),
            is_new_fragmentainer: false,
        };
        let Some(fragment) = layout_child(self.context, child, &float_space, None) else {
            return;
        };
        let margin_box = PhysicalSize::new(
            fragment.size().width + margin.horizontal(),
            fragment.size().height + margin.vertical(),
        );
        let origin = floats.place(float_type, margin_box, block_offset);
        let offset = LogicalOffset::new(
            padding.left + origin.inline_offset + margin.left,
            origin.block_offset + margin.top,
        );
        let bfc_offset =
            self.space.bfc_offset + LogicalOffset::new(padding.left + origin.inline_offset, origin.block_offset);
        log::trace!("float {child:?} placed at {offset:?}");
        builder.add_floating_object(fragment, float_type, margin, offset, bfc_offset);
    }
}

/// Positions float margin boxes along the edges of a content box.
#[derive(Debug)]
struct FloatPlacer {
    available: f64,
    row_top: f64,
    row_bottom: f64,
    left_edge: f64,
    right_edge: f64,
    bottom: f64,
}

impl FloatPlacer {
    fn new(available: f64) -> Self {
        Self {
            available,
            row_top: 0.0,
            row_bottom: 0.0,
            left_edge: 0.0,
            right_edge: 0.0,
            bottom: 0.0,
        }
    }

    /// Where the margin box of a new float goes. A float is never placed
    /// above an earlier one.
    fn place(&mut self, float_type: FloatType, size: PhysicalSize, block_offset: f64) -> LogicalOffset {
        if block_offset > self.row_top {
            self.start_row(block_offset);
        }
        let occupied = self.left_edge + self.right_edge;
        if occupied > 0.0 && occupied + size.width > self.available {
            self.start_row(self.row_bottom);
        }

        let inline_offset = match float_type {
            FloatType::Left => {
                let offset = self.left_edge;
                self.left_edge += size.width;
                offset
            }
            FloatType::Right => {
                self.right_edge += size.width;
                self.available - self.right_edge
            }
        };
        self.row_bottom = self.row_bottom.max(self.row_top + size.height);
        self.bottom = self.bottom.max(self.row_bottom);
        LogicalOffset::new(inline_offset, self.row_top)
    }

    fn start_row(&mut self, top: f64) {
        self.row_top = top;
        self.row_bottom = self.row_bottom.max(top);
        self.left_edge = 0.0;
        self.right_edge = 0.0;
    }

    fn bottom(&self) -> f64 {
        self.bottom
    }
}
