//! # Inline Layout
//!
//! Lays out one paragraph: shapes it once, then asks the line breaker for
//! one line at a time and stacks the lines until the text or the
//! fragmentainer runs out.

use std::sync::Arc;

use super::{ConstraintSpace, LayoutContext};
use crate::fragment::{
    BreakToken, FragmentBuilder, LineHeightMetrics, PhysicalFragment, PhysicalLineBoxFragment,
    PhysicalTextFragment,
};
use crate::geometry::{LogicalOffset, PhysicalSize};
use crate::layout_object::{LayoutObjectId, LayoutObjectKind};
use crate::text::{ShapedLine, ShapingLineBreaker};

/// Spaces left over at a break hang off the previous line and are never
/// the start of the next one.
fn is_collapsible_space(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

pub struct InlineLayoutAlgorithm<'a> {
    context: &'a LayoutContext<'a>,
    layout_object: LayoutObjectId,
    space: &'a ConstraintSpace,
    break_token: Option<&'a BreakToken>,
}

impl<'a> InlineLayoutAlgorithm<'a> {
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

    /// Lay out the paragraph into a box fragment holding its line boxes.
    ///
    /// Returns `None` when not even the first line fits below the
    /// fragmentainer's remaining space and the paragraph is not at the start
    /// of the fragmentainer; the caller then breaks before it.
    pub fn layout(&self) -> Option<PhysicalFragment> {
        let tree = self.context.tree;
        let object = tree.get(self.layout_object);
        let LayoutObjectKind::Text { content } = &object.kind else {
            panic!("inline layout requires a text object, got {:?}", object.kind);
        };
        let style = &object.style;

        let start_offset = match self.break_token {
            None => 0,
            Some(BreakToken::Inline {
                layout_object,
                text_offset,
            }) => {
                assert_eq!(
                    *layout_object, self.layout_object,
                    "break token belongs to another layout object"
                );
                *text_offset
            }
            Some(token) => panic!("inline layout cannot resume from {token:?}"),
        };
        let is_resumed = self.break_token.is_some();

        let content_width = tree.content_width(self.layout_object, self.space.available_inline_size);
        let padding = style.padding;
        let chars: Vec<char> = content.chars().collect();

        let font = self.context.font_context.font_for_style(style);
        let paragraph = self.context.shaper.shape(&font, content, 0);
        let breaker = ShapingLineBreaker::new(
            self.context.shaper,
            &font,
            &paragraph,
            content,
            style.lang.as_deref(),
            style.word_break,
        )
        .with_hyphens(style.hyphens);

        let line_height = style.computed_line_height();
        let half_leading = (line_height - font.ascent() - font.descent()) / 2.0;
        let metrics = LineHeightMetrics::new(font.ascent() + half_leading, font.descent() + half_leading);

        let mut builder = FragmentBuilder::new(self.layout_object);
        let mut offset = skip_spaces(&chars, start_offset);
        let mut block_offset = if is_resumed { 0.0 } else { padding.top };
        let mut lines = 0usize;

        while offset < chars.len() {
            if let Some(limit) = self.space.fragmentainer_block_size {
                let fits = block_offset + line_height <= limit;
                let forced = self.space.is_new_fragmentainer && lines == 0;
                if !fits && !forced {
                    if lines == 0 {
                        log::trace!(
                            "paragraph {:?} does not fit in {limit}pt, moving it on",
                            self.layout_object
                        );
                        return None;
                    }
                    break;
                }
            }

            let line = breaker.shape_line(offset, content_width);
            let text_width = line.width();
            let ShapedLine {
                shape_result,
                break_offset,
                hyphen,
            } = line;

            let mut text_fragment = PhysicalFragment::Text(PhysicalTextFragment::new(
                self.layout_object,
                PhysicalSize::new(text_width, line_height),
                chars[offset..break_offset].iter().collect(),
                Arc::new(shape_result),
                hyphen,
            ));
            text_fragment.place(LogicalOffset::default().to_physical());

            let line_box = PhysicalFragment::LineBox(PhysicalLineBoxFragment::new(
                self.layout_object,
                PhysicalSize::new(content_width, line_height),
                vec![Arc::new(text_fragment)],
                metrics,
            ));
            builder.add_child(line_box, LogicalOffset::new(padding.left, block_offset));

            block_offset += line_height;
            lines += 1;
            offset = skip_spaces(&chars, break_offset);
        }

        if offset < chars.len() {
            log::debug!(
                "paragraph {:?} breaks at char {offset} after {lines} lines",
                self.layout_object
            );
            builder.set_break_token(BreakToken::Inline {
                layout_object: self.layout_object,
                text_offset: offset,
            });
        } else {
            block_offset += padding.bottom;
        }

        builder
            .set_inline_size(content_width + padding.horizontal())
            .set_block_size(block_offset)
            .set_bfc_offset(self.space.bfc_offset);
        Some(builder.to_box_fragment())
    }
}

fn skip_spaces(chars: &[char], mut offset: usize) -> usize {
    while offset < chars.len() && is_collapsible_space(chars[offset]) {
        offset += 1;
    }
    offset
}
