//! # Fragmentainer-Aware Layout
//!
//! Layout never sees an infinitely tall canvas. Each pass is given a
//! [`ConstraintSpace`] with the inline size it may use and the block size
//! still left in the current fragmentainer (page or column):
//!
//! 1. The root block is laid out into a fresh fragmentainer
//! 2. Each child is asked to fit the space that remains below its siblings
//! 3. A paragraph places lines until the next one would not fit, then stops
//!    with a break token naming the char offset to resume at
//! 4. Containers wrap their child's token in their own, so the root fragment
//!    carries the whole path back to the point of the break
//! 5. The next fragmentainer is laid out from that token
//!
//! Content that does not fit at all is pushed whole to the next
//! fragmentainer, except at the very top of one, where at least one line is
//! always placed so layout makes progress.

pub mod block;
pub mod inline;

use std::sync::Arc;

use crate::font::FontContext;
use crate::fragment::{BreakToken, PhysicalFragment};
use crate::geometry::{LogicalOffset, PhysicalOffset};
use crate::layout_object::{LayoutObjectId, LayoutTree};
use crate::model::{Document, FragmentainerConfig};
use crate::text::{Shaper, TextShaper};

pub use block::BlockLayoutAlgorithm;
pub use inline::InlineLayoutAlgorithm;

/// Everything a layout algorithm reads besides its constraint space.
pub struct LayoutContext<'a> {
    pub tree: &'a LayoutTree,
    pub font_context: &'a FontContext,
    pub shaper: &'a dyn Shaper,
}

impl<'a> LayoutContext<'a> {
    pub fn new(tree: &'a LayoutTree, font_context: &'a FontContext, shaper: &'a dyn Shaper) -> Self {
        Self {
            tree,
            font_context,
            shaper,
        }
    }
}

/// The space a layout algorithm may fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintSpace {
    /// Width offered by the containing block's content box.
    pub available_inline_size: f64,
    /// Block size left in the current fragmentainer, measured from the top
    /// of the box being laid out. `None` means unbounded.
    pub fragmentainer_block_size: Option<f64>,
    /// Where the box's border box starts in its formatting context.
    pub bfc_offset: LogicalOffset,
    /// Whether nothing has been placed in the fragmentainer before this box.
    pub is_new_fragmentainer: bool,
}

impl ConstraintSpace {
    pub fn new(available_inline_size: f64) -> Self {
        Self {
            available_inline_size,
            fragmentainer_block_size: None,
            bfc_offset: LogicalOffset::default(),
            is_new_fragmentainer: true,
        }
    }

    pub fn with_fragmentainer_block_size(mut self, block_size: Option<f64>) -> Self {
        self.fragmentainer_block_size = block_size;
        self
    }

    pub fn with_bfc_offset(mut self, bfc_offset: LogicalOffset) -> Self {
        self.bfc_offset = bfc_offset;
        self
    }
}

/// Run the algorithm matching the object's kind.
pub(crate) fn layout_child(
    context: &LayoutContext<'_>,
    layout_object: LayoutObjectId,
    space: &ConstraintSpace,
    break_token: Option<&BreakToken>,
) -> Option<PhysicalFragment> {
    if context.tree.get(layout_object).is_text() {
        InlineLayoutAlgorithm::new(context, layout_object, space, break_token).layout()
    } else {
        BlockLayoutAlgorithm::new(context, layout_object, space, break_token).layout()
    }
}

/// The main layout engine.
pub struct LayoutEngine {
    shaper: Box<dyn Shaper>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::with_shaper(TextShaper)
    }

    /// An engine that shapes text with `shaper` instead of the built-in one.
    pub fn with_shaper(shaper: impl Shaper + 'static) -> Self {
        Self {
            shaper: Box::new(shaper),
        }
    }

    /// Lay out a document into one root fragment per fragmentainer.
    pub fn layout(&self, document: &Document, font_context: &FontContext) -> Vec<Arc<PhysicalFragment>> {
        self.layout_with_tree(document, font_context).1
    }

    /// Like [`layout`](Self::layout), also returning the layout tree the
    /// fragments refer back to.
    pub fn layout_with_tree(
        &self,
        document: &Document,
        font_context: &FontContext,
    ) -> (LayoutTree, Vec<Arc<PhysicalFragment>>) {
        let tree = LayoutTree::build(&document.children, document.fragmentainer.width);
        let fragments = self.layout_tree(&tree, &document.fragmentainer, font_context);
        (tree, fragments)
    }

    /// Lay out an already built tree, fragmentainer after fragmentainer,
    /// until the root stops carrying a break token.
    pub fn layout_tree(
        &self,
        tree: &LayoutTree,
        config: &FragmentainerConfig,
        font_context: &FontContext,
    ) -> Vec<Arc<PhysicalFragment>> {
        let context = LayoutContext::new(tree, font_context, self.shaper.as_ref());
        let space = ConstraintSpace::new(config.width).with_fragmentainer_block_size(config.height);
        let mut fragments = Vec::new();
        let mut break_token: Option<Arc<BreakToken>> = None;

        loop {
            let algorithm = BlockLayoutAlgorithm::new(&context, tree.root(), &space, break_token.as_deref());
            let Some(mut fragment) = algorithm.layout() else {
                log::warn!("fragmentainer {} placed no content", fragments.len());
                break;
            };
            fragment.place(PhysicalOffset::default());
            break_token = fragment.break_token().cloned();
            log::debug!(
                "fragmentainer {}: {} ({} children)",
                fragments.len(),
                fragment.size(),
                fragment.children().len()
            );
            fragments.push(Arc::new(fragment));
            if break_token.is_none() {
                break;
            }
        }

        log::info!("laid out {} objects into {} fragmentainers", tree.len(), fragments.len());
        fragments
    }
}
