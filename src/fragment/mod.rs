//! # Physical Fragments
//!
//! The output of a layout pass: an immutable tree of boxes, line boxes and
//! text runs with resolved sizes and offsets.
//!
//! Fragments are built bottom-up. A child is created unplaced, placed exactly
//! once when its parent is assembled, and from then on is shared behind an
//! [`Arc`]. Each fragment points back at the layout object that produced it
//! for style lookup; that link is an index into the pass's [`LayoutTree`], not
//! an ownership edge.
//!
//! The tree is torn down iteratively (see [`PhysicalFragment::destroy`]), so
//! deeply nested documents do not recurse once per level on drop.

mod box_fragment;
mod break_token;
mod builder;
mod floating_object;
mod line_box_fragment;
mod text_fragment;

use std::fmt;
use std::mem;
use std::sync::Arc;

use serde::Serialize;

use crate::geometry::{PhysicalOffset, PhysicalSize};
use crate::layout_object::{LayoutObjectId, LayoutTree};
use crate::style::ResolvedStyle;

pub use box_fragment::PhysicalBoxFragment;
pub use break_token::BreakToken;
pub use builder::FragmentBuilder;
pub use floating_object::FloatingObject;
pub use line_box_fragment::{LineHeightMetrics, PhysicalLineBoxFragment};
pub use text_fragment::PhysicalTextFragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentType {
    Box,
    Text,
    LineBox,
}

impl fmt::Display for FragmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FragmentType::Box => "Box",
            FragmentType::Text => "Text",
            FragmentType::LineBox => "LineBox",
        })
    }
}

/// State shared by every fragment variant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentBase {
    layout_object: LayoutObjectId,
    size: PhysicalSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    break_token: Option<Arc<BreakToken>>,
    offset: Option<PhysicalOffset>,
}

impl FragmentBase {
    pub fn new(
        layout_object: LayoutObjectId,
        size: PhysicalSize,
        break_token: Option<Arc<BreakToken>>,
    ) -> Self {
        Self {
            layout_object,
            size,
            break_token,
            offset: None,
        }
    }
}

/// One node of the fragment tree.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum PhysicalFragment {
    Box(PhysicalBoxFragment),
    Text(PhysicalTextFragment),
    LineBox(PhysicalLineBoxFragment),
}

impl PhysicalFragment {
    pub fn fragment_type(&self) -> FragmentType {
        match self {
            PhysicalFragment::Box(_) => FragmentType::Box,
            PhysicalFragment::Text(_) => FragmentType::Text,
            PhysicalFragment::LineBox(_) => FragmentType::LineBox,
        }
    }

    fn base(&self) -> &FragmentBase {
        match self {
            PhysicalFragment::Box(fragment) => &fragment.base,
            PhysicalFragment::Text(fragment) => &fragment.base,
            PhysicalFragment::LineBox(fragment) => &fragment.base,
        }
    }

    fn base_mut(&mut self) -> &mut FragmentBase {
        match self {
            PhysicalFragment::Box(fragment) => &mut fragment.base,
            PhysicalFragment::Text(fragment) => &mut fragment.base,
            PhysicalFragment::LineBox(fragment) => &mut fragment.base,
        }
    }

    pub fn layout_object(&self) -> LayoutObjectId {
        self.base().layout_object
    }

    pub fn size(&self) -> PhysicalSize {
        self.base().size
    }

    /// Offset relative to the parent fragment, once placed.
    pub fn offset(&self) -> Option<PhysicalOffset> {
        self.base().offset
    }

    pub fn is_placed(&self) -> bool {
        self.base().offset.is_some()
    }

    pub fn break_token(&self) -> Option<&Arc<BreakToken>> {
        self.base().break_token.as_ref()
    }

    /// Style of the layout object this fragment was generated for.
    pub fn style<'t>(&self, tree: &'t LayoutTree) -> &'t ResolvedStyle {
        tree.style(self.layout_object())
    }

    /// Assign the offset within the parent.
    ///
    /// # Panics
    ///
    /// Panics if the fragment has already been placed.
    pub fn place(&mut self, offset: PhysicalOffset) {
        let base = self.base_mut();
        assert!(
            base.offset.is_none(),
            "fragment already placed at {}",
            base.offset.unwrap_or_default()
        );
        base.offset = Some(offset);
    }

    /// In-flow children; empty for text.
    pub fn children(&self) -> &[Arc<PhysicalFragment>] {
        match self {
            PhysicalFragment::Box(fragment) => fragment.children(),
            PhysicalFragment::LineBox(fragment) => fragment.children(),
            PhysicalFragment::Text(_) => &[],
        }
    }

    pub fn as_box(&self) -> Option<&PhysicalBoxFragment> {
        match self {
            PhysicalFragment::Box(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&PhysicalTextFragment> {
        match self {
            PhysicalFragment::Text(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub fn as_line_box(&self) -> Option<&PhysicalLineBoxFragment> {
        match self {
            PhysicalFragment::LineBox(fragment) => Some(fragment),
            _ => None,
        }
    }

    /// Release this fragment and everything it exclusively owns.
    ///
    /// Children still referenced from elsewhere are left to their other
    /// owners and counted as `shared`.
    pub fn destroy(self) -> DestroyStats {
        let mut teardown = Teardown::default();
        teardown.pending.push(self);
        teardown.run()
    }

    /// Multi-line dump of the subtree, one fragment per line.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&PhysicalFragment, usize)> = vec![(self, 0)];
        while let Some((fragment, depth)) = stack.pop() {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&fragment.to_string());
            if let PhysicalFragment::Text(text) = fragment {
                out.push_str(&format!(" Text: {:?}", text.text()));
            }
            out.push('\n');
            if let Some(box_fragment) = fragment.as_box() {
                for float in box_fragment.positioned_floats().iter().rev() {
                    stack.push((&float.fragment, depth + 1));
                }
            }
            for child in fragment.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

impl fmt::Display for PhysicalFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: '{}' Size: '{}' Offset: '{}' Placed: '{}'",
            self.fragment_type(),
            self.size(),
            self.offset().unwrap_or_default(),
            self.is_placed()
        )
    }
}

/// What a call to [`PhysicalFragment::destroy`] released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyStats {
    pub boxes: usize,
    pub texts: usize,
    pub line_boxes: usize,
    pub floats: usize,
    /// Children or floats left alive because another owner holds them.
    pub shared: usize,
}

impl DestroyStats {
    pub fn fragments(&self) -> usize {
        self.boxes + self.texts + self.line_boxes
    }
}

/// Worklist used to release a subtree without recursion.
#[derive(Default)]
struct Teardown {
    pending: Vec<PhysicalFragment>,
    stats: DestroyStats,
}

impl Teardown {
    fn release(&mut self, fragment: Arc<PhysicalFragment>) {
        match Arc::try_unwrap(fragment) {
            Ok(fragment) => self.pending.push(fragment),
            Err(_) => self.stats.shared += 1,
        }
    }

    fn release_float(&mut self, float: Arc<FloatingObject>) {
        match Arc::try_unwrap(float) {
            Ok(float) => {
                self.stats.floats += 1;
                self.release(float.fragment);
            }
            Err(_) => self.stats.shared += 1,
        }
    }

    fn release_all(
        &mut self,
        children: Vec<Arc<PhysicalFragment>>,
        floats: Vec<Arc<FloatingObject>>,
    ) {
        for child in children {
            self.release(child);
        }
        for float in floats {
            self.release_float(float);
        }
    }

    fn run(mut self) -> DestroyStats {
        while let Some(mut fragment) = self.pending.pop() {
            match &mut fragment {
                PhysicalFragment::Box(box_fragment) => {
                    self.stats.boxes += 1;
                    let children = mem::take(&mut box_fragment.children);
                    let floats = mem::take(&mut box_fragment.positioned_floats);
                    self.release_all(children, floats);
                }
                PhysicalFragment::LineBox(line_box) => {
                    self.stats.line_boxes += 1;
                    let children = mem::take(&mut line_box.children);
                    self.release_all(children, Vec::new());
                }
                PhysicalFragment::Text(_) => self.stats.texts += 1,
            }
            // Emptied above, so this drop does not descend.
            drop(fragment);
        }
        self.stats
    }
}

/// Drop hook for container fragments: hand the contents to a worklist
/// instead of letting them drop recursively.
fn teardown_contents(children: &mut Vec<Arc<PhysicalFragment>>, floats: &mut Vec<Arc<FloatingObject>>) {
    if children.is_empty() && floats.is_empty() {
        return;
    }
    let mut teardown = Teardown::default();
    teardown.release_all(mem::take(children), mem::take(floats));
    teardown.run();
}

#[cfg(test)]
mod tests {
    use std::sync::Weak;

    use super::*;
    use crate::font::{Font, StandardFont};
    use crate::geometry::{LogicalOffset, MarginStrut};
    use crate::layout_object::LayoutObjectKind;
    use crate::style::{FloatType, Style};
    use crate::text::{Shaper, TextShaper};

    fn tree() -> (LayoutTree, LayoutObjectId) {
        let mut tree = LayoutTree::new(100.0);
        let root = tree.root();
        let style = Style {
            font_size: Some(18.0),
            ..Default::default()
        }
        .resolve(Some(tree.style(root)), 100.0);
        let block = tree.append(root, LayoutObjectKind::Block, style);
        (tree, block)
    }

    fn text_fragment(layout_object: LayoutObjectId, text: &str) -> PhysicalFragment {
        let font = Font::standard(StandardFont::Helvetica, 10.0);
        let shape_result = TextShaper.shape(&font, text, 0);
        PhysicalFragment::Text(PhysicalTextFragment::new(
            layout_object,
            PhysicalSize::new(shape_result.width(), 14.0),
            text.to_string(),
            Arc::new(shape_result),
            None,
        ))
    }

    fn line_box(layout_object: LayoutObjectId, children: Vec<Arc<PhysicalFragment>>) -> PhysicalFragment {
        PhysicalFragment::LineBox(PhysicalLineBoxFragment::new(
            layout_object,
            PhysicalSize::new(100.0, 14.0),
            children,
            LineHeightMetrics::new(10.0, 4.0),
        ))
    }

    fn box_fragment(
        layout_object: LayoutObjectId,
        children: Vec<Arc<PhysicalFragment>>,
        floats: Vec<Arc<FloatingObject>>,
    ) -> PhysicalFragment {
        PhysicalFragment::Box(PhysicalBoxFragment::new(
            FragmentBase::new(layout_object, PhysicalSize::new(100.0, 20.0), None),
            PhysicalSize::new(100.0, 20.0),
            children,
            floats,
            None,
            MarginStrut::default(),
        ))
    }

    fn placed(mut fragment: PhysicalFragment) -> Arc<PhysicalFragment> {
        fragment.place(PhysicalOffset::default());
        Arc::new(fragment)
    }

    #[test]
    fn test_display_format() {
        let (_, id) = tree();
        let mut fragment = box_fragment(id, Vec::new(), Vec::new());
        assert_eq!(
            fragment.to_string(),
            "Type: 'Box' Size: '100x20' Offset: '0,0' Placed: 'false'"
        );
        fragment.place(PhysicalOffset::new(5.0, 7.5));
        assert_eq!(
            fragment.to_string(),
            "Type: 'Box' Size: '100x20' Offset: '5,7.5' Placed: 'true'"
        );
    }

    #[test]
    #[should_panic(expected = "already placed")]
    fn test_placing_twice_panics() {
        let (_, id) = tree();
        let mut fragment = text_fragment(id, "x");
        fragment.place(PhysicalOffset::default());
        fragment.place(PhysicalOffset::new(1.0, 1.0));
    }

    #[test]
    fn test_style_follows_back_reference() {
        let (tree, id) = tree();
        let fragment = text_fragment(id, "abc");
        assert_eq!(fragment.style(&tree).font_size, 18.0);
        assert_eq!(fragment.layout_object(), id);
    }

    #[test]
    fn test_type_tag_matches_variant() {
        let (_, id) = tree();
        assert_eq!(text_fragment(id, "a").fragment_type(), FragmentType::Text);
        assert_eq!(line_box(id, Vec::new()).fragment_type(), FragmentType::LineBox);
        assert_eq!(
            box_fragment(id, Vec::new(), Vec::new()).fragment_type(),
            FragmentType::Box
        );
    }

    #[test]
    fn test_destroy_routes_to_each_variant() {
        let (_, id) = tree();
        let text = text_fragment(id, "a").destroy();
        assert_eq!(
            text,
            DestroyStats {
                texts: 1,
                ..Default::default()
            }
        );
        let line = line_box(id, Vec::new()).destroy();
        assert_eq!(line.line_boxes, 1);
        assert_eq!(line.fragments(), 1);
        let boxed = box_fragment(id, Vec::new(), Vec::new()).destroy();
        assert_eq!(boxed.boxes, 1);
        assert_eq!(boxed.fragments(), 1);
    }

    #[test]
    fn test_destroy_thousand_mixed_fragments_without_leaks() {
        let (_, id) = tree();
        let mut weak: Vec<Weak<PhysicalFragment>> = Vec::new();
        let mut boxes = Vec::new();
        let mut expected = DestroyStats::default();

        for i in 0..100 {
            let mut lines = Vec::new();
            for _ in 0..4 {
                let texts: Vec<_> = (0..2).map(|_| placed(text_fragment(id, "word"))).collect();
                weak.extend(texts.iter().map(Arc::downgrade));
                let line = placed(line_box(id, texts));
                weak.push(Arc::downgrade(&line));
                lines.push(line);
            }
            expected.texts += 8;
            expected.line_boxes += 4;

            let mut floats = Vec::new();
            if i % 2 == 0 {
                let float_box = placed(box_fragment(id, Vec::new(), Vec::new()));
                weak.push(Arc::downgrade(&float_box));
                floats.push(Arc::new(FloatingObject::new(
                    float_box,
                    FloatType::Left,
                    Default::default(),
                    LogicalOffset::default(),
                )));
                expected.boxes += 1;
                expected.floats += 1;
            }

            let child = placed(box_fragment(id, lines, floats));
            weak.push(Arc::downgrade(&child));
            boxes.push(child);
            expected.boxes += 1;
        }
        // The root box.
        expected.boxes += 1;

        let root = box_fragment(id, boxes, Vec::new());
        assert!(expected.fragments() >= 1000);
        let stats = root.destroy();
        assert_eq!(stats, expected);
        assert!(weak.iter().all(|w| w.upgrade().is_none()), "leaked fragments");
    }

    #[test]
    fn test_destroy_leaves_shared_children_alive() {
        let (_, id) = tree();
        let shared = placed(text_fragment(id, "shared"));
        let line = line_box(id, vec![Arc::clone(&shared)]);
        let stats = line.destroy();
        assert_eq!(stats.line_boxes, 1);
        assert_eq!(stats.texts, 0);
        assert_eq!(stats.shared, 1);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn test_deep_tree_drops_without_recursion() {
        let (_, id) = tree();
        let mut fragment = text_fragment(id, "leaf");
        for _ in 0..100_000 {
            fragment = box_fragment(id, vec![placed(fragment)], Vec::new());
        }
        drop(fragment);
    }

    #[test]
    fn test_dump_tree_indents_children() {
        let (_, id) = tree();
        let line = placed(line_box(id, vec![placed(text_fragment(id, "hi"))]));
        let root = box_fragment(id, vec![line], Vec::new());
        let dump = root.dump_tree();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Type: 'Box'"));
        assert!(lines[1].starts_with("  Type: 'LineBox'"));
        assert!(lines[2].starts_with("    Type: 'Text'"));
        assert!(lines[2].ends_with("Text: \"hi\""));
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let (_, id) = tree();
        let root = box_fragment(id, vec![placed(text_fragment(id, "hi"))], Vec::new());
        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(value["type"], "Box");
        assert_eq!(value["children"][0]["type"], "Text");
        assert_eq!(value["children"][0]["text"], "hi");
        assert_eq!(value["size"]["width"], 100.0);
        assert!(value["offset"].is_null());
    }
}
