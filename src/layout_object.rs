//! # Layout Objects
//!
//! The styled tree that layout runs over. Objects live in a [`LayoutTree`]
//! arena for the duration of one layout pass; fragments refer back to them
//! by [`LayoutObjectId`] to look up their style. The tree is never mutated
//! through a fragment.
//!
//! Index 0 is always an anonymous root block standing in for the
//! fragmentainer, so root fragments carry a valid back-reference too.

use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeKind};
use crate::style::{ResolvedStyle, Style};

/// Index of a [`LayoutObject`] in its [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayoutObjectId(usize);

impl LayoutObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutObjectKind {
    /// The fragmentainer-sized root block.
    Root,
    Block,
    Text { content: String },
}

#[derive(Debug, Clone)]
pub struct LayoutObject {
    pub kind: LayoutObjectKind,
    pub style: ResolvedStyle,
    pub parent: Option<LayoutObjectId>,
    pub children: Vec<LayoutObjectId>,
}

impl LayoutObject {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, LayoutObjectKind::Text { .. })
    }
}

/// Arena of layout objects for one pass.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    objects: Vec<LayoutObject>,
}

impl LayoutTree {
    /// A tree holding only the root, whose content box is `width` wide.
    pub fn new(width: f64) -> Self {
        let style = Style::default().resolve(None, width);
        Self {
            objects: vec![LayoutObject {
                kind: LayoutObjectKind::Root,
                style: ResolvedStyle {
                    width: Some(width),
                    ..style
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Build the tree for a document's top-level nodes.
    ///
    /// Styles are resolved on the way down: text properties inherit from the
    /// parent, percentages resolve against the parent's content width.
    pub fn build(nodes: &[Node], width: f64) -> Self {
        let mut tree = Self::new(width);
        let root = tree.root();
        for node in nodes {
            tree.insert_node(root, node);
        }
        tree
    }

    pub fn root(&self) -> LayoutObjectId {
        LayoutObjectId(0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was not created by this tree.
    pub fn get(&self, id: LayoutObjectId) -> &LayoutObject {
        assert!(
            id.0 < self.objects.len(),
            "layout object {} does not belong to this tree ({} objects)",
            id.0,
            self.objects.len()
        );
        &self.objects[id.0]
    }

    pub fn style(&self, id: LayoutObjectId) -> &ResolvedStyle {
        &self.get(id).style
    }

    pub fn children(&self, id: LayoutObjectId) -> &[LayoutObjectId] {
        &self.get(id).children
    }

    /// Width of the content box of `id`, given the width it was offered.
    pub fn content_width(&self, id: LayoutObjectId, available_width: f64) -> f64 {
        let style = self.style(id);
        let border_box = style
            .width
            .unwrap_or(available_width - style.margin.horizontal());
        (border_box - style.padding.horizontal()).max(0.0)
    }

    /// Append a child object, returning its id.
    pub fn append(
        &mut self,
        parent: LayoutObjectId,
        kind: LayoutObjectKind,
        style: ResolvedStyle,
    ) -> LayoutObjectId {
        let id = LayoutObjectId(self.objects.len());
        self.objects.push(LayoutObject {
            kind,
            style,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.objects[parent.0].children.push(id);
        id
    }

    fn insert_node(&mut self, parent: LayoutObjectId, node: &Node) -> LayoutObjectId {
        let parent_width = self.content_width(parent, self.available_width_of(parent));
        let style = node.style.resolve(Some(self.style(parent)), parent_width);
        let kind = match &node.kind {
            NodeKind::Block => LayoutObjectKind::Block,
            NodeKind::Text { content } => LayoutObjectKind::Text {
                content: content.clone(),
            },
        };
        let is_text = matches!(kind, LayoutObjectKind::Text { .. });
        let id = self.append(parent, kind, style);
        if !is_text {
            for child in &node.children {
                self.insert_node(id, child);
            }
        }
        id
    }

    /// The width a container was offered by its own parent.
    fn available_width_of(&self, id: LayoutObjectId) -> f64 {
        match self.get(id).parent {
            Some(parent) => self.content_width(parent, self.available_width_of(parent)),
            None => self.style(id).width.unwrap_or(0.0),
        }
    }
}
