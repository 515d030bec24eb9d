//! Continuation tokens for content split across fragmentainers.
//!
//! A fragment that did not finish carries a token saying where layout of its
//! layout object resumes in the next fragmentainer. The fragment tree only
//! owns tokens; their contents are interpreted by the layout algorithms.

use std::sync::Arc;

use serde::Serialize;

use crate::layout_object::LayoutObjectId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BreakToken {
    /// Resume a block container.
    #[serde(rename_all = "camelCase")]
    Block {
        layout_object: LayoutObjectId,
        /// The first child that has not been laid out completely.
        child_index: usize,
        /// Where that child itself resumes, if it was split.
        child_break_token: Option<Arc<BreakToken>>,
        /// Block size of the box already used by earlier fragmentainers.
        consumed_block_size: f64,
    },
    /// Resume a paragraph at a char offset.
    #[serde(rename_all = "camelCase")]
    Inline {
        layout_object: LayoutObjectId,
        text_offset: usize,
    },
}

impl BreakToken {
    pub fn layout_object(&self) -> LayoutObjectId {
        match self {
            BreakToken::Block { layout_object, .. } | BreakToken::Inline { layout_object, .. } => {
                *layout_object
            }
        }
    }

    /// Depth of the token chain, counting this one.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut token = self;
        while let BreakToken::Block {
            child_break_token: Some(child),
            ..
        } = token
        {
            depth += 1;
            token = child;
        }
        depth
    }
}
