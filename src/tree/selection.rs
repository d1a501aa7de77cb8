//! Selection locations and ranges over the content tree

use super::node::{Node, NodeKind};

/// A boundary inside the tree: a node plus an offset.
///
/// For text leaves the offset is a char offset into the leaf text; for
/// elements it is a child index ("between nodes").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLocation {
    pub node: Node,
    pub offset: usize,
}

impl TreeLocation {
    pub fn new(node: Node, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Location just after `node`, expressed against its parent.
    ///
    /// Falls back to the start of the node itself when it is detached.
    pub fn after(node: &Node) -> Self {
        match (node.parent(), node.index_in_parent()) {
            (Some(parent), Some(index)) => Self::new(parent, index + 1),
            _ => Self::new(node.clone(), 0),
        }
    }

    /// Location just before `node`, expressed against its parent
    pub fn before(node: &Node) -> Self {
        match (node.parent(), node.index_in_parent()) {
            (Some(parent), Some(index)) => Self::new(parent, index),
            _ => Self::new(node.clone(), 0),
        }
    }
}

/// Anchor/focus pair mirroring the host selection primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Fixed end of the selection
    pub anchor: TreeLocation,
    /// Moving end; the caret
    pub focus: TreeLocation,
}

impl Selection {
    pub fn new(anchor: TreeLocation, focus: TreeLocation) -> Self {
        Self { anchor, focus }
    }

    /// Collapsed selection at a single location
    pub fn caret(location: TreeLocation) -> Self {
        Self {
            anchor: location.clone(),
            focus: location,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor.node.ptr_eq(&self.focus.node) && self.anchor.offset == self.focus.offset
    }
}

/// A concrete tree range built from linear offsets
#[derive(Debug, Clone)]
pub struct TreeRange {
    pub start: TreeLocation,
    pub end: TreeLocation,
}

impl TreeRange {
    pub fn new(start: TreeLocation, end: TreeLocation) -> Self {
        Self { start, end }
    }

    pub fn collapsed(location: TreeLocation) -> Self {
        Self {
            start: location.clone(),
            end: location,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start.node.ptr_eq(&self.end.node) && self.start.offset == self.end.offset
    }

    /// Selection with anchor at the range start and focus at its end
    pub fn to_selection(&self) -> Selection {
        Selection::new(self.start.clone(), self.end.clone())
    }
}

/// Leading whitespace of a line, used for indentation continuation
pub(crate) fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(line.len(), |(i, _)| i);
    &line[..end]
}

/// Clamp a char offset into a node to the node's addressable length
pub(crate) fn clamp_offset(node: &Node, offset: usize) -> usize {
    let max = match node.kind() {
        NodeKind::Text => node.text_len(),
        NodeKind::LineBreak => 1,
        NodeKind::Element => node.child_count(),
    };
    offset.min(max)
}
