//! Building tree ranges from linear offsets
//!
//! Exact inverse of position mapping: the same running-offset DFS, but
//! stopping to anchor boundaries instead of counting them.

use crate::tree::{ContentTree, Node, NodeKind, TreeLocation, TreeRange};

/// Build a tree range covering `[start, end)` in canonical text.
///
/// `start` clamps to 0; a negative `end` collapses to `start`. A
/// boundary landing exactly at a leaf's full length anchors after the
/// leaf rather than inside whatever node happens to follow. Offsets
/// past the end of the content anchor at the end of the last leaf.
pub fn build_range(tree: &ContentTree, start: isize, end: isize) -> TreeRange {
    let start = start.max(0) as usize;
    let end = if end < start as isize {
        start
    } else {
        end as usize
    };

    let mut current = 0usize;
    let mut start_loc: Option<TreeLocation> = None;
    let mut end_loc: Option<TreeLocation> = None;
    let mut last_leaf: Option<Node> = None;

    let mut stack: Vec<Node> = Vec::new();
    if let Some(first) = tree.root().first_child() {
        stack.push(first);
    }

    while let Some(node) = stack.pop() {
        if let Some(sibling) = node.next_sibling() {
            stack.push(sibling);
        }
        let len = match node.kind() {
            NodeKind::Text => node.text_len(),
            NodeKind::LineBreak => 1,
            NodeKind::Element => {
                if let Some(child) = node.first_child() {
                    stack.push(child);
                }
                continue;
            }
        };

        if start_loc.is_none() && current + len >= start {
            start_loc = Some(boundary_at(&node, start - current, len));
        }
        if start_loc.is_some() && end_loc.is_none() && current + len >= end {
            end_loc = Some(boundary_at(&node, end - current, len));
        }
        if start_loc.is_some() && end_loc.is_some() {
            break;
        }

        current += len;
        last_leaf = Some(node);
    }

    // Offsets beyond the content (or an empty tree) anchor at the end.
    let fallback = || match &last_leaf {
        Some(leaf) => TreeLocation::after(leaf),
        None => TreeLocation::new(tree.root().clone(), 0),
    };
    let start_loc = start_loc.unwrap_or_else(fallback);
    let end_loc = end_loc.unwrap_or_else(|| start_loc.clone());

    TreeRange::new(start_loc, end_loc)
}

/// Collapsed range at a single canonical-text offset
pub fn caret_range(tree: &ContentTree, offset: usize) -> TreeRange {
    build_range(tree, offset as isize, offset as isize)
}

fn boundary_at(leaf: &Node, offset: usize, len: usize) -> TreeLocation {
    match leaf.kind() {
        NodeKind::Text => {
            if offset == len {
                TreeLocation::after(leaf)
            } else {
                TreeLocation::new(leaf.clone(), offset)
            }
        }
        // Markers have no interior: a boundary is either before or after.
        _ => {
            if offset == 0 {
                TreeLocation::before(leaf)
            } else {
                TreeLocation::after(leaf)
            }
        }
    }
}
