//! Tree-level edit primitives
//!
//! These are the write paths the session is allowed to use outside of
//! rollback: deleting a linear span and inserting a single text node.
//! Both go through [`ContentTree`] mutators, so a connected observer
//! records them and the next flush reconciles them like native edits.

use crate::text::CanonicalText;
use crate::tree::{ContentTree, Node, NodeKind, TreeLocation};

/// Where to place the caret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretTarget {
    /// Absolute char offset into canonical text
    Offset(usize),
    /// Row/column address, resolved against line boundaries
    LineColumn { line: usize, column: usize },
}

impl CaretTarget {
    /// Resolve to a clamped char offset into `text`
    pub(crate) fn resolve(&self, text: &CanonicalText) -> usize {
        match *self {
            CaretTarget::Offset(offset) => offset.min(text.len_chars()),
            CaretTarget::LineColumn { line, column } => {
                let line = line.min(text.line_count().saturating_sub(1));
                text.line_to_char(line) + column.min(text.line_len(line))
            }
        }
    }
}

/// Delete the canonical-text span `[start, end)` from the tree.
///
/// Fully covered leaves are detached; partially covered text leaves are
/// rewritten. Containers stay in place even when emptied.
pub(crate) fn delete_span(tree: &ContentTree, start: usize, end: usize) {
    if end <= start {
        return;
    }

    let mut current = 0usize;
    let mut removals: Vec<Node> = Vec::new();
    let mut rewrites: Vec<(Node, String)> = Vec::new();

    let mut stack: Vec<Node> = Vec::new();
    if let Some(first) = tree.root().first_child() {
        stack.push(first);
    }

    while let Some(node) = stack.pop() {
        if let Some(sibling) = node.next_sibling() {
            stack.push(sibling);
        }
        match node.kind() {
            NodeKind::Text => {
                let text = node.text_value();
                let len = text.chars().count();
                let (a, b) = (current, current + len);
                let lo = start.max(a);
                let hi = end.min(b);
                if lo < hi {
                    if lo == a && hi == b {
                        removals.push(node.clone());
                    } else {
                        let kept: String = text
                            .chars()
                            .take(lo - a)
                            .chain(text.chars().skip(hi - a))
                            .collect();
                        rewrites.push((node.clone(), kept));
                    }
                }
                current = b;
            }
            NodeKind::LineBreak => {
                if start <= current && current < end {
                    removals.push(node.clone());
                }
                current += 1;
            }
            NodeKind::Element => {
                if let Some(child) = node.first_child() {
                    stack.push(child);
                }
            }
        }
        if current >= end {
            break;
        }
    }

    for (node, text) in &rewrites {
        tree.set_text(node, text);
    }
    for node in &removals {
        if let Some(parent) = node.parent() {
            tree.remove_child(&parent, node);
        }
    }
}

/// Insert `node` at a tree location, splitting a text leaf when the
/// location falls inside one. Returns the caret location just after
/// the inserted node.
pub(crate) fn insert_node_at(tree: &ContentTree, at: &TreeLocation, node: Node) -> TreeLocation {
    match at.node.kind() {
        NodeKind::Element => {
            let before = at.node.child(at.offset);
            tree.insert_before(&at.node, node.clone(), before.as_ref());
        }
        NodeKind::Text => match at.node.parent() {
            Some(parent) => {
                let len = at.node.text_len();
                let offset = at.offset.min(len);
                if offset == 0 {
                    tree.insert_before(&parent, node.clone(), Some(&at.node));
                } else if offset == len {
                    let next = at.node.next_sibling();
                    tree.insert_before(&parent, node.clone(), next.as_ref());
                } else {
                    let text = at.node.text_value();
                    let split = text
                        .char_indices()
                        .nth(offset)
                        .map_or(text.len(), |(i, _)| i);
                    let right = Node::text(&text[split..]);
                    let next = at.node.next_sibling();
                    tree.set_text(&at.node, &text[..split]);
                    tree.insert_before(&parent, right.clone(), next.as_ref());
                    tree.insert_before(&parent, node.clone(), Some(&right));
                }
            }
            None => {
                tracing::debug!("insert at detached leaf, appending to root");
                tree.append_child(tree.root(), node.clone());
            }
        },
        NodeKind::LineBreak => match at.node.parent() {
            Some(parent) => {
                let anchor = if at.offset == 0 {
                    Some(at.node.clone())
                } else {
                    at.node.next_sibling()
                };
                tree.insert_before(&parent, node.clone(), anchor.as_ref());
            }
            None => tree.append_child(tree.root(), node.clone()),
        },
    }
    TreeLocation::after(&node)
}
