//! Tree-to-text linearization

use crate::text::CanonicalText;
use crate::tree::{ContentTree, Node, NodeKind};

/// Linearize a tree into canonical text.
///
/// Depth-first over the root's subtree with an explicit node stack
/// (next-sibling pushed before first-child) so arbitrarily deep trees
/// never hit the call-stack limit. Text leaves append verbatim; each
/// line-break marker appends one separator.
pub fn linearize(tree: &ContentTree) -> CanonicalText {
    let mut out = String::new();
    let mut stack: Vec<Node> = Vec::new();
    if let Some(first) = tree.root().first_child() {
        stack.push(first);
    }

    while let Some(node) = stack.pop() {
        if let Some(sibling) = node.next_sibling() {
            stack.push(sibling);
        }
        match node.kind() {
            NodeKind::Text => out.push_str(&node.text_value()),
            NodeKind::LineBreak => out.push('\n'),
            NodeKind::Element => {
                if let Some(child) = node.first_child() {
                    stack.push(child);
                }
            }
        }
    }

    CanonicalText::from_projection(out)
}
