//! Mapping tree-relative selection locations to linear positions

use serde::{Deserialize, Serialize};

use crate::text::CanonicalText;
use crate::tree::{clamp_offset, ContentTree, Node, NodeKind, Selection, TreeLocation};

/// A caret location in canonical text
///
/// `offset` and `extent` are char counts; `line_index` is the number of
/// line separators preceding `offset`; `line_text` is the current line
/// up to `offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearPosition {
    pub offset: usize,
    pub extent: usize,
    pub line_index: usize,
    pub line_text: String,
}

/// Result of resolving one selection endpoint
struct Resolved {
    offset: usize,
    line_index: usize,
    line_text: String,
}

/// Compute the linear position of a selection.
///
/// The position addresses the ordered start of the selection; `extent`
/// is the char length of the selected span (0 when collapsed). A
/// selection outside the tree resolves to the safe default position
/// rather than failing.
pub fn compute(tree: &ContentTree, selection: &Selection) -> LinearPosition {
    let focus = resolve(tree, &selection.focus);
    if selection.is_collapsed() {
        return match focus {
            Some(r) => LinearPosition {
                offset: r.offset,
                extent: 0,
                line_index: r.line_index,
                line_text: r.line_text,
            },
            None => LinearPosition::default(),
        };
    }

    let anchor = resolve(tree, &selection.anchor);
    match (anchor, focus) {
        (Some(a), Some(f)) => {
            let (start, end) = if a.offset <= f.offset { (a, f) } else { (f, a) };
            LinearPosition {
                offset: start.offset,
                extent: end.offset - start.offset,
                line_index: start.line_index,
                line_text: start.line_text,
            }
        }
        (Some(r), None) | (None, Some(r)) => LinearPosition {
            offset: r.offset,
            extent: 0,
            line_index: r.line_index,
            line_text: r.line_text,
        },
        (None, None) => LinearPosition::default(),
    }
}

/// Rebuild full position metadata for a known offset into known text
pub(crate) fn position_for_offset(text: &CanonicalText, offset: usize) -> LinearPosition {
    let offset = offset.min(text.len_chars());
    let line_index = text.char_to_line(offset);
    let line_start = text.line_to_char(line_index);
    LinearPosition {
        offset,
        extent: 0,
        line_index,
        line_text: text.slice_string(line_start, offset),
    }
}

/// Normalize a location down to a leaf.
///
/// A location addressing a container ("between nodes") descends into
/// the indicated child with a zeroed offset; past-the-end locations
/// descend into the last child's end.
fn normalize(location: &TreeLocation) -> (Node, usize) {
    let mut node = location.node.clone();
    let mut offset = clamp_offset(&node, location.offset);

    while node.kind() == NodeKind::Element {
        let count = node.child_count();
        if count == 0 {
            return (node, 0);
        }
        if offset < count {
            match node.child(offset) {
                Some(child) => {
                    node = child;
                    offset = 0;
                }
                None => return (node, 0),
            }
        } else {
            match node.child(count - 1) {
                Some(last) => {
                    offset = match last.kind() {
                        NodeKind::Text => last.text_len(),
                        NodeKind::LineBreak => 1,
                        NodeKind::Element => last.child_count(),
                    };
                    node = last;
                }
                None => return (node, 0),
            }
        }
    }
    (node, offset)
}

/// Running-counter DFS up to the located leaf.
///
/// Stops once the target leaf is reached, truncating its contribution
/// at the located offset. Line tracking resets at every separator,
/// whether it came from leaf text or a marker node.
fn resolve(tree: &ContentTree, location: &TreeLocation) -> Option<Resolved> {
    let (target, target_offset) = normalize(location);

    if target.ptr_eq(tree.root()) {
        // Empty tree; the only position is the origin.
        return Some(Resolved {
            offset: 0,
            line_index: 0,
            line_text: String::new(),
        });
    }

    let mut offset = 0usize;
    let mut line_index = 0usize;
    let mut line_text = String::new();

    let mut stack: Vec<Node> = Vec::new();
    if let Some(first) = tree.root().first_child() {
        stack.push(first);
    }

    while let Some(node) = stack.pop() {
        if let Some(sibling) = node.next_sibling() {
            stack.push(sibling);
        }
        let is_target = node.ptr_eq(&target);

        match node.kind() {
            NodeKind::Text => {
                let text = node.text_value();
                let upto = if is_target {
                    target_offset.min(text.chars().count())
                } else {
                    usize::MAX
                };
                for ch in text.chars().take(upto) {
                    offset += 1;
                    if ch == '\n' {
                        line_index += 1;
                        line_text.clear();
                    } else {
                        line_text.push(ch);
                    }
                }
            }
            NodeKind::LineBreak => {
                // A location sitting past the marker counts one unit.
                if !is_target || target_offset > 0 {
                    offset += 1;
                    line_index += 1;
                    line_text.clear();
                }
            }
            NodeKind::Element => {
                if let Some(child) = node.first_child() {
                    stack.push(child);
                }
            }
        }

        if is_target {
            return Some(Resolved {
                offset,
                line_index,
                line_text,
            });
        }
    }

    tracing::debug!("selection endpoint outside tree, using default position");
    None
}
