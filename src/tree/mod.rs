//! Externally owned content tree
//!
//! The tree is the shared resource the whole crate revolves around: the
//! external renderer owns its structure and replaces it each render
//! pass, while the sync core reads it, observes in-place mutations to
//! it, and writes to it only during rollback and single-node inserts.
//!
//! All mutation goes through [`ContentTree`] methods so a connected
//! [`MutationObserver`] sees every change.

mod node;
mod observer;
mod selection;

pub use node::{Node, NodeKind};
pub use observer::{MutationObserver, MutationRecord};
pub use selection::{Selection, TreeLocation, TreeRange};

pub(crate) use observer::ObserverSink;
pub(crate) use selection::{clamp_offset, leading_whitespace};

use std::cell::RefCell;
use std::rc::Rc;

/// A node tree with mutation observation and a selection slot
pub struct ContentTree {
    root: Node,
    sink: Rc<RefCell<ObserverSink>>,
    selection: RefCell<Option<Selection>>,
}

impl ContentTree {
    /// Create an empty tree (a bare root element)
    pub fn new() -> Self {
        Self {
            root: Node::element(),
            sink: Rc::new(RefCell::new(ObserverSink::default())),
            selection: RefCell::new(None),
        }
    }

    /// Build a tree the way a plain-text renderer would: one text leaf
    /// per non-empty line, a line-break marker per separator.
    pub fn from_text(content: &str) -> Self {
        let tree = Self::new();
        for (i, line) in content.split('\n').enumerate() {
            if i > 0 {
                tree.root.insert_child_raw(tree.root.child_count(), Node::line_break());
            }
            if !line.is_empty() {
                tree.root
                    .insert_child_raw(tree.root.child_count(), Node::text(line));
            }
        }
        tree
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Connect an observer to this tree's mutation stream
    pub fn observe(&self) -> MutationObserver {
        self.sink.borrow_mut().recording = true;
        MutationObserver {
            sink: Rc::clone(&self.sink),
        }
    }

    fn record(&self, record: MutationRecord) {
        let mut sink = self.sink.borrow_mut();
        if sink.recording {
            sink.pending.push(record);
        }
    }

    // === Selection primitive ===

    pub fn selection(&self) -> Option<Selection> {
        self.selection.borrow().clone()
    }

    pub fn set_selection(&self, selection: Selection) {
        *self.selection.borrow_mut() = Some(selection);
    }

    /// Install a built range as the live selection
    pub fn select_range(&self, range: &TreeRange) {
        self.set_selection(range.to_selection());
    }

    pub fn set_caret(&self, location: TreeLocation) {
        self.set_selection(Selection::caret(location));
    }

    pub fn clear_selection(&self) {
        *self.selection.borrow_mut() = None;
    }

    // === Mutators (recorded while an observer is connected) ===

    /// Replace a text leaf's value
    pub fn set_text(&self, target: &Node, text: &str) {
        if target.kind() != NodeKind::Text {
            tracing::warn!("set_text on a non-text node ignored");
            return;
        }
        let old_text = target.text_value();
        target.set_text_raw(text);
        self.record(MutationRecord::CharacterData {
            target: target.clone(),
            old_text,
        });
    }

    pub fn append_child(&self, parent: &Node, child: Node) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` into `parent` before `before` (append when `None`
    /// or when `before` is not a child of `parent`)
    pub fn insert_before(&self, parent: &Node, child: Node, before: Option<&Node>) {
        let index = before
            .and_then(|n| {
                n.parent()
                    .filter(|p| p.ptr_eq(parent))
                    .and_then(|_| n.index_in_parent())
            })
            .unwrap_or_else(|| parent.child_count());
        parent.insert_child_raw(index, child.clone());

        let previous_sibling = child.previous_sibling();
        let next_sibling = child.next_sibling();
        self.record(MutationRecord::ChildList {
            target: parent.clone(),
            added: vec![child],
            removed: Vec::new(),
            previous_sibling,
            next_sibling,
        });
    }

    /// Detach `child` from `parent`; a no-op when it is not a child
    pub fn remove_child(&self, parent: &Node, child: &Node) {
        let Some(index) = child
            .parent()
            .filter(|p| p.ptr_eq(parent))
            .and_then(|_| child.index_in_parent())
        else {
            tracing::trace!("remove_child of a non-child ignored");
            return;
        };
        let previous_sibling = child.previous_sibling();
        let next_sibling = child.next_sibling();
        parent.remove_child_raw(index);

        self.record(MutationRecord::ChildList {
            target: parent.clone(),
            added: Vec::new(),
            removed: vec![child.clone()],
            previous_sibling,
            next_sibling,
        });
    }
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}
