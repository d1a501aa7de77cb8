//! Mutation observation over the content tree
//!
//! Every structural or text mutation performed through [`ContentTree`]
//! while an observer is connected is captured in arrival order as a
//! small value-type record. Records double as an undo log: applying
//! their inverses in reverse arrival order restores the pre-mutation
//! tree exactly.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::node::Node;
use super::ContentTree;

/// One observed change to the tree
#[derive(Clone)]
pub enum MutationRecord {
    /// A text leaf's value changed
    CharacterData {
        target: Node,
        /// Value before the change
        old_text: String,
    },
    /// Children were added to or removed from `target`
    ChildList {
        target: Node,
        added: Vec<Node>,
        removed: Vec<Node>,
        /// Sibling preceding the change site at the time of the change
        previous_sibling: Option<Node>,
        /// Sibling following the change site; reinsertion anchor
        next_sibling: Option<Node>,
    },
}

impl MutationRecord {
    /// Undo this record against the tree.
    ///
    /// Called with observation disconnected, in reverse arrival order.
    /// Added nodes may already have been detached by a later-arriving
    /// (earlier-undone) record; those are skipped. Removed nodes are
    /// reinserted at the recorded anchor in reverse index order so the
    /// original sibling order comes back.
    pub(crate) fn apply_inverse(&self, tree: &ContentTree) {
        match self {
            MutationRecord::CharacterData { target, old_text } => {
                tree.set_text(target, old_text);
            }
            MutationRecord::ChildList {
                target,
                added,
                removed,
                next_sibling,
                ..
            } => {
                for node in added {
                    match node.parent() {
                        Some(parent) => tree.remove_child(&parent, node),
                        None => {
                            tracing::trace!("skipping rollback of already-detached node");
                        }
                    }
                }
                for node in removed.iter().rev() {
                    let anchor = next_sibling
                        .as_ref()
                        .filter(|n| n.parent().is_some_and(|p| p.ptr_eq(target)));
                    tree.insert_before(target, node.clone(), anchor);
                }
            }
        }
    }
}

impl fmt::Debug for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationRecord::CharacterData { old_text, .. } => {
                write!(f, "CharacterData(old: {:?})", old_text)
            }
            MutationRecord::ChildList { added, removed, .. } => {
                write!(f, "ChildList(+{} -{})", added.len(), removed.len())
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct ObserverSink {
    pub(crate) recording: bool,
    pub(crate) pending: Vec<MutationRecord>,
}

/// Handle to the tree's mutation stream
///
/// Mirrors the host observation primitive: records accumulate while
/// connected and can be drained on demand with [`take_records`], so
/// none are lost at flush boundaries.
///
/// [`take_records`]: MutationObserver::take_records
#[derive(Clone)]
pub struct MutationObserver {
    pub(crate) sink: Rc<RefCell<ObserverSink>>,
}

impl MutationObserver {
    /// Take every record captured since the last call
    pub fn take_records(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.sink.borrow_mut().pending)
    }

    /// Stop capturing; already-captured records remain available
    pub fn disconnect(&self) {
        self.sink.borrow_mut().recording = false;
    }

    /// Resume capturing
    pub fn reconnect(&self) {
        self.sink.borrow_mut().recording = true;
    }

    pub fn is_connected(&self) -> bool {
        self.sink.borrow().recording
    }
}
