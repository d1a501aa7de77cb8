//! Mutation reconciliation state machine
//!
//! The external renderer assumes exclusive control of tree structure.
//! Letting native edits persist would desync its model from the real
//! tree, so every flush captures the mutated tree as linear text,
//! erases the native edit by rolling the recorded mutations back, and
//! hands the captured (text, position) to the owner. Native input keeps
//! driving keystroke capture while the renderer stays the sole source
//! of truth.

use crate::position::{self, LinearPosition};
use crate::projection;
use crate::text::CanonicalText;
use crate::tree::{ContentTree, MutationObserver, MutationRecord};

/// Where the reconciler sits in its observe/flush cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    /// Capturing raw mutations as they arrive
    Observing,
    /// Mutations queued, not yet flushed
    Queued,
    /// Inside the rollback critical section
    RollingBack,
    /// Not capturing; awaiting the next render pass
    Disconnected,
}

/// Observer handle plus the pending mutation queue
pub struct Reconciler {
    state: ReconcilerState,
    observer: Option<MutationObserver>,
    queue: Vec<MutationRecord>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            state: ReconcilerState::Disconnected,
            observer: None,
            queue: Vec::new(),
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    /// Begin (or resume) observing a tree; called once per render pass
    pub fn attach(&mut self, tree: &ContentTree) {
        self.observer = Some(tree.observe());
        self.state = ReconcilerState::Observing;
        tracing::debug!("observing");
    }

    /// Stop observing and drop all pending work
    pub fn detach(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.queue.clear();
        self.state = ReconcilerState::Disconnected;
        tracing::debug!("disconnected");
    }

    /// Move asynchronously delivered batches into the queue
    pub fn pump(&mut self) {
        if let Some(observer) = &self.observer {
            let records = observer.take_records();
            if !records.is_empty() {
                self.queue.extend(records);
                if self.state == ReconcilerState::Observing {
                    self.state = ReconcilerState::Queued;
                }
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Reconcile the tree: capture its mutated text and position, then
    /// restore it to the pre-mutation state.
    ///
    /// Returns `None` when there is nothing to report (no queued
    /// mutations and the live selection still matches `last_position`).
    /// Otherwise the returned pair is the new authoritative content;
    /// the tree itself is back to what the renderer last produced.
    pub fn flush(
        &mut self,
        tree: &ContentTree,
        last_position: Option<&LinearPosition>,
    ) -> Option<(CanonicalText, LinearPosition)> {
        // Never attached (or already detached): nothing to reconcile.
        self.observer.as_ref()?;

        // Take pending records so none are lost at the flush boundary.
        self.pump();

        let live = tree.selection().map(|s| position::compute(tree, &s));
        let position_moved = match (&live, last_position) {
            (Some(now), Some(last)) => now != last,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if self.queue.is_empty() && !position_moved {
            return None;
        }

        // Critical section: rollback's own writes must not be re-observed.
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
        self.state = ReconcilerState::RollingBack;

        // The mutated tree is the new authoritative content.
        let content = projection::linearize(tree);
        let position = live
            .or_else(|| last_position.cloned())
            .unwrap_or_default();

        tracing::debug!(records = self.queue.len(), offset = position.offset, "flush");
        for record in self.queue.drain(..).rev() {
            record.apply_inverse(tree);
        }

        self.state = ReconcilerState::Disconnected;
        Some((content, position))
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Node, Selection, TreeLocation};

    fn caret_on_first_leaf(tree: &ContentTree, offset: usize) {
        let leaf = tree.root().first_child().unwrap();
        tree.set_selection(Selection::caret(TreeLocation::new(leaf, offset)));
    }

    #[test]
    fn test_flush_without_changes_reports_nothing() {
        let tree = ContentTree::from_text("ab\n");
        let mut reconciler = Reconciler::new();
        reconciler.attach(&tree);

        assert!(reconciler.flush(&tree, None).is_none());
        assert_eq!(reconciler.state(), ReconcilerState::Observing);
    }

    #[test]
    fn test_flush_captures_mutated_text_and_rolls_back() {
        let tree = ContentTree::from_text("ab\n");
        let mut reconciler = Reconciler::new();
        reconciler.attach(&tree);

        let leaf = tree.root().first_child().unwrap();
        tree.set_text(&leaf, "aXb");
        caret_on_first_leaf(&tree, 2);

        let (content, position) = reconciler.flush(&tree, None).expect("change reported");
        assert_eq!(content.to_string(), "aXb\n");
        assert_eq!(position.offset, 2);

        // The tree itself is back to the renderer's version.
        assert_eq!(leaf.text_value(), "ab");
        assert_eq!(reconciler.state(), ReconcilerState::Disconnected);
    }

    #[test]
    fn test_position_move_alone_triggers_report() {
        let tree = ContentTree::from_text("ab\n");
        let mut reconciler = Reconciler::new();
        reconciler.attach(&tree);
        caret_on_first_leaf(&tree, 1);

        let last = LinearPosition {
            offset: 0,
            ..Default::default()
        };
        let (content, position) = reconciler.flush(&tree, Some(&last)).expect("position change");
        assert_eq!(content.to_string(), "ab\n");
        assert_eq!(position.offset, 1);
    }

    #[test]
    fn test_unchanged_position_is_quiet() {
        let tree = ContentTree::from_text("ab\n");
        let mut reconciler = Reconciler::new();
        reconciler.attach(&tree);
        caret_on_first_leaf(&tree, 1);

        let last = LinearPosition {
            offset: 1,
            line_text: "a".to_string(),
            ..Default::default()
        };
        assert!(reconciler.flush(&tree, Some(&last)).is_none());
    }

    #[test]
    fn test_rollback_is_not_reobserved() {
        let tree = ContentTree::from_text("ab\n");
        let mut reconciler = Reconciler::new();
        reconciler.attach(&tree);

        let leaf = tree.root().first_child().unwrap();
        tree.set_text(&leaf, "mutated");
        reconciler.flush(&tree, None);

        // Rollback wrote to the tree, but produced no new records.
        reconciler.attach(&tree);
        assert!(reconciler.flush(&tree, None).is_none());
    }

    #[test]
    fn test_detach_clears_queue() {
        let tree = ContentTree::from_text("ab\n");
        let mut reconciler = Reconciler::new();
        reconciler.attach(&tree);

        tree.append_child(tree.root(), Node::text("junk"));
        reconciler.pump();
        assert!(reconciler.has_pending());

        reconciler.detach();
        assert!(!reconciler.has_pending());
        // The junk stays: detaching abandons rollback along with reporting.
        assert_eq!(tree.root().child_count(), 3);
    }
}
