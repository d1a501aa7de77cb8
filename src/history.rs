//! Debounced undo/redo log
//!
//! Snapshots are whole (position, text) pairs rather than deltas: the
//! reconciler already produces authoritative canonical text per flush,
//! and the rope backing makes retained copies cheap. Recording is
//! debounced against a wall-clock read so bursts of typing coalesce
//! into one entry while burst-starts and forced checkpoints (paste,
//! pre-undo) always land.

use std::time::{Duration, Instant};

use crate::position::LinearPosition;
use crate::text::CanonicalText;

/// One undo/redo snapshot
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub position: LinearPosition,
    pub content: CanonicalText,
}

/// Bounded undo/redo log with a movable cursor
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    /// Index of the current entry (meaningless while empty)
    index: usize,
    last_recorded: Option<Instant>,
    capacity: usize,
    debounce: Duration,
}

impl HistoryStack {
    pub fn new(capacity: usize, debounce: Duration) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            last_recorded: None,
            capacity: capacity.max(1),
            debounce,
        }
    }

    /// Record a snapshot; returns whether an entry was retained.
    ///
    /// No-op when `content` equals the current entry (dedupes no-op key
    /// events), and, unless `force`, when the debounce window since the
    /// last retained snapshot has not elapsed. Recording discards any
    /// redone entries ahead of the cursor and evicts the oldest entry
    /// past capacity.
    pub fn record(
        &mut self,
        content: &CanonicalText,
        position: &LinearPosition,
        force: bool,
        now: Instant,
    ) -> bool {
        if let Some(current) = self.entries.get(self.index) {
            if current.content == *content {
                return false;
            }
        }
        if !force {
            if let Some(last) = self.last_recorded {
                if now.duration_since(last) < self.debounce {
                    return false;
                }
            }
        }

        self.last_recorded = Some(now);
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(HistoryEntry {
            position: position.clone(),
            content: content.clone(),
        });
        self.index = self.entries.len() - 1;

        while self.entries.len() > self.capacity {
            self.entries.remove(0);
            self.index -= 1;
        }
        tracing::trace!(entries = self.entries.len(), index = self.index, "history snapshot");
        true
    }

    /// Step back; `None` when already at the oldest entry
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.entries.is_empty() || self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward; `None` when already at the newest entry
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.entries.is_empty() || self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.last_recorded = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry the cursor currently sits on
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::position_for_offset;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn stack() -> HistoryStack {
        HistoryStack::new(500, DEBOUNCE)
    }

    fn entry(content: &str) -> (CanonicalText, LinearPosition) {
        let text = CanonicalText::from(content);
        let position = position_for_offset(&text, text.len_chars());
        (text, position)
    }

    // ========================================================================
    // Debounce tests
    // ========================================================================

    #[test]
    fn test_debounce_coalesces_bursts() {
        let mut history = stack();
        let t0 = Instant::now();

        for (ms, content) in [(0u64, "a"), (100, "ab"), (200, "abc"), (600, "abcd")] {
            let (text, pos) = entry(content);
            history.record(&text, &pos, false, t0 + Duration::from_millis(ms));
        }

        // Burst start and post-window snapshot retained, nothing between
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().unwrap().content, CanonicalText::from("abcd"));
    }

    #[test]
    fn test_force_bypasses_debounce() {
        let mut history = stack();
        let t0 = Instant::now();

        let (a, pa) = entry("a");
        let (b, pb) = entry("ab");
        history.record(&a, &pa, false, t0);
        history.record(&b, &pb, true, t0 + Duration::from_millis(10));

        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_identical_content_dedupes_even_forced() {
        let mut history = stack();
        let t0 = Instant::now();

        let (a, pa) = entry("same");
        history.record(&a, &pa, false, t0);
        let recorded = history.record(&a, &pa, true, t0 + Duration::from_secs(10));

        assert!(!recorded);
        assert_eq!(history.len(), 1);
    }

    // ========================================================================
    // Undo/redo tests
    // ========================================================================

    #[test]
    fn test_undo_redo_walks_and_clamps() {
        let mut history = stack();
        let t0 = Instant::now();
        for (i, content) in ["A", "B", "C"].iter().enumerate() {
            let (text, pos) = entry(content);
            history.record(&text, &pos, true, t0 + Duration::from_secs(i as u64));
        }

        assert_eq!(history.undo().unwrap().content, CanonicalText::from("B"));
        assert_eq!(history.undo().unwrap().content, CanonicalText::from("A"));
        // Clamped at the oldest entry
        assert!(history.undo().is_none());
        assert_eq!(history.current().unwrap().content, CanonicalText::from("A"));

        assert_eq!(history.redo().unwrap().content, CanonicalText::from("B"));
        assert_eq!(history.redo().unwrap().content, CanonicalText::from("C"));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_discards_redone_entries() {
        let mut history = stack();
        let t0 = Instant::now();
        for (i, content) in ["A", "B", "C"].iter().enumerate() {
            let (text, pos) = entry(content);
            history.record(&text, &pos, true, t0 + Duration::from_secs(i as u64));
        }
        history.undo();
        history.undo();

        let (d, pd) = entry("D");
        history.record(&d, &pd, true, t0 + Duration::from_secs(10));

        assert_eq!(history.len(), 2);
        assert!(history.redo().is_none());
        assert_eq!(history.current().unwrap().content, CanonicalText::from("D"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStack::new(3, Duration::ZERO);
        let t0 = Instant::now();
        for (i, content) in ["A", "B", "C", "D"].iter().enumerate() {
            let (text, pos) = entry(content);
            history.record(&text, &pos, true, t0 + Duration::from_secs(i as u64));
        }

        assert_eq!(history.len(), 3);
        // Oldest reachable entry is now B
        history.undo();
        history.undo();
        assert!(history.undo().is_none());
        assert_eq!(history.current().unwrap().content, CanonicalText::from("B"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut history = stack();
        let (a, pa) = entry("A");
        history.record(&a, &pa, true, Instant::now());
        history.clear();

        assert!(history.is_empty());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }
}
