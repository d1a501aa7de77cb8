//! Long-lived edit session
//!
//! The session is the orchestrator-owned object that survives render
//! passes: it holds the observer handle, the pending mutation queue,
//! the undo/redo history, the last known position, and the owner's
//! change callback. Everything else in the crate is stateless and is
//! handed this state explicitly.
//!
//! The contract with the owner is narrow: after every reconciled flush
//! (and after undo/redo) the session calls `on_change(content,
//! position)` exactly once, synchronously; the owner re-renders the
//! tree from that content and then calls [`render_complete`], which
//! resumes observation and restores the caret.
//!
//! [`render_complete`]: EditSession::render_complete

use std::time::Instant;

use crate::config::EditableConfig;
use crate::edit::{self, CaretTarget};
use crate::events::{Key, KeyEvent, PasteEvent, UndoRedo};
use crate::history::HistoryStack;
use crate::position::{self, LinearPosition};
use crate::projection;
use crate::range;
use crate::reconciler::Reconciler;
use crate::text::CanonicalText;
use crate::tree::{leading_whitespace, ContentTree, Node};

type ChangeCallback = Box<dyn FnMut(&CanonicalText, &LinearPosition)>;

/// How the session interacts with its environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Observing, reconciling, and recording history
    Interactive,
    /// No observation primitive available: only `update` works
    Passive,
}

/// Orchestrator-owned editing state, persistent across render passes
pub struct EditSession {
    config: EditableConfig,
    mode: SessionMode,
    reconciler: Reconciler,
    history: HistoryStack,
    last_position: Option<LinearPosition>,
    /// Set after emitting a change, cleared by `render_complete`.
    /// While set, input is reconciled away without being reported.
    awaiting_render: bool,
    on_change: Option<ChangeCallback>,
}

impl EditSession {
    pub fn new(config: EditableConfig) -> Self {
        let history = HistoryStack::new(config.history_capacity, config.debounce());
        Self {
            config,
            mode: SessionMode::Interactive,
            reconciler: Reconciler::new(),
            history,
            last_position: None,
            awaiting_render: false,
            on_change: None,
        }
    }

    /// Degraded session for environments without mutation observation:
    /// a pass-through exposing only `update`.
    pub fn passive(config: EditableConfig) -> Self {
        let mut session = Self::new(config);
        session.mode = SessionMode::Passive;
        session
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn set_on_change(&mut self, callback: impl FnMut(&CanonicalText, &LinearPosition) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Whether a reported change is still waiting for its re-render.
    /// Input landing in this window is dropped (reconciled away,
    /// unreported); the owner can recover by completing a render pass.
    pub fn is_blocked(&self) -> bool {
        self.awaiting_render
    }

    // === Lifecycle ===

    /// Begin observing a (fresh or re-rendered) tree
    pub fn attach(&mut self, tree: &ContentTree) {
        if self.mode == SessionMode::Passive {
            return;
        }
        self.reconciler.attach(tree);
        self.awaiting_render = false;
    }

    /// The owner finished a render pass: resume observation and restore
    /// the caret into the fresh tree from the last known position.
    pub fn render_complete(&mut self, tree: &ContentTree) {
        if self.mode == SessionMode::Passive {
            return;
        }
        if let Some(position) = &self.last_position {
            let caret = range::caret_range(tree, position.offset);
            tree.select_range(&caret);
        }
        self.attach(tree);
    }

    /// Stop editing: disconnect observation and atomically drop the
    /// pending queue and history so no stale callback can fire later.
    pub fn detach(&mut self) {
        self.reconciler.detach();
        self.history.clear();
        self.last_position = None;
        self.awaiting_render = false;
        tracing::debug!("session detached");
    }

    // === Reconciliation ===

    /// Drain and reconcile pending mutations, reporting the result to
    /// the owner. No-op when nothing changed.
    pub fn flush(&mut self, tree: &ContentTree) {
        if self.mode == SessionMode::Passive {
            return;
        }
        if self.awaiting_render {
            // Bounded lossy window: erase unreported input, keep quiet.
            if self
                .reconciler
                .flush(tree, self.last_position.as_ref())
                .is_some()
            {
                tracing::debug!("dropped input during blocked render window");
            }
            return;
        }
        if let Some((content, position)) = self.reconciler.flush(tree, self.last_position.as_ref())
        {
            self.last_position = Some(position.clone());
            self.awaiting_render = true;
            self.emit(&content, &position);
        }
    }

    fn emit(&mut self, content: &CanonicalText, position: &LinearPosition) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(content, position);
        }
    }

    // === Undo/redo ===

    pub fn undo(&mut self, tree: &ContentTree) {
        if self.mode == SessionMode::Passive {
            return;
        }
        // Checkpoint typing that has not made it into history yet.
        let (content, position) = self.state(tree);
        self.history.record(&content, &position, true, Instant::now());
        if let Some(entry) = self.history.undo() {
            let (content, position) = (entry.content.clone(), entry.position.clone());
            self.last_position = Some(position.clone());
            self.awaiting_render = true;
            self.emit(&content, &position);
        }
    }

    pub fn redo(&mut self, tree: &ContentTree) {
        if self.mode == SessionMode::Passive {
            return;
        }
        let (content, position) = self.state(tree);
        self.history.record(&content, &position, true, Instant::now());
        if let Some(entry) = self.history.redo() {
            let (content, position) = (entry.content.clone(), entry.position.clone());
            self.last_position = Some(position.clone());
            self.awaiting_render = true;
            self.emit(&content, &position);
        }
    }

    // === Event handlers ===

    pub fn on_key_down(&mut self, tree: &ContentTree, event: &mut KeyEvent) {
        if self.mode == SessionMode::Passive
            || event.default_prevented()
            || event.is_composing
            || self.awaiting_render
        {
            return;
        }

        if let Some(chord) = event.undo_redo_chord() {
            event.prevent_default();
            match chord {
                UndoRedo::Undo => self.undo(tree),
                UndoRedo::Redo => self.redo(tree),
            }
            return;
        }

        // Snapshot the pre-edit state; debounced, so bursts of typing
        // coalesce while the burst start is always retained.
        let (content, position) = self.state(tree);
        self.history
            .record(&content, &position, false, Instant::now());

        match &event.key {
            Key::Enter => {
                event.prevent_default();
                let indent = if self.config.continue_indentation {
                    leading_whitespace(&position.line_text).to_string()
                } else {
                    String::new()
                };
                self.insert(tree, &format!("\n{indent}"), 0);
            }
            Key::Tab if !self.config.tab_text.is_empty() => {
                event.prevent_default();
                let tab = self.config.tab_text.clone();
                self.insert(tree, &tab, 0);
            }
            _ => {}
        }
    }

    pub fn on_key_up(&mut self, tree: &ContentTree, event: &KeyEvent) {
        if self.mode == SessionMode::Passive || event.is_composing {
            return;
        }
        self.flush(tree);
    }

    pub fn on_paste(&mut self, tree: &ContentTree, event: &mut PasteEvent) {
        if self.mode == SessionMode::Passive || self.awaiting_render {
            return;
        }
        event.prevent_default();
        let (content, position) = self.state(tree);
        self.history.record(&content, &position, true, Instant::now());
        self.insert(tree, &event.text.clone(), 0);
    }

    pub fn on_focus(&mut self, tree: &ContentTree) {
        self.last_position = tree
            .selection()
            .map(|selection| position::compute(tree, &selection));
    }

    pub fn on_blur(&mut self) {
        self.last_position = None;
    }

    // === Edit API ===

    /// Pure read of the current (content, position) pair
    pub fn state(&self, tree: &ContentTree) -> (CanonicalText, LinearPosition) {
        let content = projection::linearize(tree);
        let position = tree
            .selection()
            .map(|selection| position::compute(tree, &selection))
            .or_else(|| self.last_position.clone())
            .unwrap_or_default();
        (content, position)
    }

    /// Replace the whole document, repositioning the caret by length
    /// delta. Assumes one contiguous edit; simultaneous multi-point
    /// edits will land the caret approximately.
    pub fn update(&mut self, tree: &ContentTree, content: &str) {
        let new_text = CanonicalText::from(content);
        let (old_text, old_position) = self.state(tree);

        let delta = new_text.len_chars() as isize - old_text.len_chars() as isize;
        let offset = (old_position.offset as isize + delta)
            .clamp(0, new_text.len_chars() as isize) as usize;
        let position = position::position_for_offset(&new_text, offset);

        self.history
            .record(&new_text, &position, false, Instant::now());
        self.last_position = Some(position.clone());
        if self.mode == SessionMode::Interactive {
            self.awaiting_render = true;
        }
        self.emit(&new_text, &position);
    }

    /// Delete the selection (or the `delete_offset` window next to the
    /// caret: negative deletes before, positive after), insert `text`
    /// as one node, and leave the caret right after it.
    pub fn insert(&mut self, tree: &ContentTree, text: &str, delete_offset: isize) {
        if self.mode == SessionMode::Passive {
            return;
        }
        let (_, position) = self.state(tree);

        let caret = if position.extent > 0 {
            edit::delete_span(tree, position.offset, position.offset + position.extent);
            position.offset
        } else if delete_offset != 0 {
            let a = (position.offset as isize + delete_offset.min(0)).max(0) as usize;
            let b = (position.offset as isize + delete_offset.max(0)).max(0) as usize;
            edit::delete_span(tree, a, b);
            a
        } else {
            position.offset
        };

        let at = range::caret_range(tree, caret).start;
        if text.is_empty() {
            tree.set_caret(at);
        } else {
            let node = Node::text(text);
            let after = edit::insert_node_at(tree, &at, node);
            tree.set_caret(after);
        }
        self.flush(tree);
    }

    /// Move the caret to an absolute offset or a row/column address
    pub fn move_to(&mut self, tree: &ContentTree, target: CaretTarget) {
        if self.mode == SessionMode::Passive {
            return;
        }
        let content = projection::linearize(tree);
        let offset = target.resolve(&content);
        let caret = range::caret_range(tree, offset);
        tree.select_range(&caret);
        self.last_position = Some(position::position_for_offset(&content, offset));
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditableConfig::default())
    }
}
