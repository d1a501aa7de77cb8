//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use scribe::{ContentTree, EditSession, EditableConfig, LinearPosition, Node, NodeKind};

/// Install a test tracing subscriber once, honoring RUST_LOG
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Captured `on_change` invocations as (content, position) pairs
#[derive(Clone, Default)]
pub struct ChangeLog {
    events: Rc<RefCell<Vec<(String, LinearPosition)>>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_to(&self, session: &mut EditSession) {
        let events = Rc::clone(&self.events);
        session.set_on_change(move |content, position| {
            events
                .borrow_mut()
                .push((content.to_string(), position.clone()));
        });
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> (String, LinearPosition) {
        self.events
            .borrow()
            .last()
            .cloned()
            .expect("no change events recorded")
    }

    pub fn all(&self) -> Vec<(String, LinearPosition)> {
        self.events.borrow().clone()
    }
}

/// Interactive session with a change log already attached
pub fn session_with_log() -> (EditSession, ChangeLog) {
    let mut session = EditSession::new(EditableConfig::default());
    let log = ChangeLog::new();
    log.attach_to(&mut session);
    (session, log)
}

/// Structural snapshot of a tree: (depth, kind, text) per node in
/// document order. Node identity is deliberately excluded so rollback
/// comparisons check content and order, not leaf object identity.
pub fn tree_signature(tree: &ContentTree) -> Vec<(usize, NodeKind, String)> {
    let mut out = Vec::new();
    for child in tree.root().children() {
        walk(&child, 0, &mut out);
    }
    out
}

fn walk(node: &Node, depth: usize, out: &mut Vec<(usize, NodeKind, String)>) {
    out.push((depth, node.kind(), node.text_value()));
    for child in node.children() {
        walk(&child, depth + 1, out);
    }
}
