//! Reconciliation tests - rollback exactness, reporting, and the session lifecycle

mod common;

use common::{init_tracing, session_with_log, tree_signature};
use scribe::projection::linearize;
use scribe::range::build_range;
use scribe::{ContentTree, Node};

// ========================================================================
// Rollback exactness
// ========================================================================

#[test]
fn test_text_mutation_is_reported_then_erased() {
    init_tracing();
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);
    let before = tree_signature(&tree);

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "axb");
    session.flush(&tree);

    assert_eq!(log.last().0, "axb\n");
    assert_eq!(tree_signature(&tree), before);
}

#[test]
fn test_structural_mutations_roll_back_in_reverse_order() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\ncd\n");
    session.attach(&tree);
    let before = tree_signature(&tree);

    let children = tree.root().children();
    tree.set_text(&children[0], "aXb");
    tree.remove_child(tree.root(), &children[2]);
    tree.insert_before(tree.root(), Node::text("zz"), Some(&children[3]));
    session.flush(&tree);

    assert_eq!(log.last().0, "aXb\nzz\n");
    assert_eq!(tree_signature(&tree), before);
    assert_eq!(linearize(&tree).to_string(), "ab\ncd\n");
}

#[test]
fn test_add_then_remove_of_same_node_rolls_back_cleanly() {
    let (mut session, _log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);
    let before = tree_signature(&tree);

    let extra = Node::text("extra");
    tree.append_child(tree.root(), extra.clone());
    tree.remove_child(tree.root(), &extra);
    session.flush(&tree);

    assert_eq!(tree_signature(&tree), before);
}

#[test]
fn test_multiple_removals_restore_original_sibling_order() {
    let (mut session, _log) = session_with_log();
    let tree = ContentTree::from_text("a\nb\nc\n");
    session.attach(&tree);
    let before = tree_signature(&tree);

    let children = tree.root().children();
    tree.remove_child(tree.root(), &children[0]); // "a"
    tree.remove_child(tree.root(), &children[2]); // "b"
    tree.remove_child(tree.root(), &children[4]); // "c"
    session.flush(&tree);

    assert_eq!(tree_signature(&tree), before);
}

#[test]
fn test_mutations_inside_nested_containers_roll_back() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::new();
    let span = Node::element();
    tree.append_child(tree.root(), span.clone());
    tree.append_child(&span, Node::text("inner"));
    tree.append_child(tree.root(), Node::line_break());

    session.attach(&tree);
    let before = tree_signature(&tree);

    let leaf = span.first_child().unwrap();
    tree.set_text(&leaf, "INNER!");
    tree.append_child(&span, Node::line_break());
    session.flush(&tree);

    assert_eq!(log.last().0, "INNER!\n\n");
    assert_eq!(tree_signature(&tree), before);
}

#[test]
fn test_projection_stable_across_reconciliation() {
    let (mut session, _log) = session_with_log();
    let tree = ContentTree::from_text("stable\ntext\n");
    session.attach(&tree);
    let projected = linearize(&tree).to_string();

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "mutated");
    tree.append_child(tree.root(), Node::text("junk"));
    session.flush(&tree);

    assert_eq!(linearize(&tree).to_string(), projected);
}

// ========================================================================
// Reporting
// ========================================================================

#[test]
fn test_change_callback_fires_exactly_once_per_flush() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "a1");
    tree.set_text(&leaf, "a12");
    session.flush(&tree);

    assert_eq!(log.len(), 1);
    assert_eq!(log.last().0, "a12\n");
}

#[test]
fn test_flush_with_no_changes_stays_quiet() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);

    session.flush(&tree);
    session.flush(&tree);

    assert!(log.is_empty());
}

#[test]
fn test_caret_move_alone_is_reported() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);

    let range = build_range(&tree, 1, 1);
    tree.select_range(&range);
    session.flush(&tree);

    assert_eq!(log.len(), 1);
    let (content, position) = log.last();
    assert_eq!(content, "ab\n");
    assert_eq!(position.offset, 1);
}

#[test]
fn test_reported_position_reflects_the_mutated_tree() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "aXb");
    let range = build_range(&tree, 2, 2);
    tree.select_range(&range);
    session.flush(&tree);

    let (content, position) = log.last();
    assert_eq!(content, "aXb\n");
    assert_eq!(position.offset, 2);
    assert_eq!(position.line_text, "aX");
}

// ========================================================================
// Backpressure and lifecycle
// ========================================================================

#[test]
fn test_input_during_blocked_window_is_erased_unreported() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "aXb");
    session.flush(&tree);
    assert_eq!(log.len(), 1);
    assert!(session.is_blocked());

    // Re-render has not completed; this edit lands in the lossy window.
    session.flush(&tree);
    assert_eq!(log.len(), 1);
    assert!(session.is_blocked());
}

#[test]
fn test_render_complete_unblocks_and_restores_caret() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "aXb");
    let range = build_range(&tree, 2, 2);
    tree.select_range(&range);
    session.flush(&tree);

    // Owner re-renders from the reported content.
    let rendered = ContentTree::from_text(&log.last().0);
    session.render_complete(&rendered);

    assert!(!session.is_blocked());
    // Caret restored into the fresh tree at the last known offset.
    let position = session.state(&rendered).1;
    assert_eq!(position.offset, 2);

    // Observation resumed on the new tree.
    let leaf = rendered.root().first_child().unwrap();
    rendered.set_text(&leaf, "aXYb");
    session.flush(&rendered);
    assert_eq!(log.last().0, "aXYb\n");
}

#[test]
fn test_detach_drops_pending_work_and_history() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");
    session.attach(&tree);

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "pending");
    session.detach();

    // No stale callback after detach, even with an explicit flush.
    session.flush(&tree);
    session.undo(&tree);
    assert!(log.is_empty());
}

#[test]
fn test_observation_does_not_capture_before_attach() {
    let (mut session, log) = session_with_log();
    let tree = ContentTree::from_text("ab\n");

    let leaf = tree.root().first_child().unwrap();
    tree.set_text(&leaf, "prehistoric");
    session.attach(&tree);
    session.flush(&tree);

    assert!(log.is_empty());
    // The pre-attach mutation stays: nothing observed it.
    assert_eq!(leaf.text_value(), "prehistoric");
}
