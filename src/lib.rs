//! Scribe - plain-text editing core for rendered node trees
//!
//! This crate keeps an externally rendered node tree usable as an
//! editable plain-text surface while the renderer retains exclusive
//! ownership of tree structure: native in-place edits are observed,
//! captured as linear text plus caret, and rolled back before the
//! renderer can notice them.

pub mod config;
pub mod edit;
pub mod events;
pub mod history;
pub mod position;
pub mod projection;
pub mod range;
pub mod reconciler;
pub mod session;
pub mod text;
pub mod tree;

// Re-export commonly used types
pub use config::EditableConfig;
pub use edit::CaretTarget;
pub use events::{Key, KeyEvent, Modifiers, PasteEvent};
pub use history::{HistoryEntry, HistoryStack};
pub use position::LinearPosition;
pub use reconciler::{Reconciler, ReconcilerState};
pub use session::{EditSession, SessionMode};
pub use text::CanonicalText;
pub use tree::{
    ContentTree, MutationObserver, MutationRecord, Node, NodeKind, Selection, TreeLocation,
    TreeRange,
};
