//! Node handles for the content tree
//!
//! Nodes are cheap reference-counted handles with weak parent links.
//! Identity is pointer identity: two handles are equal when they refer
//! to the same underlying node, never by content.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// What a node contributes to the linear text projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Text leaf; contributes its text verbatim
    Text,
    /// Line-break marker; contributes a single line separator
    LineBreak,
    /// Container; contributes nothing itself, only its children
    Element,
}

pub(crate) struct NodeInner {
    kind: NodeKind,
    text: RefCell<String>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
}

/// Handle to a tree node
#[derive(Clone)]
pub struct Node {
    pub(crate) inner: Rc<NodeInner>,
}

impl Node {
    fn with_kind(kind: NodeKind, text: String) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                kind,
                text: RefCell::new(text),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create a detached text leaf
    pub fn text(text: &str) -> Self {
        Self::with_kind(NodeKind::Text, text.to_string())
    }

    /// Create a detached line-break marker
    pub fn line_break() -> Self {
        Self::with_kind(NodeKind::LineBreak, String::new())
    }

    /// Create a detached container element
    pub fn element() -> Self {
        Self::with_kind(NodeKind::Element, String::new())
    }

    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    /// Text value of a text leaf (empty for other kinds)
    pub fn text_value(&self) -> String {
        self.inner.text.borrow().clone()
    }

    /// Text length in chars (0 for non-text nodes)
    pub fn text_len(&self) -> usize {
        self.inner.text.borrow().chars().count()
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner.parent.borrow().upgrade().map(|inner| Node { inner })
    }

    /// Snapshot of the current child handles
    pub fn children(&self) -> Vec<Node> {
        self.inner.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.inner.children.borrow().get(index).cloned()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.inner.children.borrow().first().cloned()
    }

    /// Position of this node among its parent's children
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        let children = parent.inner.children.borrow();
        children.iter().position(|c| c.ptr_eq(self))
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        parent.child(index + 1)
    }

    pub fn previous_sibling(&self) -> Option<Node> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        if index == 0 {
            None
        } else {
            parent.child(index - 1)
        }
    }

    /// Whether this node sits under `root` (or is `root` itself)
    pub fn is_attached_under(&self, root: &Node) -> bool {
        let mut current = self.clone();
        loop {
            if current.ptr_eq(root) {
                return true;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // === Raw mutators ===
    //
    // These do not record mutations; ContentTree wraps them so every
    // structural or text change goes through the observation sink.

    pub(crate) fn set_text_raw(&self, text: &str) {
        *self.inner.text.borrow_mut() = text.to_string();
    }

    pub(crate) fn insert_child_raw(&self, index: usize, child: Node) {
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        let mut children = self.inner.children.borrow_mut();
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub(crate) fn remove_child_raw(&self, index: usize) -> Option<Node> {
        let mut children = self.inner.children.borrow_mut();
        if index >= children.len() {
            return None;
        }
        let child = children.remove(index);
        *child.inner.parent.borrow_mut() = Weak::new();
        Some(child)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Text => write!(f, "Text({:?})", self.inner.text.borrow()),
            NodeKind::LineBreak => write!(f, "LineBreak"),
            NodeKind::Element => write!(f, "Element[{} children]", self.child_count()),
        }
    }
}
