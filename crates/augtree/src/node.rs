use std::fmt;

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// A handle to a node stored in a [crate::tree::BinaryTree] arena
///
/// Handles stay valid until the node is erased or its tree is cleared,
/// no matter how the tree gets rotated, split or joined in between.
///
/// A handle is a bare slot index and carries no identity of its tree.
/// Passing it to another tree is a programming error that is only caught
/// when the slot is vacant there, or holds a node outside the tree the
/// operation works on. Otherwise the call silently acts on whatever node
/// sits in that slot. Erased slots get reused by later insertions, so a
/// stale handle behaves the same way.
#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug)]
pub struct NodeRef(pub(crate) usize);

impl NodeRef {
    /// The slot index of the node inside its arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone)]
pub(crate) struct Node<T, S> {
    pub parent: Option<NodeRef>,
    pub children: [Option<NodeRef>; 2],
    pub value: T,
    pub synth: S,
}

impl<T, S> Node<T, S> {
    pub fn new(value: T, synth: S) -> Self {
        Self {
            parent: None,
            children: [None, None],
            value,
            synth,
        }
    }

    pub fn is_isolated(&self) -> bool {
        self.parent.is_none() && self.children[LEFT].is_none() && self.children[RIGHT].is_none()
    }
}

/// Read-only view of a node handed to selectors during a descent
///
/// Besides the node itself, the view exposes the synthesized data of
/// both children so that a selector can decide on a branch without
/// another lookup.
pub struct NodeView<'a, T, S> {
    pub(crate) value: &'a T,
    pub(crate) synth: &'a S,
    pub(crate) left: Option<&'a S>,
    pub(crate) right: Option<&'a S>,
}

impl<'a, T, S> NodeView<'a, T, S> {
    /// The user value stored in the node
    pub fn value(&self) -> &'a T {
        self.value
    }
    /// The synthesized data of the subtree rooted at the node
    pub fn synth(&self) -> &'a S {
        self.synth
    }
    /// The synthesized data of the left subtree, if any
    pub fn left(&self) -> Option<&'a S> {
        self.left
    }
    /// The synthesized data of the right subtree, if any
    pub fn right(&self) -> Option<&'a S> {
        self.right
    }
    pub fn has_left(&self) -> bool {
        self.left.is_some()
    }
    pub fn has_right(&self) -> bool {
        self.right.is_some()
    }
}

impl<T, S> Clone for NodeView<'_, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T, S> Copy for NodeView<'_, T, S> {}
