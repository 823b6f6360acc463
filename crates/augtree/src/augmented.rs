use crate::error::IntegrityError;
use crate::node::NodeRef;
use crate::rb::{ColorAccess, ColorField, Colored, RedBlack};
use crate::select::InsertSelector;
use crate::synth::Synthesizer;
use crate::tree::{BinaryTree, Subtree};
use log::debug;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

/// A red-black tree with synthesized subtree data
///
/// Read-only queries (search, iteration, navigation, `sum_before`)
/// come from the underlying [BinaryTree] through [Deref]. Everything
/// that changes the structure goes through this type, so that the
/// red-black properties hold after each call.
///
/// Whole-tree operations hand out [Subtree] values living in the same
/// arena. They are moved back in with [Self::install],
/// [Self::insert_range] or [Self::join_trees], or freed with
/// [Self::delete_subtree].
pub struct AugTree<T, S, Y, C> {
    tree: BinaryTree<T, S, Y>,
    colors: PhantomData<fn() -> C>,
}

/// An [AugTree] keeping colors next to plain values
pub type ColoredTree<T, S, Y> = AugTree<Colored<T>, S, Y, ColorField>;

impl<T, S, Y, C> Deref for AugTree<T, S, Y, C> {
    type Target = BinaryTree<T, S, Y>;
    fn deref(&self) -> &Self::Target {
        &self.tree
    }
}

impl<T, S, Y: Default, C> Default for AugTree<T, S, Y, C> {
    fn default() -> Self {
        Self::new(Y::default())
    }
}

impl<T: Clone, S: Clone, Y: Clone, C> Clone for AugTree<T, S, Y, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            colors: PhantomData,
        }
    }
}

impl<T: fmt::Debug, S, Y, C> fmt::Debug for AugTree<T, S, Y, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<T, S, Y, C> AugTree<T, S, Y, C> {
    pub fn new(synthesizer: Y) -> Self {
        Self::with_capacity(0, synthesizer)
    }

    pub fn with_capacity(capacity: usize, synthesizer: Y) -> Self {
        Self {
            tree: BinaryTree::with_capacity(capacity, synthesizer),
            colors: PhantomData,
        }
    }

    /// Moves the whole tree out as a [Subtree]
    pub fn take(&mut self) -> Subtree {
        self.tree.take_root()
    }

    /// Makes a red-black `subtree` the whole tree; the tree must be empty
    pub fn install(&mut self, subtree: Subtree) {
        self.tree.set_root(subtree);
    }

    pub fn delete_subtree(&mut self, subtree: Subtree) -> usize {
        self.tree.delete_subtree(subtree)
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Checks the red-black properties and returns the black depth
    ///
    /// # Panics
    ///
    /// Panics when any of the properties is broken.
    pub fn check_integrity(&self) -> usize
    where
        C: ColorAccess<T>,
    {
        match RedBlack::<C>::check_integrity(&self.tree, self.tree.root()) {
            Ok(depth) => depth,
            Err(e) => {
                debug!("integrity check failed: {e}");
                panic!("broken red-black tree: {e}");
            }
        }
    }
}

impl<T, S: PartialEq, Y: Synthesizer<T, S>, C: ColorAccess<T>> AugTree<T, S, Y, C> {
    /// Checks links, synthesized data and the red-black properties
    pub fn validate(&self) -> Result<usize, IntegrityError> {
        self.tree.check_synthesized()?;
        RedBlack::<C>::check_integrity(&self.tree, self.tree.root())
    }

    pub fn validate_subtree(&self, subtree: &Subtree) -> Result<usize, IntegrityError> {
        self.tree.check_subtree_synthesized(subtree.root())?;
        RedBlack::<C>::check_integrity(&self.tree, subtree.root())
    }
}

impl<T, S, Y: Synthesizer<T, S>, C: ColorAccess<T>> AugTree<T, S, Y, C> {
    /// Builds a tree holding `values` in order, in linear time
    pub fn from_vec(values: Vec<T>, synthesizer: Y) -> Self {
        let mut tree = BinaryTree::with_capacity(values.len(), synthesizer);
        let all = tree.build_tree_move(values);
        RedBlack::<C>::paint_balanced(&mut tree, all.root());
        tree.set_root(all);
        Self {
            tree,
            colors: PhantomData,
        }
    }

    /// Inserts `value` right before `before`, or at the end for `None`
    pub fn emplace_before(&mut self, before: Option<NodeRef>, value: T) -> NodeRef {
        let node = self.tree.emplace_before(before, value);
        RedBlack::<C>::insert_fixup(&mut self.tree, node);
        node
    }

    pub fn push_back(&mut self, value: T) -> NodeRef {
        self.emplace_before(None, value)
    }

    pub fn push_front(&mut self, value: T) -> NodeRef {
        let first = self.tree.first();
        self.emplace_before(first, value)
    }

    /// Inserts `value` where `selector` leads it
    pub fn select_insert<I: InsertSelector<T>>(&mut self, selector: I, value: T) -> NodeRef {
        let node = self.tree.select_insert(selector, value);
        RedBlack::<C>::insert_fixup(&mut self.tree, node);
        node
    }

    /// Deletes `node` and returns its value together with the node after it
    pub fn remove(&mut self, node: NodeRef) -> (T, Option<NodeRef>) {
        assert!(self.tree.owns(node), "{node} does not belong to this tree");
        let next = RedBlack::<C>::detach(&mut self.tree, node);
        (self.tree.free(node), next)
    }

    /// Deletes `node` and returns the node after it
    pub fn erase(&mut self, node: NodeRef) -> Option<NodeRef> {
        self.remove(node).1
    }

    /// Changes a value in place and refreshes the synthesized data
    pub fn update<R>(&mut self, node: NodeRef, f: impl FnOnce(&mut T) -> R) -> R {
        self.tree.update(node, f)
    }

    /// Splits the whole tree at `at`
    ///
    /// Returns the nodes before `at`, `at` itself as a single-node tree,
    /// and the nodes after it. The tree is left empty.
    pub fn split_tree(&mut self, at: NodeRef) -> (Subtree, Subtree, Subtree) {
        let (left, right) = RedBlack::<C>::split(&mut self.tree, at);
        (left, Subtree::new(Some(at)), right)
    }

    /// Joins `left`, the single node `pivot` and `right` into one tree
    pub fn join_trees(&mut self, left: Subtree, pivot: Subtree, right: Subtree) -> Subtree {
        let pivot = pivot.into_root().expect("a join needs a pivot node");
        RedBlack::<C>::join(&mut self.tree, left, pivot, right)
    }

    /// Splits the whole tree right before `before`
    ///
    /// With `None`, everything goes to the left part. The tree is left
    /// empty.
    pub fn split_at(&mut self, before: Option<NodeRef>) -> (Subtree, Subtree) {
        match before {
            None => (self.take(), Subtree::empty()),
            Some(before) => {
                let (left, pivot, right) = self.split_tree(before);
                let right = self.join_trees(Subtree::empty(), pivot, right);
                (left, right)
            }
        }
    }

    /// Joins two trees without a pivot, borrowing the last node of `left`
    ///
    /// The result always has a black root, even when one side is empty.
    pub fn concat(&mut self, left: Subtree, right: Subtree) -> Subtree {
        if left.is_empty() {
            return RedBlack::<C>::blacken(&mut self.tree, right, 0).0;
        }
        if right.is_empty() {
            return RedBlack::<C>::blacken(&mut self.tree, left, 0).0;
        }
        let saved = self.tree.replace_root(left.into_root());
        let last = self.tree.last().expect("the left tree is not empty");
        RedBlack::<C>::detach(&mut self.tree, last);
        let left = Subtree::new(self.tree.replace_root(saved));
        RedBlack::<C>::join(&mut self.tree, left, last, right)
    }

    /// Splices the nodes of `range` in right before `before`, or at the end
    pub fn insert_range(&mut self, before: Option<NodeRef>, range: Subtree) {
        if range.is_empty() {
            return;
        }
        if let Some(before) = before {
            assert!(self.tree.owns(before), "{before} does not belong to this tree");
        }
        let (left, right) = self.split_at(before);
        let left = self.concat(left, range);
        let all = self.concat(left, right);
        self.install(all);
    }

    /// Moves the nodes of `[begin, end)` out into a tree of their own
    ///
    /// A `None` end stands for the end of the tree, and a `None` begin
    /// for an empty range.
    pub fn split_range(&mut self, begin: Option<NodeRef>, end: Option<NodeRef>) -> Subtree {
        let Some(begin) = begin else {
            return Subtree::empty();
        };
        assert!(self.tree.owns(begin), "{begin} does not belong to this tree");
        if let Some(end) = end {
            assert!(self.tree.owns(end), "{end} does not belong to this tree");
            match self.tree.compare_positions(begin, end) {
                Ordering::Less => {}
                Ordering::Equal => return Subtree::empty(),
                Ordering::Greater => {
                    panic!("the range end {end} comes before its beginning {begin}")
                }
            }
        }
        let (left, rest) = self.split_at(Some(begin));
        self.install(rest);
        let (middle, right) = self.split_at(end);
        let outside = self.concat(left, right);
        self.install(outside);
        middle
    }

    /// Deep-copies a detached tree, colors included
    pub fn clone_subtree(&mut self, subtree: &Subtree) -> Subtree
    where
        T: Clone,
        S: Clone,
    {
        self.tree.clone_subtree(subtree)
    }
}

impl<T, S, Y, C> FromIterator<T> for AugTree<T, S, Y, C>
where
    Y: Synthesizer<T, S> + Default,
    C: ColorAccess<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect(), Y::default())
    }
}

impl<T, S, Y, C> Extend<T> for AugTree<T, S, Y, C>
where
    Y: Synthesizer<T, S>,
    C: ColorAccess<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}
