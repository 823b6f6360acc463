// Copyright (c) 2025 gudzpoz
// Copyright (c) 2019 Sevag Hanssian
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

// See crates/augtree/LICENSE for more license information.

use crate::error::IntegrityError;
use crate::node::{LEFT, Node, NodeRef, NodeView, RIGHT};
use crate::select::{Accumulator, Branch, BranchSelector, InsertSelector};
use crate::synth::Synthesizer;
use slab::Slab;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

/// A tree detached from the main root of a [BinaryTree]
///
/// The nodes stay in the arena of the tree they came from, and the
/// subtree must only be handed back to that tree. Moving the handle
/// moves the ownership of all of its nodes: there is no way to clone
/// it, and consuming it leaves nothing behind.
#[must_use = "a dropped subtree stays unreachable in the arena until the tree is cleared"]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Subtree {
    root: Option<NodeRef>,
}

impl Subtree {
    /// The empty tree
    pub const fn empty() -> Self {
        Self { root: None }
    }
    pub(crate) fn new(root: Option<NodeRef>) -> Self {
        Self { root }
    }
    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
    pub(crate) fn into_root(self) -> Option<NodeRef> {
        self.root
    }
}

/// A binary tree over a slab arena, with synthesized subtree data
///
/// The tree keeps no ordering or balancing policy of its own. Every
/// structural operation keeps the synthesized data of all nodes
/// reachable from the main root consistent, except for [Self::get_mut]
/// which requires a call to [Self::refresh_synthesized_result] after
/// the value changes.
pub struct BinaryTree<T, S, Y> {
    slab: Slab<Node<T, S>>,
    root: Option<NodeRef>,
    synthesizer: Y,
}

impl<T, S, Y: Default> Default for BinaryTree<T, S, Y> {
    fn default() -> Self {
        Self::new(Y::default())
    }
}

impl<T: Clone, S: Clone, Y: Clone> Clone for BinaryTree<T, S, Y> {
    fn clone(&self) -> Self {
        Self {
            slab: self.slab.clone(),
            root: self.root,
            synthesizer: self.synthesizer.clone(),
        }
    }
}

impl<T: fmt::Debug, S, Y> fmt::Debug for BinaryTree<T, S, Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, S, Y> BinaryTree<T, S, Y> {
    pub fn new(synthesizer: Y) -> Self {
        Self::with_capacity(0, synthesizer)
    }

    /// Creates a tree whose arena can hold `capacity` nodes without reallocating
    pub fn with_capacity(capacity: usize, synthesizer: Y) -> Self {
        Self {
            slab: Slab::with_capacity(capacity),
            root: None,
            synthesizer,
        }
    }

    pub fn synthesizer(&self) -> &Y {
        &self.synthesizer
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes in the arena, detached subtrees included
    pub fn node_count(&self) -> usize {
        self.slab.len()
    }

    pub(crate) fn node(&self, node: NodeRef) -> &Node<T, S> {
        &self.slab[node.0]
    }

    pub(crate) fn node_mut(&mut self, node: NodeRef) -> &mut Node<T, S> {
        &mut self.slab[node.0]
    }

    pub(crate) fn slab_insert(&mut self, node: Node<T, S>) -> usize {
        self.slab.insert(node)
    }

    pub(crate) fn slab_remove(&mut self, node: NodeRef) -> Node<T, S> {
        self.slab.remove(node.0)
    }

    pub fn get(&self, node: NodeRef) -> &T {
        &self.node(node).value
    }

    /// Mutable access to a node value
    ///
    /// The synthesized data is not refreshed: call
    /// [Self::refresh_synthesized_result] afterwards, or use
    /// [Self::update] instead.
    pub fn get_mut(&mut self, node: NodeRef) -> &mut T {
        &mut self.node_mut(node).value
    }

    pub fn synth(&self, node: NodeRef) -> &S {
        &self.node(node).synth
    }

    pub fn view(&self, node: NodeRef) -> NodeView<'_, T, S> {
        let n = self.node(node);
        NodeView {
            value: &n.value,
            synth: &n.synth,
            left: n.children[LEFT].map(|l| &self.node(l).synth),
            right: n.children[RIGHT].map(|r| &self.node(r).synth),
        }
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).parent
    }

    pub fn left(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).children[LEFT]
    }

    pub fn right(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node).children[RIGHT]
    }

    /// The child of `node` on side `dir`, [LEFT] or [RIGHT]
    pub fn child(&self, node: NodeRef, dir: usize) -> Option<NodeRef> {
        self.node(node).children[dir]
    }

    /// The side of its parent that `node` hangs on
    pub(crate) fn side_of(&self, node: NodeRef) -> usize {
        let parent = self.node(node).parent.expect("the root hangs on no side");
        self.side_of_child(parent, node)
    }

    fn side_of_child(&self, parent: NodeRef, child: NodeRef) -> usize {
        let children = self.node(parent).children;
        if children[LEFT] == Some(child) {
            LEFT
        } else {
            assert_eq!(
                children[RIGHT],
                Some(child),
                "{child} claims {parent} as its parent, but {parent} does not own it",
            );
            RIGHT
        }
    }

    /// The extreme node of the subtree at `this` on side `dir`
    pub fn edge(&self, mut this: NodeRef, dir: usize) -> NodeRef {
        while let Some(node) = self.node(this).children[dir] {
            this = node;
        }
        this
    }

    /// The in-order neighbour of `this` on side `dir`
    pub fn next(&self, mut this: NodeRef, dir: usize) -> Option<NodeRef> {
        if let Some(child) = self.node(this).children[dir] {
            return Some(self.edge(child, dir ^ 1));
        }
        let mut y = self.node(this).parent;
        while let Some(p) = y
            && self.node(p).children[dir] == Some(this)
        {
            this = p;
            y = self.node(p).parent;
        }
        y
    }

    /// The node following `node` in order, `None` past the end
    pub fn successor(&self, node: NodeRef) -> Option<NodeRef> {
        self.next(node, RIGHT)
    }

    /// The node preceding `node` in order, `None` before the start
    pub fn predecessor(&self, node: NodeRef) -> Option<NodeRef> {
        self.next(node, LEFT)
    }

    pub fn first(&self) -> Option<NodeRef> {
        self.root.map(|r| self.edge(r, LEFT))
    }

    pub fn last(&self) -> Option<NodeRef> {
        self.root.map(|r| self.edge(r, RIGHT))
    }

    /// The root of whatever tree `node` currently belongs to
    pub fn root_of(&self, mut node: NodeRef) -> NodeRef {
        while let Some(parent) = self.node(node).parent {
            node = parent;
        }
        node
    }

    /// Whether `node` is reachable from the main root
    ///
    /// This only looks at the slot `node` points to in this arena. A
    /// handle taken from another tree passes whenever that slot happens
    /// to hold a node under the main root here.
    pub fn owns(&self, node: NodeRef) -> bool {
        self.slab.contains(node.0) && Some(self.root_of(node)) == self.root
    }

    fn path_from_root(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut path = vec![node];
        let mut x = node;
        while let Some(parent) = self.node(x).parent {
            path.push(parent);
            x = parent;
        }
        path.reverse();
        path
    }

    /// Compares the in-order positions of two nodes of the same tree
    pub fn compare_positions(&self, a: NodeRef, b: NodeRef) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.path_from_root(a);
        let path_b = self.path_from_root(b);
        assert_eq!(path_a[0], path_b[0], "{a} and {b} belong to different trees");
        let common = path_a.iter().zip(&path_b).take_while(|(x, y)| x == y).count();
        if common == path_a.len() {
            // a is an ancestor of b
            return if self.node(a).children[LEFT] == Some(path_b[common]) {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        if common == path_b.len() {
            return if self.node(b).children[LEFT] == Some(path_a[common]) {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        let fork = path_a[common - 1];
        if self.node(fork).children[LEFT] == Some(path_a[common]) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    /// Descends from the main root as told by `selector`
    ///
    /// Returns the first node the selector matches, or `None` once the
    /// descent falls off the tree.
    pub fn find<B: BranchSelector<T, S>>(&self, selector: &mut B) -> Option<NodeRef> {
        let mut x = self.root;
        while let Some(n) = x {
            x = match selector.select(self.view(n)) {
                Branch::Left => self.node(n).children[LEFT],
                Branch::Right => self.node(n).children[RIGHT],
                Branch::Match => return Some(n),
            };
        }
        None
    }

    /// Accumulates every node strictly before `node` into `acc`
    pub fn sum_before<A: Accumulator<T, S>>(&self, node: NodeRef, acc: &mut A) {
        if let Some(left) = self.node(node).children[LEFT] {
            acc.add_subtree(&self.node(left).synth);
        }
        let mut x = node;
        while let Some(p) = self.node(x).parent {
            let pn = self.node(p);
            if pn.children[RIGHT] == Some(x) {
                if let Some(left) = pn.children[LEFT] {
                    acc.add_subtree(&self.node(left).synth);
                }
                acc.add_node(&pn.value, &pn.synth);
            }
            x = p;
        }
    }

    pub(crate) fn link(&mut self, parent: NodeRef, dir: usize, child: Option<NodeRef>) {
        self.node_mut(parent).children[dir] = child;
        if let Some(child) = child {
            self.node_mut(child).parent = Some(parent);
        }
    }

    /// Puts `y` where `x` hangs
    ///
    /// The main root is updated when `x` is the main root. A detached
    /// root is replaced silently and the caller keeps track of it.
    pub(crate) fn replace(&mut self, x: NodeRef, y: Option<NodeRef>) {
        let parent = self.node(x).parent;
        if let Some(y) = y {
            self.node_mut(y).parent = parent;
        }
        match parent {
            None => {
                if self.root == Some(x) {
                    self.root = y;
                }
            }
            Some(p) => {
                let dir = self.side_of_child(p, x);
                self.node_mut(p).children[dir] = y;
            }
        }
    }

    pub(crate) fn replace_root(&mut self, root: Option<NodeRef>) -> Option<NodeRef> {
        mem::replace(&mut self.root, root)
    }

    /// Moves the whole tree out, leaving the main root empty
    pub fn take_root(&mut self) -> Subtree {
        Subtree::new(self.root.take())
    }

    /// Makes `subtree` the main tree
    ///
    /// The main root must be empty.
    pub fn set_root(&mut self, subtree: Subtree) {
        assert!(self.root.is_none(), "the tree still has a root");
        if let Some(root) = subtree.root {
            assert!(self.node(root).parent.is_none(), "{root} is not a detached root");
        }
        self.root = subtree.into_root();
    }

    /// Drops every node, detached subtrees included
    pub fn clear(&mut self) {
        self.slab.clear();
        self.root = None;
    }

    /// Releases a freestanding node and returns its value
    pub fn free(&mut self, node: NodeRef) -> T {
        assert!(
            self.node(node).is_isolated() && self.root != Some(node),
            "{node} is still linked into a tree",
        );
        self.slab.remove(node.0).value
    }
}

impl<T, S, Y: Synthesizer<T, S>> BinaryTree<T, S, Y> {
    /// Recomputes the synthesized data of a single node from its children
    pub(crate) fn synthesize_node(&mut self, node: NodeRef) {
        let n = self.node(node);
        let left = n.children[LEFT].map(|l| &self.node(l).synth);
        let right = n.children[RIGHT].map(|r| &self.node(r).synth);
        let synth = self.synthesizer.synthesize(&n.value, left, right);
        self.node_mut(node).synth = synth;
    }

    /// Recomputes the synthesized data from `node` up to its root
    pub fn refresh_synthesized_result(&mut self, node: NodeRef) {
        let mut x = Some(node);
        while let Some(n) = x {
            self.synthesize_node(n);
            x = self.node(n).parent;
        }
    }

    /// Recomputes the synthesized data of every node under the main root
    pub fn refresh_tree_synthesized_result(&mut self) {
        self.refresh_subtree(self.root);
    }

    pub(crate) fn refresh_subtree(&mut self, root: Option<NodeRef>) {
        let Some(root) = root else { return };
        let mut stack = vec![(root, false)];
        while let Some((n, visited)) = stack.pop() {
            if visited {
                self.synthesize_node(n);
            } else {
                stack.push((n, true));
                let children = self.node(n).children;
                stack.extend(children.into_iter().flatten().map(|c| (c, false)));
            }
        }
    }

    /// Changes a value in place and refreshes the synthesized data
    pub fn update<R>(&mut self, node: NodeRef, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.node_mut(node).value);
        self.refresh_synthesized_result(node);
        result
    }

    pub(crate) fn new_node(&mut self, value: T) -> NodeRef {
        let synth = self.synthesizer.synthesize(&value, None, None);
        NodeRef(self.slab.insert(Node::new(value, synth)))
    }

    /// Allocates a freestanding single-node tree
    pub fn make_node(&mut self, value: T) -> Subtree {
        Subtree::new(Some(self.new_node(value)))
    }

    /// Inserts `value` as a leaf where `selector` leads it
    pub fn select_insert<I: InsertSelector<T>>(&mut self, mut selector: I, value: T) -> NodeRef {
        let mut parent = None;
        let mut dir = LEFT;
        let mut x = self.root;
        while let Some(n) = x {
            dir = if selector.go_left(&value, &self.node(n).value) {
                LEFT
            } else {
                RIGHT
            };
            parent = Some(n);
            x = self.node(n).children[dir];
        }
        let z = self.new_node(value);
        match parent {
            None => self.root = Some(z),
            Some(p) => {
                self.link(p, dir, Some(z));
                self.refresh_synthesized_result(p);
            }
        }
        z
    }

    /// Splices `subtree` in right before `before`, or at the end for `None`
    ///
    /// The subtree's own synthesized data must already be consistent;
    /// only the ancestors of the attachment point get refreshed.
    pub fn insert_before(&mut self, before: Option<NodeRef>, subtree: Subtree) {
        let Some(s) = subtree.into_root() else { return };
        assert!(
            self.node(s).parent.is_none() && self.root != Some(s),
            "{s} is not a detached root",
        );
        let (parent, dir) = match before {
            Some(b) => {
                assert!(self.owns(b), "{b} does not belong to this tree");
                match self.node(b).children[LEFT] {
                    None => (b, LEFT),
                    Some(l) => (self.edge(l, RIGHT), RIGHT),
                }
            }
            None => match self.root {
                None => {
                    self.root = Some(s);
                    return;
                }
                Some(r) => (self.edge(r, RIGHT), RIGHT),
            },
        };
        self.link(parent, dir, Some(s));
        self.refresh_synthesized_result(parent);
    }

    /// Constructs a new node right before `before`, or at the end for `None`
    ///
    /// Panics before allocating anything if `before` is not in the tree.
    pub fn emplace_before(&mut self, before: Option<NodeRef>, value: T) -> NodeRef {
        if let Some(b) = before {
            assert!(self.owns(b), "{b} does not belong to this tree");
        }
        let z = self.new_node(value);
        self.insert_before(before, Subtree::new(Some(z)));
        z
    }

    /// Rotates `x` down towards `dir`, lifting its child on the other side
    ///
    /// The lifted node takes over the synthesized data of `x`, since the
    /// content of the subtree is unchanged; only `x` is re-synthesized.
    pub fn rotate(&mut self, x: NodeRef, dir: usize) {
        assert!(dir == LEFT || dir == RIGHT);
        let y = self.node(x).children[dir ^ 1]
            .unwrap_or_else(|| panic!("rotating {x} without a child to lift"));

        let beta = self.node(y).children[dir];
        self.link(x, dir ^ 1, beta);
        self.replace(x, Some(y));
        self.link(y, dir, Some(x));

        let (xn, yn) = self.slab.get2_mut(x.0, y.0).expect("distinct nodes");
        mem::swap(&mut xn.synth, &mut yn.synth);
        self.synthesize_node(x);
    }

    pub fn rotate_left(&mut self, x: NodeRef) {
        self.rotate(x, LEFT);
    }

    pub fn rotate_right(&mut self, x: NodeRef) {
        self.rotate(x, RIGHT);
    }

    /// Swaps the position of `a`, which must have two children, with its successor
    ///
    /// Only links move: both nodes keep their values and handles. The
    /// synthesized data along the affected path is left stale.
    pub(crate) fn swap_with_successor(&mut self, a: NodeRef) -> NodeRef {
        let [a_left, a_right] = self.node(a).children;
        let (Some(a_left), Some(a_right)) = (a_left, a_right) else {
            panic!("{a} needs two children to swap with its successor");
        };
        let b = self.edge(a_right, LEFT);
        let b_parent = self.node(b).parent.expect("the successor lies below");
        let b_right = self.node(b).children[RIGHT];

        self.replace(a, Some(b));
        self.link(b, LEFT, Some(a_left));
        self.node_mut(a).children[LEFT] = None;
        self.link(a, RIGHT, b_right);
        if b == a_right {
            self.link(b, RIGHT, Some(a));
        } else {
            self.link(b_parent, LEFT, Some(a));
            self.link(b, RIGHT, Some(a_right));
        }
        b
    }

    /// Replaces `z`, which has at most one child, by that child
    ///
    /// Returns the former parent of `z` and the child that took its
    /// place; `z` is left freestanding.
    pub(crate) fn splice_out(&mut self, z: NodeRef) -> (Option<NodeRef>, Option<NodeRef>) {
        let node = self.node(z);
        let [left, right] = node.children;
        assert!(left.is_none() || right.is_none(), "{z} has two children");
        let parent = node.parent;
        let child = left.or(right);
        self.replace(z, child);
        let node = self.node_mut(z);
        node.parent = None;
        node.children = [None, None];
        (parent, child)
    }

    /// Takes `z` out of the tree structure without deleting it
    pub(crate) fn unlink(&mut self, z: NodeRef) {
        if self.node(z).children.iter().all(Option::is_some) {
            self.swap_with_successor(z);
        }
        let (parent, _) = self.splice_out(z);
        if let Some(parent) = parent {
            self.refresh_synthesized_result(parent);
        }
        self.synthesize_node(z);
    }

    /// Deletes `node` and returns its value together with the node after it
    pub fn remove(&mut self, node: NodeRef) -> (T, Option<NodeRef>) {
        assert!(self.owns(node), "{node} does not belong to this tree");
        let next = self.successor(node);
        self.unlink(node);
        (self.slab.remove(node.0).value, next)
    }

    /// Deletes `node` and returns the node after it
    pub fn erase(&mut self, node: NodeRef) -> Option<NodeRef> {
        self.remove(node).1
    }
}

impl<T, S: PartialEq, Y: Synthesizer<T, S>> BinaryTree<T, S, Y> {
    /// Verifies parent links and synthesized data under the main root
    pub fn check_synthesized(&self) -> Result<(), IntegrityError> {
        self.check_subtree_synthesized(self.root)
    }

    /// Verifies parent links and synthesized data under a detached root
    pub fn check_subtree_synthesized(&self, root: Option<NodeRef>) -> Result<(), IntegrityError> {
        let Some(root) = root else { return Ok(()) };
        if self.node(root).parent.is_some() {
            return Err(IntegrityError::AttachedRoot(root));
        }
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            let node = self.node(n);
            for child in node.children.into_iter().flatten() {
                if self.node(child).parent != Some(n) {
                    return Err(IntegrityError::BrokenLink { node: child, parent: n });
                }
                stack.push(child);
            }
            let expected = self.synthesizer.synthesize(
                &node.value,
                node.children[LEFT].map(|l| &self.node(l).synth),
                node.children[RIGHT].map(|r| &self.node(r).synth),
            );
            if expected != node.synth {
                return Err(IntegrityError::StaleSynthesized(n));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{ByOrd, IndexFinder, Total};
    use crate::synth::{Size, SizeSynth};

    type SizeTree = BinaryTree<i32, usize, SizeSynth>;

    fn values(tree: &SizeTree) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    fn sum_values(value: &u32, left: Option<&u32>, right: Option<&u32>) -> u32 {
        value + left.copied().unwrap_or(0) + right.copied().unwrap_or(0)
    }

    fn ordered(values: &[i32]) -> SizeTree {
        let mut tree = SizeTree::default();
        for &v in values {
            tree.select_insert(ByOrd, v);
        }
        tree
    }

    #[test]
    fn test_select_insert() {
        let tree = ordered(&[5, 3, 8, 1, 4, 7, 9, 4]);
        assert_eq!(vec![1, 3, 4, 4, 5, 7, 8, 9], values(&tree));
        assert_eq!(8, *tree.synth(tree.root().unwrap()));
        tree.check_synthesized().unwrap();
    }

    #[test]
    fn test_basic_rotation() {
        let mut tree = ordered(&[5, 1, 8, 7, 9]);

        /*
         *      x
         *     / \
         *    /   y
         *   a   / \
         *      b   g
         */

        let (x, a, y, b, g) = (NodeRef(0), NodeRef(1), NodeRef(2), NodeRef(3), NodeRef(4));
        assert_eq!(tree.root(), Some(x));
        assert_eq!(tree.parent(x), None);
        assert_eq!(tree.node(x).children, [Some(a), Some(y)]);
        assert_eq!(tree.parent(a), Some(x));
        assert_eq!(tree.node(y).children, [Some(b), Some(g)]);
        assert_eq!(tree.parent(b), Some(y));
        assert_eq!(tree.parent(g), Some(y));
        assert_eq!(3, *tree.synth(y));

        tree.rotate_left(x);
        assert_eq!(vec![1, 5, 7, 8, 9], values(&tree));

        /*
         *      y
         *     / \
         *    x   g
         *   / \
         *  a   b
         */

        assert_eq!(tree.root(), Some(y));
        assert_eq!(tree.parent(y), None);
        assert_eq!(tree.node(y).children, [Some(x), Some(g)]);
        assert_eq!(tree.node(x).children, [Some(a), Some(b)]);
        assert_eq!(tree.parent(x), Some(y));
        assert_eq!(tree.parent(a), Some(x));
        assert_eq!(tree.parent(b), Some(x));
        assert_eq!(5, *tree.synth(y));
        assert_eq!(3, *tree.synth(x));
        tree.check_synthesized().unwrap();

        tree.rotate_right(y); // brings our tree back to its first shape
        assert_eq!(vec![1, 5, 7, 8, 9], values(&tree));
        assert_eq!(tree.root(), Some(x));
        assert_eq!(tree.node(x).children, [Some(a), Some(y)]);
        assert_eq!(tree.node(y).children, [Some(b), Some(g)]);
        assert_eq!(tree.parent(b), Some(y));
        assert_eq!(5, *tree.synth(x));
        assert_eq!(3, *tree.synth(y));
        tree.check_synthesized().unwrap();
    }

    #[test]
    #[should_panic(expected = "without a child to lift")]
    fn test_rotate_without_child() {
        let mut tree = ordered(&[1, 2]);
        let root = tree.root().unwrap();
        tree.rotate_right(root);
    }

    #[test]
    fn test_successor_predecessor() {
        let tree = ordered(&[50, 20, 70, 10, 30, 60, 80, 25]);
        let mut forward = vec![];
        let mut x = tree.first();
        while let Some(n) = x {
            forward.push(*tree.get(n));
            x = tree.successor(n);
        }
        assert_eq!(vec![10, 20, 25, 30, 50, 60, 70, 80], forward);

        let mut backward = vec![];
        let mut x = tree.last();
        while let Some(n) = x {
            backward.push(*tree.get(n));
            x = tree.predecessor(n);
        }
        forward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_emplace_before() {
        let mut tree = BinaryTree::<char, usize, SizeSynth>::default();
        tree.emplace_before(None, 'b');
        let d = tree.emplace_before(None, 'd');
        tree.emplace_before(Some(d), 'c');
        let first = tree.first();
        tree.emplace_before(first, 'a');
        assert_eq!("abcd", tree.iter().collect::<String>());
        assert_eq!(4, *tree.synth(tree.root().unwrap()));
        tree.check_synthesized().unwrap();
    }

    #[test]
    fn test_insert_subtree() {
        let mut tree = ordered(&[10, 20, 30]);
        let mut piece = tree.make_node(25);
        let extra = tree.make_node(26);
        let root = piece.root();
        tree.insert_before(None, extra);
        assert_eq!(vec![10, 20, 30, 26], values(&tree));
        let thirty = tree.find(&mut |v: &i32| 30_i32.cmp(v));
        tree.insert_before(thirty, std::mem::take(&mut piece));
        assert!(piece.is_empty());
        assert_eq!(vec![10, 20, 25, 30, 26], values(&tree));
        assert!(tree.owns(root.unwrap()));
        tree.check_synthesized().unwrap();
    }

    #[test]
    fn test_erase() {
        let mut tree = ordered(&[50, 20, 70, 10, 30, 60, 80, 25, 35]);
        let twenty = tree.find(&mut |v: &i32| 20_i32.cmp(v)).unwrap();
        let next = tree.erase(twenty);
        assert_eq!(Some(25), next.map(|n| *tree.get(n)));
        assert_eq!(vec![10, 25, 30, 35, 50, 60, 70, 80], values(&tree));
        tree.check_synthesized().unwrap();

        let root = tree.root().unwrap();
        let (value, next) = tree.remove(root);
        assert_eq!(50, value);
        assert_eq!(Some(60), next.map(|n| *tree.get(n)));
        assert_eq!(vec![10, 25, 30, 35, 60, 70, 80], values(&tree));
        tree.check_synthesized().unwrap();

        let last = tree.last().unwrap();
        assert_eq!(None, tree.erase(last));
        assert_eq!(6, tree.node_count());
        assert_eq!(6, *tree.synth(tree.root().unwrap()));
    }

    #[test]
    fn test_find_and_sum_before() {
        let mut tree = SizeTree::default();
        let all = tree.build_tree_copy(&(0..100).collect::<Vec<_>>());
        tree.set_root(all);

        let node = tree.find(&mut |v: &i32| 42_i32.cmp(v)).unwrap();
        assert_eq!(42, *tree.get(node));
        let mut before = Total::<Size, i32, usize>::new();
        tree.sum_before(node, &mut before);
        assert_eq!(42, before.get());

        let mut finder = IndexFinder::<Size, i32, usize>::new(42);
        assert_eq!(Some(node), tree.find(&mut finder));
        assert_eq!(0, finder.offset());
        assert_eq!(None, tree.find(&mut IndexFinder::<Size, i32, usize>::new(100)));
        assert_eq!(None, tree.find(&mut |v: &i32| 1000_i32.cmp(v)));
    }

    #[test]
    fn test_compare_positions() {
        let tree = ordered(&[50, 20, 70, 10, 30, 60, 80]);
        let nodes: Vec<NodeRef> = tree.nodes().collect();
        for (i, &a) in nodes.iter().enumerate() {
            for (j, &b) in nodes.iter().enumerate() {
                assert_eq!(i.cmp(&j), tree.compare_positions(a, b), "{i} vs {j}");
            }
        }
    }

    #[test]
    fn test_update_refreshes() {
        let mut tree = BinaryTree::<u32, u32, _>::new(sum_values);
        let sub = tree.build_tree_copy(&[1, 2, 3, 4, 5]);
        tree.set_root(sub);
        let root = tree.root().unwrap();
        assert_eq!(15, *tree.synth(root));

        let first = tree.first().unwrap();
        tree.update(first, |v| *v = 11);
        assert_eq!(25, *tree.synth(root));
        tree.check_synthesized().unwrap();

        *tree.get_mut(first) = 1;
        assert_eq!(Err(IntegrityError::StaleSynthesized(first)), tree.check_synthesized());
        tree.refresh_tree_synthesized_result();
        assert_eq!(15, *tree.synth(root));
        tree.check_synthesized().unwrap();
    }

    #[test]
    fn test_take_and_set_root() {
        let mut tree = ordered(&[1, 2, 3]);
        let whole = tree.take_root();
        assert!(tree.is_empty());
        assert_eq!(0, tree.iter().count());
        tree.set_root(whole);
        assert_eq!(vec![1, 2, 3], values(&tree));
    }

    #[test]
    #[should_panic(expected = "does not belong to this tree")]
    fn test_erase_foreign_node() {
        let mut tree = ordered(&[1, 2, 3]);
        let stray = tree.make_node(4).root().unwrap();
        tree.erase(stray);
    }

    #[test]
    fn test_emplace_before_foreign_node() {
        let mut tree = ordered(&[1, 2, 3]);
        let stray = tree.make_node(4).root().unwrap();
        assert!(!tree.owns(stray));
        assert_eq!(4, tree.node_count());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tree.emplace_before(Some(stray), 5)
        }));
        assert!(result.is_err());
        assert_eq!(4, tree.node_count());
        assert_eq!(vec![1, 2, 3], values(&tree));
        tree.check_synthesized().unwrap();
    }
}
