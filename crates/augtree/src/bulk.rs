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

//! Operations touching many nodes at once

use crate::node::{LEFT, Node, NodeRef, RIGHT};
use crate::synth::Synthesizer;
use crate::tree::{BinaryTree, Subtree};
use log::trace;

impl<T, S, Y: Synthesizer<T, S>> BinaryTree<T, S, Y> {
    /// Links a sequence of freestanding nodes into a balanced tree
    ///
    /// The middle node becomes the root, so that for any node the left
    /// subtree is at most one node larger than the right one.
    pub(crate) fn link_balanced(&mut self, nodes: &[NodeRef]) -> Option<NodeRef> {
        if nodes.is_empty() {
            return None;
        }
        let mid = nodes.len() / 2;
        let root = nodes[mid];
        let left = self.link_balanced(&nodes[..mid]);
        let right = self.link_balanced(&nodes[mid + 1..]);
        self.node_mut(root).parent = None;
        self.link(root, LEFT, left);
        self.link(root, RIGHT, right);
        self.synthesize_node(root);
        Some(root)
    }

    /// Builds a balanced tree out of `values`, in order
    pub fn build_tree_move(&mut self, values: Vec<T>) -> Subtree {
        trace!("building a tree of {} nodes", values.len());
        let nodes: Vec<NodeRef> = values.into_iter().map(|v| self.new_node(v)).collect();
        Subtree::new(self.link_balanced(&nodes))
    }

    pub fn build_tree_copy(&mut self, values: &[T]) -> Subtree
    where
        T: Clone,
    {
        self.build_tree_move(values.to_vec())
    }

    /// Moves the nodes of `[begin, end)` out into a tree of their own
    ///
    /// A `None` end stands for the end of the tree, and a `None` begin
    /// for an empty range. The remaining tree keeps its order but not
    /// necessarily its shape. `end` must not come before `begin`.
    pub fn detach_tree(&mut self, begin: Option<NodeRef>, end: Option<NodeRef>) -> Subtree {
        let Some(begin) = begin else {
            return Subtree::empty();
        };
        assert!(self.owns(begin), "{begin} does not belong to this tree");
        let mut nodes = vec![];
        let mut x = Some(begin);
        while x != end {
            let n = x.unwrap_or_else(|| {
                panic!("the range starting at {begin} never reaches its end")
            });
            nodes.push(n);
            x = self.successor(n);
        }
        trace!("detaching {} nodes starting at {begin}", nodes.len());
        for &n in &nodes {
            self.unlink(n);
        }
        Subtree::new(self.link_balanced(&nodes))
    }
}

impl<T: Clone, S: Clone, Y> BinaryTree<T, S, Y> {
    fn copy_node(&mut self, node: NodeRef) -> NodeRef {
        let n = self.node(node);
        let copy = Node::new(n.value.clone(), n.synth.clone());
        NodeRef(self.slab_insert(copy))
    }

    fn clone_from_root(&mut self, root: Option<NodeRef>) -> Subtree {
        let Some(root) = root else {
            return Subtree::empty();
        };
        let top = self.copy_node(root);
        let mut stack = vec![(root, top)];
        let mut count = 1;
        while let Some((src, dst)) = stack.pop() {
            for dir in [LEFT, RIGHT] {
                if let Some(child) = self.child(src, dir) {
                    let copy = self.copy_node(child);
                    self.link(dst, dir, Some(copy));
                    stack.push((child, copy));
                    count += 1;
                }
            }
        }
        trace!("cloned {count} nodes from {root}");
        Subtree::new(Some(top))
    }

    /// Deep-copies a detached tree into new nodes of the same arena
    pub fn clone_subtree(&mut self, subtree: &Subtree) -> Subtree {
        self.clone_from_root(subtree.root())
    }

    /// Deep-copies the main tree into a detached tree
    pub fn clone_tree(&mut self) -> Subtree {
        self.clone_from_root(self.root())
    }
}

impl<T, S, Y> BinaryTree<T, S, Y> {
    /// Frees every node of a detached tree and returns how many there were
    pub fn delete_subtree(&mut self, subtree: Subtree) -> usize {
        let Some(root) = subtree.into_root() else {
            return 0;
        };
        assert!(
            self.parent(root).is_none() && self.root() != Some(root),
            "{root} is not a detached root",
        );
        let mut stack = vec![root];
        let mut count = 0;
        while let Some(n) = stack.pop() {
            let node = self.slab_remove(n);
            stack.extend(node.children.into_iter().flatten());
            count += 1;
        }
        trace!("deleted {count} nodes from {root}");
        count
    }

    /// Frees every node of the main tree
    pub fn delete_tree(&mut self) -> usize {
        let whole = self.take_root();
        self.delete_subtree(whole)
    }
}
