use crate::node::{LEFT, NodeRef, RIGHT};
use crate::tree::{BinaryTree, Subtree};

/// In-order iterator over node handles
///
/// Both ends are inclusive; the iterator is exhausted once they cross.
pub struct Nodes<'a, T, S, Y> {
    tree: &'a BinaryTree<T, S, Y>,
    front: Option<NodeRef>,
    back: Option<NodeRef>,
}

impl<'a, T, S, Y> Nodes<'a, T, S, Y> {
    fn new(tree: &'a BinaryTree<T, S, Y>, front: Option<NodeRef>, back: Option<NodeRef>) -> Self {
        match (front, back) {
            (Some(_), Some(_)) => Self { tree, front, back },
            _ => Self {
                tree,
                front: None,
                back: None,
            },
        }
    }

    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<T, S, Y> Iterator for Nodes<'_, T, S, Y> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let node = self.front?;
        if Some(node) == self.back {
            self.finish();
        } else {
            self.front = self.tree.successor(node);
        }
        Some(node)
    }
}

impl<T, S, Y> DoubleEndedIterator for Nodes<'_, T, S, Y> {
    fn next_back(&mut self) -> Option<NodeRef> {
        let node = self.back?;
        if Some(node) == self.front {
            self.finish();
        } else {
            self.back = self.tree.predecessor(node);
        }
        Some(node)
    }
}

/// In-order iterator over values
pub struct Iter<'a, T, S, Y> {
    nodes: Nodes<'a, T, S, Y>,
}

impl<'a, T, S, Y> Iterator for Iter<'a, T, S, Y> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let tree = self.nodes.tree;
        self.nodes.next().map(|n| tree.get(n))
    }
}

impl<'a, T, S, Y> DoubleEndedIterator for Iter<'a, T, S, Y> {
    fn next_back(&mut self) -> Option<&'a T> {
        let tree = self.nodes.tree;
        self.nodes.next_back().map(|n| tree.get(n))
    }
}

impl<'a, T, S, Y> IntoIterator for &'a BinaryTree<T, S, Y> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S, Y>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A position in the tree that can step both ways
///
/// The position past the last node is represented by `None`; stepping
/// forward from there stays there, and stepping back lands on the last
/// node.
pub struct Cursor<'a, T, S, Y> {
    tree: &'a BinaryTree<T, S, Y>,
    node: Option<NodeRef>,
}

impl<'a, T, S, Y> Cursor<'a, T, S, Y> {
    pub fn node(&self) -> Option<NodeRef> {
        self.node
    }

    pub fn value(&self) -> Option<&'a T> {
        let tree = self.tree;
        self.node.map(|n| tree.get(n))
    }

    pub fn synth(&self) -> Option<&'a S> {
        let tree = self.tree;
        self.node.map(|n| tree.synth(n))
    }

    pub fn move_next(&mut self) {
        if let Some(node) = self.node {
            self.node = self.tree.successor(node);
        }
    }

    /// Steps back; returns `false` when already at the first node
    pub fn move_prev(&mut self) -> bool {
        let prev = match self.node {
            Some(node) => self.tree.predecessor(node),
            None => self.tree.last(),
        };
        match prev {
            Some(prev) => {
                self.node = Some(prev);
                true
            }
            None => false,
        }
    }
}

impl<T, S, Y> BinaryTree<T, S, Y> {
    pub fn nodes(&self) -> Nodes<'_, T, S, Y> {
        Nodes::new(self, self.first(), self.last())
    }

    pub fn iter(&self) -> Iter<'_, T, S, Y> {
        Iter { nodes: self.nodes() }
    }

    /// Node handles of a detached tree, in order
    pub fn nodes_of(&self, subtree: &Subtree) -> Nodes<'_, T, S, Y> {
        let (front, back) = match subtree.root() {
            Some(root) => (Some(self.edge(root, LEFT)), Some(self.edge(root, RIGHT))),
            None => (None, None),
        };
        Nodes::new(self, front, back)
    }

    pub fn iter_subtree(&self, subtree: &Subtree) -> Iter<'_, T, S, Y> {
        Iter {
            nodes: self.nodes_of(subtree),
        }
    }

    /// Node handles of `[begin, end)`, with `None` as in [Self::detach_tree]
    pub fn nodes_in(&self, begin: Option<NodeRef>, end: Option<NodeRef>) -> Nodes<'_, T, S, Y> {
        let back = match (begin, end) {
            (Some(b), Some(e)) if b == e => None,
            (Some(_), Some(e)) => self.predecessor(e),
            (Some(b), None) => Some(self.edge(self.root_of(b), RIGHT)),
            (None, _) => None,
        };
        Nodes::new(self, begin, back)
    }

    pub fn range(&self, begin: Option<NodeRef>, end: Option<NodeRef>) -> Iter<'_, T, S, Y> {
        Iter {
            nodes: self.nodes_in(begin, end),
        }
    }

    /// A cursor at `node`, or past the end for `None`
    pub fn cursor(&self, node: Option<NodeRef>) -> Cursor<'_, T, S, Y> {
        Cursor { tree: self, node }
    }

    pub fn cursor_front(&self) -> Cursor<'_, T, S, Y> {
        self.cursor(self.first())
    }
}

#[cfg(test)]
mod tests {
    use crate::synth::SizeSynth;
    use crate::tree::BinaryTree;

    type SizeTree = BinaryTree<i32, usize, SizeSynth>;

    fn numbers(n: i32) -> SizeTree {
        let mut tree = SizeTree::default();
        let all = tree.build_tree_copy(&(0..n).collect::<Vec<_>>());
        tree.set_root(all);
        tree
    }

    #[test]
    fn test_double_ended() {
        let tree = numbers(10);
        let mut iter = tree.iter();
        assert_eq!(Some(&0), iter.next());
        assert_eq!(Some(&9), iter.next_back());
        assert_eq!(vec![1, 2, 3, 4, 5, 6, 7, 8], iter.copied().collect::<Vec<_>>());
        assert_eq!(
            (0..10).rev().collect::<Vec<_>>(),
            tree.iter().rev().copied().collect::<Vec<_>>()
        );

        let mut iter = tree.iter();
        for _ in 0..5 {
            iter.next();
            iter.next_back();
        }
        assert_eq!(None, iter.next());
        assert_eq!(None, iter.next_back());
        assert_eq!(0, SizeTree::default().iter().count());
    }

    #[test]
    fn test_range() {
        let tree = numbers(10);
        let nodes: Vec<_> = tree.nodes().collect();
        let collect = |b: usize, e: Option<usize>| {
            tree.range(Some(nodes[b]), e.map(|e| nodes[e]))
                .copied()
                .collect::<Vec<_>>()
        };
        assert_eq!(vec![3, 4, 5], collect(3, Some(6)));
        assert_eq!(Vec::<i32>::new(), collect(4, Some(4)));
        assert_eq!(vec![7, 8, 9], collect(7, None));
        assert_eq!(vec![0], collect(0, Some(1)));
        assert_eq!(0, tree.range(None, None).count());
        assert_eq!(
            vec![5, 4, 3],
            tree.range(Some(nodes[3]), Some(nodes[6])).rev().copied().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_cursor() {
        let tree = numbers(3);
        let mut cursor = tree.cursor_front();
        assert_eq!(Some(&0), cursor.value());
        assert_eq!(Some(&1), cursor.synth());
        assert!(!cursor.move_prev());
        cursor.move_next();
        cursor.move_next();
        assert_eq!(Some(&2), cursor.value());
        cursor.move_next();
        assert_eq!(None, cursor.node());
        cursor.move_next();
        assert_eq!(None, cursor.node());
        assert!(cursor.move_prev());
        assert_eq!(Some(&2), cursor.value());
    }
}
