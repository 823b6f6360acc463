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

// Copyright (c) 2015 - present Microsoft Corporation
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
use crate::node::{LEFT, NodeRef, RIGHT};
use crate::synth::Synthesizer;
use crate::tree::{BinaryTree, Subtree};
use log::trace;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    #[default]
    Red,
    Black,
}

/// Reads and writes the color bit kept inside a node value
///
/// The color never takes part in synthesized data: synthesizers must
/// ignore it, since recoloring does not refresh anything.
pub trait ColorAccess<T> {
    fn color(value: &T) -> Color;
    fn set_color(value: &mut T, color: Color);
}

/// A value paired with a color bit, for trees with no room for one
#[derive(Debug, Clone, Default)]
pub struct Colored<T> {
    pub value: T,
    color: Color,
}

impl<T> Colored<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            color: Color::Red,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> From<T> for Colored<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Deref for Colored<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Colored<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

// Comparisons look at the value only, so that ordering selectors do
// not care about colors.
impl<T: PartialEq> PartialEq for Colored<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<T: Eq> Eq for Colored<T> {}
impl<T: PartialOrd> PartialOrd for Colored<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}
impl<T: Ord> Ord for Colored<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

/// [ColorAccess] for [Colored] values
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorField;

impl<T> ColorAccess<Colored<T>> for ColorField {
    fn color(value: &Colored<T>) -> Color {
        value.color
    }
    fn set_color(value: &mut Colored<T>, color: Color) {
        value.color = color;
    }
}

/// Red-black algorithms over a [BinaryTree], with colors read through `C`
///
/// Functions rotating nodes work on the main root of the tree. To
/// rebalance a detached tree, it is installed as the main root for the
/// duration of the call.
pub struct RedBlack<C>(PhantomData<C>);

impl<C> RedBlack<C> {
    fn color<T, S, Y>(tree: &BinaryTree<T, S, Y>, node: Option<NodeRef>) -> Color
    where
        C: ColorAccess<T>,
    {
        node.map_or(Color::Black, |n| C::color(tree.get(n)))
    }

    fn is_red<T, S, Y>(tree: &BinaryTree<T, S, Y>, node: Option<NodeRef>) -> bool
    where
        C: ColorAccess<T>,
    {
        Self::color(tree, node) == Color::Red
    }

    fn paint<T, S, Y>(tree: &mut BinaryTree<T, S, Y>, node: NodeRef, color: Color)
    where
        C: ColorAccess<T>,
    {
        C::set_color(tree.get_mut(node), color);
    }

    /// Restores the red-black properties after `x` got linked in
    ///
    /// `x` is painted red first. Both of its subtrees must have the same
    /// black depth as the node it replaced.
    pub fn insert_fixup<T, S, Y>(tree: &mut BinaryTree<T, S, Y>, x: NodeRef)
    where
        C: ColorAccess<T>,
        Y: Synthesizer<T, S>,
    {
        Self::fixup_red(tree, x);
    }

    /// Returns whether a red root got painted black, which adds one to
    /// the black depth of the whole tree.
    fn fixup_red<T, S, Y>(tree: &mut BinaryTree<T, S, Y>, x: NodeRef) -> bool
    where
        C: ColorAccess<T>,
        Y: Synthesizer<T, S>,
    {
        Self::paint(tree, x, Color::Red);
        let mut x = x;
        loop {
            let Some(p) = tree.parent(x) else {
                Self::paint(tree, x, Color::Black);
                return true;
            };
            if !Self::is_red(tree, Some(p)) {
                return false;
            }
            let Some(g) = tree.parent(p) else {
                Self::paint(tree, p, Color::Black);
                return true;
            };
            let dir = tree.side_of(p);
            if let Some(uncle) = tree.child(g, dir ^ 1)
                && Self::is_red(tree, Some(uncle))
            {
                Self::paint(tree, p, Color::Black);
                Self::paint(tree, uncle, Color::Black);
                Self::paint(tree, g, Color::Red);
                x = g;
                continue;
            }
            let mut p = p;
            if tree.child(p, dir ^ 1) == Some(x) {
                tree.rotate(p, dir);
                p = x;
            }
            Self::paint(tree, p, Color::Black);
            Self::paint(tree, g, Color::Red);
            tree.rotate(g, dir ^ 1);
            return false;
        }
    }

    /// Unlinks `z` from the main tree and rebalances
    ///
    /// The node stays allocated, freestanding, with fresh leaf
    /// synthesized data. Returns the node that followed it.
    pub fn detach<T, S, Y>(tree: &mut BinaryTree<T, S, Y>, z: NodeRef) -> Option<NodeRef>
    where
        C: ColorAccess<T>,
        Y: Synthesizer<T, S>,
    {
        let next = tree.successor(z);
        if tree.left(z).is_some() && tree.right(z).is_some() {
            let s = tree.swap_with_successor(z);
            let z_color = Self::color(tree, Some(z));
            let s_color = Self::color(tree, Some(s));
            Self::paint(tree, z, s_color);
            Self::paint(tree, s, z_color);
        }
        let color = Self::color(tree, Some(z));
        let (parent, child) = tree.splice_out(z);
        if let Some(parent) = parent {
            tree.refresh_synthesized_result(parent);
        }
        tree.synthesize_node(z);
        if color == Color::Black {
            match child {
                Some(child) if Self::is_red(tree, Some(child)) => {
                    Self::paint(tree, child, Color::Black);
                }
                _ => Self::delete_fixup(tree, child, parent),
            }
        }
        next
    }

    /// Resolves the missing black at `x`, a possibly absent child of `parent`
    fn delete_fixup<T, S, Y>(
        tree: &mut BinaryTree<T, S, Y>,
        mut x: Option<NodeRef>,
        mut parent: Option<NodeRef>,
    ) where
        C: ColorAccess<T>,
        Y: Synthesizer<T, S>,
    {
        while !Self::is_red(tree, x)
            && let Some(p) = parent
        {
            // side of the sibling
            let dir = if tree.child(p, LEFT) == x { RIGHT } else { LEFT };
            let mut w = tree.child(p, dir).expect("a node short of black has a sibling");
            if Self::is_red(tree, Some(w)) {
                Self::paint(tree, w, Color::Black);
                Self::paint(tree, p, Color::Red);
                tree.rotate(p, dir ^ 1);
                w = tree.child(p, dir).expect("a red sibling has black children");
            }
            let near = tree.child(w, dir ^ 1);
            let far = tree.child(w, dir);
            if !Self::is_red(tree, near) && !Self::is_red(tree, far) {
                Self::paint(tree, w, Color::Red);
                x = Some(p);
                parent = tree.parent(p);
                continue;
            }
            if !Self::is_red(tree, far) {
                if let Some(near) = near {
                    Self::paint(tree, near, Color::Black);
                }
                Self::paint(tree, w, Color::Red);
                tree.rotate(w, dir);
                w = tree.child(p, dir).expect("the near nephew moved up");
            }
            let p_color = Self::color(tree, Some(p));
            Self::paint(tree, w, p_color);
            Self::paint(tree, p, Color::Black);
            if let Some(far) = tree.child(w, dir) {
                Self::paint(tree, far, Color::Black);
            }
            tree.rotate(p, dir ^ 1);
            return;
        }
        if let Some(x) = x {
            Self::paint(tree, x, Color::Black);
        }
    }

    /// Number of black nodes on the leftmost path down from `node`
    pub fn black_depth<T, S, Y>(tree: &BinaryTree<T, S, Y>, node: Option<NodeRef>) -> usize
    where
        C: ColorAccess<T>,
    {
        let mut depth = 0;
        let mut x = node;
        while let Some(n) = x {
            if !Self::is_red(tree, Some(n)) {
                depth += 1;
            }
            x = tree.left(n);
        }
        depth
    }

    /// Merges `left`, `pivot` and `right`, in this order, into one tree
    ///
    /// Both trees must be detached red-black trees, and `pivot` a
    /// freestanding node. The roots get painted black before anything
    /// else.
    pub fn join<T, S, Y>(
        tree: &mut BinaryTree<T, S, Y>,
        left: Subtree,
        pivot: NodeRef,
        right: Subtree,
    ) -> Subtree
    where
        C: ColorAccess<T>,
        Y: Synthesizer<T, S>,
    {
        let l = Self::blacken(tree, left, 0).0;
        let r = Self::blacken(tree, right, 0).0;
        let hl = Self::black_depth(tree, l.root());
        let hr = Self::black_depth(tree, r.root());
        Self::join_at(tree, (l, hl), pivot, (r, hr)).0
    }

    /// Paints the root of a detached tree black
    ///
    /// `depth` is the black depth of the tree before painting, and the
    /// depth afterwards is returned along with the tree.
    pub(crate) fn blacken<T, S, Y>(
        tree: &mut BinaryTree<T, S, Y>,
        sub: Subtree,
        depth: usize,
    ) -> (Subtree, usize)
    where
        C: ColorAccess<T>,
    {
        let Some(root) = sub.root() else {
            return (sub, depth);
        };
        assert!(
            tree.parent(root).is_none() && tree.root() != Some(root),
            "{root} is not a detached root",
        );
        if Self::is_red(tree, Some(root)) {
            Self::paint(tree, root, Color::Black);
            (sub, depth + 1)
        } else {
            (sub, depth)
        }
    }

    /// Joins two black-rooted trees whose black depths are known
    ///
    /// Returns the joined tree with its black depth.
    fn join_at<T, S, Y>(
        tree: &mut BinaryTree<T, S, Y>,
        (left, hl): (Subtree, usize),
        pivot: NodeRef,
        (right, hr): (Subtree, usize),
    ) -> (Subtree, usize)
    where
        C: ColorAccess<T>,
        Y: Synthesizer<T, S>,
    {
        assert!(
            tree.node(pivot).is_isolated() && tree.root() != Some(pivot),
            "the pivot {pivot} is still linked into a tree",
        );
        let l = left.into_root();
        let r = right.into_root();
        trace!("joining around {pivot} with black depths {hl} and {hr}");

        let (host, dir, other, target) = match hl.cmp(&hr) {
            Ordering::Equal => {
                tree.link(pivot, LEFT, l);
                tree.link(pivot, RIGHT, r);
                tree.synthesize_node(pivot);
                Self::paint(tree, pivot, Color::Black);
                return (Subtree::new(Some(pivot)), hl + 1);
            }
            Ordering::Greater => (l, RIGHT, r, hr),
            Ordering::Less => (r, LEFT, l, hl),
        };
        let host = host.expect("the deeper tree is not empty");

        // Walk down the inner spine of the deeper tree to a black node
        // with the black depth of the shallower one.
        let mut parent = None;
        let mut c = Some(host);
        let mut depth = hl.max(hr);
        while let Some(n) = c {
            let black = !Self::is_red(tree, Some(n));
            if black && depth == target {
                break;
            }
            if black {
                depth -= 1;
            }
            parent = Some(n);
            c = tree.child(n, dir);
        }
        let parent = parent.expect("the deeper tree has a black root");
        tree.link(parent, dir, Some(pivot));
        tree.link(pivot, dir ^ 1, c);
        tree.link(pivot, dir, other);
        tree.refresh_synthesized_result(pivot);

        let saved = tree.replace_root(Some(host));
        let grew = Self::fixup_red(tree, pivot);
        let joined = Subtree::new(tree.replace_root(saved));
        (joined, hl.max(hr) + usize::from(grew))
    }

    /// Cuts off the `dir` child of `node` as a black-rooted tree
    ///
    /// `depth` is the black depth of that child as it was linked.
    fn cut<T, S, Y>(
        tree: &mut BinaryTree<T, S, Y>,
        node: NodeRef,
        dir: usize,
        depth: usize,
    ) -> (Subtree, usize)
    where
        C: ColorAccess<T>,
    {
        let child = tree.child(node, dir);
        tree.node_mut(node).children[dir] = None;
        if let Some(child) = child {
            tree.node_mut(child).parent = None;
        }
        Self::blacken(tree, Subtree::new(child), depth)
    }

    /// Splits the main tree around `x`
    ///
    /// Returns the black-rooted trees of the nodes before and after `x`.
    /// The main root is left empty and `x` freestanding.
    pub fn split<T, S, Y>(tree: &mut BinaryTree<T, S, Y>, x: NodeRef) -> (Subtree, Subtree)
    where
        C: ColorAccess<T>,
        Y: Synthesizer<T, S>,
    {
        assert!(tree.owns(x), "{x} does not belong to this tree");
        // Black depths along the path are tracked from the bottom up, so
        // that every join starts from known depths.
        let mut depth = Self::black_depth(tree, Some(x));
        tree.replace_root(None);

        let below = depth - usize::from(!Self::is_red(tree, Some(x)));
        let mut left = Self::cut(tree, x, LEFT, below);
        let mut right = Self::cut(tree, x, RIGHT, below);
        let mut child = x;
        let mut up = tree.parent(x);
        tree.node_mut(x).parent = None;
        let mut joins = 0;
        while let Some(p) = up {
            up = tree.parent(p);
            tree.node_mut(p).parent = None;
            let sibling = depth;
            depth += usize::from(!Self::is_red(tree, Some(p)));
            if tree.child(p, LEFT) == Some(child) {
                tree.node_mut(p).children[LEFT] = None;
                let pr = Self::cut(tree, p, RIGHT, sibling);
                right = Self::join_at(tree, right, p, pr);
            } else {
                tree.node_mut(p).children[RIGHT] = None;
                let pl = Self::cut(tree, p, LEFT, sibling);
                left = Self::join_at(tree, pl, p, left);
            }
            child = p;
            joins += 1;
        }
        tree.synthesize_node(x);
        debug_assert_eq!(left.1, Self::black_depth(tree, left.0.root()));
        debug_assert_eq!(right.1, Self::black_depth(tree, right.0.root()));
        trace!("split at {x} after {joins} joins");
        (left.0, right.0)
    }

    /// Colors a tree built by [BinaryTree::build_tree_move] as a red-black tree
    ///
    /// The nodes on the deepest level are painted red and all others
    /// black, which only works for trees as balanced as that.
    pub fn paint_balanced<T, S, Y>(tree: &mut BinaryTree<T, S, Y>, root: Option<NodeRef>)
    where
        C: ColorAccess<T>,
    {
        let Some(root) = root else { return };
        let mut height = 0;
        let mut x = Some(root);
        while let Some(n) = x {
            height += 1;
            x = tree.left(n);
        }
        let mut stack = vec![(root, 1)];
        while let Some((n, depth)) = stack.pop() {
            let color = if depth == height && height > 1 {
                Color::Red
            } else {
                Color::Black
            };
            Self::paint(tree, n, color);
            for dir in [LEFT, RIGHT] {
                if let Some(child) = tree.child(n, dir) {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    /// Checks the red-black properties of the tree at `root`
    ///
    /// Returns the black depth of the tree.
    pub fn check_integrity<T, S, Y>(
        tree: &BinaryTree<T, S, Y>,
        root: Option<NodeRef>,
    ) -> Result<usize, IntegrityError>
    where
        C: ColorAccess<T>,
    {
        let Some(root) = root else { return Ok(0) };
        if tree.parent(root).is_some() {
            return Err(IntegrityError::AttachedRoot(root));
        }
        if Self::is_red(tree, Some(root)) {
            return Err(IntegrityError::RedRoot(root));
        }
        Self::check_node(tree, root)
    }

    fn check_node<T, S, Y>(
        tree: &BinaryTree<T, S, Y>,
        node: NodeRef,
    ) -> Result<usize, IntegrityError>
    where
        C: ColorAccess<T>,
    {
        let red = Self::is_red(tree, Some(node));
        let mut depths = [0; 2];
        for dir in [LEFT, RIGHT] {
            if let Some(child) = tree.child(node, dir) {
                if tree.parent(child) != Some(node) {
                    return Err(IntegrityError::BrokenLink { node: child, parent: node });
                }
                if red && Self::is_red(tree, Some(child)) {
                    return Err(IntegrityError::RedChild { node, child });
                }
                depths[dir] = Self::check_node(tree, child)?;
            }
        }
        if depths[LEFT] != depths[RIGHT] {
            return Err(IntegrityError::BlackDepth {
                node,
                left: depths[LEFT],
                right: depths[RIGHT],
            });
        }
        Ok(depths[LEFT] + usize::from(!red))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::ByOrd;
    use crate::synth::SizeSynth;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    type Tree = BinaryTree<Colored<i32>, usize, SizeSynth>;
    type Rb = RedBlack<ColorField>;

    fn insert(tree: &mut Tree, value: i32) -> NodeRef {
        let node = tree.select_insert(ByOrd, Colored::new(value));
        Rb::insert_fixup(tree, node);
        node
    }

    fn values(tree: &Tree) -> Vec<i32> {
        tree.iter().map(|v| v.value).collect()
    }

    fn values_of(tree: &Tree, subtree: &Subtree) -> Vec<i32> {
        tree.iter_subtree(subtree).map(|v| v.value).collect()
    }

    fn valid(tree: &Tree) -> usize {
        tree.check_synthesized().unwrap();
        Rb::check_integrity(tree, tree.root()).unwrap()
    }

    fn built(n: i32) -> Tree {
        let mut tree = Tree::default();
        let all = tree.build_tree_move((0..n).map(Colored::new).collect());
        Rb::paint_balanced(&mut tree, all.root());
        tree.set_root(all);
        tree
    }

    #[test]
    fn test_insert_scenario() {
        let mut tree = Tree::default();
        let mut expected = vec![];
        for v in [5, 3, 8, 1, 4, 7, 9] {
            insert(&mut tree, v);
            expected.push(v);
            expected.sort();
            assert_eq!(expected, values(&tree));
            valid(&tree);
        }
        assert_eq!(vec![1, 3, 4, 5, 7, 8, 9], values(&tree));
    }

    #[test]
    fn test_ascending_inserts_stay_shallow() {
        let mut tree = Tree::default();
        for v in 0..1024 {
            insert(&mut tree, v);
        }
        let depth = valid(&tree);
        assert!(depth <= 11, "black depth {depth}");
    }

    #[test]
    fn test_random_insert_erase() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut tree = Tree::default();
        let mut nodes = vec![];
        let mut expected = vec![];
        for _ in 0..2000 {
            if nodes.is_empty() || rng.random_bool(0.6) {
                let v = rng.random_range(0..500);
                nodes.push(insert(&mut tree, v));
                expected.push(v);
            } else {
                let node = nodes.swap_remove(rng.random_range(0..nodes.len()));
                let v = tree.get(node).value;
                let next = Rb::detach(&mut tree, node);
                if let Some(next) = next {
                    assert!(tree.get(next).value >= v);
                }
                assert_eq!(v, tree.free(node).value);
                let i = expected.iter().position(|&e| e == v).unwrap();
                expected.remove(i);
            }
            valid(&tree);
        }
        expected.sort();
        assert_eq!(expected, values(&tree));
    }

    #[test]
    fn test_detach_every_node() {
        for victim in 0..31 {
            let mut tree = built(31);
            let node = tree.nodes().nth(victim).unwrap();
            let next = Rb::detach(&mut tree, node);
            assert_eq!(tree.nodes().nth(victim), next);
            assert!(tree.view(node).synth() == &1);
            valid(&tree);
            assert_eq!(30, values(&tree).len());
        }
    }

    #[test]
    fn test_paint_balanced() {
        for n in 0..200 {
            let tree = built(n);
            valid(&tree);
            assert_eq!((0..n).collect::<Vec<_>>(), values(&tree));
        }
    }

    #[test]
    fn test_black_depth() {
        // a perfect tree gets its leaves painted red
        let tree = built(7);
        assert_eq!(2, Rb::black_depth(&tree, tree.root()));
        assert_eq!(0, Rb::black_depth(&tree, None));
        let tree = built(8);
        // the extra node sits red on a fourth level
        assert_eq!(3, Rb::black_depth(&tree, tree.root()));
    }

    #[test]
    fn test_join_unequal_depths() {
        for (a, b) in [(0, 0), (0, 5), (5, 0), (1, 100), (100, 1), (3, 40), (40, 40), (63, 64)] {
            let mut tree = Tree::default();
            let left = tree.build_tree_move((0..a).map(Colored::new).collect());
            Rb::paint_balanced(&mut tree, left.root());
            let right = tree.build_tree_move((a + 1..a + 1 + b).map(Colored::new).collect());
            Rb::paint_balanced(&mut tree, right.root());
            let pivot = tree.make_node(Colored::new(a)).into_root().unwrap();
            let joined = Rb::join(&mut tree, left, pivot, right);
            assert_eq!((0..a + 1 + b).collect::<Vec<_>>(), values_of(&tree, &joined));
            tree.check_subtree_synthesized(joined.root()).unwrap();
            Rb::check_integrity(&tree, joined.root()).unwrap();
            assert!(tree.is_empty());
        }
    }

    #[test]
    fn test_split_everywhere() {
        for at in 0..50 {
            let mut tree = built(50);
            let x = tree.nodes().nth(at as usize).unwrap();
            let (left, right) = Rb::split(&mut tree, x);
            assert!(tree.is_empty());
            assert!(tree.view(x).synth() == &1);
            assert_eq!((0..at).collect::<Vec<_>>(), values_of(&tree, &left));
            assert_eq!((at + 1..50).collect::<Vec<_>>(), values_of(&tree, &right));
            for part in [&left, &right] {
                tree.check_subtree_synthesized(part.root()).unwrap();
                Rb::check_integrity(&tree, part.root()).unwrap();
            }

            let joined = Rb::join(&mut tree, left, x, right);
            tree.set_root(joined);
            assert_eq!((0..50).collect::<Vec<_>>(), values(&tree));
            valid(&tree);
        }
    }

    #[test]
    fn test_split_leaves_black_roots() {
        let mut tree = Tree::default();
        let first = insert(&mut tree, 1);
        let second = insert(&mut tree, 2);
        assert_eq!(Color::Red, tree.get(second).color());

        let (left, right) = Rb::split(&mut tree, first);
        assert!(left.is_empty());
        assert_eq!(Ok(1), Rb::check_integrity(&tree, right.root()));
        tree.set_root(right);
        assert_eq!(1, valid(&tree));
    }

    /// Builds a tree by inserting and erasing at random positions, so that
    /// red nodes end up all over the place
    fn scattered(rng: &mut ChaCha8Rng, expected: &mut Vec<i32>) -> Tree {
        let mut tree = Tree::default();
        let mut next = 0;
        for _ in 0..rng.random_range(1..80) {
            if expected.is_empty() || rng.random_bool(0.75) {
                let at = rng.random_range(0..=expected.len());
                let before = tree.nodes().nth(at);
                let node = tree.emplace_before(before, Colored::new(next));
                Rb::insert_fixup(&mut tree, node);
                expected.insert(at, next);
                next += 1;
            } else {
                let at = rng.random_range(0..expected.len());
                let node = tree.nodes().nth(at).unwrap();
                Rb::detach(&mut tree, node);
                assert_eq!(expected.remove(at), tree.free(node).value);
            }
        }
        valid(&tree);
        tree
    }

    #[test]
    fn test_split_scattered_trees() {
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        for _ in 0..300 {
            let mut expected = vec![];
            let mut tree = scattered(&mut rng, &mut expected);
            if expected.is_empty() {
                continue;
            }
            let at = rng.random_range(0..expected.len());
            let x = tree.nodes().nth(at).unwrap();
            let (left, right) = Rb::split(&mut tree, x);
            assert_eq!(expected[..at], values_of(&tree, &left)[..]);
            assert_eq!(expected[at + 1..], values_of(&tree, &right)[..]);
            tree.check_subtree_synthesized(left.root()).unwrap();
            tree.check_subtree_synthesized(right.root()).unwrap();
            let hl = Rb::check_integrity(&tree, left.root()).unwrap();
            let hr = Rb::check_integrity(&tree, right.root()).unwrap();

            let (joined, depth) = Rb::join_at(&mut tree, (left, hl), x, (right, hr));
            assert_eq!(Ok(depth), Rb::check_integrity(&tree, joined.root()));
            tree.set_root(joined);
            assert_eq!(expected, values(&tree));
            valid(&tree);
        }
    }

    #[test]
    fn test_join_reports_black_depth() {
        for (a, b) in [(0, 0), (0, 1), (1, 0), (2, 9), (31, 1), (15, 16), (7, 100)] {
            let mut tree = Tree::default();
            let left = tree.build_tree_move((0..a).map(Colored::new).collect());
            Rb::paint_balanced(&mut tree, left.root());
            let right = tree.build_tree_move((a + 1..a + 1 + b).map(Colored::new).collect());
            Rb::paint_balanced(&mut tree, right.root());
            let hl = Rb::black_depth(&tree, left.root());
            let hr = Rb::black_depth(&tree, right.root());
            let pivot = tree.make_node(Colored::new(a)).into_root().unwrap();

            let (joined, depth) = Rb::join_at(&mut tree, (left, hl), pivot, (right, hr));
            assert_eq!(Ok(depth), Rb::check_integrity(&tree, joined.root()));
            assert_eq!((0..a + 1 + b).collect::<Vec<_>>(), values_of(&tree, &joined));
        }
    }

    #[test]
    fn test_integrity_errors() {
        let mut tree = built(3);
        let root = tree.root().unwrap();
        let left = tree.left(root).unwrap();
        ColorField::set_color(tree.get_mut(root), Color::Red);
        assert_eq!(Err(IntegrityError::RedRoot(root)), Rb::check_integrity(&tree, Some(root)));

        ColorField::set_color(tree.get_mut(root), Color::Black);
        ColorField::set_color(tree.get_mut(left), Color::Black);
        assert_eq!(
            Err(IntegrityError::BlackDepth {
                node: root,
                left: 1,
                right: 0,
            }),
            Rb::check_integrity(&tree, Some(root))
        );
    }

    #[test]
    fn test_colored_compares_values() {
        let mut a = Colored::new(1);
        ColorField::set_color(&mut a, Color::Black);
        assert_eq!(a, Colored::new(1));
        assert!(a < Colored::new(2));
        assert_eq!(Color::Black, a.color());
        *a += 1;
        assert_eq!(2, a.into_inner());
    }
}
