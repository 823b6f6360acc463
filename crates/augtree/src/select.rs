use crate::node::NodeView;
use crate::synth::{Property, Sum};
use std::cmp::Ordering;
use std::marker::PhantomData;

/// Decision taken by a [BranchSelector] at each node of a descent
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Branch {
    Left,
    Match,
    Right,
}

/// Strategy deciding where a search goes next
///
/// Closures of the form `|value: &T| key.cmp(value)` are selectors
/// too: [Ordering::Less] descends left, [Ordering::Greater] descends
/// right and [Ordering::Equal] is a match.
pub trait BranchSelector<T, S> {
    fn select(&mut self, node: NodeView<'_, T, S>) -> Branch;
}

impl<T, S, F> BranchSelector<T, S> for F
where
    F: FnMut(&T) -> Ordering,
{
    fn select(&mut self, node: NodeView<'_, T, S>) -> Branch {
        match self(node.value()) {
            Ordering::Less => Branch::Left,
            Ordering::Equal => Branch::Match,
            Ordering::Greater => Branch::Right,
        }
    }
}

/// Strategy placing a new value during an ordered insertion
///
/// The tie-break policy is entirely up to the selector.
pub trait InsertSelector<T> {
    /// Whether `new` belongs to the left of `existing`
    fn go_left(&mut self, new: &T, existing: &T) -> bool;
}

impl<T, F> InsertSelector<T> for F
where
    F: FnMut(&T, &T) -> bool,
{
    fn go_left(&mut self, new: &T, existing: &T) -> bool {
        self(new, existing)
    }
}

/// Orders by [Ord] with strict less-than
///
/// Equal values go right, so values inserted later stay after
/// earlier equal values.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByOrd;

impl<T: Ord> InsertSelector<T> for ByOrd {
    fn go_left(&mut self, new: &T, existing: &T) -> bool {
        new < existing
    }
}

/// Collects statistics of the nodes a search passes by
pub trait Accumulator<T, S> {
    /// Adds a whole subtree
    fn add_subtree(&mut self, synth: &S);
    /// Adds a single node
    fn add_node(&mut self, value: &T, synth: &S);
}

impl<T, S> Accumulator<T, S> for () {
    fn add_subtree(&mut self, _: &S) {}
    fn add_node(&mut self, _: &T, _: &S) {}
}

impl<T, S, A: Accumulator<T, S> + ?Sized> Accumulator<T, S> for &mut A {
    fn add_subtree(&mut self, synth: &S) {
        (**self).add_subtree(synth);
    }
    fn add_node(&mut self, value: &T, synth: &S) {
        (**self).add_node(value, synth);
    }
}

macro_rules! impl_accumulator {
    ($($a:ident $i:tt),+) => {
        impl<T, S, $($a: Accumulator<T, S>),+> Accumulator<T, S> for ($($a,)+) {
            fn add_subtree(&mut self, synth: &S) {
                $(self.$i.add_subtree(synth);)+
            }
            fn add_node(&mut self, value: &T, synth: &S) {
                $(self.$i.add_node(value, synth);)+
            }
        }
    };
}
impl_accumulator!(A 0, B 1);
impl_accumulator!(A 0, B 1, C 2);

/// Running total of a single [Property]
pub struct Total<P: Property<T, S>, T, S> {
    value: P::Value,
    marker: PhantomData<fn(&T, &S) -> P>,
}

impl<P: Property<T, S>, T, S> Total<P, T, S> {
    pub fn new() -> Self {
        Self {
            value: P::Value::identity(),
            marker: PhantomData,
        }
    }

    pub fn get(&self) -> P::Value {
        self.value
    }
}

impl<P: Property<T, S>, T, S> Default for Total<P, T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Property<T, S>, T, S> Accumulator<T, S> for Total<P, T, S> {
    fn add_subtree(&mut self, synth: &S) {
        self.value.add_assign(&P::aggregate(synth));
    }
    fn add_node(&mut self, _: &T, synth: &S) {
        self.value.add_assign(&P::own(synth));
    }
}

/// How an [IndexFinder] resolves a target lying exactly on a node boundary
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Boundary {
    /// Less-or-equal: with adjacent nodes `(a)(b)`, the end of `a` wins
    Before,
    /// Strictly-less: with adjacent nodes `(a)(b)`, the start of `b` wins
    #[default]
    After,
}

/// Order-statistics search by an accumulated [Property]
///
/// Finds the node whose range `[before, before + own)` contains the
/// target, `before` being the sum of the property over every node
/// preceding it. Other statistics can be collected along the way with
/// [Self::accumulate]; after a match, they cover exactly the nodes
/// before the matched one.
pub struct IndexFinder<P: Property<T, S>, T, S, A = ()> {
    remaining: P::Value,
    boundary: Boundary,
    clamp: bool,
    acc: A,
    marker: PhantomData<fn(&T, &S) -> P>,
}

impl<P: Property<T, S>, T, S> IndexFinder<P, T, S> {
    pub fn new(target: P::Value) -> Self {
        Self {
            remaining: target,
            boundary: Boundary::After,
            clamp: false,
            acc: (),
            marker: PhantomData,
        }
    }
}

impl<P: Property<T, S>, T, S, A: Accumulator<T, S>> IndexFinder<P, T, S, A> {
    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Resolves targets past the end to the last node instead of nothing
    pub fn clamp_to_last(mut self) -> Self {
        self.clamp = true;
        self
    }

    /// Collects other statistics with `acc` during the search
    pub fn accumulate<B: Accumulator<T, S>>(self, acc: B) -> IndexFinder<P, T, S, B> {
        IndexFinder {
            remaining: self.remaining,
            boundary: self.boundary,
            clamp: self.clamp,
            acc,
            marker: PhantomData,
        }
    }

    /// What is left of the target
    ///
    /// After a match, this is the offset of the target inside the
    /// matched node.
    pub fn offset(&self) -> P::Value {
        self.remaining
    }

    pub fn accumulator(&self) -> &A {
        &self.acc
    }

    pub fn into_accumulator(self) -> A {
        self.acc
    }
}

impl<P: Property<T, S>, T, S, A: Accumulator<T, S>> BranchSelector<T, S>
    for IndexFinder<P, T, S, A>
{
    fn select(&mut self, node: NodeView<'_, T, S>) -> Branch {
        let left = node.left().map_or_else(P::Value::identity, P::aggregate);
        let go_left = match self.boundary {
            Boundary::After => self.remaining < left,
            Boundary::Before => self.remaining <= left && node.has_left(),
        };
        if go_left {
            return Branch::Left;
        }
        let end = left.add(&P::own(node.synth()));
        let inside = match self.boundary {
            Boundary::After => self.remaining < end,
            Boundary::Before => self.remaining <= end,
        };
        if let Some(left) = node.left() {
            self.acc.add_subtree(left);
        }
        if inside || (self.clamp && !node.has_right()) {
            self.remaining.sub_assign(&left);
            return Branch::Match;
        }
        self.acc.add_node(node.value(), node.synth());
        self.remaining.sub_assign(&end);
        Branch::Right
    }
}
