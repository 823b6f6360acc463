use std::marker::PhantomData;

/// Value type of a [Property]
///
/// For text buffers, this will typically be lengths,
/// line counts, etc.
///
/// It is assumed that this sum has the following properties:
/// - Associativity
/// - Commutativity
/// - Has an identity element
/// - Has inverse elements ([Sum::add_assign] versus [Sum::sub_assign])
pub trait Sum: Sized + Copy + PartialEq + PartialOrd {
    /// Adds to this sum
    ///
    /// Implementations for primitive integers use wrapping arithmetic.
    fn add_assign(&mut self, other: &Self);
    /// The inverse of [Self::add_assign]
    fn sub_assign(&mut self, other: &Self);

    /// Returns the [identity element] of this sum, typically zero
    ///
    /// [identity element]: https://en.wikipedia.org/wiki/Identity_element
    fn identity() -> Self;

    /// Shorthand for a copy of `self` with `other` added
    fn add(&self, other: &Self) -> Self {
        let mut sum = *self;
        sum.add_assign(other);
        sum
    }
}

macro_rules! impl_sum {
    ($($ty:ty),*) => {
        $(
            impl Sum for $ty {
                fn add_assign(&mut self, other: &Self) {
                    *self = self.wrapping_add(*other);
                }
                fn sub_assign(&mut self, other: &Self) {
                    *self = self.wrapping_sub(*other);
                }
                fn identity() -> Self {
                    0
                }
            }
        )*
    };
}
impl_sum!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Recomputes the synthesized data of a node
///
/// The result must be a pure function of the node value and the
/// synthesized data of its (up to two) children. The tree calls it
/// whenever a node's subtree changes shape or content.
pub trait Synthesizer<T, S> {
    fn synthesize(&self, value: &T, left: Option<&S>, right: Option<&S>) -> S;
}

impl<T, S, F> Synthesizer<T, S> for F
where
    F: Fn(&T, Option<&S>, Option<&S>) -> S,
{
    fn synthesize(&self, value: &T, left: Option<&S>, right: Option<&S>) -> S {
        self(value, left, right)
    }
}

/// Synthesizer for plain trees without any aggregate
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSynth;

impl<T> Synthesizer<T, ()> for NoSynth {
    fn synthesize(&self, _: &T, _: Option<&()>, _: Option<&()>) {}
}

/// A scalar statistic tracked per node and per subtree
///
/// A property knows how to read its contribution from a node value
/// and where its single-node and whole-subtree values live inside the
/// synthesized data `S`.
pub trait Property<T, S> {
    type Value: Sum;

    /// The contribution of a node value
    fn of_value(value: &T) -> Self::Value;
    /// The single-node contribution recorded in `synth`
    fn own(synth: &S) -> Self::Value;
    fn set_own(synth: &mut S, value: Self::Value);
    /// The whole-subtree aggregate recorded in `synth`
    fn aggregate(synth: &S) -> Self::Value;
    fn set_aggregate(synth: &mut S, value: Self::Value);

    /// Computes `own(node) + aggregate(left) + aggregate(right)` into `synth`
    fn synthesize(value: &T, synth: &mut S, left: Option<&S>, right: Option<&S>) {
        let own = Self::of_value(value);
        Self::set_own(synth, own);
        let mut sum = own;
        if let Some(left) = left {
            sum.add_assign(&Self::aggregate(left));
        }
        if let Some(right) = right {
            sum.add_assign(&Self::aggregate(right));
        }
        Self::set_aggregate(synth, sum);
    }
}

/// A set of properties sharing one synthesized data type
///
/// Implemented for tuples of up to four [Property] types.
pub trait Properties<T, S> {
    fn synthesize_all(value: &T, synth: &mut S, left: Option<&S>, right: Option<&S>);
}

macro_rules! impl_properties {
    ($($p:ident),+) => {
        impl<T, S, $($p: Property<T, S>),+> Properties<T, S> for ($($p,)+) {
            fn synthesize_all(value: &T, synth: &mut S, left: Option<&S>, right: Option<&S>) {
                $($p::synthesize(value, synth, left, right);)+
            }
        }
    };
}
impl_properties!(A);
impl_properties!(A, B);
impl_properties!(A, B, C);
impl_properties!(A, B, C, D);

/// [Synthesizer] driven by a set of [Properties]
///
/// The synthesized data starts from `S::default()` and every property
/// then fills in its own slots.
pub struct PropertySynthesizer<P>(PhantomData<fn() -> P>);

impl<P> PropertySynthesizer<P> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}
impl<P> Default for PropertySynthesizer<P> {
    fn default() -> Self {
        Self::new()
    }
}
impl<P> Clone for PropertySynthesizer<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T, S: Default, P: Properties<T, S>> Synthesizer<T, S> for PropertySynthesizer<P> {
    fn synthesize(&self, value: &T, left: Option<&S>, right: Option<&S>) -> S {
        let mut synth = S::default();
        P::synthesize_all(value, &mut synth, left, right);
        synth
    }
}

/// Node count property, stored directly as a `usize` subtree size
///
/// Every node contributes one, so the aggregate is the subtree size.
pub struct Size;

impl<T> Property<T, usize> for Size {
    type Value = usize;
    fn of_value(_: &T) -> usize {
        1
    }
    fn own(_: &usize) -> usize {
        1
    }
    fn set_own(_: &mut usize, _: usize) {}
    fn aggregate(synth: &usize) -> usize {
        *synth
    }
    fn set_aggregate(synth: &mut usize, value: usize) {
        *synth = value;
    }
}

/// Synthesizer keeping subtree sizes for order-statistics lookups
pub type SizeSynth = PropertySynthesizer<(Size,)>;
