//! This crate contains an augmented red-black tree over a slab arena,
//! with logarithmic split and join.
//!
//! To use it, pick a [synth::Synthesizer] for the subtree statistics
//! you need and build an [augmented::AugTree].
#![doc = include_str!("../README.md")]

/// Node handles and read-only node views
pub mod node;
/// Subtree statistics and the traits computing them
pub mod synth;
/// Strategies steering searches and ordered insertions
pub mod select;
/// The generic binary tree engine, without any balancing policy
pub mod tree;
/// Iterators and cursors
pub mod iter;
/// Red-black coloring and rebalancing algorithms
pub mod rb;
/// The red-black tree wrapper most users want.
pub mod augmented;
/// Diagnostics produced by integrity checks
pub mod error;

mod bulk;
#[cfg(feature = "serde")]
mod serde_impl;

#[cfg(test)]
mod test_util;

pub use augmented::{AugTree, ColoredTree};
pub use error::IntegrityError;
pub use node::{LEFT, NodeRef, NodeView, RIGHT};
pub use rb::{Color, ColorAccess, ColorField, Colored, RedBlack};
pub use select::{
    Accumulator, Boundary, Branch, BranchSelector, ByOrd, IndexFinder, InsertSelector, Total,
};
pub use synth::{NoSynth, Property, PropertySynthesizer, Size, SizeSynth, Sum, Synthesizer};
pub use tree::{BinaryTree, Subtree};
