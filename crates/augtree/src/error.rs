use crate::node::NodeRef;
use thiserror::Error;

/// A broken structural invariant found by an integrity check
///
/// The tree never produces these on its own: they point to either a
/// bug in a tree operation, or a caller mutating values behind the
/// tree's back without refreshing the synthesized data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("the root {0} is red")]
    RedRoot(NodeRef),
    #[error("red node {node} has a red child {child}")]
    RedChild { node: NodeRef, child: NodeRef },
    #[error("black depths under {node} differ: {left} on the left, {right} on the right")]
    BlackDepth {
        node: NodeRef,
        left: usize,
        right: usize,
    },
    #[error("{node} does not point back to its parent {parent}")]
    BrokenLink { node: NodeRef, parent: NodeRef },
    #[error("stale synthesized data at {0}")]
    StaleSynthesized(NodeRef),
    #[error("the root {0} still has a parent")]
    AttachedRoot(NodeRef),
}
