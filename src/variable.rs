//! The capability contract every node of a computation graph satisfies.

use std::{
    cell::Cell,
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::Tensor;

/// Unique identifier for a variable in the computation graph.
///
/// Used as the only key for derivative bookkeeping and cycle detection, so two
/// handles to the same node must report the same id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u64);

impl VarId {
    /// Get the raw ID value
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Create from raw value (for testing only)
    #[inline]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-wide start of the next unreserved block of ids
static NEXT_BLOCK: AtomicU64 = AtomicU64::new(1);

/// Number of ids a generator reserves at a time
const BLOCK_SIZE: u64 = 1024;

/// Monotonic source of [`VarId`]s.
///
/// Owned by the graph construction layer. Generators reserve disjoint blocks from one
/// process-wide counter, so ids are never reused, even across generators. Nodes built
/// from different generators can be mixed in one graph.
#[derive(Debug)]
pub struct IdGenerator {
    next: Cell<u64>,
    end: Cell<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next: Cell::new(0),
            end: Cell::new(0),
        }
    }

    pub fn next_id(&self) -> VarId {
        if self.next.get() == self.end.get() {
            let start = NEXT_BLOCK.fetch_add(BLOCK_SIZE, Ordering::Relaxed);
            self.next.set(start);
            self.end.set(start + BLOCK_SIZE);
        }
        let id = self.next.get();
        self.next.set(id + 1);
        VarId(id)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A node in a computation graph, as seen by the traversal and the backpropagation engine.
///
/// Implementors are cheap handles (typically an `Rc` around the node payload), since the
/// engine clones them into its traversal order.
///
/// The engine never asks what operation a node represents. It only needs the structure
/// (`parents`), the classification (`is_leaf`, `is_constant`) and the local
/// vector-Jacobian product (`chain_rule`).
pub trait Variable: Clone {
    /// The type of derivative values flowing through the graph.
    type Value: Tensor;

    fn unique_id(&self) -> VarId;

    /// True if the node has no recorded history, i.e. it was supplied by the user.
    fn is_leaf(&self) -> bool;

    /// True if the node does not track gradients at all, e.g. a literal.
    fn is_constant(&self) -> bool;

    /// The inputs of the operation that produced this node, in order.
    fn parents(&self) -> Vec<Self>;

    /// Given the derivative of the output with respect to this node, returns the
    /// contributions to each parent. A parent may appear more than once.
    fn chain_rule(&self, d_output: &Self::Value) -> Vec<(Self, Self::Value)>;

    /// Add `x` to the stored gradient of a leaf.
    fn accumulate_derivative(&self, x: Self::Value);
}
