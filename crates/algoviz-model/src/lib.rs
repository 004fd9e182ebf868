//! Algoviz Structure Models
//!
//! Mutable data structures driven by the step-recording executors.
//!
//! # Structures
//!
//! - **Grid**: width x height cells with obstacles and search endpoints,
//!   4-directional neighbors in a fixed order.
//! - **Bst**: unbalanced binary search tree; every operation reports the keys
//!   it visited on the way down.
//! - **Heap**: dense array binary heap (max or min); every sift swap is
//!   recorded with a snapshot of the array.
//! - **SkipList**: probabilistic multi-level list with `-∞`/`+∞` sentinels;
//!   operations report their hop path and per-level predecessors.
//!
//! Models expose only the primitives an executor needs. They never sleep,
//! never log and never share state between instances.

mod bst;
mod error;
mod grid;
mod heap;
mod skiplist;

pub use bst::{Bst, Descent, NodeLayout, NodeView, Removal, TreeOutcome, SEED_KEYS};
pub use error::{parse_key, Error, Result};
pub use grid::{Cell, Coord, Grid, NeighborOrder, MIN_SIDE};
pub use heap::{Heap, HeapType, Removed, Sift, SiftSwap, SEED_VALUES};
pub use skiplist::{
    Hop, Key, NodeSummary, SkipList, SkipOutcome, SkipReport, DEFAULT_BRANCHING_FACTOR,
    DEFAULT_MAX_HEIGHT, MAX_HEIGHT_LIMIT,
};

/// Heap index arithmetic.
pub mod heap_index {
    pub use crate::heap::{left, parent, right};
}
