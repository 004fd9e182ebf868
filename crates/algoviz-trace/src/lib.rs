//! Algoviz Step-Recording Executors
//!
//! Runs a textbook algorithm against a model and yields its progress as an
//! ordered sequence of immutable [`Step`]s, followed by exactly one
//! [`Outcome`].
//!
//! - Grid search ([`plan`]) is lazy: each [`StepTrace::advance`] pops one
//!   frontier entry, so cancelling playback also stops the computation.
//! - Tree, heap and skip-list operations are eager: the model is mutated
//!   immediately and the trace is returned as a [`Recording`].
//!
//! ```
//! use algoviz_model::Grid;
//! use algoviz_trace::{plan, Recording, SearchKind};
//!
//! let grid = Grid::with_default_endpoints(10, 10).unwrap();
//! let recording = Recording::capture(plan(&grid, SearchKind::AStar).unwrap());
//! assert_eq!(recording.outcome().path().map(|p| p.len()), Some(19));
//! ```

mod error;
mod recording;
mod search;
mod step;
mod structural;

pub use error::{Error, Result};
pub use recording::{Recording, Replay};
pub use search::{plan, AStar, BreadthFirst, SearchKind, SearchTrace};
pub use step::{Mark, Outcome, Progress, Status, Step, StepKind, StepTrace, Steps};
pub use structural::{
    heap_insert, heap_remove_root, skip_delete, skip_insert, skip_list_trace, skip_search,
    tree_delete, tree_insert, tree_search,
};
