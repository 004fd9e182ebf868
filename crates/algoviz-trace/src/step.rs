//! Steps, outcomes and the trace contract.

use algoviz_model::{Coord, Hop, Key, Removal, SkipOutcome, TreeOutcome};
use serde::{Deserialize, Serialize};

/// One unit of algorithm progress.
///
/// Steps are immutable once produced and carry their own snapshots, so a
/// renderer never has to look back at the live structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    /// A search popped `current` and expanded its neighbors
    Expand {
        current: Coord,
        frontier: Vec<Coord>,
        visited: Vec<Coord>,
        frame: u64,
    },

    /// A search popped the goal
    Arrive {
        current: Coord,
        frontier: Vec<Coord>,
        visited: Vec<Coord>,
        path: Vec<Coord>,
        frame: u64,
    },

    /// A tree descent visited a node
    Visit {
        key: i64,
        depth: usize,
        target: i64,
        frame: u64,
    },

    /// A tree delete detached or rewrote a node
    Splice {
        key: i64,
        removal: Removal,
        frame: u64,
    },

    /// A heap value landed in a slot before sifting
    Place {
        index: usize,
        value: i64,
        heap: Vec<i64>,
        frame: u64,
    },

    /// A heap comparison ended in a swap
    Swap {
        from: usize,
        to: usize,
        heap: Vec<i64>,
        frame: u64,
    },

    /// A skip-list descent passed a node at some level
    Advance {
        level: usize,
        key: Key,
        target: i64,
        frame: u64,
    },
}

/// Discriminant of a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Expand,
    Arrive,
    Visit,
    Splice,
    Place,
    Swap,
    Advance,
}

/// Something a renderer should highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum Mark {
    Cell(Coord),
    Key(i64),
    Slot(usize),
    Level { level: usize, key: Key },
}

impl Step {
    /// Get the frame number for this step.
    pub fn frame(&self) -> u64 {
        match self {
            Step::Expand { frame, .. } => *frame,
            Step::Arrive { frame, .. } => *frame,
            Step::Visit { frame, .. } => *frame,
            Step::Splice { frame, .. } => *frame,
            Step::Place { frame, .. } => *frame,
            Step::Swap { frame, .. } => *frame,
            Step::Advance { frame, .. } => *frame,
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Expand { .. } => StepKind::Expand,
            Step::Arrive { .. } => StepKind::Arrive,
            Step::Visit { .. } => StepKind::Visit,
            Step::Splice { .. } => StepKind::Splice,
            Step::Place { .. } => StepKind::Place,
            Step::Swap { .. } => StepKind::Swap,
            Step::Advance { .. } => StepKind::Advance,
        }
    }

    /// Ids the renderer should emphasise for this step.
    pub fn highlighted(&self) -> Vec<Mark> {
        match self {
            Step::Expand { current, .. } => vec![Mark::Cell(*current)],
            Step::Arrive { path, .. } => path.iter().copied().map(Mark::Cell).collect(),
            Step::Visit { key, .. } => vec![Mark::Key(*key)],
            Step::Splice { key, removal, .. } => {
                let mut marks = vec![Mark::Key(*key)];
                match removal {
                    Removal::Leaf => {}
                    Removal::Spliced { child } => marks.push(Mark::Key(*child)),
                    Removal::Replaced { successor } => marks.push(Mark::Key(*successor)),
                }
                marks
            }
            Step::Place { index, .. } => vec![Mark::Slot(*index)],
            Step::Swap { from, to, .. } => vec![Mark::Slot(*from), Mark::Slot(*to)],
            Step::Advance { level, key, .. } => vec![Mark::Level {
                level: *level,
                key: *key,
            }],
        }
    }

    /// Whether this step changes the structure rather than only reading it.
    pub fn is_structural(&self) -> bool {
        matches!(self, Step::Splice { .. } | Step::Place { .. } | Step::Swap { .. })
    }

    /// Frontier snapshot, for grid search steps.
    pub fn frontier(&self) -> Option<&[Coord]> {
        match self {
            Step::Expand { frontier, .. } | Step::Arrive { frontier, .. } => Some(frontier),
            _ => None,
        }
    }

    /// Visited snapshot, for grid search steps.
    pub fn visited(&self) -> Option<&[Coord]> {
        match self {
            Step::Expand { visited, .. } | Step::Arrive { visited, .. } => Some(visited),
            _ => None,
        }
    }

    /// Heap array after this step, for heap steps.
    pub fn heap(&self) -> Option<&[i64]> {
        match self {
            Step::Place { heap, .. } | Step::Swap { heap, .. } => Some(heap),
            _ => None,
        }
    }

    pub(crate) fn advance(hop: Hop, target: i64, frame: u64) -> Self {
        Step::Advance {
            level: hop.level,
            key: hop.key,
            target,
            frame,
        }
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Found,
    NotFound,
    Cancelled,
}

/// What a finished trace concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outcome {
    /// Start-first path to the goal
    PathFound { path: Vec<Coord> },

    /// The frontier emptied before reaching the goal
    PathNotFound,

    /// A BST operation finished
    Tree { key: i64, outcome: TreeOutcome },

    /// A heap insert settled
    HeapInserted { value: i64, index: usize },

    /// The heap root was removed
    RootRemoved { value: i64 },

    /// Root removal on an empty heap
    HeapEmpty,

    /// A skip-list operation finished
    SkipList { value: i64, outcome: SkipOutcome },
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::PathFound { .. }
            | Outcome::HeapInserted { .. }
            | Outcome::RootRemoved { .. } => Status::Found,
            Outcome::PathNotFound | Outcome::HeapEmpty => Status::NotFound,
            Outcome::Tree { outcome, .. } => match outcome {
                TreeOutcome::NotFound => Status::NotFound,
                _ => Status::Found,
            },
            Outcome::SkipList { outcome, .. } => match outcome {
                SkipOutcome::NotFound => Status::NotFound,
                _ => Status::Found,
            },
        }
    }

    pub fn path(&self) -> Option<&[Coord]> {
        match self {
            Outcome::PathFound { path } => Some(path),
            _ => None,
        }
    }

    /// The key or value the operation was about.
    pub fn value(&self) -> Option<i64> {
        match self {
            Outcome::Tree { key, .. } => Some(*key),
            Outcome::HeapInserted { value, .. }
            | Outcome::RootRemoved { value }
            | Outcome::SkipList { value, .. } => Some(*value),
            Outcome::PathFound { .. } | Outcome::PathNotFound | Outcome::HeapEmpty => None,
        }
    }
}

/// Result of pulling once from a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Step(Step),
    /// The trace is exhausted. Further pulls keep returning this.
    Finished(Outcome),
}

/// A finite sequence of steps followed by one outcome.
///
/// Traces are pulled, never pushed, so the consumer decides when the next
/// unit of work happens.
pub trait StepTrace: Send {
    fn advance(&mut self) -> Progress;

    /// Iterate the remaining steps. The outcome is available from
    /// [`Steps::outcome`] once iteration ends.
    fn steps(self) -> Steps<Self>
    where
        Self: Sized,
    {
        Steps {
            trace: self,
            outcome: None,
        }
    }
}

impl<T: StepTrace + ?Sized> StepTrace for Box<T> {
    fn advance(&mut self) -> Progress {
        (**self).advance()
    }
}

/// Iterator over a trace's steps.
#[derive(Debug)]
pub struct Steps<T> {
    trace: T,
    outcome: Option<Outcome>,
}

impl<T> Steps<T> {
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Option<Outcome> {
        self.outcome
    }
}

impl<T: StepTrace> Iterator for Steps<T> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.outcome.is_some() {
            return None;
        }
        match self.trace.advance() {
            Progress::Step(step) => Some(step),
            Progress::Finished(outcome) => {
                self.outcome = Some(outcome);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_serializes_with_type_tag() {
        let step = Step::Swap {
            from: 3,
            to: 1,
            heap: vec![9, 5, 1, 2],
            frame: 4,
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "Swap");
        assert_eq!(json["frame"], 4);

        let back: Step = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn swap_highlights_both_slots() {
        let step = Step::Swap {
            from: 2,
            to: 0,
            heap: vec![],
            frame: 0,
        };
        assert_eq!(step.highlighted(), vec![Mark::Slot(2), Mark::Slot(0)]);
        assert!(step.is_structural());
        assert_eq!(step.kind(), StepKind::Swap);
    }

    #[test]
    fn outcome_status() {
        assert_eq!(Outcome::PathNotFound.status(), Status::NotFound);
        assert_eq!(Outcome::HeapEmpty.status(), Status::NotFound);
        assert_eq!(
            Outcome::Tree {
                key: 4,
                outcome: TreeOutcome::Duplicate
            }
            .status(),
            Status::Found
        );
        assert_eq!(
            Outcome::SkipList {
                value: 4,
                outcome: SkipOutcome::NotFound
            }
            .status(),
            Status::NotFound
        );
        assert_eq!(Outcome::RootRemoved { value: 300 }.value(), Some(300));
    }

    #[test]
    fn status_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&Status::NotFound).unwrap(),
            "\"NOT_FOUND\""
        );
    }
}
