//! Lazy grid search traces.
//!
//! Each pull pops one frontier entry and returns the resulting step. The
//! trace owns a snapshot of the grid, so edits to the live grid made after
//! planning never leak into a run.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use algoviz_model::{Coord, Grid, NeighborOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::step::{Outcome, Progress, Step, StepTrace};

/// Which grid search to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    AStar,
    #[serde(rename = "bfs")]
    BreadthFirst,
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchKind::AStar => write!(f, "A*"),
            SearchKind::BreadthFirst => write!(f, "BFS"),
        }
    }
}

/// Validate the grid's endpoints and build a trace for `kind`.
pub fn plan(grid: &Grid, kind: SearchKind) -> Result<SearchTrace> {
    let start = grid.check(grid.start().ok_or(Error::MissingStart)?)?;
    let goal = grid.check(grid.end().ok_or(Error::MissingEnd)?)?;
    debug!(%kind, %start, %goal, width = grid.width(), height = grid.height(), "planning search");

    Ok(match kind {
        SearchKind::AStar => SearchTrace::AStar(AStar::new(grid.clone(), start, goal)),
        SearchKind::BreadthFirst => {
            SearchTrace::BreadthFirst(BreadthFirst::new(grid.clone(), start, goal))
        }
    })
}

/// Either grid search behind one type.
#[derive(Debug, Clone)]
pub enum SearchTrace {
    AStar(AStar),
    BreadthFirst(BreadthFirst),
}

impl SearchTrace {
    pub fn kind(&self) -> SearchKind {
        match self {
            SearchTrace::AStar(_) => SearchKind::AStar,
            SearchTrace::BreadthFirst(_) => SearchKind::BreadthFirst,
        }
    }
}

impl StepTrace for SearchTrace {
    fn advance(&mut self) -> Progress {
        match self {
            SearchTrace::AStar(search) => search.advance(),
            SearchTrace::BreadthFirst(search) => search.advance(),
        }
    }
}

/// Walk predecessor links back from `goal`, returning a start-first path.
fn rebuild_path(parents: &HashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut at = goal;
    while at != start {
        match parents.get(&at) {
            Some(&prev) => {
                path.push(prev);
                at = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Open-set entry. Field order gives the heap ordering: lowest `f`, then
/// earliest push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u64,
    seq: u64,
    g: u64,
    coord: Coord,
}

/// Per-cell search bookkeeping.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    g: u64,
    h: u64,
    parent: Option<Coord>,
}

impl SearchNode {
    fn f(&self) -> u64 {
        self.g + self.h
    }
}

/// A* over 4-connected unit-cost cells with the Manhattan heuristic.
#[derive(Debug, Clone)]
pub struct AStar {
    grid: Grid,
    start: Coord,
    goal: Coord,
    open: BinaryHeap<Reverse<OpenEntry>>,
    nodes: HashMap<Coord, SearchNode>,
    closed: HashSet<Coord>,
    closed_order: Vec<Coord>,
    seq: u64,
    frame: u64,
    finished: Option<Outcome>,
}

impl AStar {
    /// Build a search from `start` to `goal`. Prefer [`plan`], which
    /// validates the endpoints.
    pub fn new(grid: Grid, start: Coord, goal: Coord) -> Self {
        let mut search = Self {
            grid,
            start,
            goal,
            open: BinaryHeap::new(),
            nodes: HashMap::new(),
            closed: HashSet::new(),
            closed_order: Vec::new(),
            seq: 0,
            frame: 0,
            finished: None,
        };
        let h = start.manhattan(&goal);
        search.push(
            start,
            SearchNode {
                g: 0,
                h,
                parent: None,
            },
        );
        search
    }

    fn push(&mut self, coord: Coord, node: SearchNode) {
        self.nodes.insert(coord, node);
        self.open.push(Reverse(OpenEntry {
            f: node.f(),
            seq: self.seq,
            g: node.g,
            coord,
        }));
        self.seq += 1;
    }

    /// Whether an open entry still reflects the cell's best known cost.
    fn is_live(&self, entry: &OpenEntry) -> bool {
        !self.closed.contains(&entry.coord)
            && self.nodes.get(&entry.coord).map(|n| n.g) == Some(entry.g)
    }

    fn frontier(&self) -> Vec<Coord> {
        let mut live: Vec<OpenEntry> = self
            .open
            .iter()
            .map(|Reverse(e)| *e)
            .filter(|e| self.is_live(e))
            .collect();
        live.sort_unstable();
        live.into_iter().map(|e| e.coord).collect()
    }

    fn path_to(&self, goal: Coord) -> Vec<Coord> {
        let parents: HashMap<Coord, Coord> = self
            .nodes
            .iter()
            .filter_map(|(c, n)| n.parent.map(|p| (*c, p)))
            .collect();
        rebuild_path(&parents, self.start, goal)
    }

    fn finish(&mut self, outcome: Outcome) -> Progress {
        debug!(frames = self.frame, found = outcome.path().is_some(), "A* finished");
        self.finished = Some(outcome.clone());
        Progress::Finished(outcome)
    }

    fn next_frame(&mut self) -> u64 {
        let frame = self.frame;
        self.frame += 1;
        frame
    }
}

impl StepTrace for AStar {
    fn advance(&mut self) -> Progress {
        if let Some(outcome) = &self.finished {
            return Progress::Finished(outcome.clone());
        }

        let entry = loop {
            match self.open.pop() {
                Some(Reverse(entry)) if self.is_live(&entry) => break entry,
                Some(_) => continue,
                None => return self.finish(Outcome::PathNotFound),
            }
        };
        let current = entry.coord;

        if current == self.goal {
            let path = self.path_to(current);
            let frame = self.next_frame();
            trace!(frame, %current, "A* reached goal");
            let step = Step::Arrive {
                current,
                frontier: self.frontier(),
                visited: self.closed_order.clone(),
                path: path.clone(),
                frame,
            };
            self.finish(Outcome::PathFound { path });
            return Progress::Step(step);
        }

        self.closed.insert(current);
        self.closed_order.push(current);

        for neighbor in self.grid.neighbors(current, NeighborOrder::Axis) {
            if self.closed.contains(&neighbor) {
                continue;
            }
            let tentative = entry.g + 1;
            if let Some(known) = self.nodes.get(&neighbor) {
                if tentative >= known.g {
                    continue;
                }
            }
            let h = neighbor.manhattan(&self.goal);
            self.push(
                neighbor,
                SearchNode {
                    g: tentative,
                    h,
                    parent: Some(current),
                },
            );
        }

        let frame = self.next_frame();
        trace!(frame, %current, open = self.open.len(), "A* expanded");
        Progress::Step(Step::Expand {
            current,
            frontier: self.frontier(),
            visited: self.closed_order.clone(),
            frame,
        })
    }
}

/// Breadth-first search with dedup at enqueue time.
#[derive(Debug, Clone)]
pub struct BreadthFirst {
    grid: Grid,
    start: Coord,
    goal: Coord,
    queue: VecDeque<Coord>,
    seen: HashSet<Coord>,
    parents: HashMap<Coord, Coord>,
    visited: Vec<Coord>,
    frame: u64,
    finished: Option<Outcome>,
}

impl BreadthFirst {
    pub fn new(grid: Grid, start: Coord, goal: Coord) -> Self {
        Self {
            grid,
            start,
            goal,
            queue: VecDeque::from([start]),
            seen: HashSet::from([start]),
            parents: HashMap::new(),
            visited: Vec::new(),
            frame: 0,
            finished: None,
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Progress {
        debug!(frames = self.frame, found = outcome.path().is_some(), "BFS finished");
        self.finished = Some(outcome.clone());
        Progress::Finished(outcome)
    }
}

impl StepTrace for BreadthFirst {
    fn advance(&mut self) -> Progress {
        if let Some(outcome) = &self.finished {
            return Progress::Finished(outcome.clone());
        }
        let Some(current) = self.queue.pop_front() else {
            return self.finish(Outcome::PathNotFound);
        };
        self.visited.push(current);
        let frame = self.frame;
        self.frame += 1;

        if current == self.goal {
            let path = rebuild_path(&self.parents, self.start, current);
            trace!(frame, %current, "BFS reached goal");
            let step = Step::Arrive {
                current,
                frontier: self.queue.iter().copied().collect(),
                visited: self.visited.clone(),
                path: path.clone(),
                frame,
            };
            self.finish(Outcome::PathFound { path });
            return Progress::Step(step);
        }

        for neighbor in self.grid.neighbors(current, NeighborOrder::Clockwise) {
            if self.seen.insert(neighbor) {
                self.parents.insert(neighbor, current);
                self.queue.push_back(neighbor);
            }
        }

        trace!(frame, %current, queued = self.queue.len(), "BFS expanded");
        Progress::Step(Step::Expand {
            current,
            frontier: self.queue.iter().copied().collect(),
            visited: self.visited.clone(),
            frame,
        })
    }
}
