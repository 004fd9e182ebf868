//! Probabilistic skip list with header and nil sentinels.
//!
//! Nodes live in an index arena. Slot 0 is the `-∞` header and slot 1 the
//! `+∞` nil; both always span `max_height` levels. Every other node keeps
//! the level count drawn when it was inserted, so changing `max_height` or
//! `branching_factor` only shapes nodes inserted afterwards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// Upper bound accepted for `max_height`.
pub const MAX_HEIGHT_LIMIT: usize = 32;

pub const DEFAULT_MAX_HEIGHT: usize = 12;
pub const DEFAULT_BRANCHING_FACTOR: u32 = 4;

const HEAD: usize = 0;
const NIL: usize = 1;

/// A value in the list, including the two sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    /// Header sentinel
    NegInf,
    Value(i64),
    /// Nil sentinel
    PosInf,
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::NegInf => write!(f, "HEAD"),
            Key::Value(v) => write!(f, "{v}"),
            Key::PosInf => write!(f, "NIL"),
        }
    }
}

#[derive(Debug, Clone)]
struct SkipNode {
    key: Key,
    forward: Vec<usize>,
}

/// One node visited while scanning a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hop {
    pub level: usize,
    pub key: Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipOutcome {
    /// New node linked in with this many levels.
    Inserted { levels: usize },
    /// Value already present; nothing changed.
    Duplicate,
    Found,
    NotFound,
    Deleted,
}

/// Traversal record of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkipReport {
    pub value: i64,
    /// Nodes visited, top level first. Each level starts at the node the
    /// previous level stopped on.
    pub path: Vec<Hop>,
    /// Predecessor per level (index = level) at the time of the search.
    pub update: Vec<Key>,
    pub outcome: SkipOutcome,
}

impl SkipReport {
    /// Whether the value is in the list after the operation.
    pub fn found(&self) -> bool {
        matches!(
            self.outcome,
            SkipOutcome::Found | SkipOutcome::Inserted { .. } | SkipOutcome::Duplicate
        )
    }
}

/// Summary of one node for drawing: value and level count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSummary {
    pub key: Key,
    pub levels: usize,
}

/// Skip list over `i64` values.
#[derive(Debug, Clone)]
pub struct SkipList {
    nodes: Vec<Option<SkipNode>>,
    free: Vec<usize>,
    max_height: usize,
    branching_factor: u32,
    /// Number of levels currently in use
    level: usize,
    len: usize,
    rng: StdRng,
}

fn check_max_height(max_height: usize) -> Result<usize> {
    if (1..=MAX_HEIGHT_LIMIT).contains(&max_height) {
        Ok(max_height)
    } else {
        Err(Error::InvalidParameter {
            name: "max_height",
            value: max_height as i64,
            expected: "1..=32",
        })
    }
}

fn check_branching_factor(branching_factor: u32) -> Result<u32> {
    if branching_factor >= 1 {
        Ok(branching_factor)
    } else {
        Err(Error::InvalidParameter {
            name: "branching_factor",
            value: i64::from(branching_factor),
            expected: ">= 1",
        })
    }
}

impl SkipList {
    /// Create an empty list drawing levels from OS entropy.
    pub fn new(max_height: usize, branching_factor: u32) -> Result<Self> {
        Self::with_rng(max_height, branching_factor, StdRng::from_entropy())
    }

    /// Create an empty list with a reproducible level sequence.
    pub fn with_seed(max_height: usize, branching_factor: u32, seed: u64) -> Result<Self> {
        Self::with_rng(max_height, branching_factor, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_height: usize, branching_factor: u32, rng: StdRng) -> Result<Self> {
        let max_height = check_max_height(max_height)?;
        let branching_factor = check_branching_factor(branching_factor)?;
        let head = SkipNode {
            key: Key::NegInf,
            forward: vec![NIL; max_height],
        };
        let nil = SkipNode {
            key: Key::PosInf,
            forward: vec![NIL; max_height],
        };
        Ok(Self {
            nodes: vec![Some(head), Some(nil)],
            free: Vec::new(),
            max_height,
            branching_factor,
            level: 0,
            len: 0,
            rng,
        })
    }

    pub fn max_height(&self) -> usize {
        self.max_height
    }

    pub fn branching_factor(&self) -> u32 {
        self.branching_factor
    }

    /// Levels currently in use.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Level count of the header sentinel.
    pub fn header_levels(&self) -> usize {
        self.node(HEAD).forward.len()
    }

    /// Level count of the nil sentinel.
    pub fn nil_levels(&self) -> usize {
        self.node(NIL).forward.len()
    }

    // Forward links only ever point at occupied slots.
    fn node(&self, id: usize) -> &SkipNode {
        match &self.nodes[id] {
            Some(node) => node,
            None => panic!("dangling skip list link to slot {id}"),
        }
    }

    fn node_mut(&mut self, id: usize) -> &mut SkipNode {
        match &mut self.nodes[id] {
            Some(node) => node,
            None => panic!("dangling skip list link to slot {id}"),
        }
    }

    fn key(&self, id: usize) -> Key {
        self.node(id).key
    }

    fn forward(&self, id: usize, level: usize) -> usize {
        self.node(id).forward[level]
    }

    fn set_forward(&mut self, id: usize, level: usize, to: usize) {
        self.node_mut(id).forward[level] = to;
    }

    /// Change the height cap.
    ///
    /// The sentinels are resized. Nodes keep their level count; links above
    /// a reduced cap are severed since nothing can reach them.
    pub fn set_max_height(&mut self, max_height: usize) -> Result<()> {
        let max_height = check_max_height(max_height)?;
        for sentinel in [HEAD, NIL] {
            self.node_mut(sentinel).forward.resize(max_height, NIL);
        }
        for node in self.nodes.iter_mut().skip(2).flatten() {
            for link in node.forward.iter_mut().skip(max_height) {
                *link = NIL;
            }
        }
        self.max_height = max_height;
        self.level = self.level.min(max_height);
        self.trim_level();
        Ok(())
    }

    /// Change the promotion odds for future inserts.
    pub fn set_branching_factor(&mut self, branching_factor: u32) -> Result<()> {
        self.branching_factor = check_branching_factor(branching_factor)?;
        Ok(())
    }

    /// Draw a level: keep climbing with probability `1 / branching_factor`,
    /// never past `max_height`.
    pub fn random_level(&mut self) -> usize {
        let p = 1.0 / f64::from(self.branching_factor);
        let mut height = 1;
        while height < self.max_height && self.rng.gen_bool(p) {
            height += 1;
        }
        height
    }

    /// Descend toward `value`, returning the predecessor per level (sized
    /// to `max_height`, header above the active level) and the hop path.
    fn locate(&self, value: i64) -> (Vec<usize>, Vec<Hop>) {
        let target = Key::Value(value);
        let mut update = vec![HEAD; self.max_height];
        let mut path = Vec::new();
        let mut current = HEAD;
        for level in (0..self.level).rev() {
            path.push(Hop {
                level,
                key: self.key(current),
            });
            loop {
                let next = self.forward(current, level);
                if self.key(next) >= target {
                    break;
                }
                current = next;
                path.push(Hop {
                    level,
                    key: self.key(current),
                });
            }
            update[level] = current;
        }
        (update, path)
    }

    fn report(
        &self,
        value: i64,
        update: &[usize],
        path: Vec<Hop>,
        outcome: SkipOutcome,
    ) -> SkipReport {
        SkipReport {
            value,
            path,
            update: update[..self.level.max(1).min(update.len())]
                .iter()
                .map(|&id| self.key(id))
                .collect(),
            outcome,
        }
    }

    /// Insert `value`. Duplicates are rejected without any change.
    pub fn insert(&mut self, value: i64) -> SkipReport {
        let (mut update, path) = self.locate(value);
        let candidate = self.forward(update[0], 0);
        if self.key(candidate) == Key::Value(value) {
            return self.report(value, &update, path, SkipOutcome::Duplicate);
        }

        let levels = self.random_level();
        if levels > self.level {
            for slot in update.iter_mut().take(levels).skip(self.level) {
                *slot = HEAD;
            }
            self.level = levels;
        }

        let node = SkipNode {
            key: Key::Value(value),
            forward: (0..levels).map(|l| self.forward(update[l], l)).collect(),
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        for (level, &pred) in update.iter().enumerate().take(levels) {
            self.set_forward(pred, level, id);
        }
        self.len += 1;

        self.report(value, &update, path, SkipOutcome::Inserted { levels })
    }

    /// Look up `value`.
    pub fn search(&self, value: i64) -> SkipReport {
        let (update, path) = self.locate(value);
        let candidate = self.forward(update[0], 0);
        let outcome = if self.key(candidate) == Key::Value(value) {
            SkipOutcome::Found
        } else {
            SkipOutcome::NotFound
        };
        self.report(value, &update, path, outcome)
    }

    pub fn contains(&self, value: i64) -> bool {
        self.search(value).found()
    }

    /// Unlink `value` if present.
    pub fn delete(&mut self, value: i64) -> SkipReport {
        let (update, path) = self.locate(value);
        let candidate = self.forward(update[0], 0);
        if self.key(candidate) != Key::Value(value) {
            return self.report(value, &update, path, SkipOutcome::NotFound);
        }

        let report = self.report(value, &update, path, SkipOutcome::Deleted);
        for level in 0..self.level {
            if self.forward(update[level], level) != candidate {
                break;
            }
            let next = self.forward(candidate, level);
            self.set_forward(update[level], level, next);
        }
        self.nodes[candidate] = None;
        self.free.push(candidate);
        self.len -= 1;
        self.trim_level();
        report
    }

    fn trim_level(&mut self) {
        while self.level > 0 && self.forward(HEAD, self.level - 1) == NIL {
            self.level -= 1;
        }
    }

    /// Values in ascending order.
    pub fn values(&self) -> Vec<i64> {
        self.nodes()
            .into_iter()
            .filter_map(|n| match n.key {
                Key::Value(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Every node along level 0 from HEAD to NIL with its level count.
    pub fn nodes(&self) -> Vec<NodeSummary> {
        let mut out = Vec::with_capacity(self.len + 2);
        let mut current = HEAD;
        loop {
            let node = self.node(current);
            out.push(NodeSummary {
                key: node.key,
                levels: node.forward.len(),
            });
            if current == NIL {
                break;
            }
            current = node.forward[0];
        }
        out
    }

    /// Every level reachable from the header is strictly increasing and ends
    /// at nil.
    pub fn is_well_formed(&self) -> bool {
        (0..self.max_height).all(|level| {
            let mut current = HEAD;
            let mut steps = 0;
            while current != NIL {
                let next = self.forward(current, level);
                if next != NIL && self.key(next) <= self.key(current) {
                    return false;
                }
                current = next;
                steps += 1;
                if steps > self.len + 1 {
                    return false;
                }
            }
            true
        })
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self {
            nodes: vec![
                Some(SkipNode {
                    key: Key::NegInf,
                    forward: vec![NIL; DEFAULT_MAX_HEIGHT],
                }),
                Some(SkipNode {
                    key: Key::PosInf,
                    forward: vec![NIL; DEFAULT_MAX_HEIGHT],
                }),
            ],
            free: Vec::new(),
            max_height: DEFAULT_MAX_HEIGHT,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            level: 0,
            len: 0,
            rng: StdRng::from_entropy(),
        }
    }
}
