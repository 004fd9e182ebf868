//! Rectangular grid of cells for pathfinding.
//!
//! Cells are addressed by `(x, y)` with `x` growing to the right and `y`
//! growing downward, so `(0, height - 1)` is the bottom-left corner.
//! Movement is 4-directional with unit cost.

use std::ops::{Add, Sub};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

/// Smallest accepted side length for a grid.
pub const MIN_SIDE: usize = 5;

/// A position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    /// Column
    pub x: i64,
    /// Row
    pub y: i64,
}

impl Coord {
    /// Top-left corner.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const RIGHT: Self = Self { x: 1, y: 0 };
    pub const DOWN: Self = Self { x: 0, y: 1 };
    pub const LEFT: Self = Self { x: -1, y: 0 };
    pub const UP: Self = Self { x: 0, y: -1 };

    /// Create a new coordinate.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance `|dx| + |dy|`.
    ///
    /// Admissible only for 4-directional movement.
    pub fn manhattan(&self, other: &Self) -> u64 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }
}

impl Add for Coord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Coord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed order in which neighbors are reported.
///
/// The order decides which of several equally good cells a search reaches
/// first, so each algorithm pins its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeighborOrder {
    /// Right, down, left, up. Used by breadth-first search.
    #[default]
    Clockwise,
    /// Left, right, up, down. Used by A*.
    Axis,
}

impl NeighborOrder {
    /// Direction offsets in this order.
    pub const fn directions(self) -> [Coord; 4] {
        match self {
            NeighborOrder::Clockwise => [Coord::RIGHT, Coord::DOWN, Coord::LEFT, Coord::UP],
            NeighborOrder::Axis => [Coord::LEFT, Coord::RIGHT, Coord::UP, Coord::DOWN],
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i64,
    pub y: i64,
    pub obstacle: bool,
}

impl Cell {
    /// Identity of this cell.
    pub const fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// A width x height grid with obstacles and optional search endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridParts"))]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major obstacle flags
    obstacles: Vec<bool>,
    start: Option<Coord>,
    end: Option<Coord>,
}

/// Serialized grid before its invariants are checked.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct GridParts {
    width: usize,
    height: usize,
    obstacles: Vec<bool>,
    start: Option<Coord>,
    end: Option<Coord>,
}

#[cfg(feature = "serde")]
impl TryFrom<GridParts> for Grid {
    type Error = Error;

    fn try_from(parts: GridParts) -> Result<Self> {
        let mut grid = Self::new(parts.width, parts.height)?;
        if parts.obstacles.len() != grid.obstacles.len() {
            return Err(Error::ObstacleCount {
                expected: grid.obstacles.len(),
                actual: parts.obstacles.len(),
            });
        }
        grid.obstacles = parts.obstacles;
        for endpoint in [parts.start, parts.end].into_iter().flatten() {
            if grid.is_obstacle(grid.check(endpoint)?) {
                return Err(Error::EndpointCell(endpoint));
            }
        }
        grid.start = parts.start;
        grid.end = parts.end;
        Ok(grid)
    }
}

impl Grid {
    /// Create an empty grid with no endpoints.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(Error::GridTooSmall {
                width,
                height,
                min: MIN_SIDE,
            });
        }
        Ok(Self {
            width,
            height,
            obstacles: vec![false; width * height],
            start: None,
            end: None,
        })
    }

    /// Create an empty grid with start at the bottom-left corner and end at
    /// the top-right corner.
    pub fn with_default_endpoints(width: usize, height: usize) -> Result<Self> {
        let mut grid = Self::new(width, height)?;
        grid.place_default_endpoints();
        Ok(grid)
    }

    fn place_default_endpoints(&mut self) {
        self.start = Some(Coord::new(0, self.height as i64 - 1));
        self.end = Some(Coord::new(self.width as i64 - 1, 0));
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the coordinate lies inside the grid.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.y as usize * self.width + coord.x as usize)
    }

    /// Bounds-check a coordinate.
    pub fn check(&self, coord: Coord) -> Result<Coord> {
        if self.contains(coord) {
            Ok(coord)
        } else {
            Err(Error::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// The cell at `(x, y)`.
    pub fn cell_at(&self, x: i64, y: i64) -> Result<Cell> {
        let coord = self.check(Coord::new(x, y))?;
        Ok(Cell {
            x,
            y,
            obstacle: self.is_obstacle(coord),
        })
    }

    /// Whether the cell is blocked. Out-of-bounds coordinates are not
    /// obstacles; use [`Grid::contains`] to reject them.
    pub fn is_obstacle(&self, coord: Coord) -> bool {
        self.index(coord).map_or(false, |i| self.obstacles[i])
    }

    /// Block or unblock a cell.
    pub fn set_obstacle(&mut self, coord: Coord, obstacle: bool) -> Result<()> {
        let coord = self.check(coord)?;
        if obstacle && (self.start == Some(coord) || self.end == Some(coord)) {
            return Err(Error::EndpointCell(coord));
        }
        if let Some(i) = self.index(coord) {
            self.obstacles[i] = obstacle;
        }
        Ok(())
    }

    /// Flip a cell's obstacle flag, returning the new value.
    pub fn toggle_obstacle(&mut self, coord: Coord) -> Result<bool> {
        let blocked = !self.is_obstacle(self.check(coord)?);
        self.set_obstacle(coord, blocked)?;
        Ok(blocked)
    }

    pub fn start(&self) -> Option<Coord> {
        self.start
    }

    pub fn end(&self) -> Option<Coord> {
        self.end
    }

    /// Move the start point. The target cell is cleared of obstacles.
    pub fn set_start(&mut self, coord: Coord) -> Result<()> {
        let coord = self.check(coord)?;
        self.set_obstacle(coord, false)?;
        self.start = Some(coord);
        Ok(())
    }

    /// Move the end point. The target cell is cleared of obstacles.
    pub fn set_end(&mut self, coord: Coord) -> Result<()> {
        let coord = self.check(coord)?;
        self.set_obstacle(coord, false)?;
        self.end = Some(coord);
        Ok(())
    }

    /// Rebuild the grid at a new size with default endpoints and no
    /// obstacles.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        *self = Self::with_default_endpoints(width, height)?;
        Ok(())
    }

    /// Clear all obstacles and both endpoints.
    pub fn reset(&mut self) {
        self.obstacles.fill(false);
        self.start = None;
        self.end = None;
    }

    /// Block up to `count` random free cells, never an endpoint.
    ///
    /// Returns the number of obstacles actually placed.
    pub fn scatter_obstacles<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> usize {
        let free: Vec<usize> = (0..self.obstacles.len())
            .filter(|&i| !self.obstacles[i])
            .filter(|&i| {
                let coord = self.coord_of(i);
                self.start != Some(coord) && self.end != Some(coord)
            })
            .collect();

        let chosen: Vec<usize> = free.choose_multiple(rng, count).copied().collect();
        for &i in &chosen {
            self.obstacles[i] = true;
        }
        chosen.len()
    }

    fn coord_of(&self, index: usize) -> Coord {
        Coord::new((index % self.width) as i64, (index / self.width) as i64)
    }

    /// Passable in-bounds neighbors of `coord`, in the given order.
    pub fn neighbors(&self, coord: Coord, order: NeighborOrder) -> Vec<Coord> {
        order
            .directions()
            .into_iter()
            .map(|dir| coord + dir)
            .filter(|&n| self.contains(n) && !self.is_obstacle(n))
            .collect()
    }

    /// Number of blocked cells.
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.iter().filter(|&&o| o).count()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.obstacles.len()).map(move |i| {
            let coord = self.coord_of(i);
            Cell {
                x: coord.x,
                y: coord.y,
                obstacle: self.obstacles[i],
            }
        })
    }
}
