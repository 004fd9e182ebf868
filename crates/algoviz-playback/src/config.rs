//! Gallery configuration.

use std::path::Path;

use algoviz_model::{
    Grid, Heap, HeapType, SkipList, DEFAULT_BRANCHING_FACTOR, DEFAULT_MAX_HEIGHT,
    MAX_HEIGHT_LIMIT, MIN_SIDE, SEED_VALUES,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::speed::{validate_speed, SpeedControl, DEFAULT_SPEED};

/// Settings shared by every visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Steps per second
    pub speed: f64,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Random obstacles placed on a fresh grid
    pub obstacles: usize,
    pub max_height: usize,
    pub branching_factor: u32,
    pub heap_type: HeapType,
    /// Seed for obstacle placement and skip-list levels; entropy when absent
    pub seed: Option<u64>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            grid_width: 10,
            grid_height: 10,
            obstacles: 10,
            max_height: DEFAULT_MAX_HEIGHT,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            heap_type: HeapType::Max,
            seed: None,
        }
    }
}

impl GalleryConfig {
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    #[must_use]
    pub fn with_obstacles(mut self, obstacles: usize) -> Self {
        self.obstacles = obstacles;
        self
    }

    #[must_use]
    pub fn with_skip_list(mut self, max_height: usize, branching_factor: u32) -> Self {
        self.max_height = max_height;
        self.branching_factor = branching_factor;
        self
    }

    #[must_use]
    pub fn with_heap_type(mut self, heap_type: HeapType) -> Self {
        self.heap_type = heap_type;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        validate_speed(self.speed)?;
        if self.grid_width < MIN_SIDE || self.grid_height < MIN_SIDE {
            return Err(algoviz_model::Error::GridTooSmall {
                width: self.grid_width,
                height: self.grid_height,
                min: MIN_SIDE,
            }
            .into());
        }
        if !(1..=MAX_HEIGHT_LIMIT).contains(&self.max_height) {
            return Err(Error::Config(format!(
                "max_height must be between 1 and {MAX_HEIGHT_LIMIT}, got {}",
                self.max_height
            )));
        }
        if self.branching_factor == 0 {
            return Err(Error::Config("branching_factor must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        debug!(path = %path.display(), "loaded gallery config");
        Ok(config)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn speed_control(&self) -> Result<SpeedControl> {
        SpeedControl::new(self.speed)
    }

    /// Grid with default endpoints and the configured random obstacles.
    pub fn grid(&self) -> Result<Grid> {
        let mut grid = Grid::with_default_endpoints(self.grid_width, self.grid_height)?;
        let placed = grid.scatter_obstacles(self.obstacles, &mut self.rng());
        debug!(placed, "scattered obstacles");
        Ok(grid)
    }

    pub fn skip_list(&self) -> Result<SkipList> {
        let list = match self.seed {
            Some(seed) => SkipList::with_seed(self.max_height, self.branching_factor, seed)?,
            None => SkipList::new(self.max_height, self.branching_factor)?,
        };
        Ok(list)
    }

    /// Heap holding the gallery's seed values.
    pub fn heap(&self) -> Heap {
        Heap::from_values(self.heap_type, SEED_VALUES)
    }
}
