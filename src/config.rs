//! Global configuration constants and the world configuration record.

use serde::{Deserialize, Serialize};

use crate::error::{CollisionError, CollisionResult};

/// Default level of detail for polygon hulls (maximum vertex count).
pub const DEFAULT_HULL_LOD: usize = 4;

/// Default number of grid cells along the longer world axis.
pub const DEFAULT_GRID_DIVISIONS: u32 = 9;

/// Default world width covered by the spatial grid.
pub const DEFAULT_WORLD_WIDTH: f32 = 480.0;

/// Default world height covered by the spatial grid.
pub const DEFAULT_WORLD_HEIGHT: f32 = 480.0;

/// Mask that interacts with every other mask.
pub const DEFAULT_COLLISION_MASK: u32 = u32::MAX;

/// Frame budget (ms) above which a tick is reported as slow.
pub const DEFAULT_TICK_BUDGET_MS: f32 = 4.0;

/// Construction-time settings for a [`crate::world::CollisionWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub divisions: u32,
    pub tick_budget_ms: f32,
    /// Refresh hull caches on the rayon pool in `CollisionWorld::step_parallel`.
    pub parallel: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            divisions: DEFAULT_GRID_DIVISIONS,
            tick_budget_ms: DEFAULT_TICK_BUDGET_MS,
            parallel: false,
        }
    }
}

impl CollisionConfig {
    pub fn new(world_width: f32, world_height: f32, divisions: u32) -> Self {
        Self {
            world_width,
            world_height,
            divisions,
            ..Self::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_tick_budget(mut self, budget_ms: f32) -> Self {
        self.tick_budget_ms = budget_ms;
        self
    }

    /// Rejects settings the grid cannot be built from.
    pub fn validate(&self) -> CollisionResult<()> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(self.world_width) || !valid(self.world_height) {
            return Err(CollisionError::InvalidGridSize {
                width: self.world_width,
                height: self.world_height,
            });
        }
        if self.divisions == 0 {
            return Err(CollisionError::InvalidDivisions(self.divisions));
        }
        Ok(())
    }
}
