use std::collections::HashSet;

use log::debug;

use crate::{
    collision::{
        broadphase::SpatialGrid,
        contact::{CollisionResponse, TickContext},
    },
    config::CollisionConfig,
    core::{collidable::Collidable, collider::Collider},
    error::CollisionResult,
    utils::{
        allocator::{Arena, ObjectId},
        logging::ScopedTimer,
        profiling::{CollisionProfiler, PhaseTimer},
    },
};

struct Entry<T> {
    object: T,
    collider: Collider,
}

/// Owns the collidable objects, the shared spatial grid and the clock, and
/// runs every collider once per tick.
pub struct CollisionWorld<T: Collidable> {
    entries: Arena<Entry<T>>,
    order: Vec<ObjectId>,
    grid: SpatialGrid,
    time: f64,
    tick_budget_ms: f32,
    parallel_enabled: bool,
    profiler: CollisionProfiler,
}

impl<T: Collidable> CollisionWorld<T> {
    pub fn new(config: &CollisionConfig) -> CollisionResult<Self> {
        config.validate()?;
        let grid = SpatialGrid::new(config.world_width, config.world_height, config.divisions)?;
        let mut world = Self::with_grid(grid);
        world.tick_budget_ms = config.tick_budget_ms;
        world.parallel_enabled = config.parallel;
        Ok(world)
    }

    pub fn with_grid(grid: SpatialGrid) -> Self {
        Self {
            entries: Arena::new(),
            order: Vec::new(),
            grid,
            time: 0.0,
            tick_budget_ms: crate::config::DEFAULT_TICK_BUDGET_MS,
            parallel_enabled: false,
            profiler: CollisionProfiler::default(),
        }
    }

    /// Registers an object. Objects are processed in registration order.
    pub fn add_object(&mut self, object: T, collider: Collider) -> ObjectId {
        let bounds = object.world_box();
        let enabled = collider.is_enabled();
        let id = self.entries.insert(Entry { object, collider });
        self.order.push(id);
        if enabled && bounds.is_finite() {
            self.grid.update_membership(id, &bounds);
        }
        id
    }

    /// Unregisters an object and drops it from every grid cell.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<T> {
        let entry = self.entries.remove(id)?;
        self.grid.remove_object(id);
        self.order.retain(|&other| other != id);
        Some(entry.object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&T> {
        self.entries.get(id).map(|entry| &entry.object)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.entries.get_mut(id).map(|entry| &mut entry.object)
    }

    pub fn collider(&self, id: ObjectId) -> Option<&Collider> {
        self.entries.get(id).map(|entry| &entry.collider)
    }

    pub fn collider_mut(&mut self, id: ObjectId) -> Option<&mut Collider> {
        self.entries.get_mut(id).map(|entry| &mut entry.collider)
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Ids in registration order.
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Simulation time accumulated over all ticks.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn profiler(&self) -> &CollisionProfiler {
        &self.profiler
    }

    /// Enables or disables the rayon hull refresh used by `step_parallel`.
    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.parallel_enabled = enabled;
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }

    /// Runs one tick: every collider, in registration order, refreshes its
    /// grid membership, gathers candidates and tests them.
    pub fn step(&mut self, dt: f32) {
        self.tick(dt, Self::refresh_shapes);
    }

    fn tick(&mut self, dt: f32, refresh: impl FnOnce(&mut Self)) {
        let timer = ScopedTimer::with_budget("collision_step", self.tick_budget_ms);
        self.profiler.reset();
        self.time += f64::from(dt);
        let ctx = TickContext::new(self.time, dt);

        refresh(self);

        // Objects removed mid-tick simply fail to resolve below.
        let order = self.order.clone();
        self.profiler.object_count = order.len();
        for id in order {
            self.execute(id, &ctx);
        }

        self.grid.clear_dirty();
        self.profiler.total_frame_time = timer.finish();
        self.profiler.report();
    }

    fn execute(&mut self, id: ObjectId, ctx: &TickContext) {
        let broad = PhaseTimer::start();
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        entry.collider.begin_tick();

        let bounds = entry.object.world_box();
        if !entry.collider.is_enabled() || !bounds.is_finite() {
            if bounds.is_finite() {
                debug!("collider {id:?} disabled, leaving the grid");
            } else {
                debug!("object {id:?} has a non-finite bounding box, leaving the grid");
            }
            self.grid.remove_object(id);
            broad.stop(&mut self.profiler.broad_phase_time);
            return;
        }

        self.grid.update_membership(id, &bounds);
        let candidates = self.grid.potential_collisions(id);
        broad.stop(&mut self.profiler.broad_phase_time);
        self.profiler.candidate_count += candidates.len();

        let narrow = PhaseTimer::start();
        let mut touching = HashSet::new();
        let mut untested: &[ObjectId] = &[];

        for (index, &other_id) in candidates.iter().enumerate() {
            let Some((entry, other)) = self.entries.get2_mut(id, other_id) else {
                continue;
            };
            if !other.collider.is_enabled() || !other.object.is_alive() {
                continue;
            }

            self.profiler.pair_tests += 1;
            let data = match entry.collider.test(
                id,
                &entry.object,
                &mut other.collider,
                other_id,
                &other.object,
                ctx,
            ) {
                Ok(Some(data)) => data,
                Ok(None) => continue,
                Err(err) => {
                    debug!("skipping pair {id:?} -> {other_id:?}: {err}");
                    self.profiler.skipped_pairs += 1;
                    continue;
                }
            };

            touching.insert(other_id);
            self.profiler.collision_count += 1;
            let response = entry.object.on_collide(&other.object, &data);
            entry.collider.resolve(data);

            if response == CollisionResponse::Stop {
                untested = &candidates[index + 1..];
                break;
            }
        }
        narrow.stop(&mut self.profiler.narrow_phase_time);

        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        for other_id in entry.collider.finish_tick(touching, untested) {
            entry.object.on_collide_end(other_id);
        }

        if !entry.object.is_alive() {
            debug!("object {id:?} destroyed during collision tick");
            self.remove_object(id);
        }
    }

    fn refresh_shapes(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.collider.refresh(&entry.object);
        }
    }
}

#[cfg(feature = "parallel")]
impl<T: Collidable + Send> CollisionWorld<T> {
    /// Same as [`CollisionWorld::step`], but when parallel refresh is enabled
    /// the hull caches are projected on the rayon pool first. Callbacks and
    /// pair tests still run on the calling thread in registration order.
    pub fn step_parallel(&mut self, dt: f32) {
        if !self.parallel_enabled {
            self.step(dt);
            return;
        }
        self.tick(dt, |world| {
            use rayon::prelude::*;
            world
                .entries
                .par_iter_mut()
                .for_each(|entry| entry.collider.refresh(&entry.object));
        });
    }
}
