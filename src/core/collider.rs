use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{collidable::Collidable, hull::Hull, hull::HullKind, types::Rect};
use crate::{
    collision::{
        contact::{CollisionData, TickContext},
        narrowphase::{NarrowPhase, WorldShape},
    },
    config::DEFAULT_COLLISION_MASK,
    error::{CollisionError, CollisionResult},
    utils::allocator::ObjectId,
};

/// Which precise test a collider runs against its candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderKind {
    /// Axis-aligned bounding boxes.
    Box,
    /// Bounding circles (hull circle when present, else inscribed in the box).
    Circle,
    /// Separating axis test over the object's hull.
    Convex,
}

/// `Full` reports penetration detail, `LoFi` only reports that shapes touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TestMode {
    #[default]
    Full,
    LoFi,
}

/// Collision bitmask. Two colliders are tested only if their masks share a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            mask: DEFAULT_COLLISION_MASK,
        }
    }
}

impl CollisionFilter {
    pub fn new(mask: u32) -> Self {
        Self { mask }
    }

    pub fn interacts_with(&self, other: &CollisionFilter) -> bool {
        self.mask & other.mask != 0
    }
}

/// Lifecycle of a collider within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColliderState {
    #[default]
    Idle,
    Testing,
    Resolved,
}

/// Per-object collision component.
#[derive(Debug, Clone)]
pub struct Collider {
    kind: ColliderKind,
    mode: TestMode,
    filter: CollisionFilter,
    hull: Option<Hull>,
    enabled: bool,
    state: ColliderState,
    last_collision: Option<CollisionData>,
    touching: HashSet<ObjectId>,
}

impl Default for Collider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Collider {
    pub fn builder() -> ColliderBuilder {
        ColliderBuilder::new()
    }

    pub fn box_collider() -> Self {
        Self::builder().kind(ColliderKind::Box).build()
    }

    pub fn circle(hull: Option<Hull>) -> Self {
        let builder = Self::builder().kind(ColliderKind::Circle);
        match hull {
            Some(hull) => builder.hull(hull).build(),
            None => builder.build(),
        }
    }

    pub fn convex(hull: Hull) -> Self {
        Self::builder().kind(ColliderKind::Convex).hull(hull).build()
    }

    pub fn kind(&self) -> ColliderKind {
        self.kind
    }

    pub fn mode(&self) -> TestMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TestMode) {
        self.mode = mode;
    }

    pub fn filter(&self) -> CollisionFilter {
        self.filter
    }

    pub fn mask(&self) -> u32 {
        self.filter.mask
    }

    pub fn set_mask(&mut self, mask: u32) {
        self.filter.mask = mask;
    }

    pub fn hull(&self) -> Option<&Hull> {
        self.hull.as_ref()
    }

    pub fn hull_mut(&mut self) -> Option<&mut Hull> {
        self.hull.as_mut()
    }

    /// Swaps the shape, e.g. when the owning object changes form.
    pub fn set_hull(&mut self, hull: Option<Hull>) -> Option<Hull> {
        std::mem::replace(&mut self.hull, hull)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn state(&self) -> ColliderState {
        self.state
    }

    /// Data from the most recent hit this tick, if any.
    pub fn last_collision(&self) -> Option<&CollisionData> {
        self.last_collision.as_ref()
    }

    pub fn is_touching(&self, other: ObjectId) -> bool {
        self.touching.contains(&other)
    }

    /// Projects the hull, if any, for the host's current transform.
    pub fn refresh<T: Collidable>(&mut self, host: &T) {
        if let Some(hull) = self.hull.as_mut() {
            hull.refresh(&host.transform());
        }
    }

    /// World-space shape this collider presents to the narrow phase. A shape
    /// with a non-finite box, center, radius or vertex is `DegenerateShape`.
    pub fn world_shape<T: Collidable>(&mut self, id: ObjectId, host: &T) -> CollisionResult<WorldShape<'_>> {
        let bounds = host.world_box();
        if !bounds.is_finite() {
            return Err(CollisionError::DegenerateShape(id));
        }

        let shape = self.shape_in(id, host, bounds)?;
        let finite = shape.center.is_finite()
            && shape.radius.is_finite()
            && shape.vertices.iter().all(|v| v.is_finite());
        if finite {
            Ok(shape)
        } else {
            Err(CollisionError::DegenerateShape(id))
        }
    }

    fn shape_in<T: Collidable>(&mut self, id: ObjectId, host: &T, bounds: Rect) -> CollisionResult<WorldShape<'_>> {
        match self.kind {
            ColliderKind::Box => Ok(WorldShape::from_rect(bounds)),
            ColliderKind::Circle => match self.hull.as_mut() {
                Some(hull) => {
                    let transform = host.transform();
                    let center = hull.center(&transform);
                    let radius = hull.radius(&transform);
                    Ok(WorldShape::circle(center, radius, bounds))
                }
                None => Ok(WorldShape::circle(
                    bounds.center(),
                    bounds.width.max(bounds.height) * 0.5,
                    bounds,
                )),
            },
            ColliderKind::Convex => {
                let hull = self.hull.as_mut().ok_or(CollisionError::MissingHull(id))?;
                hull.refresh(&host.transform());
                let kind = hull.kind();
                let (vertices, center, radius) =
                    hull.cached().ok_or(CollisionError::MissingHull(id))?;
                Ok(match kind {
                    HullKind::Circle => WorldShape::circle(center, radius, bounds),
                    HullKind::NGon => WorldShape::polygon(vertices, center, radius, bounds),
                })
            }
        }
    }

    /// Mask filter, then the two-stage test of `host` against `other_host`.
    pub fn test<T: Collidable>(
        &mut self,
        id: ObjectId,
        host: &T,
        other: &mut Collider,
        other_id: ObjectId,
        other_host: &T,
        ctx: &TickContext,
    ) -> CollisionResult<Option<CollisionData>> {
        if !self.filter.interacts_with(&other.filter) {
            return Ok(None);
        }

        self.state = ColliderState::Testing;
        let (kind, mode, other_mask) = (self.kind, self.mode, other.mask());

        let shape = self.world_shape(id, host)?;
        let other_shape = other.world_shape(other_id, other_host)?;

        Ok(NarrowPhase::collide(kind, mode, &shape, &other_shape).map(|contact| CollisionData {
            object: id,
            other: other_id,
            overlap: contact.depth,
            normal: contact.normal,
            separation: contact.normal * contact.depth,
            contact_point: contact.point,
            time: ctx.time,
            dt: ctx.dt,
            other_mask,
        }))
    }

    /// Discards last tick's data.
    pub(crate) fn begin_tick(&mut self) {
        self.last_collision = None;
        self.state = ColliderState::Idle;
    }

    pub(crate) fn resolve(&mut self, data: CollisionData) {
        self.last_collision = Some(data);
        self.state = ColliderState::Resolved;
    }

    /// Replaces the touching set and returns the objects no longer touched.
    /// Objects skipped by an early stop keep their previous status.
    pub(crate) fn finish_tick(
        &mut self,
        mut touching: HashSet<ObjectId>,
        untested: &[ObjectId],
    ) -> Vec<ObjectId> {
        let mut ended = Vec::new();
        for &previous in &self.touching {
            if touching.contains(&previous) {
                continue;
            }
            if untested.contains(&previous) {
                touching.insert(previous);
            } else {
                ended.push(previous);
            }
        }
        ended.sort();

        self.touching = touching;
        self.state = if self.last_collision.is_some() {
            ColliderState::Resolved
        } else {
            ColliderState::Idle
        };
        ended
    }
}

pub struct ColliderBuilder {
    kind: ColliderKind,
    mode: TestMode,
    filter: CollisionFilter,
    hull: Option<Hull>,
    enabled: bool,
}

impl Default for ColliderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColliderBuilder {
    pub fn new() -> Self {
        Self {
            kind: ColliderKind::Box,
            mode: TestMode::Full,
            filter: CollisionFilter::default(),
            hull: None,
            enabled: true,
        }
    }

    pub fn kind(mut self, kind: ColliderKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn hull(mut self, hull: Hull) -> Self {
        self.hull = Some(hull);
        self
    }

    pub fn mask(mut self, mask: u32) -> Self {
        self.filter = CollisionFilter::new(mask);
        self
    }

    pub fn lofi(mut self, lofi: bool) -> Self {
        self.mode = if lofi { TestMode::LoFi } else { TestMode::Full };
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn build(self) -> Collider {
        Collider {
            kind: self.kind,
            mode: self.mode,
            filter: self.filter,
            hull: self.hull,
            enabled: self.enabled,
            state: ColliderState::Idle,
            last_collision: None,
            touching: HashSet::new(),
        }
    }
}
