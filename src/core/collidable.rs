use crate::{
    collision::contact::{CollisionData, CollisionResponse},
    core::types::{Rect, Transform2D},
    utils::allocator::ObjectId,
};

/// Capability every object handed to a [`crate::world::CollisionWorld`] must
/// provide. The collision core only reads geometry through it and reports
/// hits back through the callbacks. Hosts only need to be `Send` to use
/// [`crate::world::CollisionWorld::step_parallel`].
pub trait Collidable {
    /// Current position, rotation (degrees) and scale; used to place the hull.
    fn transform(&self) -> Transform2D;

    /// Current world-space bounding box; used for grid bucketing and box tests.
    fn world_box(&self) -> Rect;

    /// Called when this object's collider finds an overlap with `other`.
    fn on_collide(&mut self, other: &Self, data: &CollisionData) -> CollisionResponse;

    /// Called once on the first tick a previously touching object no longer
    /// overlaps this one.
    fn on_collide_end(&mut self, _other: ObjectId) {}

    /// Objects returning `false` are removed from the world at the end of
    /// their turn in the tick.
    fn is_alive(&self) -> bool {
        true
    }
}
