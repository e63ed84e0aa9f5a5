use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::utils::allocator::ObjectId;

/// Signal returned by a collision callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionResponse {
    /// Keep testing the remaining candidates.
    Continue,
    /// Stop testing candidates for this object this tick.
    Stop,
}

/// Details of one detected overlap, from the point of view of `object`.
///
/// `normal` is a unit vector pointing from `object` towards `other`;
/// `separation` is `normal * overlap` and moves `other` out of `object`.
/// Low-fidelity tests only report that the shapes touch: `overlap`,
/// `normal` and `separation` are zero and `contact_point` is the midpoint
/// between the two centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionData {
    pub object: ObjectId,
    pub other: ObjectId,
    pub overlap: f32,
    pub normal: Vec2,
    pub separation: Vec2,
    pub contact_point: Vec2,
    pub time: f64,
    pub dt: f32,
    pub other_mask: u32,
}

impl CollisionData {
    pub fn is_detailed(&self) -> bool {
        self.normal != Vec2::ZERO
    }
}

/// Clock values handed to each collider for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickContext {
    pub time: f64,
    pub dt: f32,
}

impl TickContext {
    pub fn new(time: f64, dt: f32) -> Self {
        Self { time, dt }
    }
}
