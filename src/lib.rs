//! Hullgrid – broad-phase spatial grid and convex-hull collision detection
//! for 2D games.
//!
//! Objects are bucketed into a uniform grid by their bounding boxes; each
//! tick every collider gathers the objects sharing its cells, rejects pairs
//! whose bounding circles do not overlap and runs a precise box, circle or
//! separating-axis test on the rest. Hits are delivered to the owning object
//! through the [`Collidable`] callbacks. Only detection is provided; response
//! and simulation are left to the host.

pub mod collision;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    broadphase::SpatialGrid,
    contact::{CollisionData, CollisionResponse, TickContext},
    narrowphase::{NarrowPhase, SATAlgorithm, WorldShape},
    node::SpatialGridNode,
};
pub use config::CollisionConfig;
pub use self::core::{
    collidable::Collidable,
    collider::{Collider, ColliderBuilder, ColliderKind, ColliderState, CollisionFilter, TestMode},
    hull::{Hull, HullKind},
    types::{Rect, Transform2D},
};
pub use error::{CollisionError, CollisionResult};
pub use utils::allocator::ObjectId;
pub use world::CollisionWorld;
