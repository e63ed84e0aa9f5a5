//! Collision detection modules: spatial grid broad phase, narrow phase and contact data.

pub mod broadphase;
pub mod contact;
pub mod narrowphase;
pub mod node;

pub use broadphase::SpatialGrid;
pub use contact::{CollisionData, CollisionResponse, TickContext};
pub use narrowphase::{NarrowPhase, SATAlgorithm, WorldShape};
pub use node::SpatialGridNode;
