//! Core data types: transforms, rectangles, hulls and the collider component.

pub mod collidable;
pub mod collider;
pub mod hull;
pub mod types;

pub use collidable::Collidable;
pub use collider::{Collider, ColliderBuilder, ColliderKind, ColliderState, CollisionFilter, TestMode};
pub use hull::{Hull, HullKind};
pub use types::{Rect, Transform2D};
