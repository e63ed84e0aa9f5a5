//! Error types shared by hull construction, grid construction and pair tests.

use thiserror::Error;

use crate::utils::allocator::ObjectId;

/// Result alias used across the crate.
pub type CollisionResult<T> = Result<T, CollisionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollisionError {
    #[error("convex hull requires at least 3 points, got {0}")]
    InsufficientPoints(usize),

    #[error("convex hull input contains a non-finite point")]
    NonFinitePoint,

    #[error("hull level of detail must be at least 3, got {0}")]
    InvalidLod(usize),

    #[error("circle radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),

    #[error("grid dimensions must be positive and finite, got {width}x{height}")]
    InvalidGridSize { width: f32, height: f32 },

    #[error("grid division count must be positive, got {0}")]
    InvalidDivisions(u32),

    /// A convex collider was asked for its shape but its object carries no hull.
    #[error("object {0:?} uses a convex collider without a hull")]
    MissingHull(ObjectId),

    #[error("object {0:?} reported a non-finite bounding box")]
    DegenerateShape(ObjectId),
}

impl CollisionError {
    /// Errors that only cost a single pair test; the tick keeps going.
    pub fn is_pair_local(&self) -> bool {
        matches!(
            self,
            CollisionError::MissingHull(_) | CollisionError::DegenerateShape(_)
        )
    }
}
