//! Utility helpers: generational arena, 2D math, logging and profiling.

pub mod allocator;
pub mod logging;
pub mod math;
pub mod profiling;

pub use allocator::{Arena, ObjectId};
