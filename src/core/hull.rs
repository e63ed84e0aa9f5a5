//! Convex collision shapes: polygon, circle and oriented box.
//!
//! A hull keeps its vertices in object-local space and lazily projects them
//! into world space for whatever transform it is asked about. The projection
//! is cached and only recomputed when the transform changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::{Rect, Transform2D};
use crate::{
    config::DEFAULT_HULL_LOD,
    error::{CollisionError, CollisionResult},
    utils::math,
};

/// Shape discriminator used by the narrow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullKind {
    NGon,
    Circle,
}

#[derive(Debug, Clone)]
struct WorldHull {
    transform: Transform2D,
    vertices: Vec<Vec2>,
    center: Vec2,
    radius: f32,
}

#[derive(Debug, Clone)]
pub struct Hull {
    kind: HullKind,
    vertices: Vec<Vec2>,
    center: Vec2,
    radius: f32,
    cache: Option<WorldHull>,
}

impl Hull {
    /// Builds a convex polygon from an unordered point set, reduced to at most
    /// `lod` vertices.
    pub fn convex(points: &[Vec2], lod: usize) -> CollisionResult<Self> {
        if points.len() < 3 {
            return Err(CollisionError::InsufficientPoints(points.len()));
        }
        if lod < 3 {
            return Err(CollisionError::InvalidLod(lod));
        }
        if !points.iter().all(|p| p.is_finite()) {
            return Err(CollisionError::NonFinitePoint);
        }

        let center = math::centroid(points);
        let radius = math::max_distance(center, points);

        let vertices = if points.len() <= lod && math::is_convex(points) {
            points.to_vec()
        } else {
            math::reduce_hull(math::convex_hull(points), lod)
        };

        if vertices.len() < 3 {
            return Err(CollisionError::InsufficientPoints(vertices.len()));
        }

        Ok(Self {
            kind: HullKind::NGon,
            vertices,
            center,
            radius,
            cache: None,
        })
    }

    /// Same as [`Hull::convex`] with the default level of detail.
    pub fn polygon(points: &[Vec2]) -> CollisionResult<Self> {
        Self::convex(points, DEFAULT_HULL_LOD)
    }

    /// Circle around `center`. The vertex list is the bounding square; overlap
    /// tests use `radius` directly.
    pub fn circle(center: Vec2, radius: f32) -> CollisionResult<Self> {
        if !radius.is_finite() || radius < 0.0 || !center.is_finite() {
            return Err(CollisionError::InvalidRadius(radius));
        }
        let bounds = Rect::centered(center, Vec2::splat(radius));
        Ok(Self {
            kind: HullKind::Circle,
            vertices: bounds.corners().to_vec(),
            center,
            radius,
            cache: None,
        })
    }

    /// Circle inscribed in `rect` (radius is half the larger side).
    pub fn circle_from_rect(rect: Rect) -> CollisionResult<Self> {
        let radius = rect.width.max(rect.height) * 0.5;
        if !rect.is_finite() {
            return Err(CollisionError::InvalidRadius(radius));
        }
        Ok(Self {
            kind: HullKind::Circle,
            vertices: rect.corners().to_vec(),
            center: rect.center(),
            radius,
            cache: None,
        })
    }

    /// Oriented box with its local origin at `(0, 0)`. The four corners are
    /// kept verbatim.
    pub fn obb(rect: Rect) -> CollisionResult<Self> {
        let local = Rect::new(0.0, 0.0, rect.width, rect.height);
        let corners = local.corners();
        let center = math::centroid(&corners);
        let radius = math::max_distance(center, &corners);
        if !local.is_finite() {
            return Err(CollisionError::InvalidRadius(radius));
        }
        Ok(Self {
            kind: HullKind::NGon,
            vertices: corners.to_vec(),
            center,
            radius,
            cache: None,
        })
    }

    pub fn kind(&self) -> HullKind {
        self.kind
    }

    pub fn local_vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn local_center(&self) -> Vec2 {
        self.center
    }

    pub fn local_radius(&self) -> f32 {
        self.radius
    }

    /// Recomputes the world-space projection if `transform` differs from the
    /// cached one. Returns whether anything was recomputed.
    pub fn refresh(&mut self, transform: &Transform2D) -> bool {
        if self.is_fresh(transform) {
            return false;
        }
        self.cache = Some(project(&self.vertices, self.center, self.radius, transform));
        true
    }

    /// Drops the cached projection.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn vertices(&mut self, transform: &Transform2D) -> &[Vec2] {
        &self.world(transform).vertices
    }

    pub fn center(&mut self, transform: &Transform2D) -> Vec2 {
        self.world(transform).center
    }

    pub fn radius(&mut self, transform: &Transform2D) -> f32 {
        self.world(transform).radius
    }

    /// Projection from the last refresh, if any.
    pub(crate) fn cached(&self) -> Option<(&[Vec2], Vec2, f32)> {
        self.cache
            .as_ref()
            .map(|c| (c.vertices.as_slice(), c.center, c.radius))
    }

    fn is_fresh(&self, transform: &Transform2D) -> bool {
        matches!(&self.cache, Some(cached) if cached.transform == *transform)
    }

    fn world(&mut self, transform: &Transform2D) -> &WorldHull {
        if !self.is_fresh(transform) {
            self.cache = None;
        }
        let (vertices, center, radius) = (&self.vertices, self.center, self.radius);
        self.cache
            .get_or_insert_with(|| project(vertices, center, radius, transform))
    }
}

fn project(vertices: &[Vec2], center: Vec2, radius: f32, transform: &Transform2D) -> WorldHull {
    let affine = transform.to_affine();
    WorldHull {
        transform: *transform,
        vertices: vertices.iter().map(|v| affine.transform_point2(*v)).collect(),
        center: affine.transform_point2(center),
        radius: radius * transform.max_scale(),
    }
}
