use std::borrow::Cow;

use glam::Vec2;

use crate::{
    core::{
        collider::{ColliderKind, TestMode},
        hull::HullKind,
        types::Rect,
    },
    utils::math,
};

const EPSILON: f32 = 1e-6;

/// World-space view of one participant in a pair test.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldShape<'a> {
    pub kind: HullKind,
    pub center: Vec2,
    /// Bounding circle radius around `center`.
    pub radius: f32,
    /// Axis-aligned bounds reported by the owning object.
    pub bounds: Rect,
    pub vertices: Cow<'a, [Vec2]>,
}

impl<'a> WorldShape<'a> {
    /// Box shape: corners of `bounds`, circumscribed circle.
    pub fn from_rect(bounds: Rect) -> Self {
        Self {
            kind: HullKind::NGon,
            center: bounds.center(),
            radius: bounds.half_diagonal(),
            bounds,
            vertices: Cow::Owned(bounds.corners().to_vec()),
        }
    }

    pub fn circle(center: Vec2, radius: f32, bounds: Rect) -> Self {
        Self {
            kind: HullKind::Circle,
            center,
            radius,
            bounds,
            vertices: Cow::Owned(Rect::centered(center, Vec2::splat(radius)).corners().to_vec()),
        }
    }

    pub fn polygon(vertices: &'a [Vec2], center: Vec2, radius: f32, bounds: Rect) -> Self {
        Self {
            kind: HullKind::NGon,
            center,
            radius,
            bounds,
            vertices: Cow::Borrowed(vertices),
        }
    }

    /// Furthest point of the shape along `direction`.
    fn support(&self, direction: Vec2) -> Vec2 {
        match self.kind {
            HullKind::Circle => self.center + direction * self.radius,
            HullKind::NGon => math::support(&self.vertices, direction).unwrap_or(self.center),
        }
    }
}

/// Minimum translation along `normal` (unit, A towards B) that separates a pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub normal: Vec2,
    pub depth: f32,
}

/// Narrow-phase result before it is wrapped into collision data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: Vec2,
    pub depth: f32,
    pub point: Vec2,
}

/// Stage one: bounding-circle rejection without a square root. Returns the
/// squared center distance when the circles overlap. Non-finite input never
/// overlaps.
pub fn bounding_circles_overlap(
    center_a: Vec2,
    radius_a: f32,
    center_b: Vec2,
    radius_b: f32,
) -> Option<f32> {
    let dist_sq = (center_b - center_a).length_squared();
    let reach = radius_a + radius_b;
    if !dist_sq.is_finite() || !reach.is_finite() || dist_sq >= reach * reach {
        None
    } else {
        Some(dist_sq)
    }
}

/// Circle-circle penetration for circles already known to overlap.
pub fn circle_penetration(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> Penetration {
    let delta = center_b - center_a;
    let distance = delta.length();
    let normal = if distance > EPSILON { delta / distance } else { Vec2::X };
    Penetration {
        normal,
        depth: (radius_a + radius_b) - distance,
    }
}

/// Separating axis theorem for convex polygons and circles.
pub struct SATAlgorithm;

impl SATAlgorithm {
    /// Tests two convex polygons. The returned normal points from the centroid
    /// of `a` towards the centroid of `b`.
    pub fn polygons(a: &[Vec2], b: &[Vec2]) -> Option<Penetration> {
        if a.len() < 3 || b.len() < 3 {
            return None;
        }

        let mut min_overlap = f32::MAX;
        let mut min_axis = Vec2::ZERO;

        for axis in math::edge_normals(a).chain(math::edge_normals(b)) {
            let overlap = Self::axis_overlap(math::project(a, axis), math::project(b, axis))?;
            if overlap < min_overlap {
                min_overlap = overlap;
                min_axis = axis;
            }
        }

        if min_axis == Vec2::ZERO {
            return None;
        }

        let direction = math::centroid(b) - math::centroid(a);
        Some(Penetration {
            normal: if min_axis.dot(direction) < 0.0 { -min_axis } else { min_axis },
            depth: min_overlap,
        })
    }

    /// Tests a convex polygon against a circle. The normal points from the
    /// polygon towards the circle.
    pub fn polygon_circle(polygon: &[Vec2], center: Vec2, radius: f32) -> Option<Penetration> {
        if polygon.len() < 3 {
            return None;
        }

        let closest = polygon
            .iter()
            .copied()
            .min_by(|p, q| p.distance_squared(center).total_cmp(&q.distance_squared(center)))?;
        let vertex_axis = (center - closest).try_normalize();

        let mut min_overlap = f32::MAX;
        let mut min_axis = Vec2::ZERO;

        for axis in math::edge_normals(polygon).chain(vertex_axis) {
            let c = center.dot(axis);
            let overlap =
                Self::axis_overlap(math::project(polygon, axis), (c - radius, c + radius))?;
            if overlap < min_overlap {
                min_overlap = overlap;
                min_axis = axis;
            }
        }

        if min_axis == Vec2::ZERO {
            return None;
        }

        let direction = center - math::centroid(polygon);
        Some(Penetration {
            normal: if min_axis.dot(direction) < 0.0 { -min_axis } else { min_axis },
            depth: min_overlap,
        })
    }

    /// Overlap of two projected intervals, or `None` when there is a gap.
    /// Containment counts the distance to push the inner interval out.
    fn axis_overlap((a_min, a_max): (f32, f32), (b_min, b_max): (f32, f32)) -> Option<f32> {
        let overlap = a_max.min(b_max) - a_min.max(b_min);
        if overlap <= 0.0 {
            return None;
        }
        let contained = (a_min <= b_min && a_max >= b_max) || (b_min <= a_min && b_max >= a_max);
        if contained {
            Some(overlap + (a_min - b_min).abs().min((a_max - b_max).abs()))
        } else {
            Some(overlap)
        }
    }
}

/// Precise test dispatcher shared by every collider kind.
pub struct NarrowPhase;

impl NarrowPhase {
    /// Runs the two-stage test for `a` (the tester, using `kind`) against `b`.
    pub fn collide(kind: ColliderKind, mode: TestMode, a: &WorldShape<'_>, b: &WorldShape<'_>) -> Option<Contact> {
        let dist_sq = bounding_circles_overlap(a.center, a.radius, b.center, b.radius)?;

        match kind {
            ColliderKind::Box => {
                if !a.bounds.intersects(&b.bounds) {
                    return None;
                }
                Some(Self::circle_contact(a, b, mode, dist_sq))
            }
            ColliderKind::Circle => Some(Self::circle_contact(a, b, mode, dist_sq)),
            ColliderKind::Convex => {
                let penetration = Self::convex_penetration(a, b)?;
                Some(match mode {
                    TestMode::LoFi => Self::touching(a, b),
                    TestMode::Full => Contact {
                        normal: penetration.normal,
                        depth: penetration.depth,
                        point: a.support(penetration.normal) - penetration.normal * penetration.depth * 0.5,
                    },
                })
            }
        }
    }

    fn circle_contact(a: &WorldShape<'_>, b: &WorldShape<'_>, mode: TestMode, dist_sq: f32) -> Contact {
        if mode == TestMode::LoFi {
            return Self::touching(a, b);
        }
        let depth = (a.radius + b.radius) - dist_sq.sqrt();
        let normal = circle_penetration(a.center, a.radius, b.center, b.radius).normal;
        Contact {
            normal,
            depth,
            point: a.center + normal * (a.radius - depth * 0.5),
        }
    }

    fn convex_penetration(a: &WorldShape<'_>, b: &WorldShape<'_>) -> Option<Penetration> {
        match (a.kind, b.kind) {
            (HullKind::NGon, HullKind::NGon) => SATAlgorithm::polygons(&a.vertices, &b.vertices),
            (HullKind::NGon, HullKind::Circle) => {
                SATAlgorithm::polygon_circle(&a.vertices, b.center, b.radius)
            }
            (HullKind::Circle, HullKind::NGon) => {
                SATAlgorithm::polygon_circle(&b.vertices, a.center, a.radius).map(|p| Penetration {
                    normal: -p.normal,
                    depth: p.depth,
                })
            }
            (HullKind::Circle, HullKind::Circle) => {
                Some(circle_penetration(a.center, a.radius, b.center, b.radius))
            }
        }
    }

    fn touching(a: &WorldShape<'_>, b: &WorldShape<'_>) -> Contact {
        Contact {
            normal: Vec2::ZERO,
            depth: 0.0,
            point: (a.center + b.center) * 0.5,
        }
    }
}
