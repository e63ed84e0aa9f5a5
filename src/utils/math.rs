//! 2D geometry helpers layered on top of `glam`.

use glam::Vec2;

const EPSILON: f32 = 1e-6;

/// Z component of the cross product of `(a - o)` and `(b - o)`.
#[inline]
pub fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

/// Arithmetic mean of a point set; `Vec2::ZERO` for an empty set.
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Largest distance from `center` to any point.
pub fn max_distance(center: Vec2, points: &[Vec2]) -> f32 {
    points
        .iter()
        .map(|p| p.distance(center))
        .fold(0.0, f32::max)
}

/// Signed area (positive for counter-clockwise winding in a y-up frame).
pub fn signed_area(polygon: &[Vec2]) -> f32 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| polygon[i].perp_dot(polygon[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// True when the polygon is strictly convex in either winding order.
pub fn is_convex(polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0f32;
    for i in 0..n {
        let turn = cross(polygon[i], polygon[(i + 1) % n], polygon[(i + 2) % n]);
        if turn.abs() <= EPSILON {
            return false;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }

    // A star polygon turns consistently but winds more than once.
    let winding: f32 = (0..n)
        .map(|i| {
            let e1 = polygon[(i + 1) % n] - polygon[i];
            let e2 = polygon[(i + 2) % n] - polygon[(i + 1) % n];
            e1.angle_to(e2)
        })
        .sum();
    (winding.abs() - std::f32::consts::TAU).abs() < 1e-3
}

/// Convex hull by monotone chain. Counter-clockwise, collinear points dropped.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut sorted: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup_by(|a, b| a.distance_squared(*b) <= EPSILON * EPSILON);

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Vec2> = Vec::with_capacity(sorted.len() * 2);
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPSILON {
            hull.pop();
        }
        hull.push(p);
    }

    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPSILON
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

/// Drops hull vertices until at most `budget` remain, always removing the
/// vertex whose triangle with its neighbours has the smallest area. Removing a
/// vertex from a convex polygon keeps it convex.
pub fn reduce_hull(mut hull: Vec<Vec2>, budget: usize) -> Vec<Vec2> {
    let budget = budget.max(3);
    while hull.len() > budget {
        let n = hull.len();
        let victim = (0..n)
            .map(|i| {
                let prev = hull[(i + n - 1) % n];
                let next = hull[(i + 1) % n];
                (i, cross(prev, hull[i], next).abs())
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);

        match victim {
            Some(i) => {
                hull.remove(i);
            }
            None => break,
        }
    }
    hull
}

/// Projects a vertex set onto an axis and returns `(min, max)`.
pub fn project(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

/// Unit edge normals of a polygon, skipping zero-length edges.
pub fn edge_normals(polygon: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    let n = polygon.len();
    (0..n).filter_map(move |i| {
        let edge = polygon[(i + 1) % n] - polygon[i];
        edge.perp().try_normalize()
    })
}

/// Vertex of `vertices` furthest along `direction`.
pub fn support(vertices: &[Vec2], direction: Vec2) -> Option<Vec2> {
    vertices
        .iter()
        .copied()
        .max_by(|a, b| a.dot(direction).total_cmp(&b.dot(direction)))
}
