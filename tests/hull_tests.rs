use approx::assert_relative_eq;
use hullgrid::utils::math::{is_convex, signed_area};
use hullgrid::*;

struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
    }
}

#[test]
fn obb_round_trips_rectangle_corners() {
    let rect = Rect::new(0.0, 0.0, 4.0, 3.0);
    let hull = Hull::obb(rect).unwrap();

    assert_eq!(hull.local_vertices(), rect.corners().as_slice());
    assert_eq!(
        hull.local_vertices(),
        &[
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 3.0),
            Vec2::new(0.0, 3.0),
        ]
    );
    assert!(signed_area(hull.local_vertices()) > 0.0);
    assert_eq!(hull.kind(), HullKind::NGon);
}

#[test]
fn obb_is_anchored_at_local_origin() {
    let hull = Hull::obb(Rect::new(25.0, 40.0, 10.0, 6.0)).unwrap();
    assert_eq!(
        hull.local_vertices(),
        Rect::new(0.0, 0.0, 10.0, 6.0).corners().as_slice()
    );
    assert_eq!(hull.local_center(), Vec2::new(5.0, 3.0));
}

#[test]
fn reduction_is_convex_and_within_lod() {
    let mut rng = Lcg(11);

    for case in 0..300 {
        let count = 3 + case % 28;
        let lod = 3 + case % 6;
        let points: Vec<Vec2> = (0..count)
            .map(|_| Vec2::new(rng.next_f32() * 100.0, rng.next_f32() * 100.0))
            .collect();

        let hull = match Hull::convex(&points, lod) {
            Ok(hull) => hull,
            Err(CollisionError::InsufficientPoints(_)) => continue,
            Err(other) => panic!("unexpected error {other}"),
        };

        let vertices = hull.local_vertices();
        assert!(vertices.len() <= lod, "case {case}: {} > {lod}", vertices.len());
        assert!(vertices.len() >= 3);
        assert!(is_convex(vertices), "case {case}: {vertices:?}");
    }
}

#[test]
fn convex_input_within_lod_is_kept_verbatim() {
    let triangle = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 5.0), Vec2::new(5.0, 0.0)];
    let hull = Hull::polygon(&triangle).unwrap();
    assert_eq!(hull.local_vertices(), triangle.as_slice());
}

#[test]
fn oversized_input_is_reduced_to_default_lod() {
    let hexagon: Vec<Vec2> = (0..6)
        .map(|i| Vec2::from_angle(i as f32 * std::f32::consts::TAU / 6.0) * 20.0)
        .collect();
    let hull = Hull::polygon(&hexagon).unwrap();

    assert_eq!(hull.local_vertices().len(), 4);
    assert!(is_convex(hull.local_vertices()));
    assert_relative_eq!(hull.local_radius(), 20.0, epsilon = 1e-4);
    assert!(hull.local_center().length() < 1e-4);
}

#[test]
fn invalid_lod_is_rejected() {
    let square = Rect::new(0.0, 0.0, 1.0, 1.0).corners();
    assert_eq!(Hull::convex(&square, 2).unwrap_err(), CollisionError::InvalidLod(2));
}

#[test]
fn world_vertices_follow_rotation_in_degrees() {
    let mut hull = Hull::polygon(&[
        Vec2::new(-1.0, -1.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, 1.0),
    ])
    .unwrap();
    let transform = Transform2D::from_position_rotation(Vec2::new(10.0, 5.0), 90.0);

    let vertices = hull.vertices(&transform).to_vec();
    assert_relative_eq!(vertices[0].x, 11.0, epsilon = 1e-4);
    assert_relative_eq!(vertices[0].y, 4.0, epsilon = 1e-4);
    assert_eq!(hull.center(&transform), Vec2::new(10.0, 5.0));
}

#[test]
fn circle_from_rect_uses_half_the_larger_side() {
    let mut hull = Hull::circle_from_rect(Rect::new(0.0, 0.0, 8.0, 4.0)).unwrap();
    assert_eq!(hull.kind(), HullKind::Circle);
    assert_eq!(hull.local_center(), Vec2::new(4.0, 2.0));
    assert_eq!(hull.radius(&Transform2D::default()), 4.0);
    assert_eq!(hull.local_vertices().len(), 4);
}
