use std::cell::Cell;
use std::rc::Rc;

use hullgrid::*;

/// Square game object used as the host in these tests.
#[derive(Default)]
struct Ship {
    position: Vec2,
    half: f32,
    rotation: f32,
    hits: Vec<CollisionData>,
    ended: Vec<ObjectId>,
    stop_on_hit: bool,
    destroy_on_hit: bool,
    alive: bool,
}

impl Ship {
    fn at(x: f32, y: f32, half: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            half,
            alive: true,
            ..Self::default()
        }
    }

    fn hit_ids(&self) -> Vec<ObjectId> {
        self.hits.iter().map(|data| data.other).collect()
    }
}

impl Collidable for Ship {
    fn transform(&self) -> Transform2D {
        Transform2D::from_position_rotation(self.position, self.rotation)
    }

    fn world_box(&self) -> Rect {
        Rect::centered(self.position, Vec2::splat(self.half))
    }

    fn on_collide(&mut self, _other: &Self, data: &CollisionData) -> CollisionResponse {
        self.hits.push(*data);
        if self.destroy_on_hit {
            self.alive = false;
        }
        if self.stop_on_hit {
            CollisionResponse::Stop
        } else {
            CollisionResponse::Continue
        }
    }

    fn on_collide_end(&mut self, other: ObjectId) {
        self.ended.push(other);
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

fn world() -> CollisionWorld<Ship> {
    CollisionWorld::new(&CollisionConfig::default()).expect("default config is valid")
}

fn square_hull(half: f32) -> Hull {
    Hull::polygon(&Rect::centered(Vec2::ZERO, Vec2::splat(half)).corners()).unwrap()
}

#[test]
fn both_objects_receive_the_hit() {
    let mut world = world();
    let a = world.add_object(Ship::at(100.0, 100.0, 10.0), Collider::circle(None));
    let b = world.add_object(Ship::at(115.0, 100.0, 10.0), Collider::circle(None));

    world.step(1.0 / 60.0);

    let ship_a = world.object(a).unwrap();
    let ship_b = world.object(b).unwrap();
    assert_eq!(ship_a.hit_ids(), vec![b]);
    assert_eq!(ship_b.hit_ids(), vec![a]);
    assert_eq!(ship_a.hits[0].normal, Vec2::X);
    assert_eq!(ship_b.hits[0].normal, -Vec2::X);
    assert_eq!(ship_a.hits[0].overlap, 5.0);

    let collider = world.collider(a).unwrap();
    assert_eq!(collider.state(), ColliderState::Resolved);
    assert!(collider.is_touching(b));
    assert_eq!(collider.last_collision().map(|data| data.other), Some(b));
}

#[test]
fn masks_without_shared_bits_never_report() {
    let mut world = world();
    let a = world.add_object(Ship::at(50.0, 50.0, 5.0), Collider::builder().mask(2).build());
    let b = world.add_object(Ship::at(50.0, 50.0, 5.0), Collider::builder().mask(1).build());

    world.step(1.0 / 60.0);

    assert!(world.object(a).unwrap().hits.is_empty());
    assert!(world.object(b).unwrap().hits.is_empty());
    assert_eq!(world.collider(a).unwrap().state(), ColliderState::Idle);
}

#[test]
fn stop_response_ends_the_candidate_scan() {
    let mut world = world();
    let mut hub = Ship::at(100.0, 100.0, 10.0);
    hub.stop_on_hit = true;
    let a = world.add_object(hub, Collider::box_collider());
    let b = world.add_object(Ship::at(110.0, 100.0, 10.0), Collider::box_collider());
    let c = world.add_object(Ship::at(90.0, 100.0, 10.0), Collider::box_collider());

    world.step(1.0 / 60.0);

    assert_eq!(world.object(a).unwrap().hit_ids(), vec![b]);
    // The candidate after the stop was never tested from a's side.
    assert!(world.object(c).unwrap().hit_ids().contains(&a));
}

#[test]
fn collide_end_fires_once_after_separation() {
    let mut world = world();
    let a = world.add_object(Ship::at(100.0, 100.0, 10.0), Collider::circle(None));
    let b = world.add_object(Ship::at(115.0, 100.0, 10.0), Collider::circle(None));

    world.step(1.0 / 60.0);
    assert!(world.object(a).unwrap().ended.is_empty());

    world.object_mut(b).unwrap().position = Vec2::new(300.0, 300.0);
    world.step(1.0 / 60.0);
    world.step(1.0 / 60.0);

    assert_eq!(world.object(a).unwrap().ended, vec![b]);
    assert_eq!(world.object(b).unwrap().ended, vec![a]);
    assert!(!world.collider(a).unwrap().is_touching(b));
}

#[test]
fn each_tick_discards_the_previous_hit() {
    let mut world = world();
    let a = world.add_object(Ship::at(100.0, 100.0, 10.0), Collider::circle(None));
    let b = world.add_object(Ship::at(115.0, 100.0, 10.0), Collider::circle(None));

    world.step(1.0 / 60.0);
    let collider = world.collider(a).unwrap();
    assert_eq!(collider.state(), ColliderState::Resolved);
    assert_eq!(collider.last_collision().map(|data| data.other), Some(b));

    world.object_mut(b).unwrap().position = Vec2::new(300.0, 300.0);
    world.step(1.0 / 60.0);

    for id in [a, b] {
        let collider = world.collider(id).unwrap();
        assert!(collider.last_collision().is_none());
        assert_eq!(collider.state(), ColliderState::Idle);
    }
}

#[test]
fn destroyed_object_leaves_mid_tick() {
    let mut world = world();
    let mut bullet = Ship::at(200.0, 200.0, 5.0);
    bullet.destroy_on_hit = true;
    let bullet = world.add_object(bullet, Collider::box_collider());
    let wall = world.add_object(Ship::at(215.0, 200.0, 20.0), Collider::box_collider());

    world.step(1.0 / 60.0);

    assert!(world.object(bullet).is_none());
    assert!(!world.grid().contains_object(bullet));
    assert_eq!(world.ids(), &[wall]);
    assert!(world.object(wall).unwrap().hits.is_empty());
}

#[test]
fn time_accumulates_and_reaches_collision_data() {
    let mut world = world();
    let a = world.add_object(Ship::at(100.0, 100.0, 10.0), Collider::box_collider());
    world.add_object(Ship::at(105.0, 100.0, 10.0), Collider::box_collider());

    world.step(0.25);
    world.step(0.5);

    assert_eq!(world.time(), 0.75);
    let last = world.object(a).unwrap().hits.last().copied().unwrap();
    assert_eq!(last.time, 0.75);
    assert_eq!(last.dt, 0.5);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_refresh_matches_sequential() {
    let run = |parallel: bool| {
        let mut world = world();
        world.set_parallel_enabled(parallel);
        let ids: Vec<ObjectId> = (0..12)
            .map(|i| {
                let mut ship = Ship::at(20.0 + i as f32 * 15.0, 60.0, 10.0);
                ship.rotation = i as f32 * 7.5;
                world.add_object(ship, Collider::convex(square_hull(7.0)))
            })
            .collect();
        world.step_parallel(1.0 / 60.0);
        ids.iter()
            .map(|&id| world.object(id).unwrap().hit_ids())
            .collect::<Vec<_>>()
    };

    assert_eq!(run(false), run(true));
}

#[test]
fn config_deserializes_with_defaults() {
    let config: CollisionConfig = serde_json::from_str(r#"{ "divisions": 4 }"#).unwrap();
    assert_eq!(config.divisions, 4);
    assert_eq!(config.world_width, 480.0);

    let world = CollisionWorld::<Ship>::new(&config).unwrap();
    assert_eq!(world.grid().columns(), 4);
    assert_eq!(world.grid().rows(), 4);

    let invalid = CollisionConfig::new(480.0, 480.0, 0);
    assert_eq!(
        CollisionWorld::<Ship>::new(&invalid).err(),
        Some(CollisionError::InvalidDivisions(0))
    );
}

#[test]
fn disabled_colliders_are_ignored() {
    let mut world = world();
    let a = world.add_object(Ship::at(100.0, 100.0, 10.0), Collider::box_collider());
    let b = world.add_object(
        Ship::at(105.0, 100.0, 10.0),
        Collider::builder().enabled(false).build(),
    );

    world.step(1.0 / 60.0);
    assert!(world.object(a).unwrap().hits.is_empty());
    assert!(world.object(b).unwrap().hits.is_empty());
    assert!(!world.grid().contains_object(b));

    // b rejoins the grid on its own turn, after a has already scanned.
    world.collider_mut(b).unwrap().set_enabled(true);
    world.step(1.0 / 60.0);
    assert!(world.object(a).unwrap().hits.is_empty());
    assert_eq!(world.object(b).unwrap().hit_ids(), vec![a]);

    world.step(1.0 / 60.0);
    assert_eq!(world.object(a).unwrap().hit_ids(), vec![b]);
}

#[test]
fn profiler_counts_pair_tests_and_hits() {
    let mut world = world();
    world.add_object(Ship::at(100.0, 100.0, 10.0), Collider::box_collider());
    world.add_object(Ship::at(105.0, 100.0, 10.0), Collider::box_collider());
    world.add_object(Ship::at(400.0, 400.0, 10.0), Collider::box_collider());

    world.step(1.0 / 60.0);

    let profiler = world.profiler();
    assert_eq!(profiler.object_count, 3);
    assert_eq!(profiler.pair_tests, 2);
    assert_eq!(profiler.collision_count, 2);
    assert_eq!(profiler.skipped_pairs, 0);
}

#[test]
fn convex_colliders_without_hulls_skip_their_pairs() {
    let mut world = world();
    let convex = || Collider::builder().kind(ColliderKind::Convex).build();
    let a = world.add_object(Ship::at(100.0, 100.0, 10.0), convex());
    let b = world.add_object(Ship::at(105.0, 100.0, 10.0), convex());

    world.step(1.0 / 60.0);

    assert_eq!(world.profiler().skipped_pairs, 2);
    assert!(world.object(a).unwrap().hits.is_empty());
    assert!(world.object(b).unwrap().hits.is_empty());
}

#[test]
fn removed_objects_leave_grid_and_order() {
    let mut world = world();
    let a = world.add_object(Ship::at(100.0, 100.0, 10.0), Collider::box_collider());
    let b = world.add_object(Ship::at(105.0, 100.0, 10.0), Collider::box_collider());

    let ship = world.remove_object(a).expect("registered");
    assert_eq!(ship.position, Vec2::new(100.0, 100.0));
    assert!(world.remove_object(a).is_none());
    assert_eq!(world.ids(), &[b]);

    world.step(1.0 / 60.0);
    assert!(world.object(b).unwrap().hits.is_empty());
}

/// Single-threaded host sharing a hit counter with the game.
struct Beacon {
    position: Vec2,
    hits: Rc<Cell<u32>>,
}

impl Collidable for Beacon {
    fn transform(&self) -> Transform2D {
        Transform2D::from_position(self.position)
    }

    fn world_box(&self) -> Rect {
        Rect::centered(self.position, Vec2::splat(4.0))
    }

    fn on_collide(&mut self, _other: &Self, _data: &CollisionData) -> CollisionResponse {
        self.hits.set(self.hits.get() + 1);
        CollisionResponse::Continue
    }
}

#[test]
fn hosts_need_not_be_thread_safe() {
    let hits = Rc::new(Cell::new(0));
    let mut world = CollisionWorld::new(&CollisionConfig::default()).unwrap();
    for x in [50.0, 55.0] {
        let beacon = Beacon {
            position: Vec2::new(x, 50.0),
            hits: Rc::clone(&hits),
        };
        world.add_object(beacon, Collider::circle(None));
    }

    world.step(1.0 / 60.0);
    assert_eq!(hits.get(), 2);
}
