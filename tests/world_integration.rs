use flocking::boid::BoidSnapshot;
use flocking::export::{Recorder, CSV_HEADER};
use flocking::{
    BoidSeed, BoundaryPolicy, FlockParams, FlockSpec, Scenario, SimError, SimState, SpatialIndexKind, SpawnStrategy,
    Vec2, World, WorldConfig,
};

fn world(width: f32, height: f32, boundary: BoundaryPolicy) -> World {
    World::new(WorldConfig {
        width,
        height,
        boundary,
        seed: Some(1),
        ..WorldConfig::default()
    })
    .unwrap()
}

fn lone_params(max_speed: f32) -> FlockParams {
    FlockParams {
        max_speed,
        alignment_radius: 0.0,
        cohesion_radius: 0.0,
        ..FlockParams::default()
    }
}

fn spec(params: FlockParams) -> FlockSpec {
    FlockSpec {
        params,
        ..FlockSpec::default()
    }
}

fn seed(x: f32, y: f32, vx: f32, vy: f32) -> BoidSeed {
    BoidSeed::new(Vec2::new(x, y), Vec2::new(vx, vy))
}

fn only(world: &World) -> BoidSnapshot {
    let snapshot = world.snapshot();
    assert_eq!(snapshot.len(), 1);
    snapshot[0]
}

#[test]
fn wrap_carries_overshoot_to_the_opposite_edge() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Wrap);
    world
        .add_group_at(spec(lone_params(5.0)), &[seed(99.5, 50.0, 5.0, 0.0)])
        .unwrap();
    world.start().unwrap();
    world.tick().unwrap();

    let boid = only(&world);
    assert!((boid.position.x - 4.5).abs() < 1e-5, "x = {}", boid.position.x);
    assert_eq!(boid.position.y, 50.0);
    assert_eq!(boid.velocity, Vec2::new(5.0, 0.0));
}

#[test]
fn bounce_clamps_to_the_edge_and_reverses() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Bounce);
    world
        .add_group_at(spec(lone_params(5.0)), &[seed(98.0, 50.0, 5.0, 0.0)])
        .unwrap();
    world.start().unwrap();
    world.tick().unwrap();

    let boid = only(&world);
    assert_eq!(boid.position.x, 100.0);
    assert_eq!(boid.velocity.x, -5.0);
}

#[test]
fn separation_pushes_two_close_agents_apart() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Bounce);
    world
        .add_group_at(
            spec(lone_params(4.0)),
            &[seed(0.0, 0.0, 0.0, 0.0), seed(10.0, 0.0, 0.0, 0.0)],
        )
        .unwrap();

    let forces = world.compute_forces();
    assert_eq!(forces.len(), 2);
    let (left, right) = (forces[0].1, forces[1].1);
    assert!(left.x < 0.0 && right.x > 0.0);
    assert!((left.x + 0.075).abs() < 1e-6);
    assert!((right.x - 0.075).abs() < 1e-6);
    assert_eq!((left.y, right.y), (0.0, 0.0));
}

#[test]
fn approaching_agents_are_still_pushed_apart() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Bounce);
    world
        .add_group_at(
            spec(lone_params(4.0)),
            &[seed(0.0, 0.0, 1.0, 0.0), seed(10.0, 0.0, -1.0, 0.0)],
        )
        .unwrap();

    let forces = world.compute_forces();
    // Each agent is steered away from the other, against its current heading
    assert!(forces[0].1.x < 0.0);
    assert!(forces[1].1.x > 0.0);
    assert!((forces[0].1.x + forces[1].1.x).abs() < 1e-6);
}

#[test]
fn one_tick_applies_the_separation_force_to_velocity() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Bounce);
    world
        .add_group_at(
            spec(lone_params(4.0)),
            &[seed(45.0, 50.0, 0.0, 0.0), seed(55.0, 50.0, 0.0, 0.0)],
        )
        .unwrap();
    world.start().unwrap();
    world.tick().unwrap();

    let snapshot = world.snapshot();
    assert!(snapshot[0].velocity.x < 0.0 && snapshot[0].position.x < 45.0);
    assert!(snapshot[1].velocity.x > 0.0 && snapshot[1].position.x > 55.0);
    // Forces came from the pre-tick state, so the pair stays symmetric
    assert!((snapshot[0].velocity.x + snapshot[1].velocity.x).abs() < 1e-6);
}

#[test]
fn obstacles_push_agents_away() {
    let mut world = world(200.0, 200.0, BoundaryPolicy::Bounce);
    world.add_obstacle(Vec2::new(60.0, 50.0), 5.0).unwrap();
    world
        .add_group_at(spec(lone_params(4.0)), &[seed(50.0, 50.0, 1.0, 0.0)])
        .unwrap();

    let force = world.compute_forces()[0].1;
    assert!((force.x + 0.15).abs() < 1e-5, "force = {force}");
    assert!(force.y.abs() < 1e-6);

    // Outside the buffer of radius + size + 20 there is no push at all
    let mut far = World::new(WorldConfig { seed: Some(1), ..WorldConfig::default() }).unwrap();
    far.add_obstacle(Vec2::new(100.0, 50.0), 5.0).unwrap();
    far.add_group_at(spec(lone_params(4.0)), &[seed(50.0, 50.0, 1.0, 0.0)])
        .unwrap();
    assert_eq!(far.compute_forces()[0].1, Vec2::ZERO);
}

#[test]
fn agent_inside_an_obstacle_buffer_is_pushed_outward() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Bounce);
    world.add_obstacle(Vec2::new(50.0, 50.0), 10.0).unwrap();
    world
        .add_group_at(spec(lone_params(4.0)), &[seed(55.0, 50.0, 0.0, 0.0)])
        .unwrap();

    let force = world.compute_forces()[0].1;
    assert!(force.x > 0.0);
    assert!(force.y.abs() < 1e-6);
}

#[test]
fn coincident_agents_stay_finite() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Bounce);
    let stacked = [seed(50.0, 50.0, 0.0, 0.0); 3];
    world.add_group_at(FlockSpec::default(), &stacked).unwrap();
    world.start().unwrap();
    for _ in 0..5 {
        world.tick().unwrap();
    }

    for boid in world.snapshot() {
        assert!(boid.position.is_finite() && boid.velocity.is_finite());
    }
}

#[test]
fn exhausted_regions_leave_the_world_unchanged() {
    let mut world = World::new(WorldConfig { seed: Some(3), ..WorldConfig::default() }).unwrap();
    let small = FlockSpec { count: 2, ..FlockSpec::default() };
    for _ in 0..12 {
        world.add_group(small).unwrap();
    }
    let before = world.snapshot();

    let err = world.add_group(small).unwrap_err();
    assert!(matches!(err, SimError::Placement(ref e) if e.total_regions == 12));
    assert_eq!(world.flocks().len(), 12);
    assert_eq!(world.snapshot(), before);
}

#[test]
fn region_spawns_stay_inside_their_margins() {
    let mut world = World::new(WorldConfig { seed: Some(4), ..WorldConfig::default() }).unwrap();
    let id = world.add_group(FlockSpec::default()).unwrap();

    // First region is centred on (100, 100); size 3 keeps boids 30 from its edges
    let flock = world.flock(id).unwrap();
    for boid in &flock.boids {
        assert!((30.0..=170.0).contains(&boid.position.x));
        assert!((30.0..=170.0).contains(&boid.position.y));
        let speed = boid.velocity.length();
        assert!((1.0 - 1e-4..=4.0 + 1e-4).contains(&speed));
    }
}

#[test]
fn reset_with_a_seed_replays_the_same_run() {
    let scenario = Scenario {
        world: WorldConfig { seed: Some(42), ..WorldConfig::default() },
        random_obstacles: 2,
        ..Scenario::default()
    };
    let mut world = scenario.build().unwrap();

    let run = |world: &mut World| {
        world.start().unwrap();
        for _ in 0..20 {
            world.tick().unwrap();
        }
        (world.snapshot(), world.obstacles().to_vec())
    };
    let first = run(&mut world);

    world.reset();
    assert_eq!(world.state(), SimState::Idle);
    assert_eq!(world.boid_count(), 0);
    assert!(world.obstacles().is_empty());

    scenario.populate(&mut world).unwrap();
    let second = run(&mut world);
    assert_eq!(first, second);
}

#[test]
fn index_and_threading_choices_do_not_change_results() {
    let run = |spatial_index: SpatialIndexKind, parallel: bool| {
        let mut world = World::new(WorldConfig {
            spawn: SpawnStrategy::Uniform,
            boundary: BoundaryPolicy::Wrap,
            spatial_index,
            parallel,
            seed: Some(9),
            ..WorldConfig::default()
        })
        .unwrap();
        world.add_group(FlockSpec { count: 80, ..FlockSpec::default() }).unwrap();
        world.add_group(FlockSpec { count: 40, ..FlockSpec::default() }).unwrap();
        world.add_obstacle(Vec2::new(400.0, 300.0), 40.0).unwrap();
        world.start().unwrap();
        for _ in 0..25 {
            world.tick().unwrap();
        }
        world.snapshot()
    };

    let reference = run(SpatialIndexKind::BruteForce, false);
    assert_eq!(run(SpatialIndexKind::BruteForce, true), reference);
    assert_eq!(run(SpatialIndexKind::Grid { cell_size: 30.0 }, false), reference);
    assert_eq!(run(SpatialIndexKind::Grid { cell_size: 30.0 }, true), reference);
}

#[test]
fn flocks_only_react_to_their_own_members() {
    let mut world = world(100.0, 100.0, BoundaryPolicy::Bounce);
    world
        .add_group_at(spec(lone_params(4.0)), &[seed(50.0, 50.0, 0.0, 0.0)])
        .unwrap();
    world
        .add_group_at(spec(lone_params(4.0)), &[seed(55.0, 50.0, 0.0, 0.0)])
        .unwrap();

    assert!(world.compute_forces().iter().all(|(_, f)| *f == Vec2::ZERO));
}

#[test]
fn recorded_run_exports_one_row_per_boid_per_tick() {
    let mut world = Scenario::default().build().unwrap();
    let mut recorder = Recorder::new();
    world.start().unwrap();
    for _ in 0..3 {
        let summary = world.tick().unwrap();
        recorder.record(summary.tick, &world.snapshot());
    }

    let mut buf = Vec::new();
    recorder.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 1 + 3 * 30);
    assert!(lines[1].starts_with("1,0,1,"));
    assert!(lines[90].starts_with("3,29,1,"));
}

#[test]
fn scenario_files_load_from_disk() {
    let path = std::env::temp_dir().join(format!("flocking-scenario-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[world]\nseed = 5\n\n[[flocks]]\ncolor = \"red\"\ncount = 4\n\n[[flocks]]\ncount = 6\n",
    )
    .unwrap();

    let world = Scenario::load(&path).unwrap().build().unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(world.flocks().len(), 2);
    assert_eq!(world.boid_count(), 10);
    assert!(Scenario::load(&path).is_err());
}
