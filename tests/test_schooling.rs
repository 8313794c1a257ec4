use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use reef_rush::config::GameConfig;
use reef_rush::entities::*;
use reef_rush::schooling::*;
use reef_rush::spawner::build_fish;

const EPS: f32 = 1e-4;

fn minnow(id: EntityId, pos: Vec2, vel: Vec2) -> Fish {
    let mut rng = StdRng::seed_from_u64(42);
    let mut fish = build_fish(id, Species::Minnow, 1, pos, 1.0, &GameConfig::default(), &mut rng);
    fish.pattern = MovementPattern::Linear;
    fish.body.velocity = vel;
    fish
}

fn school_of(positions: &[(f32, f32)]) -> (SchoolingSystem, SchoolId) {
    let mut schools = SchoolingSystem::new();
    let id = schools.create_school(2, positions.len());
    for (i, &(x, y)) in positions.iter().enumerate() {
        let fish = minnow(i as EntityId + 1, Vec2::new(x, y), Vec2::new(4.0, 0.0));
        assert!(schools.add_to_school(id, fish).is_ok());
    }
    (schools, id)
}

// ── Membership ────────────────────────────────────────────────────────────────

#[test]
fn full_school_hands_the_fish_back() {
    let (mut schools, id) = school_of(&[(10.0, 10.0), (11.0, 10.0)]);
    let extra = minnow(99, Vec2::ZERO, Vec2::ZERO);
    let rejected = schools.add_to_school(id, extra).unwrap_err();
    assert_eq!(rejected.body.id, 99);
    assert_eq!(schools.school(id).map(|s| s.members.len()), Some(2));
}

#[test]
fn unknown_school_hands_the_fish_back() {
    let mut schools = SchoolingSystem::new();
    assert!(schools.add_to_school(7, minnow(1, Vec2::ZERO, Vec2::ZERO)).is_err());
    assert!(schools.is_empty());
}

#[test]
fn minimum_size_never_exceeds_maximum() {
    let mut schools = SchoolingSystem::new();
    let id = schools.create_school(5, 3);
    let school = schools.school(id).unwrap();
    assert_eq!(school.min_size, 3);
    assert_eq!(school.max_size, 3);
}

// ── Flocking ──────────────────────────────────────────────────────────────────

#[test]
fn lone_fish_feels_no_force() {
    let members = vec![minnow(1, Vec2::new(5.0, 5.0), Vec2::new(4.0, 0.0))];
    assert_eq!(flocking_force(&members, 0, &FlockingWeights::default()), Vec2::ZERO);
}

#[test]
fn close_neighbour_pushes_apart() {
    let weights = FlockingWeights::default();
    let members = vec![
        minnow(1, Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)),
        minnow(2, Vec2::new(1.0, 0.0), Vec2::new(4.0, 0.0)),
    ];
    let force = flocking_force(&members, 0, &weights);
    let expected = Vec2::new(-weights.separation + weights.cohesion, 0.0);
    assert!((force - expected).length() < EPS, "force = {force}");
}

#[test]
fn distant_schoolmates_pull_together() {
    let members = vec![
        minnow(1, Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)),
        minnow(2, Vec2::new(10.0, 0.0), Vec2::new(4.0, 0.0)),
    ];
    let force = flocking_force(&members, 0, &FlockingWeights::default());
    assert!(force.x > 0.0);
    assert!(force.y.abs() < EPS);
}

#[test]
fn alignment_matches_schoolmates_heading() {
    let weights = FlockingWeights {
        separation: 0.0,
        alignment: 1.0,
        cohesion: 0.0,
        ..FlockingWeights::default()
    };
    let members = vec![
        minnow(1, Vec2::new(0.0, 0.0), Vec2::ZERO),
        minnow(2, Vec2::new(0.0, 10.0), Vec2::new(5.0, 0.0)),
        minnow(3, Vec2::new(10.0, 0.0), Vec2::new(3.0, 2.0)),
    ];
    let force = flocking_force(&members, 0, &weights);
    assert!((force - Vec2::new(4.0, 1.0)).length() < EPS, "force = {force}");

    let moving = flocking_force(&members, 1, &weights);
    assert!((moving - Vec2::new(1.5 - 5.0, 1.0)).length() < EPS, "force = {moving}");
}

#[test]
fn alignment_and_cohesion_add_up() {
    let weights = FlockingWeights::default();
    let members = vec![
        minnow(1, Vec2::new(0.0, 0.0), Vec2::ZERO),
        minnow(2, Vec2::new(0.0, 10.0), Vec2::new(5.0, 0.0)),
    ];
    let force = flocking_force(&members, 0, &weights);
    let expected = Vec2::new(5.0 * weights.alignment, 10.0 * weights.cohesion);
    assert!((force - expected).length() < EPS, "force = {force}");
}

#[test]
fn dead_schoolmates_are_ignored() {
    let mut members = vec![
        minnow(1, Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)),
        minnow(2, Vec2::new(1.0, 0.0), Vec2::new(4.0, 0.0)),
    ];
    members[1].body.destroy();
    assert_eq!(flocking_force(&members, 0, &FlockingWeights::default()), Vec2::ZERO);
    assert_eq!(flocking_force(&members, 1, &FlockingWeights::default()), Vec2::ZERO);
}

#[test]
fn flocking_never_exceeds_cruise_speed() {
    let (mut schools, _) = school_of(&[(10.0, 10.0), (10.5, 10.0), (10.0, 10.5), (30.0, 20.0)]);
    for fish in schools.members_mut() {
        fish.body.velocity = Vec2::new(7.9, 0.0);
    }
    for _ in 0..30 {
        schools.apply_flocking(0.1);
    }
    for fish in schools.members() {
        assert!(fish.body.velocity.length() <= Species::Minnow.base_speed() + EPS);
    }
}

#[test]
fn stunned_member_is_not_steered() {
    let (mut schools, _) = school_of(&[(10.0, 10.0), (10.5, 10.0), (20.0, 10.0)]);
    if let Some(fish) = schools.members_mut().next() {
        fish.body.velocity = Vec2::ZERO;
        fish.status.stunned = Some(TimedEffect {
            remaining: 1.0,
            snapshot: Vec2::new(4.0, 0.0),
        });
    }
    schools.apply_flocking(0.1);
    assert_eq!(schools.members().next().map(|f| f.body.velocity), Some(Vec2::ZERO));
}

// ── Pruning ───────────────────────────────────────────────────────────────────

#[test]
fn prune_keeps_a_school_above_minimum() {
    let (mut schools, id) = school_of(&[(10.0, 10.0), (11.0, 10.0), (12.0, 10.0)]);
    if let Some(fish) = schools.members_mut().next() {
        fish.body.destroy();
    }
    let released = schools.prune();
    assert!(released.is_empty());
    assert_eq!(schools.school(id).map(|s| s.members.len()), Some(2));
}

#[test]
fn prune_disbands_a_school_below_minimum() {
    let (mut schools, id) = school_of(&[(10.0, 10.0), (11.0, 10.0), (12.0, 10.0)]);
    for fish in schools.members_mut().take(2) {
        fish.body.destroy();
    }
    let released = schools.prune();
    assert_eq!(released.len(), 1);
    assert!(released[0].is_alive());
    assert!(schools.school(id).is_none());
    assert!(schools.is_empty());
}
