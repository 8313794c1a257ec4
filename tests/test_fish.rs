use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use reef_rush::config::GameConfig;
use reef_rush::entities::*;
use reef_rush::fish::*;
use reef_rush::spawner::build_fish;

const EPS: f32 = 1e-4;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn area() -> PlayArea {
    PlayArea::new(80.0, 40.0)
}

fn make_fish(species: Species, pos: Vec2, vel: Vec2) -> Fish {
    let mut fish = build_fish(1, species, 1, pos, 1.0, &GameConfig::default(), &mut seeded_rng());
    fish.pattern = MovementPattern::Linear;
    fish.body.velocity = vel;
    fish
}

fn sighting(id: EntityId, x: f32, y: f32, rank: f32) -> Sighting {
    Sighting {
        id,
        position: Vec2::new(x, y),
        velocity: Vec2::ZERO,
        rank,
        is_player: false,
    }
}

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < EPS
}

// ── Status effects ────────────────────────────────────────────────────────────

#[test]
fn poison_reverses_and_restores_heading() {
    let mut fish = make_fish(Species::Minnow, Vec2::new(40.0, 20.0), Vec2::new(8.0, 0.0));
    set_poisoned(&mut fish, 4.0);
    assert!(close(fish.body.velocity, Vec2::new(-8.0, 0.0)));

    update_status(&mut fish, 2.0);
    assert!(fish.status.poisoned.is_some());
    assert!(close(fish.body.velocity, Vec2::new(-8.0, 0.0)));

    update_status(&mut fish, 2.5);
    assert!(fish.status.poisoned.is_none());
    assert!(close(fish.body.velocity, Vec2::new(8.0, 0.0)));
}

#[test]
fn repeated_poison_extends_without_flipping_again() {
    let mut fish = make_fish(Species::Minnow, Vec2::new(40.0, 20.0), Vec2::new(8.0, 0.0));
    set_poisoned(&mut fish, 4.0);
    set_poisoned(&mut fish, 2.0);
    assert!(close(fish.body.velocity, Vec2::new(-8.0, 0.0)));
    assert_eq!(fish.status.poisoned.map(|p| p.remaining), Some(4.0));
}

#[test]
fn stun_overrides_poison_until_it_ends() {
    let mut fish = make_fish(Species::Minnow, Vec2::new(40.0, 20.0), Vec2::new(8.0, 0.0));
    set_poisoned(&mut fish, 4.0);
    set_stunned(&mut fish, 1.0);
    assert_eq!(fish.body.velocity, Vec2::ZERO);

    update_status(&mut fish, 1.5);
    assert!(fish.status.stunned.is_none());
    assert!(close(fish.body.velocity, Vec2::new(-8.0, 0.0)));

    update_status(&mut fish, 3.0);
    assert!(close(fish.body.velocity, Vec2::new(8.0, 0.0)));
}

#[test]
fn poison_while_stunned_applies_after_stun() {
    let mut fish = make_fish(Species::Minnow, Vec2::new(40.0, 20.0), Vec2::new(8.0, 0.0));
    set_stunned(&mut fish, 1.0);
    set_poisoned(&mut fish, 4.0);
    assert_eq!(fish.body.velocity, Vec2::ZERO);

    update_status(&mut fish, 1.5);
    assert!(close(fish.body.velocity, Vec2::new(-8.0, 0.0)));
}

#[test]
fn simultaneous_expiry_restores_original_heading() {
    let mut fish = make_fish(Species::Minnow, Vec2::new(40.0, 20.0), Vec2::new(8.0, 0.0));
    set_poisoned(&mut fish, 1.0);
    set_stunned(&mut fish, 1.0);

    update_status(&mut fish, 1.5);
    assert!(fish.status.poisoned.is_none());
    assert!(fish.status.stunned.is_none());
    assert!(close(fish.body.velocity, Vec2::new(8.0, 0.0)));
}

#[test]
fn freeze_damps_then_restores_cruise_speed() {
    let mut fish = make_fish(Species::Minnow, Vec2::new(40.0, 20.0), Vec2::new(8.0, 0.0));
    set_frozen(&mut fish, 2.0);
    assert!(close(fish.body.velocity, Vec2::new(8.0 * FROZEN_DAMPING, 0.0)));

    update_status(&mut fish, 2.5);
    assert!(fish.status.frozen.is_none());
    assert!(close(fish.body.velocity, Vec2::new(Species::Minnow.base_speed(), 0.0)));
}

// ── Fleeing ───────────────────────────────────────────────────────────────────

#[test]
fn fleeing_clears_effects_and_heads_for_nearer_edge() {
    let mut fish = make_fish(Species::Snapper, Vec2::new(10.0, 20.0), Vec2::new(6.5, 0.0));
    set_poisoned(&mut fish, 4.0);
    set_stunned(&mut fish, 2.0);

    start_fleeing(&mut fish, &area());

    assert!(fish.status.fleeing);
    assert!(fish.status.poisoned.is_none());
    assert!(fish.status.stunned.is_none());
    let expected = -Species::Snapper.base_speed() * FLEE_SPEED_MULTIPLIER;
    assert!(close(fish.body.velocity, Vec2::new(expected, 0.0)));
}

#[test]
fn fleeing_fish_is_culled_off_screen() {
    let area = area();
    let mut fish = make_fish(Species::Minnow, Vec2::new(70.0, 20.0), Vec2::new(8.0, 0.0));
    start_fleeing(&mut fish, &area);

    for _ in 0..100 {
        update_fish(&mut fish, 0.1, &[], &area);
        if !fish.is_alive() {
            break;
        }
    }
    assert!(!fish.is_alive());
    assert!(fish.body.position.x > area.width);
}

#[test]
fn dead_fish_is_not_updated() {
    let mut fish = make_fish(Species::Minnow, Vec2::new(40.0, 20.0), Vec2::new(8.0, 0.0));
    fish.body.destroy();
    update_fish(&mut fish, 0.5, &[], &area());
    assert_eq!(fish.body.position, Vec2::new(40.0, 20.0));
}

#[test]
fn off_screen_uses_margin_plus_radius() {
    let area = area();
    let inside = make_fish(Species::Minnow, Vec2::new(-6.0, 20.0), Vec2::ZERO);
    let outside = make_fish(Species::Minnow, Vec2::new(-7.0, 20.0), Vec2::ZERO);
    assert!(!is_off_screen(&inside, &area));
    assert!(is_off_screen(&outside, &area));
}

// ── Movement patterns ─────────────────────────────────────────────────────────

#[test]
fn sinusoidal_stays_within_amplitude() {
    let area = area();
    let mut fish = make_fish(Species::Minnow, Vec2::new(30.0, 20.0), Vec2::new(8.0, 0.0));
    fish.pattern = MovementPattern::Sinusoidal;
    fish.motion = PatternState {
        amplitude: 2.0,
        frequency: 0.5,
        ..PatternState::at(20.0)
    };

    let mut lowest = f32::MAX;
    let mut highest = f32::MIN;
    for _ in 0..60 {
        update_fish(&mut fish, 1.0 / 30.0, &[], &area);
        let y = fish.body.position.y;
        assert!((y - 20.0).abs() <= 2.0 + 1e-3, "y = {y}");
        lowest = lowest.min(y);
        highest = highest.max(y);
    }
    assert!(highest - lowest > 2.0);
}

#[test]
fn sinusoidal_fish_keeps_an_external_push() {
    let area = area();
    let mut fish = make_fish(Species::Minnow, Vec2::new(30.0, 20.0), Vec2::new(8.0, 0.0));
    fish.pattern = MovementPattern::Sinusoidal;
    fish.motion = PatternState {
        amplitude: 2.0,
        frequency: 0.5,
        ..PatternState::at(20.0)
    };

    fish.body.position.y = 25.0;
    update_fish(&mut fish, 0.1, &[], &area);

    let wave = 2.0 * (std::f32::consts::TAU * 0.5 * 0.1).sin();
    assert!((fish.body.position.y - (25.0 + wave)).abs() < EPS);
    assert!((fish.motion.base_y - 25.0).abs() < EPS);
}

#[test]
fn sinusoidal_fish_follows_vertical_velocity() {
    let area = area();
    let mut fish = make_fish(Species::Minnow, Vec2::new(30.0, 20.0), Vec2::new(0.0, 5.0));
    fish.pattern = MovementPattern::Sinusoidal;
    fish.motion = PatternState {
        amplitude: 2.0,
        frequency: 0.5,
        ..PatternState::at(20.0)
    };

    for _ in 0..10 {
        update_fish(&mut fish, 0.1, &[], &area);
    }
    assert!((fish.motion.base_y - 25.0).abs() < 1e-3);
    assert!((fish.body.position.y - 25.0).abs() <= 2.0 + 1e-3);
}

#[test]
fn zigzag_flips_vertical_direction_each_period() {
    let area = area();
    let mut fish = make_fish(Species::Snapper, Vec2::new(30.0, 20.0), Vec2::new(6.5, 3.25));
    fish.pattern = MovementPattern::ZigZag;
    fish.motion.zigzag_period = 1.0;
    fish.motion.zigzag_timer = 1.0;

    update_fish(&mut fish, 0.5, &[], &area);
    assert!(fish.body.velocity.y > 0.0);

    update_fish(&mut fish, 0.6, &[], &area);
    assert!(fish.body.velocity.y < 0.0);
}

#[test]
fn aggressive_fish_turns_toward_prey() {
    let mut shark = make_fish(Species::Shark, Vec2::new(40.0, 20.0), Vec2::new(5.5, 0.0));
    shark.pattern = MovementPattern::Aggressive;
    let sightings = [sighting(7, 40.0, 30.0, 1.0)];

    update_fish(&mut shark, 0.1, &sightings, &area());
    assert!(shark.body.velocity.y > 0.0);
}

#[test]
fn poisoned_aggressive_fish_turns_away() {
    let mut shark = make_fish(Species::Shark, Vec2::new(40.0, 20.0), Vec2::new(5.5, 0.0));
    shark.pattern = MovementPattern::Aggressive;
    set_poisoned(&mut shark, 4.0);
    let sightings = [sighting(7, 40.0, 30.0, 1.0)];

    update_fish(&mut shark, 0.1, &sightings, &area());
    assert!(shark.body.velocity.y < 0.0);
}

#[test]
fn aggressive_fish_ignores_prey_out_of_range() {
    let mut shark = make_fish(Species::Shark, Vec2::new(40.0, 5.0), Vec2::new(5.5, 0.0));
    shark.pattern = MovementPattern::Aggressive;
    let sightings = [sighting(7, 40.0, 5.0 + DETECTION_RADIUS + 1.0, 1.0)];

    update_fish(&mut shark, 0.1, &sightings, &area());
    assert_eq!(shark.body.velocity.y, 0.0);
}

// ── Targeting ─────────────────────────────────────────────────────────────────

#[test]
fn nearest_prey_skips_self_and_bigger_fish() {
    let snapper = make_fish(Species::Snapper, Vec2::ZERO, Vec2::ZERO);
    let sightings = [
        sighting(1, 0.0, 0.0, 2.0), // itself
        sighting(2, 5.0, 0.0, 1.0),
        sighting(3, 3.0, 0.0, 1.0),
        sighting(4, 1.0, 0.0, 3.0),
    ];

    assert_eq!(nearest_prey(&snapper, &sightings, 10.0).map(|s| s.id), Some(3));
    assert!(nearest_prey(&snapper, &sightings, 2.0).is_none());
    assert_eq!(nearest_threat(&snapper, &sightings, 10.0).map(|s| s.id), Some(4));
}

#[test]
fn player_sighting_uses_player_rank() {
    let config = GameConfig::default();
    let player = reef_rush::player::new_player(0, Vec2::new(2.0, 0.0), 3, &config);
    let snapper = make_fish(Species::Snapper, Vec2::ZERO, Vec2::ZERO);
    let minnow = make_fish(Species::Minnow, Vec2::ZERO, Vec2::ZERO);
    let sightings = [Sighting::of_player(&player)];

    assert!(nearest_prey(&snapper, &sightings, 10.0).is_some_and(|s| s.is_player));
    assert!(nearest_threat(&minnow, &sightings, 10.0).is_some_and(|s| s.is_player));
}
