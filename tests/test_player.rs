use glam::Vec2;

use reef_rush::config::{GameConfig, ScaleConfig};
use reef_rush::entities::*;
use reef_rush::player::*;

const EPS: f32 = 1e-4;

fn area() -> PlayArea {
    PlayArea::new(60.0, 30.0)
}

fn make_player() -> Player {
    new_player(0, area().center(), 3, &GameConfig::default())
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn keyboard_direction_is_normalized() {
    let mut player = make_player();
    update_player(&mut player, &FrameInput::toward(Vec2::new(3.0, 4.0)), 0.1, 1.0, &area());
    assert!((player.body.velocity.length() - player.speed).abs() < EPS);
    assert!((player.body.velocity.normalize() - Vec2::new(0.6, 0.8)).length() < EPS);
}

#[test]
fn speed_multiplier_scales_velocity() {
    let mut player = make_player();
    update_player(&mut player, &FrameInput::toward(Vec2::X), 0.1, 1.5, &area());
    assert!((player.body.velocity.x - player.speed * 1.5).abs() < EPS);
}

#[test]
fn reversed_controls_flip_direction() {
    let mut player = make_player();
    player.reversed_timer = 2.0;
    let start = player.body.position;
    update_player(&mut player, &FrameInput::toward(Vec2::X), 0.1, 1.0, &area());
    assert!(player.body.position.x < start.x);
    assert!((player.reversed_timer - 1.9).abs() < EPS);
}

#[test]
fn stunned_player_cannot_move() {
    let mut player = make_player();
    player.stun_timer = 1.0;
    let start = player.body.position;
    update_player(&mut player, &FrameInput::toward(Vec2::X), 0.1, 1.0, &area());
    assert_eq!(player.body.position, start);
    assert_eq!(player.body.velocity, Vec2::ZERO);
}

#[test]
fn follow_target_overrides_keys_without_overshoot() {
    let mut player = make_player();
    let target = player.body.position + Vec2::new(0.0, 1.0);
    let input = FrameInput {
        direction: Vec2::X,
        follow_target: Some(target),
    };
    update_player(&mut player, &input, 0.5, 1.0, &area());
    assert!((player.body.position - target).length() < EPS);
}

#[test]
fn follow_target_inside_deadzone_stops() {
    let mut player = make_player();
    let target = player.body.position + Vec2::new(FOLLOW_DEADZONE / 2.0, 0.0);
    update_player(&mut player, &FrameInput::follow(target), 0.1, 1.0, &area());
    assert_eq!(player.body.velocity, Vec2::ZERO);
}

#[test]
fn player_stays_inside_the_area() {
    let area = area();
    let mut player = make_player();
    for _ in 0..100 {
        update_player(&mut player, &FrameInput::toward(Vec2::new(-1.0, -1.0)), 0.1, 1.0, &area);
    }
    let r = player.body.radius;
    assert!((player.body.position - Vec2::new(r, r)).length() < EPS);
}

#[test]
fn knockback_decays_and_ignores_input() {
    let mut player = make_player();
    player.knockback_timer = 0.4;
    player.body.velocity = Vec2::new(18.0, 0.0);

    update_player(&mut player, &FrameInput::toward(Vec2::NEG_X), 0.1, 1.0, &area());
    assert!(player.body.velocity.x > 0.0);
    assert!(player.body.velocity.x < 18.0);
    assert!((player.knockback_timer - 0.3).abs() < EPS);
}

#[test]
fn timers_never_go_negative() {
    let mut player = make_player();
    player.damage_cooldown = 0.05;
    update_player(&mut player, &FrameInput::default(), 1.0, 1.0, &area());
    assert_eq!(player.damage_cooldown, 0.0);
    assert!(!player.is_recovering());
}

// ── Growth ────────────────────────────────────────────────────────────────────

#[test]
fn growth_thresholds_pick_size() {
    let config = GameConfig::default();
    assert_eq!(size_for_growth(0, &config), SizeClass::Small);
    assert_eq!(size_for_growth(config.medium_growth - 1, &config), SizeClass::Small);
    assert_eq!(size_for_growth(config.medium_growth, &config), SizeClass::Medium);
    assert_eq!(size_for_growth(config.large_growth, &config), SizeClass::Large);
}

#[test]
fn growing_changes_size_and_radius_once() {
    let config = GameConfig {
        scale: ScaleConfig {
            medium: 1.2,
            ..ScaleConfig::default()
        },
        ..GameConfig::default()
    };
    let mut player = new_player(0, area().center(), 3, &config);

    assert_eq!(apply_growth(&mut player, config.medium_growth - 1, &config), None);
    assert_eq!(apply_growth(&mut player, 1, &config), Some(SizeClass::Medium));
    assert!((player.body.radius - SizeClass::Medium.base_radius() * 1.2).abs() < EPS);
    assert_eq!(apply_growth(&mut player, 1, &config), None);
    assert!((player.rank() - 2.5).abs() < EPS);
}
