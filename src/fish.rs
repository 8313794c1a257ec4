/// Per-fish update: status effects, AI targeting, movement patterns.
///
/// Status flags are independent timers. Stun zeroes velocity and wins over
/// poison for as long as both run; poison negates velocity on entry and again
/// on exit; freeze damps velocity rather than zeroing it.
use std::f32::consts::TAU;

use glam::Vec2;

use crate::entities::{
    Behavior, EntityId, Fish, MovementPattern, PlayArea, Player, TimedEffect,
};
use crate::special;

pub const FROZEN_DAMPING: f32 = 0.1;
pub const FLEE_SPEED_MULTIPLIER: f32 = 2.0;
/// Aggressive fish notice prey inside this radius.
pub const DETECTION_RADIUS: f32 = 14.0;
/// How quickly a chasing fish turns toward its desired velocity (per second).
pub const STEER_RATE: f32 = 3.0;
/// Distance past the play area at which a fish counts as gone.
pub const OFFSCREEN_MARGIN: f32 = 6.0;
/// Squared lengths at or below this are treated as zero vectors.
pub const MIN_LENGTH_SQ: f32 = 1e-6;

// ── Nearby-entity snapshot ────────────────────────────────────────────────────

/// What a fish can see of another live entity this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sighting {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rank: f32,
    pub is_player: bool,
}

impl Sighting {
    pub fn of_fish(fish: &Fish) -> Self {
        Self {
            id: fish.body.id,
            position: fish.body.position,
            velocity: fish.body.velocity,
            rank: fish.rank(),
            is_player: false,
        }
    }

    pub fn of_player(player: &Player) -> Self {
        Self {
            id: player.body.id,
            position: player.body.position,
            velocity: player.body.velocity,
            rank: player.rank(),
            is_player: true,
        }
    }
}

fn nearest_where<'a>(
    id: EntityId,
    position: Vec2,
    radius: f32,
    sightings: &'a [Sighting],
    keep: impl Fn(&Sighting) -> bool,
) -> Option<&'a Sighting> {
    let radius_sq = radius * radius;
    sightings
        .iter()
        .filter(|s| s.id != id && keep(*s))
        .map(|s| (s, s.position.distance_squared(position)))
        .filter(|&(_, d)| d <= radius_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| s)
}

/// Closest entity this fish could eat.
pub fn nearest_prey<'a>(fish: &Fish, sightings: &'a [Sighting], radius: f32) -> Option<&'a Sighting> {
    let rank = fish.rank();
    nearest_where(fish.body.id, fish.body.position, radius, sightings, |s| s.rank < rank)
}

/// Closest entity that could eat this fish.
pub fn nearest_threat<'a>(fish: &Fish, sightings: &'a [Sighting], radius: f32) -> Option<&'a Sighting> {
    let rank = fish.rank();
    nearest_where(fish.body.id, fish.body.position, radius, sightings, |s| s.rank > rank)
}

// ── Status effects ────────────────────────────────────────────────────────────

pub fn set_poisoned(fish: &mut Fish, duration: f32) {
    if let Some(poison) = fish.status.poisoned.as_mut() {
        poison.remaining = poison.remaining.max(duration);
        return;
    }
    let snapshot = fish.body.velocity;
    match fish.status.stunned.as_mut() {
        Some(stun) => stun.snapshot = -stun.snapshot,
        None => fish.body.velocity = -fish.body.velocity,
    }
    fish.status.poisoned = Some(TimedEffect { remaining: duration, snapshot });
}

pub fn set_stunned(fish: &mut Fish, duration: f32) {
    if let Some(stun) = fish.status.stunned.as_mut() {
        stun.remaining = stun.remaining.max(duration);
        return;
    }
    fish.status.stunned = Some(TimedEffect {
        remaining: duration,
        snapshot: fish.body.velocity,
    });
    fish.body.velocity = Vec2::ZERO;
}

pub fn set_frozen(fish: &mut Fish, duration: f32) {
    if let Some(frozen) = fish.status.frozen.as_mut() {
        frozen.remaining = frozen.remaining.max(duration);
        return;
    }
    fish.status.frozen = Some(TimedEffect {
        remaining: duration,
        snapshot: fish.body.velocity,
    });
    fish.body.velocity *= FROZEN_DAMPING;
    if let Some(stun) = fish.status.stunned.as_mut() {
        stun.snapshot *= FROZEN_DAMPING;
    }
}

/// One-shot: head for the nearer side edge and keep going until culled.
pub fn start_fleeing(fish: &mut Fish, area: &PlayArea) {
    if fish.status.fleeing {
        return;
    }
    let direction = if fish.body.position.x < area.width / 2.0 { -1.0 } else { 1.0 };
    fish.status.poisoned = None;
    fish.status.stunned = None;
    fish.status.frozen = None;
    fish.status.fleeing = true;
    fish.body.velocity = Vec2::new(direction * fish.base_speed * FLEE_SPEED_MULTIPLIER, 0.0);
}

fn tick_effect(effect: &mut Option<TimedEffect>, dt: f32) -> Option<TimedEffect> {
    let running = effect.as_mut()?;
    running.remaining -= dt;
    if running.remaining <= 0.0 {
        effect.take()
    } else {
        None
    }
}

/// Counts every effect down and undoes the ones that expire.
pub fn update_status(fish: &mut Fish, dt: f32) {
    // Poison first so a same-frame stun expiry restores the un-reversed snapshot.
    if tick_effect(&mut fish.status.poisoned, dt).is_some() {
        match fish.status.stunned.as_mut() {
            Some(stun) => stun.snapshot = -stun.snapshot,
            None => fish.body.velocity = -fish.body.velocity,
        }
    }

    if let Some(stun) = tick_effect(&mut fish.status.stunned, dt) {
        fish.body.velocity = stun.snapshot;
    }

    if tick_effect(&mut fish.status.frozen, dt).is_some() {
        let speed = special::nominal_speed(fish);
        match fish.status.stunned.as_mut() {
            Some(stun) => stun.snapshot = stun.snapshot.normalize_or_zero() * speed,
            None => fish.body.velocity = fish.body.velocity.normalize_or_zero() * speed,
        }
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

fn can_steer(fish: &Fish) -> bool {
    fish.status.stunned.is_none() && fish.status.frozen.is_none()
}

/// Aggressive pattern: turn toward the nearest prey, if any is in sight.
fn chase(fish: &mut Fish, dt: f32, sightings: &[Sighting]) {
    let Some(prey) = nearest_prey(fish, sightings, DETECTION_RADIUS) else {
        return;
    };
    let to_prey = prey.position - fish.body.position;
    if to_prey.length_squared() <= MIN_LENGTH_SQ {
        return;
    }
    let mut desired = to_prey.normalize() * special::nominal_speed(fish);
    if fish.status.poisoned.is_some() {
        desired = -desired;
    }
    let t = (STEER_RATE * dt).min(1.0);
    fish.body.velocity = fish.body.velocity.lerp(desired, t);
}

fn apply_pattern(fish: &mut Fish, dt: f32) {
    match fish.pattern {
        MovementPattern::Sinusoidal => {
            let m = &mut fish.motion;
            let (amplitude, frequency) = (m.amplitude, m.frequency);
            let wave = |t: f32| amplitude * (TAU * frequency * t).sin();
            // Re-centre on wherever the fish actually is, so pushes and
            // vertical velocity carry the centre line with them.
            m.base_y = fish.body.position.y - wave(m.elapsed) + fish.body.velocity.y * dt;
            m.elapsed += dt;
            fish.body.position.y = m.base_y + wave(m.elapsed);
        }
        MovementPattern::ZigZag => {
            let m = &mut fish.motion;
            if m.zigzag_period <= 0.0 {
                return;
            }
            m.zigzag_timer -= dt;
            if m.zigzag_timer <= 0.0 {
                fish.body.velocity.y = -fish.body.velocity.y;
                m.zigzag_timer += m.zigzag_period;
            }
        }
        MovementPattern::Linear | MovementPattern::Aggressive => {}
    }
}

fn bounce_vertical(fish: &mut Fish, area: &PlayArea) {
    let r = fish.body.radius;
    let pos = &mut fish.body.position;
    let vel = &mut fish.body.velocity;
    if pos.y < r && vel.y < 0.0 {
        vel.y = -vel.y;
    } else if pos.y > area.height - r && vel.y > 0.0 {
        vel.y = -vel.y;
    }
}

pub fn is_off_screen(fish: &Fish, area: &PlayArea) -> bool {
    !area.contains(fish.body.position, fish.body.radius, OFFSCREEN_MARGIN)
}

/// Advances one fish by `dt` against this frame's snapshot of the others.
pub fn update_fish(fish: &mut Fish, dt: f32, sightings: &[Sighting], area: &PlayArea) {
    if !fish.body.alive {
        return;
    }
    update_status(fish, dt);
    fish.tail_bite_cooldown = (fish.tail_bite_cooldown - dt).max(0.0);

    if fish.status.fleeing {
        fish.body.position += fish.body.velocity * dt;
        if is_off_screen(fish, area) {
            fish.body.destroy();
        }
        return;
    }

    let steerable = can_steer(fish);
    special::update_behavior(fish, dt, sightings, steerable);

    let self_steering = matches!(fish.behavior, Behavior::Barracuda(_) | Behavior::Angelfish(_));
    if steerable && !self_steering && fish.pattern == MovementPattern::Aggressive {
        chase(fish, dt, sightings);
    }

    let overlay = steerable && fish.pattern != MovementPattern::Linear;
    if overlay {
        apply_pattern(fish, dt);
    }

    fish.body.position.x += fish.body.velocity.x * dt;
    if !(overlay && fish.pattern == MovementPattern::Sinusoidal) {
        fish.body.position.y += fish.body.velocity.y * dt;
    }
    bounce_vertical(fish, area);

    if is_off_screen(fish, area) {
        fish.body.destroy();
    }
}
