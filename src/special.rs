/// Special-fish behaviors: barracuda dash, pufferfish puff cycle, angelfish
/// evasion and the poison-fish payload.
use glam::Vec2;

use crate::entities::{
    AngelState, BarracudaState, Behavior, Fish, PoisonPayload, PuffPhase, PufferState,
};
use crate::fish::{nearest_prey, nearest_threat, Sighting, MIN_LENGTH_SQ};

// ── Barracuda ─────────────────────────────────────────────────────────────────

pub const DASH_TRIGGER_RADIUS: f32 = 12.0;
pub const DASH_SPEED_MULTIPLIER: f32 = 3.0;
pub const DASH_DURATION: f32 = 0.6;
pub const DASH_COOLDOWN: f32 = 2.5;

// ── Pufferfish ────────────────────────────────────────────────────────────────

pub const PUFF_NORMAL_DURATION: f32 = 3.0;
pub const PUFF_RAMP_DURATION: f32 = 0.5;
pub const PUFF_HOLD_DURATION: f32 = 2.0;
/// Radius multiplier at full inflation.
pub const PUFF_MAX_SCALE: f32 = 2.0;
/// Fraction of speed lost at full inflation.
pub const PUFF_SLOWDOWN: f32 = 0.6;
pub const INFLATED_THRESHOLD: f32 = 0.5;

// ── Angelfish ─────────────────────────────────────────────────────────────────

pub const THREAT_RADIUS: f32 = 9.0;
pub const EVADE_DURATION: f32 = 1.2;
pub const EVADE_SPEED_MULTIPLIER: f32 = 1.8;

pub fn barracuda_state() -> BarracudaState {
    BarracudaState {
        target: None,
        dashing: false,
        dash_timer: 0.0,
        cooldown: 0.0,
    }
}

pub fn puffer_state(base_radius: f32) -> PufferState {
    PufferState {
        phase: PuffPhase::None,
        phase_timer: PUFF_NORMAL_DURATION,
        inflation: 0.0,
        base_radius,
    }
}

pub fn angel_state() -> AngelState {
    AngelState {
        threat: None,
        evade_timer: 0.0,
    }
}

/// Speed the fish should currently cruise at.
pub fn nominal_speed(fish: &Fish) -> f32 {
    match &fish.behavior {
        Behavior::Pufferfish(p) => fish.base_speed * (1.0 - p.inflation * PUFF_SLOWDOWN),
        Behavior::Barracuda(b) if b.dashing => fish.base_speed * DASH_SPEED_MULTIPLIER,
        _ => fish.base_speed,
    }
}

pub fn is_inflated(fish: &Fish) -> bool {
    matches!(&fish.behavior, Behavior::Pufferfish(p) if p.inflation >= INFLATED_THRESHOLD)
}

pub fn poison_payload(fish: &Fish) -> Option<PoisonPayload> {
    match fish.behavior {
        Behavior::Poison(payload) => Some(payload),
        _ => None,
    }
}

/// Radius for a given inflation level; monotonic in `inflation`.
pub fn puffer_radius(state: &PufferState) -> f32 {
    state.base_radius * (1.0 + state.inflation * (PUFF_MAX_SCALE - 1.0))
}

/// Steps the normal → inflating → holding → deflating → normal cycle.
pub fn advance_puff(state: &mut PufferState, dt: f32) {
    state.phase_timer -= dt;
    match state.phase {
        PuffPhase::None => {
            state.inflation = 0.0;
            if state.phase_timer <= 0.0 {
                state.phase = PuffPhase::Inflating;
                state.phase_timer = PUFF_RAMP_DURATION;
            }
        }
        PuffPhase::Inflating => {
            state.inflation = (state.inflation + dt / PUFF_RAMP_DURATION).min(1.0);
            if state.phase_timer <= 0.0 {
                state.inflation = 1.0;
                state.phase = PuffPhase::Holding;
                state.phase_timer = PUFF_HOLD_DURATION;
            }
        }
        PuffPhase::Holding => {
            state.inflation = 1.0;
            if state.phase_timer <= 0.0 {
                state.phase = PuffPhase::Deflating;
                state.phase_timer = PUFF_RAMP_DURATION;
            }
        }
        PuffPhase::Deflating => {
            state.inflation = (state.inflation - dt / PUFF_RAMP_DURATION).max(0.0);
            if state.phase_timer <= 0.0 {
                state.inflation = 0.0;
                state.phase = PuffPhase::None;
                state.phase_timer = PUFF_NORMAL_DURATION;
            }
        }
    }
}

fn cruise_velocity(velocity: Vec2, speed: f32) -> Vec2 {
    let direction = if velocity.x < 0.0 { -1.0 } else { 1.0 };
    Vec2::new(direction * speed, 0.0)
}

fn update_barracuda(fish: &mut Fish, dt: f32, sightings: &[Sighting], steerable: bool) {
    let Behavior::Barracuda(mut state) = fish.behavior else {
        return;
    };
    state.cooldown = (state.cooldown - dt).max(0.0);

    if state.dashing {
        state.dash_timer -= dt;
        if state.dash_timer <= 0.0 {
            state.dashing = false;
            state.target = None;
            state.cooldown = DASH_COOLDOWN;
            let cruise = fish.base_speed;
            match fish.status.stunned.as_mut() {
                Some(stun) => stun.snapshot = stun.snapshot.normalize_or_zero() * cruise,
                None if steerable => {
                    fish.body.velocity = fish.body.velocity.normalize_or_zero() * cruise;
                }
                None => {}
            }
        }
    } else if steerable && state.cooldown <= 0.0 {
        if let Some(prey) = nearest_prey(fish, sightings, DASH_TRIGGER_RADIUS) {
            let to_prey = prey.position - fish.body.position;
            if to_prey.length_squared() > MIN_LENGTH_SQ {
                let mut direction = to_prey.normalize();
                if fish.status.poisoned.is_some() {
                    direction = -direction;
                }
                fish.body.velocity = direction * fish.base_speed * DASH_SPEED_MULTIPLIER;
                state.dashing = true;
                state.dash_timer = DASH_DURATION;
                state.target = Some(prey.id);
            }
        }
    }
    fish.behavior = Behavior::Barracuda(state);
}

fn update_pufferfish(fish: &mut Fish, dt: f32, steerable: bool) {
    let Behavior::Pufferfish(mut state) = fish.behavior else {
        return;
    };
    advance_puff(&mut state, dt);
    fish.body.radius = puffer_radius(&state);
    fish.behavior = Behavior::Pufferfish(state);

    if steerable && fish.body.velocity.length_squared() > MIN_LENGTH_SQ {
        fish.body.velocity = fish.body.velocity.normalize() * nominal_speed(fish);
    }
}

fn update_angelfish(fish: &mut Fish, dt: f32, sightings: &[Sighting], steerable: bool) {
    let Behavior::Angelfish(mut state) = fish.behavior else {
        return;
    };
    if state.evade_timer > 0.0 {
        state.evade_timer -= dt;
        if state.evade_timer <= 0.0 {
            state.evade_timer = 0.0;
            state.threat = None;
            if steerable {
                fish.body.velocity = cruise_velocity(fish.body.velocity, fish.base_speed);
            }
        }
    } else if steerable {
        if let Some(threat) = nearest_threat(fish, sightings, THREAT_RADIUS) {
            let away = fish.body.position - threat.position;
            if away.length_squared() > MIN_LENGTH_SQ {
                let mut direction = away.normalize();
                if fish.status.poisoned.is_some() {
                    direction = -direction;
                }
                fish.body.velocity = direction * fish.base_speed * EVADE_SPEED_MULTIPLIER;
                state.threat = Some(threat.id);
                state.evade_timer = EVADE_DURATION;
            }
        }
    }
    fish.behavior = Behavior::Angelfish(state);
}

/// Runs the kind-specific part of a fish's update.
pub fn update_behavior(fish: &mut Fish, dt: f32, sightings: &[Sighting], steerable: bool) {
    match fish.behavior {
        Behavior::Barracuda(_) => update_barracuda(fish, dt, sightings, steerable),
        Behavior::Pufferfish(_) => update_pufferfish(fish, dt, steerable),
        Behavior::Angelfish(_) => update_angelfish(fish, dt, sightings, steerable),
        Behavior::Plain | Behavior::Poison(_) => {}
    }
}
