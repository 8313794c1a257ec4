/// Timers for the non-fish entities: bonus items, oysters and hazards.
use std::f32::consts::TAU;

use crate::entities::{BonusItem, Hazard, HazardKind, OysterPhase, PermanentOyster, PlayArea};

pub const BOB_AMPLITUDE: f32 = 0.6;
pub const BOB_FREQUENCY: f32 = 0.5;
pub const BOMB_SINK_SPEED: f32 = 1.5;
pub const JELLY_DRIFT_AMPLITUDE: f32 = 2.0;
pub const JELLY_DRIFT_FREQUENCY: f32 = 0.25;

// ── Bonus items ───────────────────────────────────────────────────────────────

/// Counts down the lifetime and bobs the item around its base line.
pub fn update_bonus_item(item: &mut BonusItem, dt: f32) {
    if !item.body.alive {
        return;
    }
    item.lifetime -= dt;
    if item.lifetime <= 0.0 {
        item.body.destroy();
        return;
    }
    item.bob_phase = (item.bob_phase + dt * BOB_FREQUENCY * TAU) % TAU;
    item.body.position.x += item.body.velocity.x * dt;
    item.body.position.y = item.base_y + BOB_AMPLITUDE * item.bob_phase.sin();
}

// ── Oysters ───────────────────────────────────────────────────────────────────

pub fn phase_duration(oyster: &PermanentOyster, phase: OysterPhase) -> f32 {
    match phase {
        OysterPhase::Closed => oyster.timings.closed,
        OysterPhase::Opening => oyster.timings.opening,
        OysterPhase::Open => oyster.timings.open,
        OysterPhase::Closing => oyster.timings.closing,
    }
}

fn next_phase(phase: OysterPhase) -> OysterPhase {
    match phase {
        OysterPhase::Closed => OysterPhase::Opening,
        OysterPhase::Opening => OysterPhase::Open,
        OysterPhase::Open => OysterPhase::Closing,
        OysterPhase::Closing => OysterPhase::Closed,
    }
}

/// Runs the Closed → Opening → Open → Closing cycle and the collect cooldown.
pub fn advance_oyster(oyster: &mut PermanentOyster, dt: f32) {
    oyster.collect_cooldown = (oyster.collect_cooldown - dt).max(0.0);
    oyster.phase_timer -= dt;
    // A zero-length phase is skipped; guard against a cycle of all zeros.
    let mut steps = 0;
    while oyster.phase_timer <= 0.0 && steps < 4 {
        oyster.phase = next_phase(oyster.phase);
        oyster.phase_timer += phase_duration(oyster, oyster.phase);
        steps += 1;
    }
}

pub fn oyster_can_hurt(oyster: &PermanentOyster) -> bool {
    oyster.phase == OysterPhase::Closing
}

pub fn oyster_can_collect(oyster: &PermanentOyster) -> bool {
    oyster.phase == OysterPhase::Open && oyster.collect_cooldown <= 0.0
}

// ── Hazards ───────────────────────────────────────────────────────────────────

pub fn update_hazard(hazard: &mut Hazard, dt: f32, area: &PlayArea) {
    if !hazard.body.alive {
        return;
    }
    match &mut hazard.kind {
        HazardKind::Bomb { fuse, detonating, .. } => {
            hazard.body.position.y =
                (hazard.body.position.y + BOMB_SINK_SPEED * dt).min(area.height - hazard.body.radius);
            *fuse -= dt;
            if *fuse <= 0.0 {
                *detonating = true;
            }
        }
        HazardKind::Jellyfish { phase } => {
            *phase = (*phase + dt * JELLY_DRIFT_FREQUENCY * TAU) % TAU;
            hazard.body.velocity.y = JELLY_DRIFT_AMPLITUDE * phase.cos();
            hazard.body.position += hazard.body.velocity * dt;
            if !area.contains(hazard.body.position, hazard.body.radius, crate::fish::OFFSCREEN_MARGIN) {
                hazard.body.destroy();
            }
        }
    }
}
