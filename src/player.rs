/// Player movement from processed input, player timers and growth.
use glam::Vec2;

use crate::config::GameConfig;
use crate::entities::{Body, EntityId, EntityKind, PlayArea, Player, SizeClass};
use crate::fish::MIN_LENGTH_SQ;

/// Closer than this to the follow target counts as "arrived".
pub const FOLLOW_DEADZONE: f32 = 0.5;
/// Knockback velocity decays by this factor per second.
pub const KNOCKBACK_DRAG: f32 = 4.0;

/// Input already reduced to what the simulation needs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Keyboard direction; any length, normalized on use.
    pub direction: Vec2,
    /// Mouse position in world space. Overrides `direction` when set.
    pub follow_target: Option<Vec2>,
}

impl FrameInput {
    pub fn toward(direction: Vec2) -> Self {
        Self {
            direction,
            follow_target: None,
        }
    }

    pub fn follow(target: Vec2) -> Self {
        Self {
            direction: Vec2::ZERO,
            follow_target: Some(target),
        }
    }
}

pub fn player_radius(size: SizeClass, config: &GameConfig) -> f32 {
    size.base_radius() * config.scale.for_size(size)
}

pub fn new_player(id: EntityId, position: Vec2, lives: u32, config: &GameConfig) -> Player {
    let size = SizeClass::Small;
    Player {
        body: Body::new(id, EntityKind::Player, position, Vec2::ZERO, player_radius(size, config)),
        size,
        growth: 0,
        lives,
        speed: config.player_speed,
        damage_cooldown: 0.0,
        stun_timer: 0.0,
        reversed_timer: 0.0,
        knockback_timer: 0.0,
    }
}

fn steer_direction(player: &Player, input: &FrameInput) -> Vec2 {
    let raw = match input.follow_target {
        Some(target) => {
            let offset = target - player.body.position;
            if offset.length() <= FOLLOW_DEADZONE {
                Vec2::ZERO
            } else {
                offset
            }
        }
        None => input.direction,
    };
    if raw.length_squared() <= MIN_LENGTH_SQ {
        return Vec2::ZERO;
    }
    let dir = raw.normalize();
    if player.controls_reversed() {
        -dir
    } else {
        dir
    }
}

/// Timers, then velocity from input, then integration and clamping.
pub fn update_player(player: &mut Player, input: &FrameInput, dt: f32, speed_multiplier: f32, area: &PlayArea) {
    player.damage_cooldown = (player.damage_cooldown - dt).max(0.0);
    player.reversed_timer = (player.reversed_timer - dt).max(0.0);
    player.stun_timer = (player.stun_timer - dt).max(0.0);

    if player.is_stunned() {
        player.body.velocity = Vec2::ZERO;
    } else if player.knockback_timer > 0.0 {
        player.knockback_timer = (player.knockback_timer - dt).max(0.0);
        player.body.velocity *= (1.0 - KNOCKBACK_DRAG * dt).max(0.0);
    } else {
        let dir = steer_direction(player, input);
        let mut velocity = dir * player.speed * speed_multiplier;
        // Following the mouse should not overshoot the cursor.
        if let Some(target) = input.follow_target {
            let remaining = (target - player.body.position).length();
            if dt > 0.0 && velocity.length() * dt > remaining {
                velocity = velocity.normalize_or_zero() * (remaining / dt);
            }
        }
        player.body.velocity = velocity;
    }

    player.body.position += player.body.velocity * dt;
    player.body.position = area.clamp(player.body.position, player.body.radius);
}

/// Size class earned by a growth total under the configured thresholds.
pub fn size_for_growth(growth: u32, config: &GameConfig) -> SizeClass {
    if growth >= config.large_growth {
        SizeClass::Large
    } else if growth >= config.medium_growth {
        SizeClass::Medium
    } else {
        SizeClass::Small
    }
}

/// Adds growth; returns the new class when the player grew this call.
pub fn apply_growth(player: &mut Player, amount: u32, config: &GameConfig) -> Option<SizeClass> {
    player.growth = player.growth.saturating_add(amount);
    let size = size_for_growth(player.growth, config);
    if size > player.size {
        player.size = size;
        player.body.radius = player_radius(size, config);
        Some(size)
    } else {
        None
    }
}
