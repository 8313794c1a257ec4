/// Per-level spawn tables and the factory that turns a spawn request into
/// an entity.
use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::config::GameConfig;
use crate::entities::{
    Behavior, Body, BonusItem, BonusKind, EntityId, EntityKind, Fish, GameWorld, Hazard,
    HazardKind, MovementPattern, OysterPhase, PatternState, PermanentOyster, PlayArea,
    PoisonPayload, PowerUpKind, Species, StatusEffects,
};
use crate::special;

pub const BOMB_RADIUS: f32 = 1.0;
pub const BOMB_FUSE: f32 = 6.0;
pub const BOMB_EXPLOSION_RADIUS: f32 = 6.0;
pub const JELLY_RADIUS: f32 = 1.2;
pub const JELLY_SPEED: f32 = 2.0;
pub const ITEM_RADIUS: f32 = 0.8;
pub const ITEM_LIFETIME: f32 = 8.0;
pub const STARFISH_POINTS: u32 = 100;
pub const PEARL_POINTS: u32 = 300;
pub const OYSTER_RADIUS: f32 = 1.5;
/// Used when the configured margin leaves no room to spawn in.
pub const FALLBACK_MARGIN_FRACTION: f32 = 0.25;

// ── Tables ────────────────────────────────────────────────────────────────────

/// Spawn rates in expected spawns per second.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnTable {
    pub fish: Vec<(Species, f32)>,
    pub school_rate: f32,
    pub school_size: (usize, usize),
    pub bomb_rate: f32,
    pub jellyfish_rate: f32,
    pub starfish_rate: f32,
    pub pearl_rate: f32,
    pub power_up_rate: f32,
    pub max_fish: usize,
}

fn fish_rates(level: u32) -> Vec<(Species, f32)> {
    match level {
        1 => vec![
            (Species::Minnow, 0.9),
            (Species::Angelfish, 0.15),
            (Species::Snapper, 0.2),
            (Species::PoisonFish, 0.05),
        ],
        2 => vec![
            (Species::Minnow, 0.8),
            (Species::Angelfish, 0.2),
            (Species::Snapper, 0.3),
            (Species::Pufferfish, 0.1),
            (Species::PoisonFish, 0.08),
            (Species::Shark, 0.05),
        ],
        3 => vec![
            (Species::Minnow, 0.7),
            (Species::Angelfish, 0.25),
            (Species::Snapper, 0.35),
            (Species::Pufferfish, 0.15),
            (Species::PoisonFish, 0.1),
            (Species::Shark, 0.1),
            (Species::Barracuda, 0.05),
        ],
        _ => vec![
            (Species::Minnow, 0.7),
            (Species::Angelfish, 0.3),
            (Species::Snapper, 0.4),
            (Species::Pufferfish, 0.2),
            (Species::PoisonFish, 0.12),
            (Species::Shark, 0.15),
            (Species::Barracuda, 0.1),
        ],
    }
}

fn hazard_rates(level: u32) -> (f32, f32) {
    match level {
        1 => (0.0, 0.02),
        2 => (0.03, 0.04),
        3 => (0.05, 0.05),
        _ => (0.08, 0.06),
    }
}

pub fn spawn_table(level: u32) -> SpawnTable {
    let (bomb_rate, jellyfish_rate) = hazard_rates(level);
    SpawnTable {
        fish: fish_rates(level),
        school_rate: if level >= 2 { 0.08 } else { 0.04 },
        school_size: (4, 7),
        bomb_rate,
        jellyfish_rate,
        starfish_rate: 0.05,
        pearl_rate: 0.0,
        power_up_rate: 0.04,
        max_fish: 14 + 2 * level.min(5) as usize,
    }
}

/// Bonus stages only rain collectables.
pub fn bonus_stage_table() -> SpawnTable {
    SpawnTable {
        fish: Vec::new(),
        school_rate: 0.0,
        school_size: (0, 0),
        bomb_rate: 0.0,
        jellyfish_rate: 0.0,
        starfish_rate: 1.2,
        pearl_rate: 0.5,
        power_up_rate: 0.15,
        max_fish: 0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnRequest {
    Fish(Species),
    School { size: usize },
    Bomb,
    Jellyfish,
    Starfish,
    Pearl,
    PowerUp(PowerUpKind),
}

fn roll(rate: f32, dt: f32, rng: &mut impl Rng) -> bool {
    let p = (rate * dt).clamp(0.0, 1.0) as f64;
    p > 0.0 && rng.gen_bool(p)
}

/// Rolls every table entry once for a frame of length `dt`.
pub fn roll_spawns(table: &SpawnTable, dt: f32, rng: &mut impl Rng) -> Vec<SpawnRequest> {
    let mut requests = Vec::new();
    for &(species, rate) in &table.fish {
        if roll(rate, dt, rng) {
            requests.push(SpawnRequest::Fish(species));
        }
    }
    if roll(table.school_rate, dt, rng) {
        let (lo, hi) = table.school_size;
        let size = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        if size > 0 {
            requests.push(SpawnRequest::School { size });
        }
    }
    if roll(table.bomb_rate, dt, rng) {
        requests.push(SpawnRequest::Bomb);
    }
    if roll(table.jellyfish_rate, dt, rng) {
        requests.push(SpawnRequest::Jellyfish);
    }
    if roll(table.starfish_rate, dt, rng) {
        requests.push(SpawnRequest::Starfish);
    }
    if roll(table.pearl_rate, dt, rng) {
        requests.push(SpawnRequest::Pearl);
    }
    if roll(table.power_up_rate, dt, rng) {
        let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
        requests.push(SpawnRequest::PowerUp(kind));
    }
    requests
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Vertical range to spawn in. Falls back to a quarter-height margin when
/// the configured one leaves no room.
pub fn spawn_y_range(height: f32, margin: f32) -> (f32, f32) {
    if height > 2.0 * margin && margin >= 0.0 {
        return (margin, height - margin);
    }
    let safe = height.max(0.0) * FALLBACK_MARGIN_FRACTION;
    (safe, height.max(0.0) - safe)
}

fn pick_y(height: f32, margin: f32, rng: &mut impl Rng) -> f32 {
    let (lo, hi) = spawn_y_range(height, margin);
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

fn pick_x(width: f32, rng: &mut impl Rng) -> f32 {
    if width > 2.0 {
        rng.gen_range(1.0..width - 1.0)
    } else {
        width / 2.0
    }
}

/// Start just past a random side edge, heading inward. Returns (x, direction).
fn pick_side(area: &PlayArea, radius: f32, rng: &mut impl Rng) -> (f32, f32) {
    if rng.gen_bool(0.5) {
        (-radius - 1.0, 1.0)
    } else {
        (area.width + radius + 1.0, -1.0)
    }
}

// ── Factories ─────────────────────────────────────────────────────────────────

pub fn points_for(species: Species, level: u32) -> u32 {
    let base = species.base_points();
    base + base * level.saturating_sub(1) / 4
}

fn pattern_for(species: Species, rng: &mut impl Rng) -> MovementPattern {
    match species {
        Species::Minnow => {
            if rng.gen_bool(0.5) {
                MovementPattern::Linear
            } else {
                MovementPattern::Sinusoidal
            }
        }
        Species::Snapper => {
            if rng.gen_bool(0.5) {
                MovementPattern::ZigZag
            } else {
                MovementPattern::Aggressive
            }
        }
        Species::Shark => MovementPattern::Aggressive,
        Species::Angelfish => MovementPattern::Sinusoidal,
        Species::PoisonFish => MovementPattern::ZigZag,
        Species::Barracuda | Species::Pufferfish => MovementPattern::Linear,
    }
}

fn behavior_for(species: Species, radius: f32, config: &GameConfig) -> Behavior {
    match species {
        Species::Barracuda => Behavior::Barracuda(special::barracuda_state()),
        Species::Pufferfish => Behavior::Pufferfish(special::puffer_state(radius)),
        Species::Angelfish => Behavior::Angelfish(special::angel_state()),
        Species::PoisonFish => Behavior::Poison(PoisonPayload {
            duration: config.poison_duration,
            points: Species::PoisonFish.base_points(),
        }),
        Species::Minnow | Species::Snapper | Species::Shark => Behavior::Plain,
    }
}

/// Builds one fish of `species`, heading along `direction` (±1 on x).
pub fn build_fish(
    id: EntityId,
    species: Species,
    level: u32,
    position: Vec2,
    direction: f32,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Fish {
    let size = species.size_class();
    let radius = size.base_radius() * config.scale.for_size(size);
    let base_speed = species.base_speed();
    let pattern = pattern_for(species, rng);

    let mut motion = PatternState::at(position.y);
    let mut velocity = Vec2::new(direction * base_speed, 0.0);
    match pattern {
        MovementPattern::Sinusoidal => {
            motion.amplitude = rng.gen_range(1.0..3.0);
            motion.frequency = rng.gen_range(0.2..0.6);
        }
        MovementPattern::ZigZag => {
            motion.zigzag_period = rng.gen_range(0.6..1.4);
            motion.zigzag_timer = motion.zigzag_period;
            velocity.y = base_speed * 0.5;
        }
        MovementPattern::Linear | MovementPattern::Aggressive => {}
    }

    Fish {
        body: Body::new(id, size.entity_kind(), position, velocity, radius).with_tag(species.name()),
        species,
        size,
        base_speed,
        points: points_for(species, level),
        level,
        status: StatusEffects::default(),
        pattern,
        motion,
        behavior: behavior_for(species, radius, config),
        tail_bite_cooldown: 0.0,
    }
}

pub fn build_bomb(id: EntityId, x: f32) -> Hazard {
    Hazard {
        body: Body::new(id, EntityKind::Hazard, Vec2::new(x, 0.0), Vec2::ZERO, BOMB_RADIUS).with_tag("bomb"),
        kind: HazardKind::Bomb {
            fuse: BOMB_FUSE,
            explosion_radius: BOMB_EXPLOSION_RADIUS,
            detonating: false,
        },
    }
}

pub fn build_jellyfish(id: EntityId, position: Vec2, direction: f32) -> Hazard {
    let velocity = Vec2::new(direction * JELLY_SPEED, 0.0);
    Hazard {
        body: Body::new(id, EntityKind::Hazard, position, velocity, JELLY_RADIUS).with_tag("jellyfish"),
        kind: HazardKind::Jellyfish { phase: 0.0 },
    }
}

pub fn build_bonus_item(id: EntityId, kind: BonusKind, position: Vec2, config: &GameConfig) -> BonusItem {
    let (entity_kind, points, duration) = match kind {
        BonusKind::Starfish => (EntityKind::Bonus, STARFISH_POINTS, 0.0),
        BonusKind::PearlOyster => (EntityKind::Bonus, PEARL_POINTS, 0.0),
        BonusKind::PowerUp(PowerUpKind::Freeze) => (EntityKind::PowerUp, 0, config.freeze_duration),
        BonusKind::PowerUp(_) => (EntityKind::PowerUp, 0, config.power_up_duration),
    };
    BonusItem {
        body: Body::new(id, entity_kind, position, Vec2::ZERO, ITEM_RADIUS),
        kind,
        points,
        duration,
        lifetime: ITEM_LIFETIME,
        bob_phase: 0.0,
        base_y: position.y,
    }
}

pub fn build_oyster(id: EntityId, position: Vec2, config: &GameConfig) -> PermanentOyster {
    PermanentOyster {
        body: Body::new(id, EntityKind::Bonus, position, Vec2::ZERO, OYSTER_RADIUS).with_tag("oyster"),
        phase: OysterPhase::Closed,
        phase_timer: config.oyster.closed,
        collect_cooldown: 0.0,
        points: config.pearl_points,
        timings: config.oyster,
    }
}

/// Lines `count` oysters up evenly along the sea floor.
pub fn place_oysters(world: &mut GameWorld, count: usize) {
    let area = world.area;
    for i in 0..count {
        let x = area.width * (i + 1) as f32 / (count + 1) as f32;
        let y = (area.height - OYSTER_RADIUS).max(0.0);
        let id = world.alloc_id();
        let oyster = build_oyster(id, Vec2::new(x, y), &world.config);
        world.oysters.push(oyster);
    }
}

fn spawn_school(world: &mut GameWorld, size: usize, rng: &mut impl Rng) {
    let species = Species::Minnow;
    let radius = species.size_class().base_radius();
    let (x, direction) = pick_side(&world.area, radius, rng);
    let y = pick_y(world.area.height, world.config.spawn_margin, rng);
    let school = world.schools.create_school(2, size);
    for i in 0..size {
        let offset = Vec2::new(-direction * (i / 2) as f32 * 1.2, (i % 3) as f32 - 1.0);
        let id = world.alloc_id();
        let mut fish = build_fish(id, species, world.level, Vec2::new(x, y) + offset, direction, &world.config, rng);
        fish.pattern = MovementPattern::Linear;
        fish.body.tags.insert("school".to_string());
        if world.schools.add_to_school(school, fish).is_err() {
            break;
        }
    }
    debug!(school, size, "school spawned");
}

/// Turns this frame's requests into entities, honouring the fish cap.
pub fn apply_spawns(world: &mut GameWorld, requests: &[SpawnRequest], max_fish: usize, rng: &mut impl Rng) {
    let margin = world.config.spawn_margin;
    for &request in requests {
        let area = world.area;
        match request {
            SpawnRequest::Fish(species) => {
                if world.live_fish().count() >= max_fish {
                    continue;
                }
                let radius = species.size_class().base_radius();
                let (x, direction) = pick_side(&area, radius, rng);
                let y = pick_y(area.height, margin, rng);
                let id = world.alloc_id();
                let fish = build_fish(id, species, world.level, Vec2::new(x, y), direction, &world.config, rng);
                world.fish.push(fish);
            }
            SpawnRequest::School { size } => {
                if world.live_fish().count() + size > max_fish {
                    continue;
                }
                spawn_school(world, size, rng);
            }
            SpawnRequest::Bomb => {
                let x = pick_x(area.width, rng);
                let id = world.alloc_id();
                world.hazards.push(build_bomb(id, x));
            }
            SpawnRequest::Jellyfish => {
                let (x, direction) = pick_side(&area, JELLY_RADIUS, rng);
                let y = pick_y(area.height, margin, rng);
                let id = world.alloc_id();
                world.hazards.push(build_jellyfish(id, Vec2::new(x, y), direction));
            }
            SpawnRequest::Starfish | SpawnRequest::Pearl | SpawnRequest::PowerUp(_) => {
                let kind = match request {
                    SpawnRequest::Starfish => BonusKind::Starfish,
                    SpawnRequest::PowerUp(kind) => BonusKind::PowerUp(kind),
                    _ => BonusKind::PearlOyster,
                };
                let position = Vec2::new(pick_x(area.width, rng), pick_y(area.height, margin, rng));
                let id = world.alloc_id();
                let item = build_bonus_item(id, kind, position, &world.config);
                world.bonus_items.push(item);
            }
        }
    }
}
