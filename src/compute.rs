/// Pure game-logic driver.
///
/// `tick` takes an immutable reference to the current `GameWorld` (plus the
/// frame's input and an RNG handle) and returns a brand-new `GameWorld`.
/// Side effects are limited to the injected RNG.
///
/// Pass order inside a frame is fixed: movement/AI, environmental forces,
/// collision resolution, dead-entity pruning, then timers/score/progression
/// and spawning. Collisions always see this frame's positions.
use std::iter;

use glam::Vec2;
use rand::Rng;
use tracing::info;

use crate::bonus;
use crate::collision;
use crate::config::GameConfig;
use crate::entities::{
    CarryOver, GameEvent, GameStatus, GameWorld, PlayArea, Species, StageKind,
};
use crate::fish::{self, Sighting};
use crate::frenzy::FrenzySystem;
use crate::player::{self, FrameInput};
use crate::powerup::PowerUpManager;
use crate::schooling::SchoolingSystem;
use crate::spawner;

/// Minnows already swimming when a normal stage opens.
pub const INITIAL_FISH: usize = 3;
/// Extra oysters placed on a bonus stage.
pub const BONUS_STAGE_EXTRA_OYSTERS: usize = 2;

// ── Constructors ──────────────────────────────────────────────────────────────

/// Builds a fresh stage from the carried-over run state.
pub fn init_world(area: PlayArea, carry: &CarryOver, config: &GameConfig, rng: &mut impl Rng) -> GameWorld {
    let mut world = GameWorld {
        player: player::new_player(0, area.center(), carry.lives, config),
        fish: Vec::new(),
        schools: SchoolingSystem::new(),
        hazards: Vec::new(),
        bonus_items: Vec::new(),
        oysters: Vec::new(),
        power_ups: PowerUpManager::new(),
        frenzy: FrenzySystem::new(),
        stats: carry.stats.clone(),
        score: carry.score,
        high_score: carry.high_score.max(carry.score),
        level: carry.level.max(1),
        stage: carry.stage,
        stage_time_left: 0.0,
        status: GameStatus::Playing,
        frame: 0,
        area,
        next_id: 1,
        config: config.clone(),
        events: Vec::new(),
    };

    match carry.stage {
        StageKind::Normal => {
            spawner::place_oysters(&mut world, config.oysters_per_stage);
            for _ in 0..INITIAL_FISH {
                let (lo, hi) = spawner::spawn_y_range(area.height, config.spawn_margin);
                let y = if hi > lo { rng.gen_range(lo..hi) } else { lo };
                let x = if area.width > 2.0 { rng.gen_range(1.0..area.width - 1.0) } else { 0.0 };
                let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let id = world.alloc_id();
                let fish = spawner::build_fish(id, Species::Minnow, world.level, Vec2::new(x, y), direction, config, rng);
                world.fish.push(fish);
            }
        }
        StageKind::Bonus => {
            world.stage_time_left = config.bonus_stage_duration;
            spawner::place_oysters(&mut world, config.oysters_per_stage + BONUS_STAGE_EXTRA_OYSTERS);
        }
    }

    info!(level = world.level, stage = ?world.stage, "stage started");
    world
}

/// Where play goes after the stage in `carry` is cleared.
pub fn next_stage(carry: &CarryOver, config: &GameConfig) -> CarryOver {
    let every = config.bonus_stage_every;
    let (level, stage) = match carry.stage {
        StageKind::Normal if every > 0 && carry.level % every == 0 => (carry.level, StageKind::Bonus),
        StageKind::Normal | StageKind::Bonus => (carry.level + 1, StageKind::Normal),
    };
    CarryOver {
        level,
        stage,
        ..carry.clone()
    }
}

// ── Per-frame helpers ─────────────────────────────────────────────────────────

/// Physically removes everything marked dead. Disbanded schools hand their
/// survivors back to the general fish list.
pub fn prune_dead(world: &mut GameWorld) {
    world.fish.retain(|f| f.body.alive);
    for mut released in world.schools.prune() {
        if released.body.alive {
            released.body.tags.remove("school");
            world.fish.push(released);
        }
    }
    world.hazards.retain(|h| h.body.alive);
    world.bonus_items.retain(|b| b.body.alive);
    world.oysters.retain(|o| o.body.alive);
}

fn clear_stage(world: &mut GameWorld) {
    let area = world.area;
    world.status = GameStatus::StageClear;
    world.stats.stages_cleared += 1;
    for f in world.fish.iter_mut().chain(world.schools.members_mut()) {
        if f.body.alive {
            fish::start_fleeing(f, &area);
        }
    }
    world.events.push(GameEvent::StageCleared { level: world.level });
    info!(level = world.level, score = world.score, "stage cleared");
}

// ── Per-frame tick ────────────────────────────────────────────────────────────

/// Advance the simulation by `dt` seconds. All randomness comes through
/// `rng` so callers control determinism.
pub fn tick(world: &GameWorld, input: &FrameInput, dt: f32, rng: &mut impl Rng) -> GameWorld {
    let mut next = world.clone();
    next.events.clear();
    next.frame += 1;
    if next.status == GameStatus::GameOver {
        return next;
    }
    let dt = dt.max(0.0);
    let area = next.area;

    // ── 1. Movement and AI ───────────────────────────────────────────────────
    let speed_multiplier = next.power_ups.speed_multiplier();
    player::update_player(&mut next.player, input, dt, speed_multiplier, &area);

    let sightings: Vec<Sighting> = iter::once(Sighting::of_player(&next.player))
        .chain(next.live_fish().map(Sighting::of_fish))
        .collect();
    next.schools.apply_flocking(dt);
    for f in next.fish.iter_mut().chain(next.schools.members_mut()) {
        fish::update_fish(f, dt, &sightings, &area);
    }
    for hazard in next.hazards.iter_mut() {
        bonus::update_hazard(hazard, dt, &area);
    }
    for item in next.bonus_items.iter_mut() {
        bonus::update_bonus_item(item, dt);
    }
    for oyster in next.oysters.iter_mut() {
        bonus::advance_oyster(oyster, dt);
    }

    // ── 2. Environmental forces ──────────────────────────────────────────────
    collision::apply_pufferfish_push(&mut next);

    // ── 3. Collisions ────────────────────────────────────────────────────────
    if next.status == GameStatus::Playing {
        collision::resolve_collisions(&mut next);
    }

    // ── 4. Prune ─────────────────────────────────────────────────────────────
    prune_dead(&mut next);

    // ── 5. Timers, score and progression ─────────────────────────────────────
    next.power_ups.update(dt);
    if let Some(level) = next.frenzy.update(dt) {
        next.events.push(GameEvent::FrenzyChanged(level));
    }
    next.high_score = next.high_score.max(next.score);

    if next.player.lives == 0 {
        next.status = GameStatus::GameOver;
        info!(score = next.score, level = next.level, "game over");
        return next;
    }

    if next.status == GameStatus::Playing {
        match next.stage {
            StageKind::Normal => {
                if next.player.growth >= next.config.stage_goal {
                    clear_stage(&mut next);
                }
            }
            StageKind::Bonus => {
                next.stage_time_left -= dt;
                if next.stage_time_left <= 0.0 {
                    next.stage_time_left = 0.0;
                    next.status = GameStatus::StageClear;
                    next.events.push(GameEvent::BonusStageOver);
                    info!(level = next.level, score = next.score, "bonus stage over");
                }
            }
        }
    }

    // ── 6. Spawning ──────────────────────────────────────────────────────────
    if next.status == GameStatus::Playing {
        let table = match next.stage {
            StageKind::Normal => spawner::spawn_table(next.level),
            StageKind::Bonus => spawner::bonus_stage_table(),
        };
        let requests = spawner::roll_spawns(&table, dt, rng);
        spawner::apply_spawns(&mut next, &requests, table.max_fish, rng);
    }

    next
}
