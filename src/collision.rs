/// Circle tests and the per-frame interaction resolver.
///
/// Every rule checks `alive` on both sides before it fires, so an entity
/// killed by an earlier rule is never processed again in the same sweep.
use glam::Vec2;
use tracing::debug;

use crate::bonus;
use crate::config::GameConfig;
use crate::entities::{
    Body, BonusItem, BonusKind, EntityId, Fish, GameEvent, GameStats, GameWorld, Hazard,
    HazardKind, PermanentOyster, Player, PowerUpKind,
};
use crate::fish::{self, MIN_LENGTH_SQ};
use crate::frenzy::FrenzySystem;
use crate::player;
use crate::powerup::PowerUpManager;
use crate::special;

/// Tail point sits this fraction of the radius behind the fish's center.
pub const TAIL_OFFSET_FRACTION: f32 = 0.9;
pub const TAIL_RADIUS: f32 = 0.5;
pub const TAIL_BITE_COOLDOWN: f32 = 1.5;
/// Size classes the target must out-rank the player by to be tail-bitten.
pub const TAIL_BITE_RANK_GAP: u8 = 2;
/// An inflated pufferfish reaches this many radii out.
pub const PUSH_RADIUS_FACTOR: f32 = 2.0;
pub const PUSH_SPEED: f32 = 10.0;
pub const PUSH_NUDGE: f32 = 0.5;
pub const KNOCKBACK_NUDGE: f32 = 1.0;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Strict overlap on squared distance; touching circles do not collide.
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}

pub fn collides(a: &Body, b: &Body) -> bool {
    a.alive && b.alive && circles_overlap(a.position, a.radius, b.position, b.radius)
}

/// Unit vector from `from` to `to`, or `None` when they coincide.
pub fn separation(from: Vec2, to: Vec2) -> Option<Vec2> {
    let offset = to - from;
    if offset.length_squared() <= MIN_LENGTH_SQ {
        None
    } else {
        Some(offset.normalize())
    }
}

/// Point behind the fish along its heading. A fish with no heading has no tail.
pub fn tail_point(fish: &Fish) -> Option<Vec2> {
    let velocity = fish.body.velocity;
    if velocity.length_squared() <= MIN_LENGTH_SQ {
        return None;
    }
    Some(fish.body.position - velocity.normalize() * fish.body.radius * TAIL_OFFSET_FRACTION)
}

pub fn can_eat(eater_rank: f32, prey_rank: f32) -> bool {
    eater_rank > prey_rank
}

pub fn tail_bite_eligible(player: &Player, fish: &Fish) -> bool {
    fish.size.rank() >= player.size.rank() + TAIL_BITE_RANK_GAP
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// Everything a player-side rule may touch.
struct Interaction<'a> {
    player: &'a mut Player,
    power_ups: &'a mut PowerUpManager,
    frenzy: &'a mut FrenzySystem,
    stats: &'a mut GameStats,
    score: &'a mut u64,
    events: &'a mut Vec<GameEvent>,
    config: &'a GameConfig,
    freeze_request: Option<f32>,
}

impl Interaction<'_> {
    fn player_active(&self) -> bool {
        self.player.body.alive && self.player.lives > 0
    }

    fn award(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        *self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreDelta(points as i64));
    }

    /// Returns how much was actually taken.
    fn penalize(&mut self, points: u64) -> u64 {
        let taken = points.min(*self.score);
        *self.score -= taken;
        if taken > 0 {
            self.events.push(GameEvent::ScoreDelta(-(taken as i64)));
        }
        taken
    }

    /// Applies one hit. Returns whether a life was lost.
    fn damage_player(&mut self) -> bool {
        if self.power_ups.is_active(PowerUpKind::Invincibility) || self.player.is_recovering() {
            return false;
        }
        if self.power_ups.deactivate(PowerUpKind::Shield) {
            self.player.damage_cooldown = self.config.damage_cooldown;
            self.events.push(GameEvent::ShieldAbsorbed);
            return false;
        }
        self.player.lives = self.player.lives.saturating_sub(1);
        self.player.damage_cooldown = self.config.damage_cooldown;
        self.events.push(GameEvent::PlayerDamaged {
            lives: self.player.lives,
        });
        debug!(lives = self.player.lives, "player damaged");
        if self.player.lives == 0 {
            self.events.push(GameEvent::PlayerDied);
        }
        true
    }

    fn player_eats(&mut self, fish: &mut Fish) {
        let payload = special::poison_payload(fish);
        let base = payload.map_or(fish.points, |p| p.points) as u64;
        let points = base * self.power_ups.score_multiplier() * self.frenzy.multiplier();

        fish.body.destroy();
        self.award(points);
        self.stats.record_eat(fish.species);
        self.events.push(GameEvent::FishEaten {
            eater: None,
            species: fish.species,
            points,
            position: fish.body.position,
        });

        if let Some(payload) = payload {
            self.player.reversed_timer = self.player.reversed_timer.max(payload.duration);
            self.events.push(GameEvent::PlayerPoisoned {
                duration: payload.duration,
            });
            return;
        }

        if let Some(size) = player::apply_growth(self.player, fish.growth_value(), self.config) {
            self.events.push(GameEvent::PlayerGrew(size));
        }
        if let Some(level) = self.frenzy.register_fish_eaten() {
            self.stats.record_frenzy(level);
            self.events.push(GameEvent::FrenzyChanged(level));
        }
    }

    fn puffer_knockback(&mut self, puffer: &Fish) {
        if self.player.knockback_timer > 0.0 {
            return;
        }
        let Some(dir) = separation(puffer.body.position, self.player.body.position) else {
            return;
        };
        self.player.body.velocity = dir * self.config.knockback_speed;
        self.player.body.position += dir * KNOCKBACK_NUDGE;
        self.player.knockback_timer = self.config.knockback_duration;
        let penalty = self.penalize(self.config.puffer_penalty);
        self.events.push(GameEvent::PufferPush {
            puffer: puffer.body.id,
            penalty,
        });
    }

    /// True when the tail zone claimed the contact, bite or not.
    fn try_tail_bite(&mut self, fish: &mut Fish) -> bool {
        if !tail_bite_eligible(self.player, fish) {
            return false;
        }
        let Some(tail) = tail_point(fish) else {
            return false;
        };
        if !circles_overlap(tail, TAIL_RADIUS, self.player.body.position, self.player.body.radius) {
            return false;
        }
        if fish.tail_bite_cooldown <= 0.0 {
            fish.tail_bite_cooldown = TAIL_BITE_COOLDOWN;
            let points = self.config.tail_bite_points;
            self.award(points);
            self.stats.tail_bites += 1;
            self.events.push(GameEvent::TailBite {
                target: fish.body.id,
                points,
            });
        }
        true
    }

    fn player_vs_fish(&mut self, fish: &mut Fish) {
        if !self.player_active() || !fish.body.alive {
            return;
        }
        if self.try_tail_bite(fish) {
            return;
        }
        if !collides(&self.player.body, &fish.body) {
            return;
        }
        if special::is_inflated(fish) {
            self.puffer_knockback(fish);
            return;
        }
        if special::poison_payload(fish).is_some() {
            self.player_eats(fish);
            return;
        }
        let (mine, theirs) = (self.player.rank(), fish.rank());
        if can_eat(mine, theirs) {
            self.player_eats(fish);
        } else if can_eat(theirs, mine) {
            self.damage_player();
        }
    }

    fn player_vs_hazard(&mut self, hazard: &mut Hazard) {
        if !self.player_active() || !collides(&self.player.body, &hazard.body) {
            return;
        }
        match &mut hazard.kind {
            HazardKind::Bomb { detonating, .. } => {
                *detonating = true;
                self.damage_player();
            }
            HazardKind::Jellyfish { .. } => {
                if self.power_ups.is_active(PowerUpKind::Invincibility) || self.player.is_stunned() {
                    return;
                }
                self.player.stun_timer = self.config.stun_duration;
                self.player.body.velocity = Vec2::ZERO;
                self.events.push(GameEvent::Stunned { target: None });
            }
        }
    }

    fn player_vs_oyster(&mut self, oyster: &mut PermanentOyster) {
        if !self.player_active() || !collides(&self.player.body, &oyster.body) {
            return;
        }
        if bonus::oyster_can_hurt(oyster) {
            self.damage_player();
        } else if bonus::oyster_can_collect(oyster) {
            oyster.collect_cooldown = oyster.timings.open + oyster.timings.closing;
            let points = oyster.points as u64;
            self.award(points);
            self.stats.pearls += 1;
            self.events.push(GameEvent::PearlCollected { points });
        }
    }

    fn player_vs_bonus(&mut self, item: &mut BonusItem) {
        if !self.player_active() || !collides(&self.player.body, &item.body) {
            return;
        }
        item.body.destroy();
        match item.kind {
            BonusKind::PowerUp(kind) => {
                self.events.push(GameEvent::BonusCollected {
                    kind: item.kind,
                    points: 0,
                });
                self.activate_power_up(kind, item.duration);
            }
            BonusKind::Starfish | BonusKind::PearlOyster => {
                let points = item.points as u64;
                self.award(points);
                self.events.push(GameEvent::BonusCollected {
                    kind: item.kind,
                    points,
                });
            }
        }
    }

    fn activate_power_up(&mut self, kind: PowerUpKind, duration: f32) {
        self.stats.power_ups += 1;
        self.events.push(GameEvent::PowerUpActivated(kind));
        match kind {
            PowerUpKind::ScoreDoubler
            | PowerUpKind::SpeedBoost
            | PowerUpKind::Invincibility
            | PowerUpKind::Shield => self.power_ups.activate(kind, duration),
            PowerUpKind::Freeze => {
                self.power_ups.activate(kind, duration);
                let longest = self.freeze_request.map_or(duration, |d| d.max(duration));
                self.freeze_request = Some(longest);
            }
            PowerUpKind::FrenzyStarter => {
                let was = self.frenzy.level();
                let level = self.frenzy.force_frenzy();
                if level != was {
                    self.stats.record_frenzy(level);
                    self.events.push(GameEvent::FrenzyChanged(level));
                }
            }
            PowerUpKind::ExtraLife => {
                if self.player.lives < self.config.max_lives.max(1) {
                    self.player.lives += 1;
                }
            }
        }
    }
}

fn fish_eats_fish(eater: &mut Fish, prey: &mut Fish, events: &mut Vec<GameEvent>) {
    prey.body.destroy();
    events.push(GameEvent::FishEaten {
        eater: Some(eater.body.id),
        species: prey.species,
        points: 0,
        position: prey.body.position,
    });
    if let Some(payload) = special::poison_payload(prey) {
        fish::set_poisoned(eater, payload.duration);
        events.push(GameEvent::FishPoisoned {
            id: eater.body.id,
            duration: payload.duration,
        });
    }
}

fn fish_vs_fish(a: &mut Fish, b: &mut Fish, events: &mut Vec<GameEvent>) {
    if !collides(&a.body, &b.body) {
        return;
    }
    // Inflated pufferfish push rather than bite or get bitten.
    if special::is_inflated(a) || special::is_inflated(b) {
        return;
    }
    if can_eat(a.rank(), b.rank()) {
        fish_eats_fish(a, b, events);
    } else if can_eat(b.rank(), a.rank()) {
        fish_eats_fish(b, a, events);
    }
}

fn fish_vs_hazard(fish: &mut Fish, hazard: &mut Hazard, config: &GameConfig, events: &mut Vec<GameEvent>) {
    if fish.status.fleeing || !collides(&fish.body, &hazard.body) {
        return;
    }
    match &mut hazard.kind {
        HazardKind::Bomb { detonating, .. } => *detonating = true,
        HazardKind::Jellyfish { .. } => {
            if fish.status.stunned.is_none() {
                fish::set_stunned(fish, config.stun_duration);
                events.push(GameEvent::Stunned {
                    target: Some(fish.body.id),
                });
            }
        }
    }
}

/// Blows up every bomb flagged this frame. Each blast kills all fish whose
/// center lies inside its radius, whether or not they touch the bomb.
fn detonate_bombs(hazards: &mut [Hazard], fish: &mut [&mut Fish], events: &mut Vec<GameEvent>) {
    for hazard in hazards.iter_mut() {
        let radius = match hazard.kind {
            HazardKind::Bomb {
                detonating: true,
                explosion_radius,
                ..
            } if hazard.body.alive => explosion_radius,
            _ => continue,
        };
        hazard.body.destroy();
        let center = hazard.body.position;
        let reach_sq = radius * radius;
        let mut destroyed = 0;
        for f in fish.iter_mut() {
            if f.body.alive && f.body.position.distance_squared(center) <= reach_sq {
                f.body.destroy();
                destroyed += 1;
            }
        }
        debug!(?center, destroyed, "bomb detonated");
        events.push(GameEvent::Explosion {
            position: center,
            radius,
            destroyed,
        });
    }
}

/// Applies every interaction rule once for this frame's positions.
pub fn resolve_collisions(world: &mut GameWorld) {
    let GameWorld {
        player,
        fish,
        schools,
        hazards,
        bonus_items,
        oysters,
        power_ups,
        frenzy,
        stats,
        score,
        events,
        config,
        ..
    } = world;

    let mut all_fish: Vec<&mut Fish> = fish.iter_mut().chain(schools.members_mut()).collect();
    let mut ctx = Interaction {
        player,
        power_ups,
        frenzy,
        stats,
        score,
        events: &mut *events,
        config: &*config,
        freeze_request: None,
    };

    for hazard in hazards.iter_mut().filter(|h| h.body.alive) {
        ctx.player_vs_hazard(hazard);
    }
    for f in all_fish.iter_mut() {
        ctx.player_vs_fish(f);
    }
    for oyster in oysters.iter_mut() {
        ctx.player_vs_oyster(oyster);
    }
    for item in bonus_items.iter_mut() {
        ctx.player_vs_bonus(item);
    }
    let freeze_request = ctx.freeze_request;

    for i in 0..all_fish.len() {
        let (head, tail) = all_fish.split_at_mut(i + 1);
        let a = &mut *head[i];
        for b in tail.iter_mut() {
            if !a.body.alive {
                break;
            }
            fish_vs_fish(a, b, events);
        }
    }

    for hazard in hazards.iter_mut() {
        for f in all_fish.iter_mut() {
            if !hazard.body.alive {
                break;
            }
            fish_vs_hazard(f, hazard, config, events);
        }
    }

    detonate_bombs(hazards, &mut all_fish, events);

    if let Some(duration) = freeze_request {
        for f in all_fish.iter_mut().filter(|f| f.body.alive) {
            fish::set_frozen(f, duration);
        }
    }
}

/// Inflated pufferfish shove every other live fish inside their reach.
pub fn apply_pufferfish_push(world: &mut GameWorld) {
    let pushers: Vec<(EntityId, Vec2, f32)> = world
        .live_fish()
        .filter(|f| special::is_inflated(f) && !f.status.fleeing)
        .map(|f| (f.body.id, f.body.position, f.body.radius * PUSH_RADIUS_FACTOR))
        .collect();
    if pushers.is_empty() {
        return;
    }

    for f in world.fish.iter_mut().chain(world.schools.members_mut()) {
        if !f.body.alive || f.status.fleeing || f.status.stunned.is_some() {
            continue;
        }
        for &(id, center, reach) in &pushers {
            if f.body.id == id || f.body.position.distance_squared(center) >= reach * reach {
                continue;
            }
            let Some(dir) = separation(center, f.body.position) else {
                continue;
            };
            f.body.velocity = dir * PUSH_SPEED;
            f.body.position += dir * PUSH_NUDGE;
        }
    }
}
