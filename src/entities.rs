//! Entity records for the reef: plain data, no rules.
//!
//! The per-frame rules live in `fish`, `special`, `collision`, `bonus` and
//! `compute`; this module only defines the records they operate on.
use std::collections::{BTreeMap, HashSet};

use glam::Vec2;

use crate::config::{GameConfig, OysterTimings};
use crate::frenzy::{FrenzyLevel, FrenzySystem};
use crate::powerup::PowerUpManager;
use crate::schooling::SchoolingSystem;

pub type EntityId = u32;

/// The player out-ranks fish of its own size class by this much.
pub const PLAYER_RANK_EDGE: f32 = 0.5;

// ── Tags ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    SmallFish,
    MediumFish,
    LargeFish,
    Bonus,
    PowerUp,
    Hazard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn rank(self) -> u8 {
        match self {
            SizeClass::Small => 1,
            SizeClass::Medium => 2,
            SizeClass::Large => 3,
        }
    }

    pub fn next(self) -> Option<SizeClass> {
        match self {
            SizeClass::Small => Some(SizeClass::Medium),
            SizeClass::Medium => Some(SizeClass::Large),
            SizeClass::Large => None,
        }
    }

    pub fn entity_kind(self) -> EntityKind {
        match self {
            SizeClass::Small => EntityKind::SmallFish,
            SizeClass::Medium => EntityKind::MediumFish,
            SizeClass::Large => EntityKind::LargeFish,
        }
    }

    /// Unscaled collision radius for a fish of this class.
    pub fn base_radius(self) -> f32 {
        match self {
            SizeClass::Small => 0.8,
            SizeClass::Medium => 1.5,
            SizeClass::Large => 2.6,
        }
    }

    /// Growth progress the player earns for eating a fish of this class.
    pub fn growth_value(self) -> u32 {
        match self {
            SizeClass::Small => 1,
            SizeClass::Medium => 3,
            SizeClass::Large => 6,
        }
    }
}

// ── Base entity ───────────────────────────────────────────────────────────────

/// Position, velocity and collision circle shared by every moving object.
#[derive(Clone, Debug)]
pub struct Body {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub alive: bool,
    pub kind: EntityKind,
    pub tags: HashSet<String>,
}

impl Body {
    pub fn new(id: EntityId, kind: EntityKind, position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            alive: true,
            kind,
            tags: HashSet::new(),
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.insert(tag.to_string());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the entity dead; it is physically removed by the next prune.
    pub fn destroy(&mut self) {
        self.alive = false;
    }
}

// ── Fish ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    Minnow,
    Snapper,
    Shark,
    Barracuda,
    Pufferfish,
    Angelfish,
    PoisonFish,
}

impl Species {
    pub const ALL: [Species; 7] = [
        Species::Minnow,
        Species::Snapper,
        Species::Shark,
        Species::Barracuda,
        Species::Pufferfish,
        Species::Angelfish,
        Species::PoisonFish,
    ];

    pub fn size_class(self) -> SizeClass {
        match self {
            Species::Minnow | Species::Angelfish | Species::PoisonFish => SizeClass::Small,
            Species::Snapper | Species::Pufferfish => SizeClass::Medium,
            Species::Shark | Species::Barracuda => SizeClass::Large,
        }
    }

    /// Points at level 1.
    pub fn base_points(self) -> u32 {
        match self {
            Species::Minnow => 10,
            Species::Angelfish => 25,
            Species::PoisonFish => 5,
            Species::Snapper => 40,
            Species::Pufferfish => 60,
            Species::Shark => 120,
            Species::Barracuda => 150,
        }
    }

    /// Cruise speed in cells per second.
    pub fn base_speed(self) -> f32 {
        match self {
            Species::Minnow => 8.0,
            Species::Angelfish => 7.0,
            Species::PoisonFish => 6.0,
            Species::Snapper => 6.5,
            Species::Pufferfish => 4.0,
            Species::Shark => 5.5,
            Species::Barracuda => 6.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Minnow => "minnow",
            Species::Snapper => "snapper",
            Species::Shark => "shark",
            Species::Barracuda => "barracuda",
            Species::Pufferfish => "pufferfish",
            Species::Angelfish => "angelfish",
            Species::PoisonFish => "poison fish",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementPattern {
    Linear,
    Sinusoidal,
    ZigZag,
    Aggressive,
}

/// Timers and shape parameters for the movement-pattern overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternState {
    pub elapsed: f32,
    /// Centre line of the sinusoidal wave; drifts with vertical velocity.
    pub base_y: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub zigzag_period: f32,
    pub zigzag_timer: f32,
}

impl PatternState {
    pub fn at(base_y: f32) -> Self {
        Self {
            elapsed: 0.0,
            base_y,
            amplitude: 0.0,
            frequency: 0.0,
            zigzag_period: 0.0,
            zigzag_timer: 0.0,
        }
    }
}

/// A running status effect: countdown plus the velocity captured at onset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedEffect {
    pub remaining: f32,
    pub snapshot: Vec2,
}

/// Independent status flags. Forcing `remaining` to zero cancels an effect
/// on the next update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    pub poisoned: Option<TimedEffect>,
    pub stunned: Option<TimedEffect>,
    pub frozen: Option<TimedEffect>,
    pub fleeing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuffPhase {
    None,
    Inflating,
    Holding,
    Deflating,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarracudaState {
    pub target: Option<EntityId>,
    pub dashing: bool,
    pub dash_timer: f32,
    pub cooldown: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PufferState {
    pub phase: PuffPhase,
    pub phase_timer: f32,
    /// 0 = deflated, 1 = fully inflated.
    pub inflation: f32,
    pub base_radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngelState {
    pub threat: Option<EntityId>,
    pub evade_timer: f32,
}

/// Carried by a poison fish and handed to whoever eats it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoisonPayload {
    pub duration: f32,
    pub points: u32,
}

/// Closed set of fish behaviors; each variant owns its own state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    Plain,
    Barracuda(BarracudaState),
    Pufferfish(PufferState),
    Angelfish(AngelState),
    Poison(PoisonPayload),
}

#[derive(Clone, Debug)]
pub struct Fish {
    pub body: Body,
    pub species: Species,
    pub size: SizeClass,
    pub base_speed: f32,
    pub points: u32,
    pub level: u32,
    pub status: StatusEffects,
    pub pattern: MovementPattern,
    pub motion: PatternState,
    pub behavior: Behavior,
    pub tail_bite_cooldown: f32,
}

impl Fish {
    pub fn rank(&self) -> f32 {
        self.size.rank() as f32
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    pub fn growth_value(&self) -> u32 {
        self.size.growth_value()
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub size: SizeClass,
    pub growth: u32,
    pub lives: u32,
    pub speed: f32,
    /// Post-damage grace period.
    pub damage_cooldown: f32,
    pub stun_timer: f32,
    pub reversed_timer: f32,
    pub knockback_timer: f32,
}

impl Player {
    pub fn rank(&self) -> f32 {
        self.size.rank() as f32 + PLAYER_RANK_EDGE
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    pub fn controls_reversed(&self) -> bool {
        self.reversed_timer > 0.0
    }

    pub fn is_recovering(&self) -> bool {
        self.damage_cooldown > 0.0
    }
}

// ── Hazards ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HazardKind {
    /// Sinks slowly; blows up on contact or when the fuse runs out.
    Bomb {
        fuse: f32,
        explosion_radius: f32,
        detonating: bool,
    },
    /// Drifts vertically and stuns whatever touches it.
    Jellyfish { phase: f32 },
}

#[derive(Clone, Debug)]
pub struct Hazard {
    pub body: Body,
    pub kind: HazardKind,
}

// ── Bonus items ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PowerUpKind {
    ScoreDoubler,
    FrenzyStarter,
    SpeedBoost,
    Invincibility,
    Freeze,
    ExtraLife,
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::ScoreDoubler,
        PowerUpKind::FrenzyStarter,
        PowerUpKind::SpeedBoost,
        PowerUpKind::Invincibility,
        PowerUpKind::Freeze,
        PowerUpKind::ExtraLife,
        PowerUpKind::Shield,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::ScoreDoubler => "x2 SCORE",
            PowerUpKind::FrenzyStarter => "FRENZY",
            PowerUpKind::SpeedBoost => "SPEED",
            PowerUpKind::Invincibility => "INVINCIBLE",
            PowerUpKind::Freeze => "FREEZE",
            PowerUpKind::ExtraLife => "1UP",
            PowerUpKind::Shield => "SHIELD",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BonusKind {
    Starfish,
    PearlOyster,
    PowerUp(PowerUpKind),
}

#[derive(Clone, Debug)]
pub struct BonusItem {
    pub body: Body,
    pub kind: BonusKind,
    pub points: u32,
    /// Effect duration for power-ups; unused by plain bonus items.
    pub duration: f32,
    pub lifetime: f32,
    pub bob_phase: f32,
    pub base_y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OysterPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Oyster fixed to the sea floor for the whole stage.
#[derive(Clone, Debug)]
pub struct PermanentOyster {
    pub body: Body,
    pub phase: OysterPhase,
    pub phase_timer: f32,
    pub collect_cooldown: f32,
    pub points: u32,
    pub timings: OysterTimings,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Everything a tick reports to the front-end (particles, sounds, logs).
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// `eater` is `None` when the player did the eating.
    FishEaten {
        eater: Option<EntityId>,
        species: Species,
        points: u64,
        position: Vec2,
    },
    PlayerPoisoned { duration: f32 },
    FishPoisoned { id: EntityId, duration: f32 },
    PlayerDamaged { lives: u32 },
    ShieldAbsorbed,
    PlayerDied,
    ScoreDelta(i64),
    TailBite { target: EntityId, points: u64 },
    PufferPush { puffer: EntityId, penalty: u64 },
    /// `target` is `None` for the player.
    Stunned { target: Option<EntityId> },
    Explosion { position: Vec2, radius: f32, destroyed: u32 },
    BonusCollected { kind: BonusKind, points: u64 },
    PearlCollected { points: u64 },
    PowerUpActivated(PowerUpKind),
    FrenzyChanged(FrenzyLevel),
    PlayerGrew(SizeClass),
    StageCleared { level: u32 },
    BonusStageOver,
}

// ── Run statistics ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameStats {
    pub eaten: BTreeMap<Species, u32>,
    pub tail_bites: u32,
    pub frenzies: u32,
    pub super_frenzies: u32,
    pub power_ups: u32,
    pub pearls: u32,
    pub stages_cleared: u32,
}

impl GameStats {
    pub fn record_eat(&mut self, species: Species) {
        *self.eaten.entry(species).or_insert(0) += 1;
    }

    pub fn total_eaten(&self) -> u32 {
        self.eaten.values().sum()
    }

    pub fn record_frenzy(&mut self, level: FrenzyLevel) {
        match level {
            FrenzyLevel::Frenzy => self.frenzies += 1,
            FrenzyLevel::SuperFrenzy => self.super_frenzies += 1,
            FrenzyLevel::None => {}
        }
    }
}

// ── Stage / world ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    StageClear,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Normal,
    Bonus,
}

/// Play-area bounds in cells; the origin is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True while a circle is inside the area grown by `margin` on every side.
    pub fn contains(&self, position: Vec2, radius: f32, margin: f32) -> bool {
        let m = margin + radius;
        position.x >= -m
            && position.x <= self.width + m
            && position.y >= -m
            && position.y <= self.height + m
    }

    pub fn clamp(&self, position: Vec2, radius: f32) -> Vec2 {
        let r_x = radius.min(self.width / 2.0);
        let r_y = radius.min(self.height / 2.0);
        Vec2::new(
            position.x.clamp(r_x, self.width - r_x),
            position.y.clamp(r_y, self.height - r_y),
        )
    }
}

/// Data handed from one game state to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct CarryOver {
    pub level: u32,
    pub stage: StageKind,
    pub score: u64,
    pub lives: u32,
    pub high_score: u64,
    pub stats: GameStats,
}

impl CarryOver {
    pub fn new_run(level: u32, lives: u32, high_score: u64) -> Self {
        Self {
            level: level.max(1),
            stage: StageKind::Normal,
            score: 0,
            lives,
            high_score,
            stats: GameStats::default(),
        }
    }
}

/// The entire game state. Cloneable so `compute::tick` can return a new copy
/// without mutating the original.
#[derive(Clone, Debug)]
pub struct GameWorld {
    pub player: Player,
    pub fish: Vec<Fish>,
    pub schools: SchoolingSystem,
    pub hazards: Vec<Hazard>,
    pub bonus_items: Vec<BonusItem>,
    pub oysters: Vec<PermanentOyster>,
    pub power_ups: PowerUpManager,
    pub frenzy: FrenzySystem,
    pub stats: GameStats,
    pub score: u64,
    pub high_score: u64,
    pub level: u32,
    pub stage: StageKind,
    /// Seconds left in a bonus stage; unused for normal stages.
    pub stage_time_left: f32,
    pub status: GameStatus,
    pub frame: u64,
    pub area: PlayArea,
    pub next_id: EntityId,
    pub config: GameConfig,
    /// Events produced by the most recent tick.
    pub events: Vec<GameEvent>,
}

impl GameWorld {
    pub fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Live fish, school members included.
    pub fn live_fish(&self) -> impl Iterator<Item = &Fish> {
        self.fish
            .iter()
            .chain(self.schools.members())
            .filter(|f| f.body.alive)
    }

    pub fn carry_over(&self) -> CarryOver {
        CarryOver {
            level: self.level,
            stage: self.stage,
            score: self.score,
            lives: self.player.lives,
            high_score: self.high_score.max(self.score),
            stats: self.stats.clone(),
        }
    }
}
