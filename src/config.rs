use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::entities::SizeClass;
use crate::error::{GameError, Result};

/// Radius multipliers per size class, applied on top of the base radii.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl ScaleConfig {
    pub fn for_size(&self, size: SizeClass) -> f32 {
        match size {
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            small: 1.0,
            medium: 1.0,
            large: 1.0,
        }
    }
}

/// Seconds spent in each phase of the permanent oyster cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OysterTimings {
    pub closed: f32,
    pub opening: f32,
    pub open: f32,
    pub closing: f32,
}

impl Default for OysterTimings {
    fn default() -> Self {
        Self {
            closed: 3.0,
            opening: 0.6,
            open: 2.0,
            closing: 0.6,
        }
    }
}

/// Gameplay tunables. Every field has a default so partial files work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // Simulation
    pub tick_rate: f64,

    // Player
    pub starting_lives: u32,
    pub max_lives: u32,
    pub player_speed: f32,
    pub medium_growth: u32,
    pub large_growth: u32,
    pub stage_goal: u32,
    pub damage_cooldown: f32,
    pub stun_duration: f32,
    pub knockback_duration: f32,
    pub knockback_speed: f32,

    // Scoring
    pub puffer_penalty: u64,
    pub tail_bite_points: u64,
    pub pearl_points: u32,

    // Power-ups
    pub power_up_duration: f32,
    pub freeze_duration: f32,
    pub poison_duration: f32,

    // World
    pub scale: ScaleConfig,
    pub spawn_margin: f32,
    pub bonus_stage_every: u32,
    pub bonus_stage_duration: f32,
    pub oyster: OysterTimings,
    pub oysters_per_stage: usize,

    // Persistence
    pub high_score_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            starting_lives: 3,
            max_lives: 5,
            player_speed: 14.0,
            medium_growth: 10,
            large_growth: 25,
            stage_goal: 45,
            damage_cooldown: 2.0,
            stun_duration: 1.5,
            knockback_duration: 0.4,
            knockback_speed: 18.0,
            puffer_penalty: 50,
            tail_bite_points: 250,
            pearl_points: 500,
            power_up_duration: 10.0,
            freeze_duration: 5.0,
            poison_duration: 4.0,
            scale: ScaleConfig::default(),
            spawn_margin: 3.0,
            bonus_stage_every: 3,
            bonus_stage_duration: 20.0,
            oyster: OysterTimings::default(),
            oysters_per_stage: 1,
            high_score_capacity: 10,
        }
    }
}

impl GameConfig {
    /// Seconds per fixed update.
    pub fn timestep(&self) -> f32 {
        if self.tick_rate > 0.0 {
            (1.0 / self.tick_rate) as f32
        } else {
            1.0 / 30.0
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the file, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded game config from {}", path.display());
                config
            }
            Err(GameError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                warn!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                error!("{}", e);
                error!("Using default GameConfig");
                Self::default()
            }
        }
    }
}
