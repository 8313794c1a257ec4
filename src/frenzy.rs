//! Frenzy chain detection.
//!
//! Every fish the player eats is stamped into a time-ordered history. Four
//! eats inside the activation window start a Frenzy; four more inside the
//! upgrade window while already in Frenzy start a Super Frenzy. Any eat
//! during a frenzy refreshes its countdown.
use std::collections::VecDeque;

use tracing::debug;

/// Activation window while no frenzy is running.
pub const FRENZY_WINDOW: f32 = 2.0;
/// Window used for the Frenzy → Super Frenzy upgrade.
pub const SUPER_FRENZY_WINDOW: f32 = 2.5;
pub const FRENZY_THRESHOLD: usize = 4;
pub const FRENZY_DURATION: f32 = 6.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrenzyLevel {
    #[default]
    None,
    Frenzy,
    SuperFrenzy,
}

impl FrenzyLevel {
    pub fn multiplier(self) -> u64 {
        match self {
            FrenzyLevel::None => 1,
            FrenzyLevel::Frenzy => 2,
            FrenzyLevel::SuperFrenzy => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FrenzyLevel::None => "",
            FrenzyLevel::Frenzy => "FRENZY x2",
            FrenzyLevel::SuperFrenzy => "SUPER FRENZY x4",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrenzySystem {
    /// Age in seconds of each recorded eat, oldest first.
    history: VecDeque<f32>,
    level: FrenzyLevel,
    time_remaining: f32,
}

impl FrenzySystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn window(&self) -> f32 {
        match self.level {
            FrenzyLevel::None => FRENZY_WINDOW,
            FrenzyLevel::Frenzy | FrenzyLevel::SuperFrenzy => SUPER_FRENZY_WINDOW,
        }
    }

    /// Records an eat. Returns the new level when this eat changed it.
    pub fn register_fish_eaten(&mut self) -> Option<FrenzyLevel> {
        self.history.push_back(0.0);
        if self.level != FrenzyLevel::None {
            self.time_remaining = FRENZY_DURATION;
        }

        let window = self.window();
        let recent = self.history.iter().filter(|&&age| age <= window).count();
        if recent < FRENZY_THRESHOLD {
            return None;
        }
        match self.level {
            FrenzyLevel::None => Some(self.enter(FrenzyLevel::Frenzy)),
            FrenzyLevel::Frenzy => Some(self.enter(FrenzyLevel::SuperFrenzy)),
            FrenzyLevel::SuperFrenzy => None,
        }
    }

    fn enter(&mut self, level: FrenzyLevel) -> FrenzyLevel {
        debug!(?level, "frenzy tier reached");
        self.level = level;
        self.time_remaining = FRENZY_DURATION;
        // The chain that earned this tier does not count toward the next one.
        self.history.clear();
        level
    }

    /// Ages the history and runs the countdown. Returns `Some(None)` when
    /// an active frenzy just expired.
    pub fn update(&mut self, dt: f32) -> Option<FrenzyLevel> {
        for age in self.history.iter_mut() {
            *age += dt;
        }
        let window = self.window();
        while self.history.front().is_some_and(|&age| age > window) {
            self.history.pop_front();
        }

        if self.level == FrenzyLevel::None {
            return None;
        }
        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            debug!("frenzy expired");
            self.level = FrenzyLevel::None;
            self.time_remaining = 0.0;
            return Some(FrenzyLevel::None);
        }
        None
    }

    /// Jumps straight to Frenzy (or refreshes a running frenzy) and forgets
    /// the history so the jump cannot cascade into a Super Frenzy.
    pub fn force_frenzy(&mut self) -> FrenzyLevel {
        self.history.clear();
        if self.level == FrenzyLevel::None {
            self.enter(FrenzyLevel::Frenzy)
        } else {
            self.time_remaining = FRENZY_DURATION;
            self.level
        }
    }

    pub fn level(&self) -> FrenzyLevel {
        self.level
    }

    pub fn multiplier(&self) -> u64 {
        self.level.multiplier()
    }

    pub fn is_active(&self) -> bool {
        self.level != FrenzyLevel::None
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.level = FrenzyLevel::None;
        self.time_remaining = 0.0;
    }
}
