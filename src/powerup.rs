//! Active power-up bag.
//!
//! At most one entry per kind. Re-activating a running kind renews it to the
//! longer of the two durations; it never stacks.
use crate::entities::PowerUpKind;

pub const SCORE_DOUBLER_MULTIPLIER: u64 = 2;
pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PowerUpManager {
    active: Vec<ActivePowerUp>,
}

impl PowerUpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, kind: PowerUpKind, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        match self.active.iter_mut().find(|p| p.kind == kind) {
            Some(entry) => entry.remaining = entry.remaining.max(duration),
            None => self.active.push(ActivePowerUp { kind, remaining: duration }),
        }
    }

    /// Removes `kind` immediately. Returns whether it was active.
    pub fn deactivate(&mut self, kind: PowerUpKind) -> bool {
        let before = self.active.len();
        self.active.retain(|p| p.kind != kind);
        self.active.len() != before
    }

    pub fn update(&mut self, dt: f32) {
        for entry in &mut self.active {
            entry.remaining -= dt;
        }
        self.active.retain(|p| p.remaining > 0.0);
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|p| p.kind == kind)
    }

    /// Seconds left for `kind`, or zero when inactive.
    pub fn remaining_time(&self, kind: PowerUpKind) -> f32 {
        self.active
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.remaining)
            .unwrap_or(0.0)
    }

    pub fn score_multiplier(&self) -> u64 {
        if self.is_active(PowerUpKind::ScoreDoubler) {
            SCORE_DOUBLER_MULTIPLIER
        } else {
            1
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        if self.is_active(PowerUpKind::SpeedBoost) {
            SPEED_BOOST_MULTIPLIER
        } else {
            1.0
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivePowerUp> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
