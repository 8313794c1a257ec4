//! Reef Rush: an eat-or-be-eaten arcade fish game.
//!
//! The library holds the gameplay core (entities, fish AI, collisions,
//! frenzy and power-up timers, schooling, spawning) plus the state stack and
//! high-score table. The `reef_rush` binary is a terminal front-end on top.

pub mod bonus;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod fish;
pub mod frenzy;
pub mod highscore;
pub mod player;
pub mod powerup;
pub mod schooling;
pub mod spawner;
pub mod special;
pub mod states;

pub use error::{GameError, Result};
