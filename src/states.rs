//! Game-state stack with deferred transitions.
//!
//! Push/pop/clear requests made while the stack is being walked are queued
//! and applied together at one fixed point in the frame. States are built
//! from registered factories keyed by `StateId`; asking for an id nobody
//! registered is a configuration error.
use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::debug;

use crate::error::{GameError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateId {
    MainMenu,
    StageIntro,
    Playing,
    Paused,
    GameOver,
    HighScores,
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateId::MainMenu => "main menu",
            StateId::StageIntro => "stage intro",
            StateId::Playing => "playing",
            StateId::Paused => "paused",
            StateId::GameOver => "game over",
            StateId::HighScores => "high scores",
        };
        f.write_str(name)
    }
}

/// A queued transition. `P` is the payload handed to the new state's factory.
#[derive(Clone, Debug, PartialEq)]
pub enum StateAction<P> {
    Push(StateId, P),
    Pop,
    Clear,
}

pub type StateFactory<S, P> = fn(&P) -> S;

pub struct StateRegistry<S, P> {
    factories: HashMap<StateId, StateFactory<S, P>>,
}

impl<S, P> Default for StateRegistry<S, P> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<S, P> StateRegistry<S, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: StateId, factory: StateFactory<S, P>) {
        self.factories.insert(id, factory);
    }

    pub fn is_registered(&self, id: StateId) -> bool {
        self.factories.contains_key(&id)
    }

    pub fn create(&self, id: StateId, payload: &P) -> Result<S> {
        self.factories
            .get(&id)
            .map(|factory| factory(payload))
            .ok_or(GameError::UnregisteredState(id))
    }
}

pub struct StateStack<S, P> {
    stack: Vec<(StateId, S)>,
    pending: VecDeque<StateAction<P>>,
}

impl<S, P> Default for StateStack<S, P> {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            pending: VecDeque::new(),
        }
    }
}

impl<S, P> StateStack<S, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_push(&mut self, id: StateId, payload: P) {
        self.pending.push_back(StateAction::Push(id, payload));
    }

    pub fn request_pop(&mut self) {
        self.pending.push_back(StateAction::Pop);
    }

    pub fn request_clear(&mut self) {
        self.pending.push_back(StateAction::Clear);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Applies every queued action in order. Unknown ids are rejected before
    /// anything changes, so a failed call leaves the stack untouched.
    /// Returns the number of actions applied.
    pub fn apply_pending(&mut self, registry: &StateRegistry<S, P>) -> Result<usize> {
        for action in &self.pending {
            if let StateAction::Push(id, _) = action {
                if !registry.is_registered(*id) {
                    return Err(GameError::UnregisteredState(*id));
                }
            }
        }

        let mut applied = 0;
        while let Some(action) = self.pending.pop_front() {
            match action {
                StateAction::Push(id, payload) => {
                    let state = registry.create(id, &payload)?;
                    debug!(%id, "push state");
                    self.stack.push((id, state));
                }
                StateAction::Pop => {
                    if let Some((id, _)) = self.stack.pop() {
                        debug!(%id, "pop state");
                    }
                }
                StateAction::Clear => {
                    debug!(depth = self.stack.len(), "clear states");
                    self.stack.clear();
                }
            }
            applied += 1;
        }
        Ok(applied)
    }

    pub fn current(&self) -> Option<&S> {
        self.stack.last().map(|(_, s)| s)
    }

    pub fn current_mut(&mut self) -> Option<&mut S> {
        self.stack.last_mut().map(|(_, s)| s)
    }

    pub fn current_id(&self) -> Option<StateId> {
        self.stack.last().map(|(id, _)| *id)
    }

    /// Bottom to top.
    pub fn states(&self) -> impl DoubleEndedIterator<Item = (StateId, &S)> {
        self.stack.iter().map(|(id, s)| (*id, s))
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
