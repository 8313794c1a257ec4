use std::path::PathBuf;

use thiserror::Error;

use crate::states::StateId;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Asking for a state nobody registered is a programming error.
    #[error("no factory registered for game state '{0}'")]
    UnregisteredState(StateId),
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;
