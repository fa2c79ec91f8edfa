//! Error type shared by game construction, undo, export and parsing.
//!
//! Rejected moves in a phantom game are *not* errors: they are a normal
//! transition outcome (see `transforms::phantom::MoveOutcome`).

use std::io;

use super::action::Action;
use super::player::{Actor, PlayerId};

/// Errors raised by the engine.
#[derive(Debug)]
pub enum GameError {
    /// IO error while reading or writing a file.
    Io(io::Error),
    /// A parameter key the game does not recognise.
    UnknownParameter { game: String, key: String },
    /// A required parameter without a default was not supplied.
    MissingParameter { game: String, key: String },
    /// A parameter had the wrong type or an unsupported value.
    InvalidParameter { key: String, message: String },
    /// Malformed EFG text.
    Parse { line: usize, message: String },
    /// Chance probabilities at one node do not sum to one.
    InvalidChanceDistribution { history: String, sum: f64 },
    /// A chance outcome with a probability outside `[0, 1]`.
    InvalidProbability { history: String, probability: f64 },
    /// One information-set key produced two different action lists.
    InfosetConflict { player: PlayerId, info_state: String },
    /// Undo of something other than the most recent action.
    InvalidUndo { actor: Actor, action: Action, message: String },
    /// A simultaneous node reached the EFG writer.
    SimultaneousNode { history: String },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GameError>;

impl From<io::Error> for GameError {
    fn from(err: io::Error) -> Self {
        GameError::Io(err)
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::Io(e) => write!(f, "IO error: {}", e),
            GameError::UnknownParameter { game, key } => {
                write!(f, "Unknown parameter '{}' for game '{}'", key, game)
            }
            GameError::MissingParameter { game, key } => {
                write!(f, "Missing required parameter '{}' for game '{}'", key, game)
            }
            GameError::InvalidParameter { key, message } => {
                write!(f, "Invalid parameter '{}': {}", key, message)
            }
            GameError::Parse { line, message } => {
                write!(f, "EFG parse error at line {}: {}", line, message)
            }
            GameError::InvalidChanceDistribution { history, sum } => write!(
                f,
                "Chance probabilities sum to {} instead of 1 at history [{}]",
                sum, history
            ),
            GameError::InvalidProbability { history, probability } => write!(
                f,
                "Chance outcome with probability {} at history [{}]",
                probability, history
            ),
            GameError::InfosetConflict { player, info_state } => write!(
                f,
                "Information state for {} maps to nodes with different actions: {:?}",
                player, info_state
            ),
            GameError::InvalidUndo { actor, action, message } => {
                write!(f, "Cannot undo action {} by {}: {}", action, actor, message)
            }
            GameError::SimultaneousNode { history } => write!(
                f,
                "Simultaneous node at history [{}]; wrap the game in TurnBasedGame to export it",
                history
            ),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion() {
        let err: GameError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, GameError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_display_messages() {
        let err = GameError::UnknownParameter {
            game: "phantom".to_string(),
            key: "colour".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown parameter 'colour' for game 'phantom'");

        let err = GameError::Parse {
            line: 3,
            message: "expected '{'".to_string(),
        };
        assert_eq!(err.to_string(), "EFG parse error at line 3: expected '{'");
    }
}
