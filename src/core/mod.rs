//! Core engine types: players, actions, game descriptors, parameters,
//! errors, RNG and the `State`/`Game` contract.
//!
//! Everything else in the crate (games, transforms, the EFG exporter) is
//! written against these types only.

pub mod player;
pub mod action;
pub mod game_type;
pub mod params;
pub mod error;
pub mod rng;
pub mod state;

pub use player::{Actor, PlayerId, PlayerMap};
pub use action::{Action, ActionRecord};
pub use game_type::{ChanceMode, Dynamics, GameType, Information, Utility};
pub use params::{GameParameter, GameParameters};
pub use error::{GameError, Result};
pub use rng::GameRng;
pub use state::{Game, State};
