//! # rust-efg
//!
//! A generic extensive-form game abstraction and tree exporter.
//!
//! ## Design Principles
//!
//! 1. **One Contract**: Sequential, simultaneous, chance and transformed
//!    games all implement `State`/`Game`, so traversal code never needs to
//!    know which one it is walking.
//!
//! 2. **Value Semantics**: Cloning a state yields an independent value.
//!    Histories are persistent `im::Vector`s, so clones are cheap.
//!
//! 3. **Transforms Wrap, They Don't Inherit**: The turn-based and phantom
//!    transforms own their base state and derive their own `GameType`.
//!
//! ## Modules
//!
//! - `core`: Players, actions, game descriptors, parameters, errors, RNG and
//!   the `State`/`Game` traits
//! - `joint`: `ActionView` and the flat joint-action encoding
//! - `games`: Small reference games (tic-tac-toe, Kuhn poker, coin game,
//!   matrix games)
//! - `transforms`: Turn-based simultaneous and phantom wrappers
//! - `efg`: EFG writer, parser and the re-loaded `EfgGame`
//! - `sim`: Seeded random playouts with contract checks

pub mod core;
pub mod joint;
pub mod games;
pub mod transforms;
pub mod efg;
pub mod sim;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, Actor, ChanceMode, Dynamics, Game, GameError, GameParameter,
    GameParameters, GameRng, GameType, Information, PlayerId, PlayerMap, Result, State, Utility,
};

pub use crate::joint::{ActionView, JointAction};

pub use crate::transforms::{
    CellState, MoveOutcome, ObservationType, PhantomConfig, PhantomGame, PhantomState,
    TurnBasedGame, TurnBasedState,
};

pub use crate::efg::{EfgGame, EfgTree, EfgWriter, ExportConfig, ExportStats};

pub use crate::sim::{random_playout, random_playouts, Playout, PlayoutConfig};
