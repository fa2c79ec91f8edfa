//! Game transforms: wrappers that turn one game into another.
//!
//! - `turn_based`: simultaneous nodes become sequences of single-player
//!   choices, hiding earlier choices from later movers.
//! - `phantom`: a perfect-information cell game where opponent pieces are
//!   hidden and illegal moves are rejected with a retry.

pub mod phantom;
pub mod turn_based;

pub use phantom::{
    Attempt, CellState, CellView, MoveOutcome, ObservationType, PhantomConfig, PhantomGame,
    PhantomState,
};
pub use turn_based::{TurnBasedGame, TurnBasedState};
