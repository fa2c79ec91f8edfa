//! Small reference games that exercise the engine.
//!
//! - `TicTacToeGame`: perfect information, deterministic; the base of the
//!   phantom transform.
//! - `KuhnPokerGame`: chance deals and hidden cards; shared information sets.
//! - `CoinGame`: one chance node, two decisions, four leaves.
//! - `MatrixGame`: one-shot simultaneous moves for any number of players.

pub mod tic_tac_toe;
pub mod kuhn_poker;
pub mod coin_game;
pub mod matrix;

pub use tic_tac_toe::{TicTacToeGame, TicTacToeState};
pub use kuhn_poker::{KuhnPokerGame, KuhnPokerState};
pub use coin_game::{CoinGame, CoinState};
pub use matrix::{MatrixGame, MatrixState};
