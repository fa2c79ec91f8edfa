//! Extensive-form export and import.
//!
//! [`EfgWriter`] walks a game's full tree and writes it in Gambit's EFG
//! format (version 2, real numbers). Decision nodes whose player has the
//! same information state share an information set, numbered per player
//! from 1 in order of first visit:
//!
//! ```text
//! EFG 2 R "kuhn_poker" { "Player 1" "Player 2" }
//! ""
//! c "" 1 "" { "J" 0.3333333333333333 "Q" 0.3333333333333333 "K" 0.3333333333333333 } 0
//! c "" 2 "" { "Q" 0.5 "K" 0.5 } 0
//! p "" 1 1 "J" { "Pass" "Bet" } 0
//! p "" 2 1 "Qp" { "Pass" "Bet" } 0
//! t "" 1 "" { -1 1 }
//! ...
//! ```
//!
//! Numbers use the shortest decimal that reads back as the same `f64`.
//! [`EfgTree`] parses the format back, and [`EfgGame`] plays it as a
//! sequential game.

pub mod game;
pub mod tree;
pub mod writer;

pub use game::{EfgGame, EfgState};
pub use tree::{EfgNode, EfgTree, NodeKind};
pub use writer::{escape, EfgWriter, ExportConfig, ExportStats};
