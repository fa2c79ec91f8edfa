//! The state-machine contract every game variant satisfies.
//!
//! ## State
//!
//! A node of the transition system: who moves, what is legal, how actions
//! change it and how to take them back, what each player knows. `Clone` is
//! the only way to branch: a clone is an independent value, and mutations to
//! it never reach the original.
//!
//! ## Game
//!
//! The static side: the `GameType` descriptor, the initial state, and bounds
//! that are constant for one game instance.
//!
//! Sequential, simultaneous, chance-augmented and transformed games all
//! implement the same pair of traits, so traversal and export code is
//! variant-agnostic.

use super::action::{Action, ActionRecord};
use super::error::Result;
use super::game_type::{GameType, Utility};
use super::player::{Actor, PlayerId};

/// A single game state.
///
/// ## Implementation Notes
///
/// - `legal_actions`: non-empty for every non-terminal state. At
///   simultaneous nodes it returns the flattened joint actions (player 0
///   varying fastest, see [`crate::joint`]).
/// - `apply_action`: deterministic. Applying an illegal action is a
///   contract violation and panics, except where a transform defines retry
///   semantics.
/// - `undo_action`: only the most recent action can be undone.
/// - `information_state`: two histories the player cannot tell apart must
///   produce identical strings, distinguishable histories must differ.
pub trait State: Clone + std::fmt::Display {
    /// Who moves next.
    fn current_player(&self) -> Actor;

    fn num_players(&self) -> usize;

    /// Legal actions for the current actor, in a fixed order.
    fn legal_actions(&self) -> Vec<Action>;

    /// Legal actions of one player.
    ///
    /// Default: the current legal actions if `player` is to move, else none.
    /// Simultaneous games override this to expose every player's list.
    fn legal_actions_for(&self, player: PlayerId) -> Vec<Action> {
        match self.current_player() {
            Actor::Player(p) if p == player => self.legal_actions(),
            _ => Vec::new(),
        }
    }

    /// Outcomes and their probabilities at a chance node.
    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        Vec::new()
    }

    /// Apply an action for the current actor.
    fn apply_action(&mut self, action: Action);

    /// Revert the most recent action, which `actor` took.
    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()>;

    /// Every action applied since the initial state.
    fn history(&self) -> Vec<ActionRecord>;

    fn is_terminal(&self) -> bool {
        self.current_player().is_terminal()
    }

    fn is_chance_node(&self) -> bool {
        self.current_player().is_chance()
    }

    fn is_simultaneous_node(&self) -> bool {
        self.current_player().is_simultaneous()
    }

    /// Per-player returns. Meaningful only at terminal states; zero before.
    fn returns(&self) -> Vec<f64>;

    /// History-consistent description of what `player` knows.
    fn information_state(&self, player: PlayerId) -> String;

    /// Fixed-length numeric encoding of `information_state`.
    fn information_state_tensor(&self, player: PlayerId) -> Vec<f64>;

    /// What `player` currently observes.
    fn observation(&self, player: PlayerId) -> String;

    /// Fixed-length numeric encoding of `observation`.
    fn observation_tensor(&self, player: PlayerId) -> Vec<f64>;

    /// Human-readable label of an action.
    fn action_to_string(&self, actor: Actor, action: Action) -> String;

    /// Clone and apply in one step.
    #[must_use]
    fn child(&self, action: Action) -> Self {
        let mut next = self.clone();
        next.apply_action(action);
        next
    }

    /// Space-separated action ids of the history.
    fn history_string(&self) -> String {
        self.history()
            .iter()
            .map(|r| r.action.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A game: descriptor, initial state and static bounds.
pub trait Game {
    /// The states of this game.
    type State: State;

    fn game_type(&self) -> &GameType;

    fn new_initial_state(&self) -> Self::State;

    /// Number of distinct player action ids: every id is in `0..n`.
    fn num_distinct_actions(&self) -> usize;

    /// Largest number of outcomes at any chance node.
    fn max_chance_outcomes(&self) -> usize {
        0
    }

    fn num_players(&self) -> usize;

    fn min_utility(&self) -> f64;

    fn max_utility(&self) -> f64;

    /// The constant sum of returns, for zero-sum and constant-sum games.
    fn utility_sum(&self) -> Option<f64> {
        match self.game_type().utility {
            Utility::ZeroSum => Some(0.0),
            _ => None,
        }
    }

    fn information_state_tensor_shape(&self) -> Vec<usize>;

    fn observation_tensor_shape(&self) -> Vec<usize>;

    /// Upper bound on the number of actions in any history.
    fn max_game_length(&self) -> usize;
}

/// Check that `action` is the last entry of `history` and was taken by `actor`.
///
/// Shared by the undo implementations of the built-in games.
pub(crate) fn check_undo(history: Option<&ActionRecord>, actor: Actor, action: Action) -> Result<()> {
    use super::error::GameError;

    match history {
        None => Err(GameError::InvalidUndo {
            actor,
            action,
            message: "already at the initial state".to_string(),
        }),
        Some(last) if last.actor != actor || last.action != action => Err(GameError::InvalidUndo {
            actor,
            action,
            message: format!("most recent action was {} by {}", last.action, last.actor),
        }),
        Some(_) => Ok(()),
    }
}
