//! Uniform random playouts with contract checks.

use serde::{Deserialize, Serialize};

use crate::core::{Action, ActionRecord, Actor, Game, GameRng, PlayerId, Result, State};

/// Playout settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoutConfig {
    /// Seed for the batch RNG. Default: 42.
    pub seed: u64,

    /// After every step, check that undoing it on a copy restores the
    /// previous state. Default: true.
    pub check_undo: bool,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            check_undo: true,
        }
    }
}

impl PlayoutConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_check_undo(mut self, check_undo: bool) -> Self {
        self.check_undo = check_undo;
        self
    }
}

/// The result of one playout.
#[derive(Clone, Debug, PartialEq)]
pub struct Playout {
    pub history: Vec<ActionRecord>,
    pub returns: Vec<f64>,
}

/// Play `game` from its initial state to a terminal state.
///
/// Players pick uniformly among legal actions (flat joint actions at
/// simultaneous nodes); chance outcomes are sampled by probability.
///
/// # Panics
///
/// Panics when the game breaks the state contract: no legal actions at a
/// non-terminal state, chance probabilities not summing to one, tensors of
/// the wrong length, returns outside the utility bounds or a playout longer
/// than `max_game_length`.
pub fn random_playout<G: Game>(game: &G, rng: &mut GameRng, config: &PlayoutConfig) -> Result<Playout> {
    let mut state = game.new_initial_state();
    let mut steps = 0;

    while !state.is_terminal() {
        check_state(game, &state);
        assert!(
            steps < game.max_game_length(),
            "Playout exceeded max_game_length {}",
            game.max_game_length()
        );

        let actor = state.current_player();
        let action = if actor.is_chance() {
            let outcomes = state.chance_outcomes();
            let total: f64 = outcomes.iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-9, "Chance probabilities sum to {}", total);
            rng.sample_outcome(&outcomes)
        } else {
            rng.choose(&state.legal_actions()).copied()
        };
        let action = match action {
            Some(action) => action,
            None => panic!("No legal actions at non-terminal state:\n{}", state),
        };

        let before = state.clone();
        state.apply_action(action);
        if config.check_undo {
            check_undo_round_trip(game, &before, &state, actor, action)?;
        }
        steps += 1;
    }

    let returns = state.returns();
    check_returns(game, &returns);
    log::trace!("Playout finished after {} steps: {:?}", steps, returns);

    Ok(Playout {
        history: state.history(),
        returns,
    })
}

/// Run `count` playouts, each with its own forked RNG.
pub fn random_playouts<G: Game>(game: &G, count: usize, config: &PlayoutConfig) -> Result<Vec<Playout>> {
    let mut rng = GameRng::new(config.seed);
    (0..count)
        .map(|_| random_playout(game, &mut rng.fork(), config))
        .collect()
}

fn check_state<G: Game>(game: &G, state: &G::State) {
    if !state.is_chance_node() {
        assert!(!state.legal_actions().is_empty(), "No legal actions at:\n{}", state);
    }

    let info_len: usize = game.information_state_tensor_shape().iter().product();
    let obs_len: usize = game.observation_tensor_shape().iter().product();
    for player in PlayerId::all(game.num_players()) {
        assert_eq!(state.information_state_tensor(player).len(), info_len);
        assert_eq!(state.observation_tensor(player).len(), obs_len);
    }
}

fn check_undo_round_trip<G: Game>(
    game: &G,
    before: &G::State,
    after: &G::State,
    actor: Actor,
    action: Action,
) -> Result<()> {
    let mut undone = after.clone();
    undone.undo_action(actor, action)?;

    assert_eq!(undone.history(), before.history(), "Undo changed the history");
    assert_eq!(undone.current_player(), before.current_player());
    for player in PlayerId::all(game.num_players()) {
        assert_eq!(
            undone.information_state(player),
            before.information_state(player),
            "Undo changed the information state of {}",
            player
        );
    }
    Ok(())
}

fn check_returns<G: Game>(game: &G, returns: &[f64]) {
    const TOLERANCE: f64 = 1e-9;

    assert_eq!(returns.len(), game.num_players());
    for &r in returns {
        assert!(
            r >= game.min_utility() - TOLERANCE && r <= game.max_utility() + TOLERANCE,
            "Return {} outside [{}, {}]",
            r,
            game.min_utility(),
            game.max_utility()
        );
    }
    if let Some(sum) = game.utility_sum() {
        let total: f64 = returns.iter().sum();
        assert!((total - sum).abs() < TOLERANCE, "Returns sum to {}, expected {}", total, sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{CoinGame, KuhnPokerGame, MatrixGame, TicTacToeGame};
    use crate::transforms::{PhantomConfig, PhantomGame, TurnBasedGame};

    #[test]
    fn test_playouts_on_builtin_games() {
        let config = PlayoutConfig::default();
        assert_eq!(random_playouts(&TicTacToeGame::new(), 20, &config).unwrap().len(), 20);
        assert_eq!(random_playouts(&KuhnPokerGame::new(), 20, &config).unwrap().len(), 20);
        assert_eq!(random_playouts(&CoinGame::new(), 5, &config).unwrap().len(), 5);
        assert_eq!(random_playouts(&MatrixGame::indexed(vec![2, 3]), 5, &config).unwrap().len(), 5);
    }

    #[test]
    fn test_playouts_on_transforms() {
        let config = PlayoutConfig::default().with_seed(7);
        let phantom = PhantomGame::new(TicTacToeGame::new(), PhantomConfig::default()).unwrap();
        let turn_based = TurnBasedGame::new(MatrixGame::indexed(vec![2, 3, 2]));

        for playout in random_playouts(&phantom, 20, &config).unwrap() {
            assert!(playout.history.len() >= 5);
        }
        for playout in random_playouts(&turn_based, 10, &config).unwrap() {
            assert_eq!(playout.history.len(), 3);
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = PlayoutConfig::default().with_seed(3);
        let first = random_playouts(&KuhnPokerGame::new(), 10, &config).unwrap();
        let second = random_playouts(&KuhnPokerGame::new(), 10, &config).unwrap();
        assert_eq!(first, second);
    }
}
