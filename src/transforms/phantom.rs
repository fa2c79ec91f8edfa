//! Phantom games: a perfect-information board game where players do not see
//! the opponent's pieces.
//!
//! Only a referee knows the true board. A submitted move that is illegal on
//! the true board is rejected: the board does not change, the mover learns
//! that the cell belongs to the opponent, and the mover keeps the turn until
//! a move is placed.
//!
//! Parameters:
//! - `"obstype"`: `"reveal-nothing"` (default) or `"reveal-numturns"`.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{
    Action, ActionRecord, Actor, Dynamics, Game, GameError, GameParameters, GameType,
    Information, PlayerId, PlayerMap, Result, State,
};

/// A base state whose actions are claims on board cells.
///
/// Action `a` claims cell `a.index()`; a claim is legal exactly when the
/// cell is free.
pub trait CellState: State {
    fn num_cells(&self) -> usize;

    /// The player holding `cell`, if any.
    fn cell_owner(&self, cell: usize) -> Option<PlayerId>;
}

/// How much a player learns about the other player's moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    /// Nothing beyond the player's own attempts and their outcomes.
    #[default]
    RevealNothing,
    /// Also how many attempts the opponent made, and when.
    RevealNumTurns,
}

impl ObservationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ObservationType::RevealNothing => "reveal-nothing",
            ObservationType::RevealNumTurns => "reveal-numturns",
        }
    }
}

impl std::str::FromStr for ObservationType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reveal-nothing" => Ok(ObservationType::RevealNothing),
            "reveal-numturns" => Ok(ObservationType::RevealNumTurns),
            other => Err(GameError::InvalidParameter {
                key: "obstype".to_string(),
                message: format!("unknown observation type '{}'", other),
            }),
        }
    }
}

impl std::fmt::Display for ObservationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phantom configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhantomConfig {
    /// Defaults to `RevealNothing`.
    pub obs_type: ObservationType,
}

impl PhantomConfig {
    /// Read `obstype` from a parameter bag, rejecting any other key.
    pub fn from_parameters(params: &GameParameters) -> Result<Self> {
        params.check_known("phantom", &["obstype"])?;
        let obs_type = params
            .string_or("obstype", ObservationType::default().as_str())?
            .parse()?;
        Ok(Self { obs_type })
    }

    #[must_use]
    pub fn with_obs_type(mut self, obs_type: ObservationType) -> Self {
        self.obs_type = obs_type;
        self
    }
}

/// What a player knows about one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellView {
    /// Never attempted: free or held by the opponent.
    Unknown,
    Mine,
    Opponent,
}

impl CellView {
    fn symbol(self) -> char {
        match self {
            CellView::Unknown => '.',
            CellView::Mine => 'm',
            CellView::Opponent => 'o',
        }
    }

    fn plane(self) -> usize {
        match self {
            CellView::Unknown => 0,
            CellView::Mine => 1,
            CellView::Opponent => 2,
        }
    }
}

/// Result of one submitted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// Legal on the true board: applied, turn passes on.
    Placed,
    /// Cell already taken: nothing changes on the board, same player again.
    Rejected,
}

/// One entry of the attempt sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Attempt {
    pub player: PlayerId,
    pub action: Action,
    pub outcome: MoveOutcome,
}

/// The phantom version of a two-player cell game.
#[derive(Clone, Debug)]
pub struct PhantomGame<G> {
    base: G,
    config: PhantomConfig,
    game_type: GameType,
    num_cells: usize,
}

impl<G> PhantomGame<G>
where
    G: Game,
    G::State: CellState,
{
    /// Wrap a two-player, sequential, deterministic, perfect-information game.
    pub fn new(base: G, config: PhantomConfig) -> Result<Self> {
        let base_type = base.game_type();
        if base.num_players() != 2
            || base_type.dynamics != Dynamics::Sequential
            || base_type.information != Information::Perfect
            || base.max_chance_outcomes() != 0
        {
            return Err(GameError::InvalidParameter {
                key: "game".to_string(),
                message: format!(
                    "'{}' is not a two-player sequential deterministic perfect-information game",
                    base_type.short_name
                ),
            });
        }

        let game_type = GameType {
            short_name: format!("phantom_{}", base_type.short_name),
            long_name: format!("Phantom {}", base_type.long_name),
            ..base_type.clone()
        }
        .with_information(Information::Imperfect);
        let num_cells = base.new_initial_state().num_cells();

        Ok(Self {
            base,
            config,
            game_type,
            num_cells,
        })
    }

    /// Wrap `base` with settings from a parameter bag.
    pub fn from_parameters(base: G, params: &GameParameters) -> Result<Self> {
        Self::new(base, PhantomConfig::from_parameters(params)?)
    }

    #[must_use]
    pub fn config(&self) -> &PhantomConfig {
        &self.config
    }

    /// Longest attempt sequence: every cell placed, plus one rejection per
    /// cell the second mover can run into.
    fn longest_sequence(&self) -> usize {
        2 * self.num_cells - 1
    }

    fn bits_per_attempt(&self) -> usize {
        2 + self.num_cells + 1
    }
}

impl<G> Game for PhantomGame<G>
where
    G: Game,
    G::State: CellState,
{
    type State = PhantomState<G::State>;

    fn game_type(&self) -> &GameType {
        &self.game_type
    }

    fn new_initial_state(&self) -> Self::State {
        PhantomState::new(self.base.new_initial_state(), self.config.obs_type)
    }

    fn num_distinct_actions(&self) -> usize {
        self.base.num_distinct_actions()
    }

    fn num_players(&self) -> usize {
        2
    }

    fn min_utility(&self) -> f64 {
        self.base.min_utility()
    }

    fn max_utility(&self) -> f64 {
        self.base.max_utility()
    }

    fn utility_sum(&self) -> Option<f64> {
        self.base.utility_sum()
    }

    /// View planes per cell, then one slot per attempt: player one-hot and
    /// cell one-hot with a final "hidden" entry.
    fn information_state_tensor_shape(&self) -> Vec<usize> {
        vec![3 * self.num_cells + self.longest_sequence() * self.bits_per_attempt()]
    }

    fn observation_tensor_shape(&self) -> Vec<usize> {
        vec![3 * self.num_cells]
    }

    fn max_game_length(&self) -> usize {
        self.longest_sequence()
    }
}

/// A phantom game state: the true board plus each player's private view.
#[derive(Clone, Debug)]
pub struct PhantomState<S> {
    base: S,
    obs_type: ObservationType,
    views: PlayerMap<Vec<CellView>>,
    sequence: Vector<Attempt>,
}

impl<S: CellState> PhantomState<S> {
    pub fn new(base: S, obs_type: ObservationType) -> Self {
        let views = PlayerMap::with_value(2, vec![CellView::Unknown; base.num_cells()]);
        Self {
            base,
            obs_type,
            views,
            sequence: Vector::new(),
        }
    }

    /// The true board, as the referee sees it.
    #[must_use]
    pub fn base(&self) -> &S {
        &self.base
    }

    #[must_use]
    pub fn view(&self, player: PlayerId) -> &[CellView] {
        &self.views[player]
    }

    /// Every attempt so far, rejected ones included.
    pub fn attempts(&self) -> impl Iterator<Item = &Attempt> {
        self.sequence.iter()
    }

    /// Number of placed moves.
    #[must_use]
    pub fn num_turns(&self) -> usize {
        self.sequence
            .iter()
            .filter(|a| a.outcome == MoveOutcome::Placed)
            .count()
    }

    /// Submit a move for the current player.
    ///
    /// This is the whole transition function: a legal move is applied to the
    /// true board and the turn passes; an illegal one only teaches the mover
    /// that the cell is taken, and the same player must submit again.
    ///
    /// # Panics
    ///
    /// Panics if no player is to move, the mover already knows `action`'s
    /// cell, or the base game refuses a move on a free cell.
    pub fn attempt(&mut self, action: Action) -> MoveOutcome {
        let player = match self.base.current_player() {
            Actor::Player(p) => p,
            other => panic!("Cannot submit {} when {} is to move", action, other),
        };
        let cell = action.index();
        assert!(
            self.views[player].get(cell) == Some(&CellView::Unknown),
            "{} already knows cell {}",
            player,
            cell
        );

        // The referee answers from the true board.
        let outcome = match self.base.cell_owner(cell) {
            None => {
                assert!(
                    self.base.legal_actions().contains(&action),
                    "Cell {} is free but {} is not a legal move",
                    cell,
                    action
                );
                self.base.apply_action(action);
                self.views[player][cell] = CellView::Mine;
                MoveOutcome::Placed
            }
            Some(owner) => {
                self.views[player][cell] = if owner == player {
                    CellView::Mine
                } else {
                    CellView::Opponent
                };
                log::trace!("{} rejected on cell {} held by {}, retry", player, cell, owner);
                MoveOutcome::Rejected
            }
        };

        self.sequence.push_back(Attempt {
            player,
            action,
            outcome,
        });
        outcome
    }

    fn view_string(&self, player: PlayerId) -> String {
        self.views[player].iter().map(|v| v.symbol()).collect()
    }

    fn sequence_string(&self, player: PlayerId) -> String {
        let mut out = String::new();
        for attempt in &self.sequence {
            if attempt.player == player {
                out.push_str(&format!("{},{} ", attempt.player.0, attempt.action));
            } else if self.obs_type == ObservationType::RevealNumTurns {
                out.push_str(&format!("{},? ", attempt.player.0));
            }
        }
        out
    }

    fn view_tensor(&self, player: PlayerId, values: &mut Vec<f64>) {
        let num_cells = self.base.num_cells();
        let start = values.len();
        values.resize(start + 3 * num_cells, 0.0);
        for (cell, view) in self.views[player].iter().enumerate() {
            values[start + view.plane() * num_cells + cell] = 1.0;
        }
    }
}

impl<S: CellState> State for PhantomState<S> {
    fn current_player(&self) -> Actor {
        self.base.current_player()
    }

    fn num_players(&self) -> usize {
        2
    }

    /// Cells the mover has not tried yet.
    fn legal_actions(&self) -> Vec<Action> {
        match self.current_player() {
            Actor::Player(p) => self.views[p]
                .iter()
                .enumerate()
                .filter(|(_, v)| **v == CellView::Unknown)
                .map(|(cell, _)| Action::from(cell))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn apply_action(&mut self, action: Action) {
        self.attempt(action);
    }

    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()> {
        let last = match self.sequence.last() {
            Some(last) => *last,
            None => {
                return Err(GameError::InvalidUndo {
                    actor,
                    action,
                    message: "already at the initial state".to_string(),
                })
            }
        };
        if actor != Actor::Player(last.player) || action != last.action {
            return Err(GameError::InvalidUndo {
                actor,
                action,
                message: format!("most recent attempt was {} by {}", last.action, last.player),
            });
        }

        if last.outcome == MoveOutcome::Placed {
            self.base.undo_action(actor, action)?;
        }
        self.views[last.player][action.index()] = CellView::Unknown;
        self.sequence.pop_back();
        Ok(())
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.sequence
            .iter()
            .map(|a| ActionRecord::new(Actor::Player(a.player), a.action))
            .collect()
    }

    fn returns(&self) -> Vec<f64> {
        self.base.returns()
    }

    fn information_state(&self, player: PlayerId) -> String {
        format!("{}\n{}", self.view_string(player), self.sequence_string(player))
    }

    fn information_state_tensor(&self, player: PlayerId) -> Vec<f64> {
        let num_cells = self.base.num_cells();
        let slots = 2 * num_cells - 1;
        let bits = 2 + num_cells + 1;

        let mut values = Vec::with_capacity(3 * num_cells + slots * bits);
        self.view_tensor(player, &mut values);

        let start = values.len();
        values.resize(start + slots * bits, 0.0);
        let visible = self.sequence.iter().filter(|a| {
            a.player == player || self.obs_type == ObservationType::RevealNumTurns
        });
        for (slot, attempt) in visible.enumerate().take(slots) {
            let offset = start + slot * bits;
            values[offset + attempt.player.index()] = 1.0;
            let cell = if attempt.player == player {
                attempt.action.index()
            } else {
                num_cells
            };
            values[offset + 2 + cell] = 1.0;
        }
        values
    }

    fn observation(&self, player: PlayerId) -> String {
        self.view_string(player)
    }

    fn observation_tensor(&self, player: PlayerId) -> Vec<f64> {
        let mut values = Vec::with_capacity(3 * self.base.num_cells());
        self.view_tensor(player, &mut values);
        values
    }

    fn action_to_string(&self, actor: Actor, action: Action) -> String {
        self.base.action_to_string(actor, action)
    }
}

impl<S: CellState> std::fmt::Display for PhantomState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::TicTacToeGame;

    fn phantom(obs_type: ObservationType) -> PhantomGame<TicTacToeGame> {
        PhantomGame::new(TicTacToeGame::new(), PhantomConfig::default().with_obs_type(obs_type))
            .unwrap()
    }

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    #[test]
    fn test_game_type() {
        let game = phantom(ObservationType::RevealNothing);

        assert_eq!(game.game_type().short_name, "phantom_tic_tac_toe");
        assert_eq!(game.game_type().information, Information::Imperfect);
        assert_eq!(game.num_distinct_actions(), 9);
        assert_eq!(game.max_game_length(), 17);
    }

    #[test]
    fn test_rejected_move_keeps_turn() {
        let mut state = phantom(ObservationType::RevealNothing).new_initial_state();

        assert_eq!(state.attempt(Action(4)), MoveOutcome::Placed);
        assert_eq!(state.current_player(), Actor::Player(P1));

        let board_before = state.base().clone();
        assert_eq!(state.attempt(Action(4)), MoveOutcome::Rejected);

        assert_eq!(state.current_player(), Actor::Player(P1));
        assert_eq!(state.base(), &board_before);
        assert_eq!(state.view(P1)[4], CellView::Opponent);
        assert!(!state.legal_actions().contains(&Action(4)));
        assert_eq!(state.num_turns(), 1);

        assert_eq!(state.attempt(Action(0)), MoveOutcome::Placed);
        assert_eq!(state.current_player(), Actor::Player(P0));
        assert_eq!(state.num_turns(), 2);
    }

    #[test]
    fn test_reveal_nothing_information_state() {
        let mut state = phantom(ObservationType::RevealNothing).new_initial_state();
        state.apply_action(Action(4));
        state.apply_action(Action(4));
        state.apply_action(Action(0));

        assert_eq!(state.information_state(P0), "....m....\n0,4 ");
        assert_eq!(state.information_state(P1), "m...o....\n1,4 1,0 ");
    }

    #[test]
    fn test_reveal_numturns_information_state() {
        let mut state = phantom(ObservationType::RevealNumTurns).new_initial_state();
        state.apply_action(Action(4));
        state.apply_action(Action(4));
        state.apply_action(Action(0));

        assert_eq!(state.information_state(P0), "....m....\n0,4 1,? 1,? ");
    }

    #[test]
    fn test_opponent_moves_invisible_under_reveal_nothing() {
        let game = phantom(ObservationType::RevealNothing);
        let mut a = game.new_initial_state();
        let mut b = game.new_initial_state();

        a.apply_action(Action(0));
        a.apply_action(Action(1));
        b.apply_action(Action(0));
        b.apply_action(Action(2));

        assert_eq!(a.information_state(P0), b.information_state(P0));
        assert_ne!(a.information_state(P1), b.information_state(P1));
    }

    #[test]
    fn test_undo_rejected_then_placed() {
        let mut state = phantom(ObservationType::RevealNumTurns).new_initial_state();
        state.apply_action(Action(4));
        let after_first = state.clone();

        state.apply_action(Action(4));
        state.undo_action(Actor::Player(P1), Action(4)).unwrap();
        assert_eq!(state.view(P1), after_first.view(P1));
        assert_eq!(state.base(), after_first.base());
        assert_eq!(state.information_state(P0), after_first.information_state(P0));

        state.undo_action(Actor::Player(P0), Action(4)).unwrap();
        assert_eq!(state.view(P0)[4], CellView::Unknown);
        assert_eq!(state.base().history().len(), 0);
        assert!(state.undo_action(Actor::Player(P0), Action(4)).is_err());
    }

    #[test]
    fn test_undo_wrong_action() {
        let mut state = phantom(ObservationType::RevealNothing).new_initial_state();
        state.apply_action(Action(2));
        assert!(state.undo_action(Actor::Player(P0), Action(3)).is_err());
        assert!(state.undo_action(Actor::Player(P1), Action(2)).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = phantom(ObservationType::RevealNothing).new_initial_state();
        state.apply_action(Action(4));
        let copy = state.clone();

        state.apply_action(Action(4));
        assert_eq!(copy.view(P1)[4], CellView::Unknown);
        assert_eq!(copy.attempts().count(), 1);
        assert_eq!(state.attempts().count(), 2);
    }

    #[test]
    fn test_tensor_lengths() {
        for obs_type in [ObservationType::RevealNothing, ObservationType::RevealNumTurns] {
            let game = phantom(obs_type);
            let mut state = game.new_initial_state();
            state.apply_action(Action(4));
            state.apply_action(Action(4));

            let tensor = state.information_state_tensor(P1);
            assert_eq!(tensor.len(), game.information_state_tensor_shape()[0]);
            assert_eq!(
                state.observation_tensor(P1).len(),
                game.observation_tensor_shape()[0]
            );
        }
    }

    #[test]
    fn test_config_from_parameters() {
        let config = PhantomConfig::from_parameters(&GameParameters::new()).unwrap();
        assert_eq!(config.obs_type, ObservationType::RevealNothing);

        let params = GameParameters::new().with("obstype", "reveal-numturns");
        let config = PhantomConfig::from_parameters(&params).unwrap();
        assert_eq!(config.obs_type, ObservationType::RevealNumTurns);

        let params = GameParameters::new().with("obstype", "reveal-everything");
        assert!(PhantomConfig::from_parameters(&params).is_err());

        let params = GameParameters::new().with("board", "3x3");
        assert!(PhantomConfig::from_parameters(&params).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = PhantomConfig::default().with_obs_type(ObservationType::RevealNumTurns);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PhantomConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
