//! Turn-based view of a simultaneous-move game.
//!
//! At a simultaneous node the players choose one after another in index
//! order. Nobody sees the choices made before theirs: the information state
//! only tells a player that the node is being rolled out and which player is
//! choosing. Once the last player has chosen, the choices are flattened into
//! one joint action and applied to the wrapped state.
//!
//! Chance nodes, sequential nodes and terminal states pass through unchanged.

use im::Vector;

use crate::core::{
    Action, ActionRecord, Actor, Dynamics, Game, GameError, GameType, PlayerId, PlayerMap,
    Result, State,
};
use crate::joint::{flatten_joint_action, unflatten_joint_action, ActionView};

/// A sequential game equivalent to a simultaneous one.
#[derive(Clone, Debug)]
pub struct TurnBasedGame<G> {
    base: G,
    game_type: GameType,
}

impl<G: Game> TurnBasedGame<G> {
    pub fn new(base: G) -> Self {
        let base_type = base.game_type();
        let game_type = GameType {
            short_name: format!("turn_based_{}", base_type.short_name),
            long_name: format!("Turn-based {}", base_type.long_name),
            ..base_type.clone()
        }
        .with_dynamics(Dynamics::Sequential);

        Self { base, game_type }
    }

    #[must_use]
    pub fn base(&self) -> &G {
        &self.base
    }
}

impl<G: Game> Game for TurnBasedGame<G> {
    type State = TurnBasedState<G::State>;

    fn game_type(&self) -> &GameType {
        &self.game_type
    }

    fn new_initial_state(&self) -> Self::State {
        TurnBasedState::new(
            self.base.new_initial_state(),
            self.base.num_distinct_actions(),
        )
    }

    fn num_distinct_actions(&self) -> usize {
        self.base.num_distinct_actions()
    }

    fn max_chance_outcomes(&self) -> usize {
        self.base.max_chance_outcomes()
    }

    fn num_players(&self) -> usize {
        self.base.num_players()
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

    /// The base encoding, then a one-hot of the rollout player and a one-hot
    /// of the player's own pending choice.
    fn information_state_tensor_shape(&self) -> Vec<usize> {
        vec![self.extended_len(&self.base.information_state_tensor_shape())]
    }

    fn observation_tensor_shape(&self) -> Vec<usize> {
        vec![self.extended_len(&self.base.observation_tensor_shape())]
    }

    /// Every base move may expand into one move per player.
    fn max_game_length(&self) -> usize {
        self.base.max_game_length() * self.base.num_players()
    }
}

impl<G: Game> TurnBasedGame<G> {
    fn extended_len(&self, base_shape: &[usize]) -> usize {
        base_shape.iter().product::<usize>()
            + self.base.num_players()
            + self.base.num_distinct_actions()
    }
}

/// One applied action, with enough context to take it back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// Applied to the base as is.
    Passthrough(ActionRecord),
    /// A player's choice at a simultaneous node, not the last one.
    Choice(PlayerId, Action),
    /// The last player's choice, which completed `joint`.
    Joint {
        player: PlayerId,
        action: Action,
        joint: Action,
    },
}

impl Step {
    fn record(self) -> ActionRecord {
        match self {
            Step::Passthrough(record) => record,
            Step::Choice(player, action) | Step::Joint { player, action, .. } => {
                ActionRecord::new(Actor::Player(player), action)
            }
        }
    }
}

/// A state of the turn-based game.
#[derive(Clone, Debug)]
pub struct TurnBasedState<S> {
    base: S,
    num_distinct_actions: usize,
    /// The player choosing, while a simultaneous node is rolled out.
    rollout: Option<PlayerId>,
    pending: PlayerMap<Option<Action>>,
    steps: Vector<Step>,
}

impl<S: State> TurnBasedState<S> {
    /// Wrap `base`. `num_distinct_actions` sizes the pending-choice tensor.
    pub fn new(base: S, num_distinct_actions: usize) -> Self {
        let pending = PlayerMap::with_default(base.num_players());
        let mut state = Self {
            base,
            num_distinct_actions,
            rollout: None,
            pending,
            steps: Vector::new(),
        };
        state.enter_node();
        state
    }

    #[must_use]
    pub fn base(&self) -> &S {
        &self.base
    }

    /// The player choosing at the simultaneous node being rolled out.
    #[must_use]
    pub fn rollout_player(&self) -> Option<PlayerId> {
        self.rollout
    }

    fn enter_node(&mut self) {
        self.rollout = if self.base.is_simultaneous_node() {
            Some(PlayerId::new(0))
        } else {
            None
        };
    }

    fn legal_lists(&self) -> Vec<Vec<Action>> {
        ActionView::new(&self.base).legal_actions
    }

    fn choose(&mut self, player: PlayerId, action: Action) {
        assert!(
            self.base.legal_actions_for(player).contains(&action),
            "Illegal action {} for {}",
            action,
            player
        );
        self.pending[player] = Some(action);

        let next = player.index() + 1;
        if next < self.base.num_players() {
            self.rollout = Some(PlayerId::new(next as u8));
            self.steps.push_back(Step::Choice(player, action));
            return;
        }

        let choices: Vec<Action> = self.pending.values().filter_map(|a| *a).collect();
        let joint = flatten_joint_action(&self.legal_lists(), &choices);
        log::trace!("joint action {} complete", joint);

        self.base.apply_action(joint);
        self.pending = PlayerMap::with_default(self.base.num_players());
        self.steps.push_back(Step::Joint {
            player,
            action,
            joint,
        });
        self.enter_node();
    }

    fn extend_tensor(&self, player: PlayerId, mut values: Vec<f64>) -> Vec<f64> {
        let start = values.len();
        values.resize(start + self.base.num_players() + self.num_distinct_actions, 0.0);
        if let Some(rollout) = self.rollout {
            values[start + rollout.index()] = 1.0;
        }
        if let Some(own) = self.pending[player] {
            values[start + self.base.num_players() + own.index()] = 1.0;
        }
        values
    }

    fn extend_string(&self, player: PlayerId, base: String) -> String {
        match self.rollout {
            None => base,
            Some(rollout) => {
                let own = self.pending[player].map_or_else(|| "-".to_string(), |a| a.to_string());
                format!("{}\nRollout player: {}\nOwn choice: {}", base, rollout.0, own)
            }
        }
    }
}

impl<S: State> State for TurnBasedState<S> {
    fn current_player(&self) -> Actor {
        match self.rollout {
            Some(player) => Actor::Player(player),
            None => self.base.current_player(),
        }
    }

    fn num_players(&self) -> usize {
        self.base.num_players()
    }

    fn legal_actions(&self) -> Vec<Action> {
        match self.rollout {
            Some(player) => self.base.legal_actions_for(player),
            None => self.base.legal_actions(),
        }
    }

    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        if self.rollout.is_some() {
            Vec::new()
        } else {
            self.base.chance_outcomes()
        }
    }

    fn apply_action(&mut self, action: Action) {
        if let Some(player) = self.rollout {
            self.choose(player, action);
            return;
        }

        let actor = self.base.current_player();
        self.base.apply_action(action);
        self.steps.push_back(Step::Passthrough(ActionRecord::new(actor, action)));
        self.enter_node();
    }

    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()> {
        let last = match self.steps.last() {
            Some(step) => *step,
            None => {
                return Err(GameError::InvalidUndo {
                    actor,
                    action,
                    message: "already at the initial state".to_string(),
                })
            }
        };
        let record = last.record();
        if record.actor != actor || record.action != action {
            return Err(GameError::InvalidUndo {
                actor,
                action,
                message: format!("most recent action was {} by {}", record.action, record.actor),
            });
        }

        match last {
            Step::Passthrough(record) => {
                self.base.undo_action(record.actor, record.action)?;
                self.rollout = None;
            }
            Step::Choice(player, _) => {
                self.pending[player] = None;
                self.rollout = Some(player);
            }
            Step::Joint { player, joint, .. } => {
                self.base.undo_action(Actor::Simultaneous, joint)?;
                let choices = unflatten_joint_action(&self.legal_lists(), joint);
                for (p, choice) in PlayerId::all(choices.len()).zip(choices) {
                    self.pending[p] = if p < player { Some(choice) } else { None };
                }
                self.rollout = Some(player);
            }
        }
        self.steps.pop_back();
        Ok(())
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.steps.iter().map(|step| step.record()).collect()
    }

    fn returns(&self) -> Vec<f64> {
        self.base.returns()
    }

    fn information_state(&self, player: PlayerId) -> String {
        self.extend_string(player, self.base.information_state(player))
    }

    fn information_state_tensor(&self, player: PlayerId) -> Vec<f64> {
        self.extend_tensor(player, self.base.information_state_tensor(player))
    }

    fn observation(&self, player: PlayerId) -> String {
        self.extend_string(player, self.base.observation(player))
    }

    fn observation_tensor(&self, player: PlayerId) -> Vec<f64> {
        self.extend_tensor(player, self.base.observation_tensor(player))
    }

    fn action_to_string(&self, actor: Actor, action: Action) -> String {
        self.base.action_to_string(actor, action)
    }
}

impl<S: State> std::fmt::Display for TurnBasedState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(rollout) = self.rollout {
            write!(f, "\nRollout player: {}", rollout.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Information, Utility};
    use crate::games::{KuhnPokerGame, MatrixGame};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    #[test]
    fn test_game_type() {
        let game = TurnBasedGame::new(MatrixGame::matching_pennies());
        let game_type = game.game_type();

        assert_eq!(game_type.dynamics, Dynamics::Sequential);
        assert_eq!(game_type.information, Information::Imperfect);
        assert_eq!(game_type.utility, Utility::ZeroSum);
        assert_eq!(game.num_distinct_actions(), 2);
        assert_eq!(game.max_game_length(), 2);
    }

    #[test]
    fn test_players_choose_in_order() {
        let game = TurnBasedGame::new(MatrixGame::matching_pennies());
        let mut state = game.new_initial_state();

        assert_eq!(state.current_player(), Actor::Player(P0));
        assert_eq!(state.legal_actions(), vec![Action(0), Action(1)]);
        state.apply_action(Action(1));

        assert_eq!(state.current_player(), Actor::Player(P1));
        assert!(state.base().is_simultaneous_node());
        state.apply_action(Action(0));

        assert!(state.is_terminal());
        assert_eq!(state.base().joint_action().unwrap().as_slice(), &[Action(1), Action(0)]);
        assert_eq!(state.returns(), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_second_mover_cannot_see_first_choice() {
        let game = TurnBasedGame::new(MatrixGame::matching_pennies());
        let heads = game.new_initial_state().child(Action(0));
        let tails = game.new_initial_state().child(Action(1));

        assert_eq!(heads.information_state(P1), tails.information_state(P1));
        assert_eq!(heads.information_state_tensor(P1), tails.information_state_tensor(P1));
        assert_ne!(heads.information_state(P0), tails.information_state(P0));
    }

    #[test]
    fn test_information_state_format() {
        let game = TurnBasedGame::new(MatrixGame::matching_pennies());
        let state = game.new_initial_state().child(Action(1));

        assert_eq!(state.information_state(P1), "\nRollout player: 1\nOwn choice: -");
        assert_eq!(state.information_state(P0), "\nRollout player: 1\nOwn choice: 1");
    }

    #[test]
    fn test_three_player_joint_action() {
        let game = TurnBasedGame::new(MatrixGame::indexed(vec![2, 3, 4]));
        let mut state = game.new_initial_state();
        state.apply_action(Action(1));
        state.apply_action(Action(2));
        state.apply_action(Action(3));

        // 1 + 2 * (2 + 3 * 3)
        assert_eq!(state.returns(), vec![23.0; 3]);
        assert_eq!(state.history().len(), 3);
    }

    #[test]
    fn test_undo_through_joint_action() {
        let game = TurnBasedGame::new(MatrixGame::indexed(vec![2, 3, 4]));
        let mut state = game.new_initial_state();
        state.apply_action(Action(1));
        state.apply_action(Action(2));
        let before_last = state.clone();
        state.apply_action(Action(3));

        state.undo_action(Actor::Player(PlayerId::new(2)), Action(3)).unwrap();
        assert_eq!(state.current_player(), Actor::Player(PlayerId::new(2)));
        assert!(state.base().is_simultaneous_node());
        assert_eq!(state.information_state(P0), before_last.information_state(P0));
        assert_eq!(state.information_state(P1), before_last.information_state(P1));

        state.undo_action(Actor::Player(P1), Action(2)).unwrap();
        state.undo_action(Actor::Player(P0), Action(1)).unwrap();
        assert_eq!(state.current_player(), Actor::Player(P0));
        assert!(state.undo_action(Actor::Player(P0), Action(1)).is_err());
    }

    #[test]
    fn test_undo_wrong_player() {
        let game = TurnBasedGame::new(MatrixGame::matching_pennies());
        let mut state = game.new_initial_state().child(Action(1));
        assert!(state.undo_action(Actor::Player(P1), Action(1)).is_err());
        assert!(state.undo_action(Actor::Player(P0), Action(0)).is_err());
    }

    #[test]
    fn test_sequential_game_passes_through() {
        let game = TurnBasedGame::new(KuhnPokerGame::new());
        let mut state = game.new_initial_state();

        assert!(state.is_chance_node());
        assert_eq!(state.chance_outcomes().len(), 3);
        state.apply_action(Action(0));
        state.apply_action(Action(2));
        assert_eq!(state.current_player(), Actor::Player(P0));
        assert_eq!(state.information_state(P0), "J");

        state.undo_action(Actor::Chance, Action(2)).unwrap();
        assert!(state.is_chance_node());
    }

    #[test]
    fn test_tensor_lengths() {
        let game = TurnBasedGame::new(MatrixGame::matching_pennies());
        let state = game.new_initial_state().child(Action(0));

        assert_eq!(
            state.information_state_tensor(P1).len(),
            game.information_state_tensor_shape()[0]
        );
        assert_eq!(
            state.observation_tensor(P0).len(),
            game.observation_tensor_shape()[0]
        );
    }
}
