//! One-shot simultaneous-move (normal-form) games.
//!
//! Every player picks one action at once from `0..num_actions[p]`; the
//! payoff table is indexed by the flat joint action (player 0 varying
//! fastest, see [`crate::joint`]).

use std::sync::Arc;

use crate::core::state::check_undo;
use crate::core::{
    Action, ActionRecord, Actor, Dynamics, Game, GameType, Information, PlayerId, Result, State,
    Utility,
};
use crate::joint::{flatten_indices, unflatten_indices, ActionView, JointAction};

/// Static data shared by every state of one game.
#[derive(Debug)]
struct MatrixTable {
    num_actions: Vec<usize>,
    payoffs: Vec<Vec<f64>>,
    labels: Vec<String>,
}

/// A normal-form game.
#[derive(Clone, Debug)]
pub struct MatrixGame {
    game_type: GameType,
    table: Arc<MatrixTable>,
}

impl MatrixGame {
    /// Create a game from per-player action counts and a payoff table.
    ///
    /// `payoffs[flat]` holds the returns of every player for the joint
    /// action `flat`. The utility classification is derived from the table.
    ///
    /// # Panics
    ///
    /// Panics if the table does not have one row per joint action, or a row
    /// does not have one entry per player.
    pub fn new(
        short_name: impl Into<String>,
        num_actions: Vec<usize>,
        payoffs: Vec<Vec<f64>>,
    ) -> Self {
        let num_joint: usize = num_actions.iter().product();
        assert!(num_actions.len() >= 2, "A matrix game needs at least 2 players");
        assert!(num_actions.iter().all(|&n| n > 0), "Every player needs an action");
        assert_eq!(payoffs.len(), num_joint, "One payoff row per joint action");
        assert!(
            payoffs.iter().all(|row| row.len() == num_actions.len()),
            "One payoff per player"
        );

        let max_actions = num_actions.iter().copied().max().unwrap_or(0);
        let labels = (0..max_actions).map(|a| format!("a{}", a)).collect();
        Self::with_labels(short_name, num_actions, payoffs, labels)
    }

    fn with_labels(
        short_name: impl Into<String>,
        num_actions: Vec<usize>,
        payoffs: Vec<Vec<f64>>,
        labels: Vec<String>,
    ) -> Self {
        let short_name = short_name.into();
        let utility = Utility::classify(payoffs.iter().map(Vec::as_slice));
        let game_type = GameType::new(short_name.clone(), short_name)
            .with_dynamics(Dynamics::Simultaneous)
            .with_information(Information::Imperfect)
            .with_utility(utility);

        Self {
            game_type,
            table: Arc::new(MatrixTable {
                num_actions,
                payoffs,
                labels,
            }),
        }
    }

    /// Matching pennies: player 0 wins on a match, player 1 on a mismatch.
    #[must_use]
    pub fn matching_pennies() -> Self {
        let payoffs = vec![
            vec![1.0, -1.0],
            vec![-1.0, 1.0],
            vec![-1.0, 1.0],
            vec![1.0, -1.0],
        ];
        Self::with_labels(
            "matching_pennies",
            vec![2, 2],
            payoffs,
            vec!["Heads".to_string(), "Tails".to_string()],
        )
    }

    /// A game where every joint action pays the players its own flat index,
    /// so every outcome is distinguishable and returns are identical.
    #[must_use]
    pub fn indexed(num_actions: Vec<usize>) -> Self {
        let num_joint: usize = num_actions.iter().product();
        let players = num_actions.len();
        let payoffs = (0..num_joint).map(|i| vec![i as f64; players]).collect();
        Self::new("indexed_matrix", num_actions, payoffs)
    }

    #[must_use]
    pub fn num_actions(&self, player: PlayerId) -> usize {
        self.table.num_actions[player.index()]
    }
}

impl Game for MatrixGame {
    type State = MatrixState;

    fn game_type(&self) -> &GameType {
        &self.game_type
    }

    fn new_initial_state(&self) -> MatrixState {
        MatrixState {
            table: Arc::clone(&self.table),
            joint: None,
        }
    }

    fn num_distinct_actions(&self) -> usize {
        self.table.labels.len()
    }

    fn num_players(&self) -> usize {
        self.table.num_actions.len()
    }

    fn min_utility(&self) -> f64 {
        self.table.payoffs.iter().flatten().copied().fold(f64::INFINITY, f64::min)
    }

    fn max_utility(&self) -> f64 {
        self.table.payoffs.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    fn utility_sum(&self) -> Option<f64> {
        match self.game_type.utility {
            Utility::ZeroSum => Some(0.0),
            Utility::ConstantSum => self.table.payoffs.first().map(|row| row.iter().sum()),
            _ => None,
        }
    }

    /// One-hot of the player's own action, set once the game is over.
    fn information_state_tensor_shape(&self) -> Vec<usize> {
        vec![self.table.labels.len()]
    }

    fn observation_tensor_shape(&self) -> Vec<usize> {
        vec![self.table.labels.len()]
    }

    fn max_game_length(&self) -> usize {
        1
    }
}

/// Either the single simultaneous node or one of its terminal children.
#[derive(Clone, Debug)]
pub struct MatrixState {
    table: Arc<MatrixTable>,
    joint: Option<Action>,
}

impl MatrixState {
    fn legal_lists(&self) -> Vec<Vec<Action>> {
        PlayerId::all(self.table.num_actions.len())
            .map(|p| self.legal_actions_for(p))
            .collect()
    }

    /// The per-player actions of the joint action taken, once terminal.
    #[must_use]
    pub fn joint_action(&self) -> Option<JointAction> {
        self.joint.map(|flat| {
            unflatten_indices(&self.table.num_actions, flat.index())
                .into_iter()
                .map(Action::from)
                .collect()
        })
    }

    fn own_action(&self, player: PlayerId) -> Option<Action> {
        self.joint_action().map(|joint| joint[player.index()])
    }

    fn joint_label(&self, joint: &JointAction) -> String {
        let indices: Vec<usize> = joint.iter().map(|a| a.index()).collect();
        let flat = flatten_indices(&self.table.num_actions, &indices);
        self.action_to_string(Actor::Simultaneous, Action::from(flat))
    }

    fn own_tensor(&self, player: PlayerId) -> Vec<f64> {
        let mut values = vec![0.0; self.table.labels.len()];
        if let Some(action) = self.own_action(player) {
            values[action.index()] = 1.0;
        }
        values
    }
}

impl State for MatrixState {
    fn current_player(&self) -> Actor {
        if self.joint.is_some() {
            Actor::Terminal
        } else {
            Actor::Simultaneous
        }
    }

    fn num_players(&self) -> usize {
        self.table.num_actions.len()
    }

    fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal() {
            return Vec::new();
        }
        ActionView::from_lists(self.current_player(), self.legal_lists())
            .flat_joint_actions()
            .collect()
    }

    fn legal_actions_for(&self, player: PlayerId) -> Vec<Action> {
        if self.is_terminal() {
            return Vec::new();
        }
        (0..self.table.num_actions[player.index()]).map(Action::from).collect()
    }

    fn apply_action(&mut self, action: Action) {
        assert!(!self.is_terminal(), "Cannot move in a finished game");
        let num_joint: usize = self.table.num_actions.iter().product();
        assert!(action.index() < num_joint, "Illegal joint action {}", action);
        self.joint = Some(action);
    }

    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()> {
        let last = self.joint.map(|a| ActionRecord::new(Actor::Simultaneous, a));
        check_undo(last.as_ref(), actor, action)?;
        self.joint = None;
        Ok(())
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.joint
            .map(|a| ActionRecord::new(Actor::Simultaneous, a))
            .into_iter()
            .collect()
    }

    fn returns(&self) -> Vec<f64> {
        match self.joint {
            Some(flat) => self.table.payoffs[flat.index()].clone(),
            None => vec![0.0; self.table.num_actions.len()],
        }
    }

    fn information_state(&self, player: PlayerId) -> String {
        match self.joint_action() {
            Some(joint) => format!("Own: {} Joint: {}", joint[player.index()], self.joint_label(&joint)),
            None => String::new(),
        }
    }

    fn information_state_tensor(&self, player: PlayerId) -> Vec<f64> {
        self.own_tensor(player)
    }

    fn observation(&self, player: PlayerId) -> String {
        self.information_state(player)
    }

    fn observation_tensor(&self, player: PlayerId) -> Vec<f64> {
        self.own_tensor(player)
    }

    fn action_to_string(&self, actor: Actor, action: Action) -> String {
        match actor {
            Actor::Simultaneous => {
                let joint = unflatten_indices(&self.table.num_actions, action.index());
                let labels: Vec<&str> = joint.iter().map(|&i| self.table.labels[i].as_str()).collect();
                format!("({})", labels.join(","))
            }
            _ => self.table.labels[action.index()].clone(),
        }
    }
}

impl std::fmt::Display for MatrixState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.joint {
            Some(flat) => write!(f, "Terminal {}", self.action_to_string(Actor::Simultaneous, flat)),
            None => write!(f, "Simultaneous node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_pennies_type() {
        let game = MatrixGame::matching_pennies();
        let game_type = game.game_type();

        assert_eq!(game_type.dynamics, Dynamics::Simultaneous);
        assert_eq!(game_type.utility, Utility::ZeroSum);
        assert_eq!(game.num_distinct_actions(), 2);
        assert_eq!(game.utility_sum(), Some(0.0));
    }

    #[test]
    fn test_joint_actions_and_returns() {
        let game = MatrixGame::matching_pennies();
        let state = game.new_initial_state();

        assert!(state.is_simultaneous_node());
        assert_eq!(state.legal_actions().len(), 4);

        // (Tails, Heads): player 0 index 1, player 1 index 0 -> flat 1
        let terminal = state.child(Action(1));
        assert!(terminal.is_terminal());
        assert_eq!(terminal.returns(), vec![-1.0, 1.0]);
        assert_eq!(terminal.joint_action().unwrap().as_slice(), &[Action(1), Action(0)]);
        assert_eq!(terminal.to_string(), "Terminal (Tails,Heads)");
    }

    #[test]
    fn test_indexed_game() {
        let game = MatrixGame::indexed(vec![2, 3, 4]);
        let state = game.new_initial_state();

        assert_eq!(game.num_players(), 3);
        assert_eq!(game.game_type().utility, Utility::Identical);
        assert_eq!(state.legal_actions().len(), 24);
        assert_eq!(state.legal_actions_for(PlayerId::new(2)).len(), 4);
        assert_eq!(state.child(Action(17)).returns(), vec![17.0; 3]);
        assert_eq!(game.max_utility(), 23.0);
    }

    #[test]
    fn test_undo() {
        let game = MatrixGame::matching_pennies();
        let mut state = game.new_initial_state().child(Action(3));

        assert!(state.undo_action(Actor::Simultaneous, Action(2)).is_err());
        state.undo_action(Actor::Simultaneous, Action(3)).unwrap();
        assert!(state.is_simultaneous_node());
        assert!(state.undo_action(Actor::Simultaneous, Action(3)).is_err());
    }

    #[test]
    #[should_panic(expected = "One payoff row per joint action")]
    fn test_bad_table() {
        let _ = MatrixGame::new("bad", vec![2, 2], vec![vec![0.0, 0.0]]);
    }
}
