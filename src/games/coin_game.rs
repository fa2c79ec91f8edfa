//! A coin is tossed in plain view, then player 0 calls it.
//!
//! One chance node with two equiprobable outcomes, two decision nodes and
//! four leaves. Perfect information, zero-sum: a correct call wins 1 from
//! player 1, a wrong call loses 1.

use im::Vector;

use crate::core::state::check_undo;
use crate::core::{
    Action, ActionRecord, Actor, ChanceMode, Game, GameType, PlayerId, Result, State,
};

const SIDES: [&str; 2] = ["Heads", "Tails"];

#[derive(Clone, Debug)]
pub struct CoinGame {
    game_type: GameType,
}

impl Default for CoinGame {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            game_type: GameType::new("coin_game", "Coin Game")
                .with_chance_mode(ChanceMode::ExplicitStochastic),
        }
    }
}

impl Game for CoinGame {
    type State = CoinState;

    fn game_type(&self) -> &GameType {
        &self.game_type
    }

    fn new_initial_state(&self) -> CoinState {
        CoinState::default()
    }

    fn num_distinct_actions(&self) -> usize {
        2
    }

    fn max_chance_outcomes(&self) -> usize {
        2
    }

    fn num_players(&self) -> usize {
        2
    }

    fn min_utility(&self) -> f64 {
        -1.0
    }

    fn max_utility(&self) -> f64 {
        1.0
    }

    fn information_state_tensor_shape(&self) -> Vec<usize> {
        vec![4]
    }

    fn observation_tensor_shape(&self) -> Vec<usize> {
        vec![4]
    }

    fn max_game_length(&self) -> usize {
        2
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoinState {
    coin: Option<Action>,
    call: Option<Action>,
    history: Vector<ActionRecord>,
}

impl CoinState {
    fn tensor(&self) -> Vec<f64> {
        let mut values = vec![0.0; 4];
        if let Some(coin) = self.coin {
            values[coin.index()] = 1.0;
        }
        if let Some(call) = self.call {
            values[2 + call.index()] = 1.0;
        }
        values
    }
}

impl State for CoinState {
    fn current_player(&self) -> Actor {
        match (self.coin, self.call) {
            (None, _) => Actor::Chance,
            (Some(_), None) => Actor::Player(PlayerId::new(0)),
            (Some(_), Some(_)) => Actor::Terminal,
        }
    }

    fn num_players(&self) -> usize {
        2
    }

    fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal() {
            Vec::new()
        } else {
            vec![Action(0), Action(1)]
        }
    }

    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        if self.is_chance_node() {
            vec![(Action(0), 0.5), (Action(1), 0.5)]
        } else {
            Vec::new()
        }
    }

    fn apply_action(&mut self, action: Action) {
        assert!(action.index() < 2, "Illegal coin game action {}", action);
        let actor = self.current_player();
        match actor {
            Actor::Chance => self.coin = Some(action),
            Actor::Player(_) => self.call = Some(action),
            _ => panic!("Cannot apply {} at a terminal state", action),
        }
        self.history.push_back(ActionRecord::new(actor, action));
    }

    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()> {
        check_undo(self.history.last(), actor, action)?;
        if actor.is_chance() {
            self.coin = None;
        } else {
            self.call = None;
        }
        self.history.pop_back();
        Ok(())
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.history.iter().copied().collect()
    }

    fn returns(&self) -> Vec<f64> {
        match (self.coin, self.call) {
            (Some(coin), Some(call)) if coin == call => vec![1.0, -1.0],
            (Some(_), Some(_)) => vec![-1.0, 1.0],
            _ => vec![0.0, 0.0],
        }
    }

    fn information_state(&self, _player: PlayerId) -> String {
        self.history_string()
    }

    fn information_state_tensor(&self, _player: PlayerId) -> Vec<f64> {
        self.tensor()
    }

    fn observation(&self, _player: PlayerId) -> String {
        self.to_string()
    }

    fn observation_tensor(&self, _player: PlayerId) -> Vec<f64> {
        self.tensor()
    }

    fn action_to_string(&self, actor: Actor, action: Action) -> String {
        let side = SIDES[action.index() % 2];
        if actor.is_chance() {
            side.to_string()
        } else {
            format!("Call {}", side)
        }
    }
}

impl std::fmt::Display for CoinState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let coin = self.coin.map_or("?", |c| SIDES[c.index()]);
        let call = self.call.map_or("?", |c| SIDES[c.index()]);
        write!(f, "coin={} call={}", coin, call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_leaves() {
        let game = CoinGame::new();
        let root = game.new_initial_state();
        assert!(root.is_chance_node());

        let mut leaves = Vec::new();
        for (coin, _) in root.chance_outcomes() {
            let decision = root.child(coin);
            assert_eq!(decision.current_player(), Actor::Player(PlayerId::new(0)));
            for call in decision.legal_actions() {
                leaves.push(decision.child(call));
            }
        }

        assert_eq!(leaves.len(), 4);
        for leaf in &leaves {
            assert!(leaf.is_terminal());
            assert_eq!(leaf.returns().iter().sum::<f64>(), 0.0);
        }
    }

    #[test]
    fn test_correct_call_wins() {
        let state = CoinState::default().child(Action(1)).child(Action(1));
        assert_eq!(state.returns(), vec![1.0, -1.0]);
        assert_eq!(state.to_string(), "coin=Tails call=Tails");
    }

    #[test]
    fn test_undo() {
        let mut state = CoinState::default().child(Action(0));
        state.undo_action(Actor::Chance, Action(0)).unwrap();
        assert!(state.is_chance_node());
        assert!(state.undo_action(Actor::Chance, Action(0)).is_err());
    }
}
