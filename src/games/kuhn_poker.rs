//! Kuhn poker: three cards, one card each, one betting round.
//!
//! Chance deals player 0's card, then player 1's. Each player antes 1.
//! Actions: 0 = pass, 1 = bet (1 chip). Sequences `pp`, `bb`, `pbb` go to
//! showdown; `bp` and `pbp` end with a fold.

use im::Vector;

use crate::core::state::check_undo;
use crate::core::{
    Action, ActionRecord, Actor, ChanceMode, Game, GameParameters, GameType, Information,
    PlayerId, Result, State,
};

pub const NUM_CARDS: usize = 3;
pub const PASS: Action = Action(0);
pub const BET: Action = Action(1);

const CARD_NAMES: [&str; NUM_CARDS] = ["J", "Q", "K"];
const MAX_BETS: usize = 3;

#[derive(Clone, Debug)]
pub struct KuhnPokerGame {
    game_type: GameType,
}

impl Default for KuhnPokerGame {
    fn default() -> Self {
        Self::new()
    }
}

impl KuhnPokerGame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            game_type: GameType::new("kuhn_poker", "Kuhn Poker")
                .with_chance_mode(ChanceMode::ExplicitStochastic)
                .with_information(Information::Imperfect),
        }
    }

    pub fn from_parameters(params: &GameParameters) -> Result<Self> {
        params.check_known("kuhn_poker", &[])?;
        Ok(Self::new())
    }
}

impl Game for KuhnPokerGame {
    type State = KuhnPokerState;

    fn game_type(&self) -> &GameType {
        &self.game_type
    }

    fn new_initial_state(&self) -> KuhnPokerState {
        KuhnPokerState::default()
    }

    fn num_distinct_actions(&self) -> usize {
        2
    }

    fn max_chance_outcomes(&self) -> usize {
        NUM_CARDS
    }

    fn num_players(&self) -> usize {
        2
    }

    fn min_utility(&self) -> f64 {
        -2.0
    }

    fn max_utility(&self) -> f64 {
        2.0
    }

    /// Player one-hot, private card one-hot, then pass/bet per betting slot.
    fn information_state_tensor_shape(&self) -> Vec<usize> {
        vec![2 + NUM_CARDS + 2 * MAX_BETS]
    }

    /// Player one-hot, private card one-hot, chips in the pot per player.
    fn observation_tensor_shape(&self) -> Vec<usize> {
        vec![2 + NUM_CARDS + 2]
    }

    fn max_game_length(&self) -> usize {
        2 + MAX_BETS
    }
}

/// A Kuhn poker state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KuhnPokerState {
    cards: Vec<usize>,
    bets: Vec<Action>,
    history: Vector<ActionRecord>,
}

impl KuhnPokerState {
    /// Private card of `player`, once dealt.
    #[must_use]
    pub fn card(&self, player: PlayerId) -> Option<usize> {
        self.cards.get(player.index()).copied()
    }

    fn betting_string(&self) -> String {
        self.bets
            .iter()
            .map(|&a| if a == BET { 'b' } else { 'p' })
            .collect()
    }

    fn is_betting_over(&self) -> bool {
        matches!(
            self.betting_string().as_str(),
            "pp" | "bb" | "bp" | "pbp" | "pbb"
        )
    }

    /// Chips each player has put in, antes included.
    fn contributions(&self) -> [f64; 2] {
        let mut pot = [1.0, 1.0];
        for (i, &a) in self.bets.iter().enumerate() {
            if a == BET {
                pot[i % 2] += 1.0;
            }
        }
        pot
    }

    /// The player who folded, if any.
    fn folder(&self) -> Option<usize> {
        match self.betting_string().as_str() {
            "bp" => Some(1),
            "pbp" => Some(0),
            _ => None,
        }
    }

    fn player_tensor_prefix(&self, player: PlayerId, values: &mut [f64]) {
        values[player.index()] = 1.0;
        if let Some(card) = self.card(player) {
            values[2 + card] = 1.0;
        }
    }
}

impl State for KuhnPokerState {
    fn current_player(&self) -> Actor {
        if self.cards.len() < 2 {
            Actor::Chance
        } else if self.is_betting_over() {
            Actor::Terminal
        } else {
            Actor::Player(PlayerId::new((self.bets.len() % 2) as u8))
        }
    }

    fn num_players(&self) -> usize {
        2
    }

    fn legal_actions(&self) -> Vec<Action> {
        match self.current_player() {
            Actor::Chance => self.chance_outcomes().into_iter().map(|(a, _)| a).collect(),
            Actor::Player(_) => vec![PASS, BET],
            _ => Vec::new(),
        }
    }

    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        if !self.is_chance_node() {
            return Vec::new();
        }
        let remaining: Vec<usize> = (0..NUM_CARDS).filter(|c| !self.cards.contains(c)).collect();
        let p = 1.0 / remaining.len() as f64;
        remaining.into_iter().map(|c| (Action::from(c), p)).collect()
    }

    fn apply_action(&mut self, action: Action) {
        let actor = self.current_player();
        match actor {
            Actor::Chance => {
                assert!(
                    action.index() < NUM_CARDS && !self.cards.contains(&action.index()),
                    "Card {} cannot be dealt",
                    action
                );
                self.cards.push(action.index());
            }
            Actor::Player(_) => {
                assert!(action == PASS || action == BET, "Illegal Kuhn poker action {}", action);
                self.bets.push(action);
            }
            _ => panic!("Cannot apply {} at a terminal state", action),
        }
        self.history.push_back(ActionRecord::new(actor, action));
    }

    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()> {
        check_undo(self.history.last(), actor, action)?;

        if actor.is_chance() {
            self.cards.pop();
        } else {
            self.bets.pop();
        }
        self.history.pop_back();
        Ok(())
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.history.iter().copied().collect()
    }

    fn returns(&self) -> Vec<f64> {
        if !self.is_terminal() {
            return vec![0.0, 0.0];
        }

        let pot = self.contributions();
        let winner = match self.folder() {
            Some(folder) => 1 - folder,
            None if self.cards[0] > self.cards[1] => 0,
            None => 1,
        };
        let loser = 1 - winner;

        let mut returns = vec![0.0; 2];
        returns[winner] = pot[loser];
        returns[loser] = -pot[loser];
        returns
    }

    fn information_state(&self, player: PlayerId) -> String {
        match self.card(player) {
            Some(card) => format!("{}{}", CARD_NAMES[card], self.betting_string()),
            None => String::new(),
        }
    }

    fn information_state_tensor(&self, player: PlayerId) -> Vec<f64> {
        let mut values = vec![0.0; 2 + NUM_CARDS + 2 * MAX_BETS];
        self.player_tensor_prefix(player, &mut values);
        for (i, &a) in self.bets.iter().enumerate() {
            values[2 + NUM_CARDS + 2 * i + a.index()] = 1.0;
        }
        values
    }

    fn observation(&self, player: PlayerId) -> String {
        let pot = self.contributions();
        match self.card(player) {
            Some(card) => format!("{} {} {}", CARD_NAMES[card], pot[0], pot[1]),
            None => format!("{} {}", pot[0], pot[1]),
        }
    }

    fn observation_tensor(&self, player: PlayerId) -> Vec<f64> {
        let mut values = vec![0.0; 2 + NUM_CARDS + 2];
        self.player_tensor_prefix(player, &mut values);
        let pot = self.contributions();
        values[2 + NUM_CARDS] = pot[0];
        values[2 + NUM_CARDS + 1] = pot[1];
        values
    }

    fn action_to_string(&self, actor: Actor, action: Action) -> String {
        match actor {
            Actor::Chance => CARD_NAMES
                .get(action.index())
                .map_or_else(|| format!("card {}", action), |s| s.to_string()),
            _ if action == PASS => "Pass".to_string(),
            _ => "Bet".to_string(),
        }
    }
}

impl std::fmt::Display for KuhnPokerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards: Vec<&str> = self.cards.iter().map(|&c| CARD_NAMES[c]).collect();
        write!(f, "{} {}", cards.join(""), self.betting_string())
    }
}
