//! Tic-tac-toe: perfect-information, deterministic, zero-sum.
//!
//! Action `c` places the mover's mark on cell `c` (row-major, 0..9).
//! Player 0 plays crosses, player 1 noughts.

use im::Vector;

use crate::core::state::check_undo;
use crate::core::{
    Action, ActionRecord, Actor, Game, GameParameters, GameType, PlayerId, Result, State,
};
use crate::transforms::CellState;

pub const NUM_ROWS: usize = 3;
pub const NUM_COLS: usize = 3;
pub const NUM_CELLS: usize = NUM_ROWS * NUM_COLS;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Contents of one board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Cross,
    Nought,
}

impl Cell {
    fn of(player: PlayerId) -> Self {
        if player.0 == 0 {
            Cell::Cross
        } else {
            Cell::Nought
        }
    }

    fn owner(self) -> Option<PlayerId> {
        match self {
            Cell::Empty => None,
            Cell::Cross => Some(PlayerId::new(0)),
            Cell::Nought => Some(PlayerId::new(1)),
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Cross => 'x',
            Cell::Nought => 'o',
        }
    }
}

/// The tic-tac-toe game.
#[derive(Clone, Debug)]
pub struct TicTacToeGame {
    game_type: GameType,
}

impl Default for TicTacToeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToeGame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            game_type: GameType::new("tic_tac_toe", "Tic Tac Toe"),
        }
    }

    /// Build from a parameter bag. The game takes no parameters.
    pub fn from_parameters(params: &GameParameters) -> Result<Self> {
        params.check_known("tic_tac_toe", &[])?;
        Ok(Self::new())
    }
}

impl Game for TicTacToeGame {
    type State = TicTacToeState;

    fn game_type(&self) -> &GameType {
        &self.game_type
    }

    fn new_initial_state(&self) -> TicTacToeState {
        TicTacToeState::new()
    }

    fn num_distinct_actions(&self) -> usize {
        NUM_CELLS
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
        vec![3, NUM_ROWS, NUM_COLS]
    }

    fn observation_tensor_shape(&self) -> Vec<usize> {
        vec![3, NUM_ROWS, NUM_COLS]
    }

    fn max_game_length(&self) -> usize {
        NUM_CELLS
    }
}

/// A tic-tac-toe position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicTacToeState {
    board: [Cell; NUM_CELLS],
    to_move: PlayerId,
    winner: Option<PlayerId>,
    history: Vector<ActionRecord>,
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToeState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: [Cell::Empty; NUM_CELLS],
            to_move: PlayerId::new(0),
            winner: None,
            history: Vector::new(),
        }
    }

    #[must_use]
    pub fn board_at(&self, cell: usize) -> Cell {
        self.board[cell]
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    fn is_full(&self) -> bool {
        self.board.iter().all(|&c| c != Cell::Empty)
    }

    fn line_owner(&self) -> Option<PlayerId> {
        LINES.iter().find_map(|line| {
            let first = self.board[line[0]];
            if first != Cell::Empty && line.iter().all(|&c| self.board[c] == first) {
                first.owner()
            } else {
                None
            }
        })
    }

    fn board_tensor(&self) -> Vec<f64> {
        let mut values = vec![0.0; 3 * NUM_CELLS];
        for (cell, &content) in self.board.iter().enumerate() {
            let plane = match content {
                Cell::Empty => 0,
                Cell::Nought => 1,
                Cell::Cross => 2,
            };
            values[plane * NUM_CELLS + cell] = 1.0;
        }
        values
    }
}

impl State for TicTacToeState {
    fn current_player(&self) -> Actor {
        if self.winner.is_some() || self.is_full() {
            Actor::Terminal
        } else {
            Actor::Player(self.to_move)
        }
    }

    fn num_players(&self) -> usize {
        2
    }

    fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal() {
            return Vec::new();
        }
        (0..NUM_CELLS)
            .filter(|&c| self.board[c] == Cell::Empty)
            .map(Action::from)
            .collect()
    }

    fn apply_action(&mut self, action: Action) {
        let cell = action.index();
        assert!(!self.is_terminal(), "Cannot move in a finished game");
        assert!(
            cell < NUM_CELLS && self.board[cell] == Cell::Empty,
            "Illegal tic-tac-toe move {}",
            action
        );

        let mover = self.to_move;
        self.board[cell] = Cell::of(mover);
        self.history.push_back(ActionRecord::new(Actor::Player(mover), action));
        self.winner = self.line_owner();
        self.to_move = mover.opponent();
    }

    fn undo_action(&mut self, actor: Actor, action: Action) -> Result<()> {
        check_undo(self.history.last(), actor, action)?;

        self.board[action.index()] = Cell::Empty;
        self.history.pop_back();
        self.winner = None;
        if let Some(player) = actor.player() {
            self.to_move = player;
        }
        Ok(())
    }

    fn history(&self) -> Vec<ActionRecord> {
        self.history.iter().copied().collect()
    }

    fn returns(&self) -> Vec<f64> {
        match self.winner {
            Some(p) if p.0 == 0 => vec![1.0, -1.0],
            Some(_) => vec![-1.0, 1.0],
            None => vec![0.0, 0.0],
        }
    }

    fn information_state(&self, _player: PlayerId) -> String {
        self.history_string()
    }

    fn information_state_tensor(&self, _player: PlayerId) -> Vec<f64> {
        self.board_tensor()
    }

    fn observation(&self, _player: PlayerId) -> String {
        self.to_string()
    }

    fn observation_tensor(&self, _player: PlayerId) -> Vec<f64> {
        self.board_tensor()
    }

    fn action_to_string(&self, _actor: Actor, action: Action) -> String {
        let cell = action.index();
        format!("({},{})", cell / NUM_COLS, cell % NUM_COLS)
    }
}

impl CellState for TicTacToeState {
    fn num_cells(&self) -> usize {
        NUM_CELLS
    }

    fn cell_owner(&self, cell: usize) -> Option<PlayerId> {
        self.board[cell].owner()
    }
}

impl std::fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..NUM_ROWS {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..NUM_COLS {
                write!(f, "{}", self.board[row * NUM_COLS + col].symbol())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(moves: &[u32]) -> TicTacToeState {
        let mut state = TicTacToeState::new();
        for &m in moves {
            state.apply_action(Action(m));
        }
        state
    }

    #[test]
    fn test_initial_state() {
        let state = TicTacToeGame::new().new_initial_state();

        assert_eq!(state.current_player(), Actor::Player(PlayerId::new(0)));
        assert_eq!(state.legal_actions().len(), 9);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_row_win() {
        let state = play(&[0, 3, 1, 4, 2]);

        assert!(state.is_terminal());
        assert_eq!(state.winner(), Some(PlayerId::new(0)));
        assert_eq!(state.returns(), vec![1.0, -1.0]);
        assert!(state.legal_actions().is_empty());
    }

    #[test]
    fn test_draw() {
        let state = play(&[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        assert!(state.is_terminal());
        assert_eq!(state.winner(), None);
        assert_eq!(state.returns(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_undo_restores_state() {
        let before = play(&[4, 0]);
        let mut after = before.clone();
        after.apply_action(Action(8));

        after.undo_action(Actor::Player(PlayerId::new(0)), Action(8)).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_undo_errors() {
        let mut state = TicTacToeState::new();
        assert!(state.undo_action(Actor::Player(PlayerId::new(0)), Action(0)).is_err());

        state.apply_action(Action(0));
        assert!(state.undo_action(Actor::Player(PlayerId::new(0)), Action(1)).is_err());
        assert!(state.undo_action(Actor::Player(PlayerId::new(1)), Action(0)).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = play(&[4]);
        let mut copy = original.clone();
        copy.apply_action(Action(0));

        assert_eq!(original.board_at(0), Cell::Empty);
        assert_eq!(original.history().len(), 1);
        assert_eq!(copy.history().len(), 2);
    }

    #[test]
    #[should_panic(expected = "Illegal tic-tac-toe move")]
    fn test_occupied_cell_panics() {
        let mut state = play(&[4]);
        state.apply_action(Action(4));
    }

    #[test]
    fn test_display_and_labels() {
        let state = play(&[0, 4]);
        assert_eq!(state.to_string(), "x..\n.o.\n...");
        assert_eq!(state.action_to_string(Actor::Player(PlayerId::new(0)), Action(5)), "(1,2)");
    }

    #[test]
    fn test_tensor_shape() {
        let game = TicTacToeGame::new();
        let state = play(&[0]);
        let len: usize = game.observation_tensor_shape().iter().product();
        assert_eq!(state.observation_tensor(PlayerId::new(0)).len(), len);
        assert_eq!(state.observation_tensor(PlayerId::new(0))[2 * NUM_CELLS], 1.0);
    }

    #[test]
    fn test_rejects_parameters() {
        let params = GameParameters::new().with("rows", 4i64);
        assert!(TicTacToeGame::from_parameters(&params).is_err());
        assert!(TicTacToeGame::from_parameters(&GameParameters::new()).is_ok());
    }
}
