use super::{Board, Player};

/// Board shape and win rule, loadable from the `[game]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub connect: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: 3,
            cols: 3,
            connect: 3,
        }
    }
}

impl GameConfig {
    /// The classic 6x7 Connect Four shape.
    pub fn connect_four() -> Self {
        GameConfig {
            rows: 6,
            cols: 7,
            connect: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
    GameOver,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    current_player: Player,
    outcome: Option<GameOutcome>,
}

impl GameState {
    /// Create initial game state for a board shape
    pub fn initial(config: GameConfig) -> Self {
        GameState {
            config,
            board: Board::new(config.rows, config.cols),
            current_player: Player::Red, // Red starts
            outcome: None,
        }
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// The winning player, if any
    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            Some(GameOutcome::Winner(p)) => Some(p),
            _ => None,
        }
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Get list of legal columns (not full)
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }

        (0..self.board.cols())
            .filter(|&col| !self.board.is_column_full(col))
            .collect()
    }

    /// Apply a move and return new state (immutable). This doubles as the
    /// hypothetical-drop lookahead: the receiver is left untouched.
    pub fn apply_move(&self, column: usize) -> Result<GameState, MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        // Clone the board and apply move
        let mut new_board = self.board.clone();
        let row = new_board
            .drop_piece(column, self.current_player.to_cell())
            .map_err(|e| match e {
                super::board::MoveError::ColumnFull => MoveError::ColumnFull,
                super::board::MoveError::InvalidColumn => MoveError::InvalidColumn,
            })?;

        // Check for win
        let outcome = if new_board.check_win(row, column, self.config.connect) {
            Some(GameOutcome::Winner(self.current_player))
        } else if new_board.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        };

        Ok(GameState {
            config: self.config,
            board: new_board,
            current_player: self.current_player.other(),
            outcome,
        })
    }

    /// Apply move mutably
    pub fn apply_move_mut(&mut self, column: usize) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let row = self
            .board
            .drop_piece(column, self.current_player.to_cell())
            .map_err(|e| match e {
                super::board::MoveError::ColumnFull => MoveError::ColumnFull,
                super::board::MoveError::InvalidColumn => MoveError::InvalidColumn,
            })?;

        // Check for win
        if self.board.check_win(row, column, self.config.connect) {
            self.outcome = Some(GameOutcome::Winner(self.current_player));
        } else if self.board.is_full() {
            self.outcome = Some(GameOutcome::Draw);
        }

        self.current_player = self.current_player.other();

        Ok(())
    }

    /// Reset to the initial empty position, keeping the board shape
    pub fn reset(&mut self) {
        self.board.clear();
        self.current_player = Player::Red;
        self.outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::Cell;
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = GameState::initial(GameConfig::connect_four());
        assert_eq!(state.current_player(), Player::Red);
        assert!(!state.is_terminal());
        assert_eq!(state.legal_actions().len(), 7);
    }

    #[test]
    fn test_apply_move() {
        let state = GameState::initial(GameConfig::connect_four());
        let new_state = state.apply_move(3).unwrap();

        assert_eq!(new_state.current_player(), Player::Yellow);
        assert_eq!(new_state.board().get(5, 3), Cell::Red);
    }

    #[test]
    fn test_apply_move_leaves_receiver_untouched() {
        let state = GameState::initial(GameConfig::default());
        let _peeked = state.apply_move(1).unwrap();

        assert_eq!(state.board().get(2, 1), Cell::Empty);
        assert_eq!(state.current_player(), Player::Red);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_win_detection() {
        let mut state = GameState::initial(GameConfig::connect_four());

        // Red wins with horizontal line
        for col in 0..4 {
            state = state.apply_move(col).unwrap(); // Red
            if col < 3 {
                state = state.apply_move(col).unwrap(); // Yellow (different row)
            }
        }

        assert!(state.is_terminal());
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Player::Red)));
        assert_eq!(state.winner(), Some(Player::Red));
    }

    #[test]
    fn test_win_detection_small_board() {
        let mut state = GameState::initial(GameConfig::default());

        // Red: columns 0, 1, 2 on the bottom row; Yellow stacks on 0, 1
        state = state.apply_move(0).unwrap(); // Red
        state = state.apply_move(0).unwrap(); // Yellow
        state = state.apply_move(1).unwrap(); // Red
        state = state.apply_move(1).unwrap(); // Yellow
        state = state.apply_move(2).unwrap(); // Red

        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Player::Red)));
    }

    #[test]
    fn test_move_after_game_over() {
        let mut state = GameState::initial(GameConfig::default());
        state = state.apply_move(0).unwrap();
        state = state.apply_move(0).unwrap();
        state = state.apply_move(1).unwrap();
        state = state.apply_move(1).unwrap();
        state = state.apply_move(2).unwrap();

        assert!(state.is_terminal());
        assert_eq!(state.apply_move(2), Err(MoveError::GameOver));
    }

    #[test]
    fn test_reset() {
        let mut state = GameState::initial(GameConfig::default());
        state.apply_move_mut(0).unwrap();
        state.apply_move_mut(1).unwrap();
        state.reset();

        assert_eq!(state.current_player(), Player::Red);
        assert!(!state.is_terminal());
        assert_eq!(state.board().get(2, 0), Cell::Empty);
        assert_eq!(state.board().get(2, 1), Cell::Empty);
    }

    #[test]
    fn test_draw() {
        let mut state = GameState::initial(GameConfig::connect_four());

        // Fill board without winning (alternating pattern)
        // This is a specific pattern that creates a draw
        let pattern = vec![
            0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6, 0, 0, 0, 1, 1, 1, 2,
            2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6,
        ];

        for &col in &pattern {
            if !state.is_terminal() {
                state = state.apply_move(col).unwrap();
            }
        }

        // Check if it's a draw or win (depends on pattern)
        if state.is_terminal() {
            assert!(matches!(
                state.outcome(),
                Some(GameOutcome::Draw) | Some(GameOutcome::Winner(_))
            ));
        }
    }
}
