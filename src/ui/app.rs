use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::{backend::Backend, Terminal};

use crate::ai::{Agent, QLearner};
use crate::config::AppConfig;
use crate::game::{GameOutcome, GameState, MoveError, Player};

/// Interactive match against a trained agent. The AI plays Red and opens
/// every game; the human plays Yellow.
pub struct App {
    game_state: GameState,
    ai: QLearner,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let mut ai = QLearner::new(Player::Red, config.agent);
        let message = match &config.training.table_path {
            Some(path) => match ai.load_table(path) {
                Ok(entries) => Some(format!("Loaded {} states from {}", entries, path.display())),
                Err(e) => Some(format!("Playing untrained ({e})")),
            },
            None => Some("No table configured; the AI plays untrained.".to_string()),
        };

        let mut app = App {
            game_state: GameState::initial(config.game),
            ai,
            selected_column: config.game.cols / 2, // Start in middle
            should_quit: false,
            message,
        };
        app.ai_move();
        app
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key press
        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                }
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.game_state.board().cols() {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('r') => {
                // Reset game; the AI opens again
                self.game_state.reset();
                self.selected_column = self.game_state.board().cols() / 2;
                self.message = Some("New game started!".to_string());
                self.ai_move();
            }
            _ => {}
        }
    }

    /// Drop the human piece in the selected column, then let the AI answer
    fn drop_piece(&mut self) {
        if self.game_state.is_terminal() {
            self.message = Some("Game over! Press 'r' to restart.".to_string());
            return;
        }

        match self.game_state.apply_move_mut(self.selected_column) {
            Ok(()) => {
                self.ai_move();
                self.announce_outcome();
            }
            Err(MoveError::ColumnFull) => {
                self.message = Some("Column is full!".to_string());
            }
            Err(MoveError::InvalidColumn) => {
                self.message = Some("Invalid column!".to_string());
            }
            Err(MoveError::GameOver) => {
                self.message = Some("Game is over!".to_string());
            }
        }
    }

    /// Let the AI take its turn, if the game is live and it is to move
    fn ai_move(&mut self) {
        if self.game_state.is_terminal() || self.game_state.current_player() != self.ai.identity()
        {
            return;
        }
        let action = self.ai.select_action(&self.game_state, false);
        if self.game_state.apply_move_mut(action).is_err() {
            self.message = Some("The AI has no legal move.".to_string());
        }
    }

    fn announce_outcome(&mut self) {
        if let Some(outcome) = self.game_state.outcome() {
            self.message = Some(match outcome {
                GameOutcome::Winner(player) => {
                    let who = if player == self.ai.identity() { "AI" } else { "You" };
                    format!("{} ({}) wins!", who, player.name())
                }
                GameOutcome::Draw => "It's a draw!".to_string(),
            });
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(frame, &self.game_state, self.selected_column, &self.message);
    }
}
