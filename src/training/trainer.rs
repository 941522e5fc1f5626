use std::path::PathBuf;

use crate::ai::{Agent, QLearner, RandomAgent};
use crate::game::{GameConfig, GameState, Player};
use crate::training::metrics::{EpisodeResult, ThroughputWindow, TrainingMetrics};

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_epochs: usize,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    /// Value table to load before and save after a training run.
    pub table_path: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_epochs: 100_000,
            log_interval: 1000,
            eval_interval: 10_000,
            eval_games: 100,
            table_path: None,
        }
    }
}

/// Outcome tallies of a completed training run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrainReport {
    pub epochs: usize,
    pub red_wins: usize,
    pub yellow_wins: usize,
    pub draws: usize,
    pub eval_win_rate: f32,
    pub table_entries: usize,
}

/// Self-play trainer: two Q-learners alternate half-moves on one shared
/// board until the run's epoch count is exhausted.
pub struct Trainer {
    config: TrainerConfig,
    game: GameConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig, game: GameConfig) -> Self {
        Trainer { config, game }
    }

    /// Run the full training loop. Red moves first in every game.
    pub fn train(&self, red: &mut QLearner, yellow: &mut QLearner) -> TrainReport {
        let mut metrics = TrainingMetrics::new();
        let mut throughput = ThroughputWindow::new();
        let mut red_wins = 0;
        let mut yellow_wins = 0;
        let mut draws = 0;

        println!(
            "Starting self-play training for {} games ({}x{}, connect {})...",
            self.config.num_epochs, self.game.rows, self.game.cols, self.game.connect
        );
        println!("-------------------------------------------");

        for epoch in 1..=self.config.num_epochs {
            let result = self.play_game(red, yellow, &mut metrics);

            // Explicit two-way branch so a win is never also tallied as a draw
            match result.winner {
                Some(Player::Red) => red_wins += 1,
                Some(Player::Yellow) => yellow_wins += 1,
                None => draws += 1,
            }
            metrics.record_episode(result);
            throughput.record_episode();

            if epoch % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                println!(
                    "Game {}/{} | games/sec: {:.0} | red_win({}): {:.1}% | draw: {:.1}% | avg_len: {:.1} | avg_reward: {:.1} | states: {}",
                    epoch,
                    self.config.num_epochs,
                    throughput.episodes_per_sec(),
                    window,
                    metrics.win_rate(window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.average_game_length(window),
                    metrics.average_reward(window),
                    red.table().len(),
                );
                throughput.reset();
            }

            if epoch % self.config.eval_interval == 0 {
                let eval_wr = self.evaluate(red);
                println!(
                    "  >> Eval vs Random ({} games): {:.1}% win rate",
                    self.config.eval_games,
                    eval_wr * 100.0
                );
            }
        }

        println!("-------------------------------------------");
        println!(
            "Training complete. {}:{}:{} (red:yellow:draw) over {} games",
            red_wins,
            yellow_wins,
            draws,
            metrics.total_episodes()
        );

        let eval_win_rate = self.evaluate(red);
        println!("Final eval vs Random: {:.1}% win rate", eval_win_rate * 100.0);

        TrainReport {
            epochs: self.config.num_epochs,
            red_wins,
            yellow_wins,
            draws,
            eval_win_rate,
            table_entries: red.table().len(),
        }
    }

    /// Play one training game: select, commit, then credit the outcome to
    /// the mover; the loser's pending decision is penalized at the end.
    fn play_game(
        &self,
        red: &mut QLearner,
        yellow: &mut QLearner,
        metrics: &mut TrainingMetrics,
    ) -> EpisodeResult {
        let mut state = GameState::initial(self.game);
        red.begin_episode();
        yellow.begin_episode();

        let mut half_moves = 0;
        while !state.is_terminal() {
            let agent = match state.current_player() {
                Player::Red => &mut *red,
                Player::Yellow => &mut *yellow,
            };
            let action = agent.select_action(&state, true);
            let prior = state.clone();
            if state.apply_move_mut(action).is_err() {
                // No legal move could be committed; abandon the episode
                break;
            }
            half_moves += 1;

            if let Some(reward) = agent.update(state.winner(), Some(action), &prior) {
                metrics.record_reward(reward);
            }
        }

        // The loser never moves after the final piece lands; its last
        // decision is still pending and is credited here.
        if let Some(winner) = state.winner() {
            match winner {
                Player::Red => {
                    if let Some(reward) = yellow.penalize_loss(&state) {
                        metrics.record_reward(reward);
                    }
                }
                Player::Yellow => {
                    if let Some(reward) = red.penalize_loss(&state) {
                        metrics.record_reward(reward);
                    }
                }
            }
        }

        EpisodeResult {
            winner: state.winner(),
            game_length: half_moves,
        }
    }

    /// Evaluate the agent against RandomAgent over `eval_games`, alternating
    /// first player. Selection is pure greedy; no table updates happen.
    pub fn evaluate(&self, agent: &mut QLearner) -> f32 {
        let mut random = RandomAgent::new();
        let mut wins = 0;

        for game_idx in 0..self.config.eval_games {
            let agent_is_red = game_idx % 2 == 0;
            let mut state = GameState::initial(self.game);

            while !state.is_terminal() {
                let is_agent_turn = (state.current_player() == Player::Red) == agent_is_red;
                let action = if is_agent_turn {
                    agent.select_action(&state, false)
                } else {
                    random.select_action(&state, false)
                };
                if state.apply_move_mut(action).is_err() {
                    break;
                }
            }

            if let Some(winner) = state.winner() {
                if (winner == Player::Red) == agent_is_red {
                    wins += 1;
                }
            }
        }

        wins as f32 / self.config.eval_games as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::LearnerConfig;

    fn agents(filter_size: usize) -> (QLearner, QLearner) {
        let red = QLearner::new(
            Player::Red,
            LearnerConfig {
                epsilon: 4,
                seed: Some(21),
                filter_size,
                ..Default::default()
            },
        );
        let yellow = QLearner::new(
            Player::Yellow,
            LearnerConfig {
                epsilon: 2,
                seed: Some(42),
                filter_size,
                ..Default::default()
            },
        );
        (red, yellow)
    }

    #[test]
    fn test_play_game_reaches_outcome() {
        let trainer = Trainer::new(TrainerConfig::default(), GameConfig::default());
        let (mut red, mut yellow) = agents(0);
        let mut metrics = TrainingMetrics::new();

        let result = trainer.play_game(&mut red, &mut yellow, &mut metrics);
        assert!(result.game_length >= 5); // a 3x3 win takes at least 5 moves
        assert!(result.game_length <= 9);
    }

    #[test]
    fn test_tallies_partition_the_epochs() {
        let config = TrainerConfig {
            num_epochs: 50,
            log_interval: 100,
            eval_interval: 100,
            eval_games: 10,
            table_path: None,
        };
        let trainer = Trainer::new(config, GameConfig::default());
        let (mut red, mut yellow) = agents(0);

        let report = trainer.train(&mut red, &mut yellow);
        assert_eq!(report.red_wins + report.yellow_wins + report.draws, 50);
        assert!(report.table_entries > 0);
    }

    #[test]
    fn test_training_grows_the_table() {
        let config = TrainerConfig {
            num_epochs: 200,
            log_interval: 1000,
            eval_interval: 1000,
            eval_games: 10,
            table_path: None,
        };
        let trainer = Trainer::new(config, GameConfig::default());
        let (mut red, mut yellow) = agents(0);

        trainer.train(&mut red, &mut yellow);
        // Each agent learns over its own observations
        assert!(red.table().len() > 10);
        assert!(yellow.table().len() > 10);
    }

    #[test]
    fn test_filter_mode_training_runs() {
        let config = TrainerConfig {
            num_epochs: 50,
            log_interval: 100,
            eval_interval: 100,
            eval_games: 10,
            table_path: None,
        };
        let trainer = Trainer::new(config, GameConfig::connect_four());
        let (mut red, mut yellow) = agents(3);

        let report = trainer.train(&mut red, &mut yellow);
        assert_eq!(report.red_wins + report.yellow_wins + report.draws, 50);
    }

    #[test]
    fn test_trained_first_mover_rarely_loses_to_random() {
        let config = TrainerConfig {
            num_epochs: 30_000,
            log_interval: 1_000_000, // silence
            eval_interval: 1_000_000,
            eval_games: 1,
            table_path: None,
        };
        let game = GameConfig::default();
        let trainer = Trainer::new(config, game);
        let (mut red, mut yellow) = agents(0);
        trainer.train(&mut red, &mut yellow);

        // Full-exploitation agent moves first against a random opponent
        let mut random = RandomAgent::with_seed(5);
        let trials = 400;
        let mut losses = 0;
        for _ in 0..trials {
            let mut state = GameState::initial(game);
            while !state.is_terminal() {
                let action = match state.current_player() {
                    Player::Red => red.select_action(&state, false),
                    Player::Yellow => random.select_action(&state, false),
                };
                state.apply_move_mut(action).unwrap();
            }
            if state.winner() == Some(Player::Yellow) {
                losses += 1;
            }
        }

        let loss_rate = losses as f32 / trials as f32;
        assert!(
            loss_rate < 0.2,
            "trained agent lost {losses}/{trials} games to random"
        );
    }
}
