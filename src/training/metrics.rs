use std::collections::VecDeque;

use crate::game::Player;

/// Result of a single episode.
pub struct EpisodeResult {
    pub winner: Option<Player>,
    pub game_length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    shaped_rewards: VecDeque<f32>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            shaped_rewards: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    pub fn record_reward(&mut self, reward: f32) {
        self.shaped_rewards.push_back(reward);
        if self.shaped_rewards.len() > self.capacity {
            self.shaped_rewards.pop_front();
        }
    }

    /// Win rate for Red in the last N episodes.
    pub fn win_rate(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.winner == Some(Player::Red))
            .count();
        wins as f32 / n as f32
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let draws = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.winner.is_none())
            .count();
        draws as f32 / n as f32
    }

    /// Average shaped reward over the last N recorded updates.
    pub fn average_reward(&self, last_n: usize) -> f32 {
        let n = self.shaped_rewards.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.shaped_rewards.iter().rev().take(n).sum();
        sum / n as f32
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f32 / n as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Games-per-second tracker for the progress line.
pub struct ThroughputWindow {
    window_start: std::time::Instant,
    window_count: usize,
}

impl ThroughputWindow {
    pub fn new() -> Self {
        ThroughputWindow {
            window_start: std::time::Instant::now(),
            window_count: 0,
        }
    }

    pub fn record_episode(&mut self) {
        self.window_count += 1;
    }

    /// Episodes per second since the last `reset` call.
    pub fn episodes_per_sec(&self) -> f32 {
        let micros = self.window_start.elapsed().as_micros();
        if micros == 0 {
            return 0.0;
        }
        self.window_count as f32 / (micros as f32 / 1_000_000.0)
    }

    /// Reset the throughput window (call after each log interval).
    pub fn reset(&mut self) {
        self.window_start = std::time::Instant::now();
        self.window_count = 0;
    }
}

impl Default for ThroughputWindow {
    fn default() -> Self {
        Self::new()
    }
}
