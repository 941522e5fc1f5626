//! Tabular Q-learning agent: greedy/exploratory action selection over the
//! value table and the temporal-difference update applied after every
//! half-move.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::agent::Agent;
use crate::ai::encoding::{self, StateKey};
use crate::ai::table::QTable;
use crate::error::TableError;
use crate::game::{Board, GameState, Player};

/// Shaped reward for a move that wins the game.
pub const WIN_REWARD: f32 = 1000.0;
/// Shaped reward for a move answered by an opponent win.
pub const LOSS_REWARD: f32 = -200.0;
/// Shaped reward while the game continues.
pub const STEP_REWARD: f32 = 0.0;

// Fixed blend/discount constants of the update rule. Intentionally not the
// configured `alpha`: the rule adds the whole bracket to the old value
// instead of interpolating toward a target, so values grow over a run.
const BLEND: f32 = 0.5;
const DISCOUNT: f32 = 0.7;

/// Written over a slot the moment its column turns out to be full. An
/// illegal action from a given state stays illegal, so the slot never
/// competes in the argmax again.
const ILLEGAL_VALUE: f32 = -100_000.0;

/// Q-learner hyperparameters, loadable from the `[agent]` / `[opponent]`
/// config sections.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Configured learning rate. Reported in logs; the update rule itself
    /// runs on its fixed blend constants.
    pub alpha: f64,
    /// Exploration denominator: a random action is taken with probability
    /// `1/epsilon` while training.
    pub epsilon: u32,
    /// Filter window edge length. 0 selects whole-board encoding.
    pub filter_size: usize,
    /// Seed for this agent's RNG; unset draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        LearnerConfig {
            alpha: 0.1,
            epsilon: 4,
            filter_size: 0,
            seed: None,
        }
    }
}

/// The (state key, action) pair behind the most recent move, kept so the
/// next outcome can be credited to it.
#[derive(Debug, Clone, Copy)]
struct Decision {
    key: StateKey,
    /// Column relative to the window's left edge; absolute in whole-board mode.
    action: usize,
    /// Anchor of the window that produced `key`; `None` in whole-board mode.
    window: Option<(usize, usize)>,
}

/// A tabular Q-learning agent. Owns its value table and RNG exclusively.
pub struct QLearner {
    table: QTable,
    identity: Player,
    alpha: f64,
    epsilon: u32,
    filter_size: usize,
    rng: StdRng,
    last_decision: Option<Decision>,
}

impl QLearner {
    pub fn new(identity: Player, config: LearnerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        QLearner {
            table: QTable::new(),
            identity,
            alpha: config.alpha,
            epsilon: config.epsilon.max(1),
            filter_size: config.filter_size,
            rng,
            last_decision: None,
        }
    }

    pub fn identity(&self) -> Player {
        self.identity
    }

    pub fn learning_rate(&self) -> f64 {
        self.alpha
    }

    pub fn epsilon(&self) -> u32 {
        self.epsilon
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Forget the pending decision. Called at game boundaries so an outcome
    /// is never credited to a move from the previous game.
    pub fn begin_episode(&mut self) {
        self.last_decision = None;
    }

    /// Persist the value table.
    pub fn save_table(&self, path: &Path) -> Result<(), TableError> {
        self.table.save(path)
    }

    /// Merge a persisted value table into this agent's table. Entries already
    /// present win over entries from disk.
    pub fn load_table(&mut self, path: &Path) -> Result<usize, TableError> {
        self.table.load(path)
    }

    fn pick_action(&mut self, state: &GameState, training: bool) -> usize {
        // Exploration fires on a 1-in-epsilon draw only; every other draw
        // falls through to greedy selection.
        if training && self.rng.random_range(0..self.epsilon) == 0 {
            let column = self.random_legal(state);
            self.remember_fallback(state, column);
            return column;
        }

        if self.filter_size == 0 {
            self.greedy_whole(state)
        } else {
            self.greedy_filtered(state)
        }
    }

    /// Greedy argmax over the whole-board key's vector, suppressing slots
    /// whose columns turn out to be full.
    fn greedy_whole(&mut self, state: &GameState) -> usize {
        let board = state.board();
        let width = board.cols();
        let key = encoding::encode_whole(board);

        let values = self.table.get_or_init(key, width, &mut self.rng);
        let mut attempts = 0;
        while attempts <= width {
            let action = argmax(values);
            if board.is_legal(action) {
                self.last_decision = Some(Decision {
                    key,
                    action,
                    window: None,
                });
                return action;
            }
            values[action] = ILLEGAL_VALUE;
            attempts += 1;
        }

        // Search exhausted without a legal argmax
        let column = self.random_legal(state);
        self.last_decision = Some(Decision {
            key,
            action: column,
            window: None,
        });
        column
    }

    /// Greedy selection across all filter windows: each window nominates its
    /// best legal column, the strictest-greatest value wins. Ties keep the
    /// first window scanned.
    fn greedy_filtered(&mut self, state: &GameState) -> usize {
        let board = state.board();
        let filter = self.filter_size;

        let mut best: Option<(f32, usize, Decision)> = None;
        for w in encoding::enumerate_windows(board, filter) {
            let values = self.table.get_or_init(w.key, filter, &mut self.rng);
            let mut attempts = 0;
            let action = loop {
                let action = argmax(values);
                if board.is_legal(w.offset_x + action) {
                    break action;
                }
                values[action] = ILLEGAL_VALUE;
                attempts += 1;
                if attempts > filter {
                    // No legal column inside this window
                    break self.rng.random_range(0..filter);
                }
            };
            let value = values[action];

            let column = w.offset_x + action;
            if !board.is_legal(column) {
                continue;
            }
            if best.as_ref().map_or(true, |(b, _, _)| value > *b) {
                best = Some((
                    value,
                    column,
                    Decision {
                        key: w.key,
                        action,
                        window: Some((w.offset_x, w.offset_y)),
                    },
                ));
            }
        }

        match best {
            Some((_, column, decision)) => {
                self.last_decision = Some(decision);
                column
            }
            None => {
                // The windows never reach the right/bottom board edge, so a
                // board whose only open columns lie there produces no
                // candidate at all.
                let column = self.random_legal(state);
                self.remember_fallback(state, column);
                column
            }
        }
    }

    /// Uniform pick over the currently legal columns; in-range fallback when
    /// none are legal (the drop then reports the failure as a sentinel).
    fn random_legal(&mut self, state: &GameState) -> usize {
        let legal = state.legal_actions();
        if legal.is_empty() {
            return self.rng.random_range(0..state.board().cols());
        }
        legal[self.rng.random_range(0..legal.len())]
    }

    /// Record the decision behind a column that was not chosen greedily, in
    /// the same mode greedy selection would have used: whole-board key, or
    /// the first enumerated window containing the column.
    fn remember_fallback(&mut self, state: &GameState, column: usize) {
        let board = state.board();
        self.last_decision = if self.filter_size == 0 {
            Some(Decision {
                key: encoding::encode_whole(board),
                action: column,
                window: None,
            })
        } else {
            encoding::enumerate_windows(board, self.filter_size)
                .into_iter()
                .find(|w| column >= w.offset_x && column < w.offset_x + self.filter_size)
                .map(|w| Decision {
                    key: w.key,
                    action: column - w.offset_x,
                    window: Some((w.offset_x, w.offset_y)),
                })
        };
    }

    /// Credit the outcome of the committed move to the decision behind it.
    ///
    /// `prior` is the state the move was selected from; the bootstrapped
    /// future value comes from re-encoding the hypothetical board after the
    /// move, in the same mode (whole board or same window) that produced the
    /// decision's key. Returns the shaped reward, or `None` when no move was
    /// committed or no decision is pending.
    pub fn update(
        &mut self,
        winner: Option<Player>,
        committed_action: Option<usize>,
        prior: &GameState,
    ) -> Option<f32> {
        let column = committed_action?;
        let decision = self.last_decision?;

        let reward = self.shaped_reward(winner);
        let future = prior.apply_move(column).ok()?;
        self.apply_decision_update(decision, reward, future.board());
        Some(reward)
    }

    /// Terminal hook for the agent that did not move last: the opponent's
    /// winning move is credited to this agent's pending decision as a loss.
    pub fn penalize_loss(&mut self, terminal: &GameState) -> Option<f32> {
        let decision = self.last_decision.take()?;
        self.apply_decision_update(decision, LOSS_REWARD, terminal.board());
        Some(LOSS_REWARD)
    }

    fn apply_decision_update(&mut self, decision: Decision, reward: f32, future_board: &Board) {
        let width = if self.filter_size == 0 {
            future_board.cols()
        } else {
            self.filter_size
        };
        let future_key = match decision.window {
            None => encoding::encode_whole(future_board),
            Some((ox, oy)) => encoding::encode_window(future_board, ox, oy, self.filter_size),
        };
        let future_value = self.table.get_or_init(future_key, width, &mut self.rng)[decision.action];

        let values = self.table.get_or_init(decision.key, width, &mut self.rng);
        let old = values[decision.action];
        values[decision.action] = old + BLEND * (reward + DISCOUNT * future_value);
    }

    fn shaped_reward(&self, winner: Option<Player>) -> f32 {
        match winner {
            Some(w) if w == self.identity => WIN_REWARD,
            Some(_) => LOSS_REWARD,
            None => STEP_REWARD,
        }
    }
}

impl Agent for QLearner {
    fn select_action(&mut self, state: &GameState, training: bool) -> usize {
        self.pick_action(state, training)
    }

    fn name(&self) -> &str {
        "QLearner"
    }
}

/// Index of the greatest value; ties keep the first index (strict `>`).
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
