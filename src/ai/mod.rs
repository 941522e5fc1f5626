mod agent;
pub mod encoding;
mod learner;
mod random;
pub mod table;

pub use agent::Agent;
pub use learner::{LearnerConfig, QLearner, LOSS_REWARD, STEP_REWARD, WIN_REWARD};
pub use random::RandomAgent;
pub use table::QTable;
