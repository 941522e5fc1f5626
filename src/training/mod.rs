//! Self-play training loop and its metrics.

pub mod metrics;
pub mod trainer;

pub use trainer::{TrainReport, Trainer, TrainerConfig};
