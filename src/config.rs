use std::path::Path;

use crate::ai::LearnerConfig;
use crate::error::ConfigError;
use crate::game::GameConfig;
use crate::training::trainer::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub agent: LearnerConfig,
    pub opponent: LearnerConfig,
    pub training: TrainerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            game: GameConfig::default(),
            agent: LearnerConfig::default(),
            // The sparring partner explores more aggressively
            opponent: LearnerConfig {
                epsilon: 2,
                ..Default::default()
            },
            training: TrainerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!(
                "Warning: config file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.rows == 0 || self.game.cols == 0 {
            return Err(ConfigError::Validation(
                "game.rows and game.cols must be > 0".into(),
            ));
        }
        if self.game.connect == 0 || self.game.connect > self.game.rows.max(self.game.cols) {
            return Err(ConfigError::Validation(
                "game.connect must fit on the board".into(),
            ));
        }
        for (section, learner) in [("agent", &self.agent), ("opponent", &self.opponent)] {
            if learner.alpha <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{section}.alpha must be > 0"
                )));
            }
            if learner.epsilon == 0 {
                return Err(ConfigError::Validation(format!(
                    "{section}.epsilon must be >= 1"
                )));
            }
            if learner.filter_size != 0
                && learner.filter_size >= self.game.rows.min(self.game.cols)
            {
                return Err(ConfigError::Validation(format!(
                    "{section}.filter_size must be smaller than both board dimensions (or 0 for whole-board keys)"
                )));
            }
        }
        if self.training.num_epochs == 0 {
            return Err(ConfigError::Validation(
                "training.num_epochs must be > 0".into(),
            ));
        }
        if self.training.log_interval == 0 {
            return Err(ConfigError::Validation(
                "training.log_interval must be > 0".into(),
            ));
        }
        if self.training.eval_interval == 0 {
            return Err(ConfigError::Validation(
                "training.eval_interval must be > 0".into(),
            ));
        }
        if self.training.eval_games == 0 {
            return Err(ConfigError::Validation(
                "training.eval_games must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_opponent_explores_more() {
        let config = AppConfig::default();
        assert!(config.opponent.epsilon < config.agent.epsilon);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            [game]
            rows = 6
            cols = 7
            connect = 4

            [agent]
            filter_size = 3
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.rows, 6);
        assert_eq!(config.agent.filter_size, 3);
        // Untouched sections keep their defaults
        assert_eq!(config.training.eval_games, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_epsilon() {
        let mut config = AppConfig::default();
        config.agent.epsilon = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_connect() {
        let mut config = AppConfig::default();
        config.game.connect = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_filter() {
        let mut config = AppConfig::default();
        config.agent.filter_size = 3; // as large as the 3x3 board
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = AppConfig::load_or_default(Path::new("/no/such/config.toml")).unwrap();
        assert_eq!(config.game.rows, 3);
    }
}
