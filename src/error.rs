use std::path::PathBuf;

/// Errors that can occur while persisting or restoring a value table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to open table file {path} for reading: {source}")]
    OpenRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write table file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_error_display() {
        let err = TableError::OpenRead {
            path: PathBuf::from("qtable.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(
            err.to_string(),
            "failed to open table file qtable.txt for reading: gone"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("agent.epsilon must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: agent.epsilon must be >= 1"
        );
    }
}
