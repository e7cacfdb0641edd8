use std::path::PathBuf;

/// Errors that can occur while persisting the learning store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode learning record: {0}")]
    Encode(#[from] serde_json::Error),
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

/// A background move search ended without reporting a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("AI worker thread exited without a result")]
    WorkerLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::CreateDir {
            path: PathBuf::from("data"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to create store directory data: denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("engine.search_depth must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: engine.search_depth must be > 0"
        );
    }
}
