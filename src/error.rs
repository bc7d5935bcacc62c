use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write configuration {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration {path} is not a JSON object: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(serde_json::Error),

    #[error("Value for {key} is not a valid {expected}")]
    InvalidValue { key: String, expected: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open record store {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to append record: {0}")]
    Write(#[from] std::io::Error),
}
