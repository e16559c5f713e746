//! Application-wide error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("env file error in {}: {message}", path.display())]
    EnvFile { path: PathBuf, message: String },

    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name} ('{value}'): {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
