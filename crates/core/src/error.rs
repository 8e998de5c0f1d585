//! Error types for suite loading, execution and output

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TapiError {
    #[error("Failed to read suite document {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse suite document {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Output to {target} failed: {reason}")]
    Output { target: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TapiError {
    /// True for errors that abort a run before any test executes.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TapiError::ConfigRead { .. } | TapiError::ConfigParse { .. } | TapiError::InvalidConfig(_)
        )
    }
}

pub type TapiResult<T> = Result<T, TapiError>;
