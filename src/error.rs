use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum DockchatError {
    #[error("Terminal initialization failed: {0}")]
    Terminal(String),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Event channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, DockchatError>;
