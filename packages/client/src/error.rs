//! Top-level client errors.

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Terminal(#[from] ReadlineError),
}
