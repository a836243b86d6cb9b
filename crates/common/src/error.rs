//! Common error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid device filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn filter(filter: &str, reason: impl Into<String>) -> Self {
        Error::Filter {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
