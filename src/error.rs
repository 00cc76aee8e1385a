// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use crate::models::{FileStatus, ProcessMode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Message shown when a remote call fails without a usable server message.
pub const GENERIC_REMOTE_MESSAGE: &str = "request failed, please try again";

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("File {id} is not ready (status: {status})")]
    NotReady { id: String, status: FileStatus },

    #[error("Cannot submit file {id} for processing ({mode}) while it is {from}")]
    InvalidTransition {
        id: String,
        from: FileStatus,
        mode: ProcessMode,
    },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ConsoleError {
    pub fn remote(status: Option<u16>, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_REMOTE_MESSAGE.to_string());
        ConsoleError::Remote { status, message }
    }

    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Remote { message, .. } => message.clone(),
            ConsoleError::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Serialization(err.to_string())
    }
}
