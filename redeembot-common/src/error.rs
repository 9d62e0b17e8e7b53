// ================================================================
// File: redeembot-common/src/error.rs
// ================================================================

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    UserInput(String),

    #[error("CDK '{0}' does not exist")]
    CodeNotFound(String),

    #[error("CDK '{0}' has expired")]
    CodeExpired(String),

    #[error("'{user}' has already redeemed CDK '{code}'")]
    AlreadyRedeemed { code: String, user: String },

    #[error("'{user}' is locked out of redemption until {until}")]
    LockedOut { user: String, until: DateTime<Utc> },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Coarse classification used by the command layer to pick a result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserInput,
    NotFound,
    BusinessRule,
    System,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UserInput(_) | Error::Parse(_) => ErrorKind::UserInput,
            Error::NotFound(_) | Error::CodeNotFound(_) => ErrorKind::NotFound,
            Error::CodeExpired(_)
            | Error::AlreadyRedeemed { .. }
            | Error::LockedOut { .. } => ErrorKind::BusinessRule,
            Error::Database(_)
            | Error::Io(_)
            | Error::Yaml(_)
            | Error::Storage(_)
            | Error::Config(_) => ErrorKind::System,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::UserInput(err.to_string())
    }
}
