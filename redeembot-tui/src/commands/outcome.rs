// File: redeembot-tui/src/commands/outcome.rs

use std::fmt;

use redeembot_common::{Error, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    UserError,
    SystemError,
}

/// What a console command produced: a status plus the text shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub status: CommandStatus,
    pub message: String,
}

impl CommandOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self { status: CommandStatus::Success, message: message.into() }
    }

    pub fn user_error(message: impl Into<String>) -> Self {
        Self { status: CommandStatus::UserError, message: message.into() }
    }

    pub fn system_error(message: impl Into<String>) -> Self {
        Self { status: CommandStatus::SystemError, message: message.into() }
    }

    pub fn usage(text: &str) -> Self {
        Self::user_error(format!("Usage: {text}"))
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

impl From<Error> for CommandOutcome {
    fn from(err: Error) -> Self {
        match err.kind() {
            ErrorKind::System => Self::system_error(format!("Error: {err}")),
            ErrorKind::UserInput | ErrorKind::NotFound | ErrorKind::BusinessRule => {
                Self::user_error(err.to_string())
            }
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
