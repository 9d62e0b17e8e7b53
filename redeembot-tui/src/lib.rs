// File: redeembot-tui/src/lib.rs

pub mod commands;
pub mod tokenizer;
pub mod tui_module;

pub use commands::{dispatch, CommandContext, CommandOutcome, CommandStatus};
pub use tui_module::TuiModule;
