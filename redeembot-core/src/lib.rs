// redeembot-core/src/lib.rs

pub mod config;
pub mod db;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use config::{AppConfig, BackendSpec};
pub use redeembot_common::error::Error;
