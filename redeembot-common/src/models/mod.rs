// File: redeembot-common/src/models/mod.rs
pub mod cdk;
pub mod storage;
pub mod migration;

pub use cdk::{Cdk, CodeSet};
pub use storage::StorageKind;
pub use migration::MigrationOutcome;
