// redeembot-core/src/services/mod.rs

pub mod cdk_registry;
pub mod command_executor;
pub mod lockout_service;
pub mod migration_service;
pub mod redemption_service;

pub use cdk_registry::{CodeRegistry, GroupExtension, RedemptionState};
pub use command_executor::LoggingCommandExecutor;
pub use lockout_service::LockoutTracker;
pub use migration_service::{migrate, MigrationService};
pub use redemption_service::{Redemption, RedemptionService};
