//! redeembot-server/src/context.rs
//!
//! The composition root: every long-lived service is built here once and
//! handed out by reference.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use redeembot_core::config::{AppConfig, AUDIT_LOG_FILE_NAME, LOCKOUT_FILE_NAME};
use redeembot_core::repositories::yaml::lockouts::YamlLockoutRepository;
use redeembot_core::repositories::{open_store, YamlAuditLogRepository};
use redeembot_core::services::{
    CodeRegistry, LockoutTracker, LoggingCommandExecutor, MigrationService, RedemptionService,
};
use redeembot_core::Error;
use redeembot_tui::CommandContext;

use crate::Args;

pub struct ServerContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub registry: Arc<Mutex<CodeRegistry>>,
    pub redemption_service: Arc<RedemptionService>,
    pub migration_service: Arc<MigrationService>,
}

impl ServerContext {
    /// Reads the configuration, opens the configured store and wires the services.
    pub async fn new(args: &Args) -> Result<Self, Error> {
        let data_dir = args.data_dir.clone();
        let mut config = AppConfig::load_or_create(&data_dir)?;
        if let Some(mode) = args.storage {
            info!("Storage mode overridden on the command line: {}", mode);
            config.storage.mode = mode;
        }

        let backend = config.backend(&data_dir);
        info!("Opening {} store", backend.kind());
        let store = open_store(&backend).await?;
        let registry = Arc::new(Mutex::new(
            CodeRegistry::open(store, config.code_name.clone()).await,
        ));

        let lockout_repo = YamlLockoutRepository::new(data_dir.join(LOCKOUT_FILE_NAME));
        let lockouts = match LockoutTracker::open(config.failed_attempts.clone(), lockout_repo).await {
            Ok(tracker) => tracker,
            Err(e) => {
                warn!("Could not read {}, starting with no bans: {}", LOCKOUT_FILE_NAME, e);
                LockoutTracker::in_memory(config.failed_attempts.clone())
            }
        };

        let redemption_service = Arc::new(RedemptionService::new(
            registry.clone(),
            Arc::new(LoggingCommandExecutor),
            Arc::new(YamlAuditLogRepository::new(data_dir.join(AUDIT_LOG_FILE_NAME))),
            lockouts,
        ));
        let migration_service = Arc::new(MigrationService::new(config.clone(), data_dir.clone()));

        Ok(Self {
            config,
            data_dir,
            registry,
            redemption_service,
            migration_service,
        })
    }

    pub fn command_context(&self) -> CommandContext {
        CommandContext {
            registry: self.registry.clone(),
            redemption: self.redemption_service.clone(),
            migration: self.migration_service.clone(),
            data_dir: self.data_dir.clone(),
        }
    }

    /// Flushes the registry one last time and closes its store.
    pub async fn shutdown(&self) {
        let registry = self.registry.lock().await;
        if let Err(e) = registry.persist().await {
            error!("Final save failed: {}", e);
        }
        registry.store().close().await;
    }
}
