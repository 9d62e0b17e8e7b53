// File: redeembot-tui/tests/test_utils/mod.rs
#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::Mutex;

use redeembot_core::config::{AppConfig, FailedAttemptSettings};
use redeembot_core::repositories::{open_store, YamlAuditLogRepository};
use redeembot_core::services::{
    CodeRegistry, LockoutTracker, LoggingCommandExecutor, MigrationService, RedemptionService,
};
use redeembot_tui::{dispatch, CommandContext, CommandOutcome};

pub struct Console {
    pub ctx: CommandContext,
    pub dir: TempDir,
}

impl Console {
    pub async fn run(&self, line: &str) -> CommandOutcome {
        dispatch(line, &self.ctx, "console").await
    }

    pub async fn run_as(&self, actor: &str, line: &str) -> CommandOutcome {
        dispatch(line, &self.ctx, actor).await
    }
}

/// A console over a file-backed registry in a fresh temp directory.
pub async fn console() -> Console {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig::default();
    let store = open_store(&config.backend(dir.path())).await.expect("file store");
    let registry = Arc::new(Mutex::new(CodeRegistry::open(store, config.code_name.clone()).await));

    let redemption = RedemptionService::new(
        registry.clone(),
        Arc::new(LoggingCommandExecutor),
        Arc::new(YamlAuditLogRepository::new(dir.path().join("log.yml"))),
        LockoutTracker::in_memory(FailedAttemptSettings::default()),
    );
    let ctx = CommandContext {
        registry,
        redemption: Arc::new(redemption),
        migration: Arc::new(MigrationService::new(config, dir.path().to_path_buf())),
        data_dir: dir.path().to_path_buf(),
    };
    Console { ctx, dir }
}
