// redeembot-core/src/services/migration_service.rs

use std::path::PathBuf;

use tracing::{info, warn};

use redeembot_common::models::cdk::count_codes;
use redeembot_common::models::{MigrationOutcome, StorageKind};
use redeembot_common::traits::repository_traits::CodeStore;
use redeembot_common::Error;

use crate::config::AppConfig;
use crate::repositories::open_store;
use crate::services::cdk_registry::CodeRegistry;

/// Only file <-> relational moves are defined.
pub fn is_supported(source: StorageKind, target: StorageKind) -> bool {
    source.is_relational() != target.is_relational()
}

/// Copies every code from `source` into `target`, replacing what `target` held.
///
/// Neither side is touched for an unsupported pair. A failed save leaves
/// `target` as it was.
pub async fn migrate(source: &dyn CodeStore, target: &dyn CodeStore) -> Result<MigrationOutcome, Error> {
    if !is_supported(source.kind(), target.kind()) {
        return Ok(MigrationOutcome::Unsupported {
            source: source.kind(),
            target: target.kind(),
        });
    }

    let codes = source.load().await?;
    let count = count_codes(&codes);
    target.save(&codes).await?;
    info!("Migrated {} codes from {} to {}", count, source.kind(), target.kind());
    Ok(MigrationOutcome::Migrated(count))
}

/// Resolves backend kinds against the configuration and runs migrations for the console.
pub struct MigrationService {
    config: AppConfig,
    data_dir: PathBuf,
}

impl MigrationService {
    pub fn new(config: AppConfig, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }

    /// Migrates between the configured backends of kind `source` and `target`.
    ///
    /// If the registry's own store is the source it is flushed first, and if it
    /// is the target the registry is reloaded afterwards.
    pub async fn run(
        &self,
        source: StorageKind,
        target: StorageKind,
        registry: &mut CodeRegistry,
    ) -> Result<MigrationOutcome, Error> {
        if !is_supported(source, target) {
            return Ok(MigrationOutcome::Unsupported { source, target });
        }

        if registry.store_kind() == source {
            registry.persist().await?;
        }

        let source_store = open_store(&self.config.backend_for(source, &self.data_dir)).await?;
        let target_store = match open_store(&self.config.backend_for(target, &self.data_dir)).await {
            Ok(store) => store,
            Err(e) => {
                source_store.close().await;
                return Err(e);
            }
        };

        let outcome = migrate(source_store.as_ref(), target_store.as_ref()).await;
        source_store.close().await;
        target_store.close().await;
        let outcome = outcome?;

        if registry.store_kind() == target {
            if let Err(e) = registry.reload().await {
                warn!("Migration finished but reloading the registry failed: {}", e);
            }
        }
        Ok(outcome)
    }
}
