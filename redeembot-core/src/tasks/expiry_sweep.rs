// redeembot-core/src/tasks/expiry_sweep.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::services::cdk_registry::CodeRegistry;

/// Spawns a background task that removes expired codes every `interval`.
pub fn spawn_expiry_sweep_task(
    registry: Arc<Mutex<CodeRegistry>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            let mut locked_registry = registry.lock().await;
            match locked_registry.sweep_expired(Utc::now()).await {
                Ok(0) => debug!("Expiry sweep found nothing to remove"),
                Ok(_) => {}
                Err(e) => error!("Expiry sweep could not persist: {}", e),
            }
        }
    })
}
