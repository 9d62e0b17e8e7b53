// redeembot-core/src/services/redemption_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use redeembot_common::models::cdk::format_expiry;
use redeembot_common::models::Cdk;
use redeembot_common::traits::host_traits::CommandExecutor;
use redeembot_common::traits::repository_traits::AuditLogRepository;
use redeembot_common::Error;

use crate::services::cdk_registry::{CodeRegistry, RedemptionState};
use crate::services::lockout_service::LockoutTracker;

/// Result of a successful `redeem`.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// The code as it was before this redemption.
    pub code: Cdk,
    pub commands: Vec<String>,
    /// Commands the executor rejected. The redemption still counts.
    pub failed_commands: Vec<String>,
    pub state: RedemptionState,
}

pub struct RedemptionService {
    registry: Arc<Mutex<CodeRegistry>>,
    executor: Arc<dyn CommandExecutor>,
    audit_log: Arc<dyn AuditLogRepository>,
    lockouts: Mutex<LockoutTracker>,
}

impl RedemptionService {
    pub fn new(
        registry: Arc<Mutex<CodeRegistry>>,
        executor: Arc<dyn CommandExecutor>,
        audit_log: Arc<dyn AuditLogRepository>,
        lockouts: LockoutTracker,
    ) -> Self {
        Self {
            registry,
            executor,
            audit_log,
            lockouts: Mutex::new(lockouts),
        }
    }

    /// Runs the full redemption of `name` by `user` under the registry lock.
    pub async fn redeem(&self, name: &str, user: &str, now: DateTime<Utc>) -> Result<Redemption, Error> {
        let mut lockouts = self.lockouts.lock().await;
        lockouts.check(user, now).await?;

        let mut registry = self.registry.lock().await;
        let code = match registry.find_by_name(name) {
            Some(cdk) => cdk.clone(),
            None => {
                if let Some(until) = lockouts.record_failure(user, now).await {
                    return Err(Error::LockedOut { user: user.to_string(), until });
                }
                return Err(Error::CodeNotFound(name.to_string()));
            }
        };
        if code.is_expired(now) {
            return Err(Error::CodeExpired(code.name));
        }
        if code.has_redeemed(user) {
            return Err(Error::AlreadyRedeemed { code: code.name, user: user.to_string() });
        }
        lockouts.clear(user);
        drop(lockouts);

        let commands = code.render_commands(user);
        let mut failed_commands = Vec::new();
        for command in &commands {
            if let Err(e) = self.executor.dispatch(command).await {
                warn!("Command '{}' for CDK '{}' failed: {}", command, code.name, e);
                failed_commands.push(command.clone());
            }
        }

        let state = match registry.apply_redemption(&code.name, user).await {
            Ok(state) => state,
            Err(e @ Error::CodeNotFound(_)) => return Err(e),
            // Memory already reflects the redemption; the next successful save reconciles storage.
            Err(e) => {
                error!("Redemption of '{}' by '{}' applied but not persisted: {}", code.name, user, e);
                match registry.find_by_name(&code.name) {
                    Some(cdk) => RedemptionState::Remaining(cdk.remaining_uses),
                    None => RedemptionState::Removed,
                }
            }
        };
        drop(registry);

        info!("'{}' redeemed CDK '{}' ({:?})", user, code.name, state);
        let line = format!("{} at {}", code, format_expiry(now));
        if let Err(e) = self.audit_log.append(user, &line).await {
            warn!("Could not write audit entry for '{}': {}", user, e);
        }

        Ok(Redemption { code, commands, failed_commands, state })
    }

    /// Read-only check whether `user` could redeem `name` right now.
    pub async fn verify(&self, name: &str, user: &str, now: DateTime<Utc>) -> Result<Cdk, Error> {
        let registry = self.registry.lock().await;
        let cdk = registry
            .find_by_name(name)
            .ok_or_else(|| Error::CodeNotFound(name.to_string()))?;
        if cdk.is_expired(now) {
            return Err(Error::CodeExpired(cdk.name.clone()));
        }
        if cdk.has_redeemed(user) {
            return Err(Error::AlreadyRedeemed { code: cdk.name.clone(), user: user.to_string() });
        }
        debug!("'{}' verified CDK '{}'", user, name);
        Ok(cdk.clone())
    }

    /// Audit lines recorded for `user`, oldest first.
    pub async fn history(&self, user: &str) -> Result<Vec<String>, Error> {
        self.audit_log.entries_for_user(user).await
    }
}
