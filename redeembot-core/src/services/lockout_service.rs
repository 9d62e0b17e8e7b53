// redeembot-core/src/services/lockout_service.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use redeembot_common::Error;

use crate::config::FailedAttemptSettings;
use crate::repositories::yaml::lockouts::YamlLockoutRepository;

#[derive(Debug, Clone, Copy)]
struct AttemptWindow {
    count: u32,
    last_attempt: DateTime<Utc>,
}

/// Counts failed redemptions per user and bans users who guess too often.
///
/// Attempt counters live in memory only; bans are written to disk.
pub struct LockoutTracker {
    settings: FailedAttemptSettings,
    attempts: HashMap<String, AttemptWindow>,
    bans: BTreeMap<String, DateTime<Utc>>,
    repo: Option<YamlLockoutRepository>,
}

impl LockoutTracker {
    /// A tracker that keeps bans in memory only.
    pub fn in_memory(settings: FailedAttemptSettings) -> Self {
        Self {
            settings,
            attempts: HashMap::new(),
            bans: BTreeMap::new(),
            repo: None,
        }
    }

    /// Loads persisted bans from `repo`.
    pub async fn open(settings: FailedAttemptSettings, repo: YamlLockoutRepository) -> Result<Self, Error> {
        let bans = repo.load_bans().await?;
        Ok(Self {
            settings,
            attempts: HashMap::new(),
            bans,
            repo: Some(repo),
        })
    }

    /// Fails with `LockedOut` while `user` is banned. Expired bans are dropped.
    pub async fn check(&mut self, user: &str, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.settings.enabled {
            return Ok(());
        }
        match self.bans.get(user).copied() {
            Some(until) if now < until => Err(Error::LockedOut {
                user: user.to_string(),
                until,
            }),
            Some(_) => {
                self.bans.remove(user);
                self.attempts.remove(user);
                self.save_bans().await;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Records one failed attempt. Returns the ban expiry if this attempt triggered a ban.
    pub async fn record_failure(&mut self, user: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.settings.enabled || self.settings.max_attempts == 0 {
            return None;
        }
        let reset_after = minutes_or_max(self.settings.reset_duration_minutes);

        let window = self.attempts.entry(user.to_string()).or_insert(AttemptWindow {
            count: 0,
            last_attempt: now,
        });
        if now - window.last_attempt >= reset_after {
            window.count = 0;
        }
        window.count += 1;
        window.last_attempt = now;

        if window.count < self.settings.max_attempts {
            return None;
        }

        self.attempts.remove(user);
        let until = now
            .checked_add_signed(minutes_or_max(self.settings.ban_duration_minutes))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.bans.insert(user.to_string(), until);
        info!("'{}' banned from redeeming until {}", user, until);
        self.save_bans().await;
        Some(until)
    }

    /// Forgets the attempt counter for `user`.
    pub fn clear(&mut self, user: &str) {
        self.attempts.remove(user);
    }

    pub fn failed_attempts(&self, user: &str) -> u32 {
        self.attempts.get(user).map(|w| w.count).unwrap_or(0)
    }

    async fn save_bans(&self) {
        if let Some(repo) = &self.repo {
            if let Err(e) = repo.save_bans(&self.bans).await {
                warn!("Could not persist redemption bans: {}", e);
            }
        }
    }
}

/// Non-positive windows count as zero; oversized ones saturate.
fn minutes_or_max(minutes: i64) -> TimeDelta {
    TimeDelta::try_minutes(minutes.max(0)).unwrap_or(TimeDelta::MAX)
}
