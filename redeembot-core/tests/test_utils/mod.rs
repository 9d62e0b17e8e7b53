// File: redeembot-core/tests/test_utils/mod.rs
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::Mutex;

use redeembot_common::models::{Cdk, CodeSet, StorageKind};
use redeembot_common::traits::host_traits::CommandExecutor;
use redeembot_common::traits::repository_traits::{AuditLogRepository, CodeStore};
use redeembot_common::Error;
use redeembot_core::config::CodeNameSettings;
use redeembot_core::repositories::{SqliteCodeStore, YamlCodeStore};
use redeembot_core::services::CodeRegistry;

/// Fixed "now" so expiry checks do not depend on the wall clock.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

pub fn yaml_store(dir: &Path) -> YamlCodeStore {
    YamlCodeStore::new(dir.join("cdk.yml"))
}

pub async fn sqlite_store(dir: &Path) -> Result<SqliteCodeStore, Error> {
    let pool = redeembot_core::db::connect_sqlite(&dir.join("data.db")).await?;
    SqliteCodeStore::new(pool).await
}

pub async fn yaml_registry(dir: &Path) -> CodeRegistry {
    CodeRegistry::open(Box::new(yaml_store(dir)), CodeNameSettings::default()).await
}

/// A small logical data set exercising every field.
pub fn sample_codes() -> CodeSet {
    let mut codes = CodeSet::new();

    let mut vip = Cdk::new(
        "vip",
        "VIPCODE1",
        3,
        false,
        "give %player% diamond 5|broadcast %player% is vip",
        Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 0).unwrap()),
    );
    vip.record_redemption("alex");
    vip.record_redemption("steve");

    let starter_a = Cdk::new("starter", "STARTA01", 1, true, "give %player% bread 16", None);
    let starter_b = Cdk::new("starter", "STARTB02", 1, true, "give %player% bread 16", None);

    for cdk in [vip, starter_a, starter_b] {
        codes
            .entry(cdk.group_id.clone())
            .or_default()
            .insert(cdk.name.clone(), cdk);
    }
    codes
}

/// Records every dispatched command; commands containing `fail` are rejected.
#[derive(Default)]
pub struct RecordingExecutor {
    pub dispatched: Mutex<Vec<String>>,
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn dispatch(&self, command: &str) -> Result<(), Error> {
        self.dispatched.lock().await.push(command.to_string());
        if command.contains("fail") {
            return Err(Error::Storage(format!("host rejected '{command}'")));
        }
        Ok(())
    }
}

/// In-memory audit log that can be told to fail every append.
#[derive(Default)]
pub struct RecordingAuditLog {
    pub entries: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingAuditLog {
    pub fn failing() -> Self {
        Self { entries: Mutex::new(Vec::new()), fail: true }
    }
}

#[async_trait]
impl AuditLogRepository for RecordingAuditLog {
    async fn append(&self, user: &str, line: &str) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Storage("audit log unavailable".into()));
        }
        self.entries.lock().await.push((user.to_string(), line.to_string()));
        Ok(())
    }

    async fn entries_for_user(&self, user: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|(u, _)| u == user)
            .map(|(_, line)| line.clone())
            .collect())
    }
}

pub fn shared(registry: CodeRegistry) -> Arc<Mutex<CodeRegistry>> {
    Arc::new(Mutex::new(registry))
}

/// Loads a fixed set but rejects every save, counting the attempts.
pub struct BrokenStore {
    codes: CodeSet,
    pub save_attempts: Arc<AtomicUsize>,
}

impl BrokenStore {
    pub fn new(codes: CodeSet) -> Self {
        Self { codes, save_attempts: Arc::new(AtomicUsize::new(0)) }
    }
}

#[async_trait]
impl CodeStore for BrokenStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Sqlite
    }

    async fn load(&self) -> Result<CodeSet, Error> {
        Ok(self.codes.clone())
    }

    async fn save(&self, _codes: &CodeSet) -> Result<(), Error> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Storage("disk is read-only".into()))
    }

    async fn close(&self) {}
}
