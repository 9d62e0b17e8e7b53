// redeembot-core/src/config.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use redeembot_common::models::StorageKind;
use redeembot_common::Error;

pub const CONFIG_FILE_NAME: &str = "config.yml";
pub const AUDIT_LOG_FILE_NAME: &str = "log.yml";
pub const LOCKOUT_FILE_NAME: &str = "failed_attempts.yml";

/// Ten years; longer lockout windows are treated as misconfiguration.
pub const MAX_DURATION_MINUTES: i64 = 10 * 366 * 24 * 60;

/// Top-level `config.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub code_name: CodeNameSettings,
    pub sweep_interval_secs: u64,
    pub failed_attempts: FailedAttemptSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageSettings::default(),
            code_name: CodeNameSettings::default(),
            sweep_interval_secs: 300,
            failed_attempts: FailedAttemptSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub mode: StorageKind,
    pub file_name: String,
    pub sqlite_file: String,
    pub mysql: MySqlSettings,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            mode: StorageKind::File,
            file_name: "cdk.yml".to_string(),
            sqlite_file: "data.db".to_string(),
            mysql: MySqlSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub table_prefix: String,
}

impl Default for MySqlSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            database: "redeembot".to_string(),
            username: "root".to_string(),
            password: "password".to_string(),
            table_prefix: "cdk_".to_string(),
        }
    }
}

impl MySqlSettings {
    /// `host:port/database`, safe to log.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeNameSettings {
    pub length: usize,
    pub characters: String,
    /// Most single-use codes one `create single` or `add` may generate.
    pub max_batch_size: u32,
}

impl Default for CodeNameSettings {
    fn default() -> Self {
        Self {
            length: 8,
            characters: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string(),
            max_batch_size: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailedAttemptSettings {
    pub enabled: bool,
    pub max_attempts: u32,
    pub ban_duration_minutes: i64,
    pub reset_duration_minutes: i64,
}

impl Default for FailedAttemptSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            ban_duration_minutes: 10,
            reset_duration_minutes: 10,
        }
    }
}

/// A storage backend resolved against the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSpec {
    File(PathBuf),
    Sqlite(PathBuf),
    MySql(MySqlSettings),
}

impl BackendSpec {
    pub fn kind(&self) -> StorageKind {
        match self {
            BackendSpec::File(_) => StorageKind::File,
            BackendSpec::Sqlite(_) => StorageKind::Sqlite,
            BackendSpec::MySql(_) => StorageKind::MySql,
        }
    }
}

impl AppConfig {
    /// Reads `config.yml` from `data_dir`, writing the defaults first if it does not exist.
    pub fn load_or_create(data_dir: &Path) -> Result<Self, Error> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            let defaults = AppConfig::default();
            std::fs::write(&path, serde_yaml::to_string(&defaults)?)?;
            info!("Wrote default configuration to {}", path.display());
            return Ok(defaults);
        }

        let raw = std::fs::read_to_string(&path)?;
        let config: AppConfig = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.code_name.length == 0 {
            return Err(Error::Config("code_name.length must be at least 1".into()));
        }
        if self.code_name.characters.is_empty() {
            return Err(Error::Config("code_name.characters must not be empty".into()));
        }
        if self.code_name.max_batch_size == 0 {
            return Err(Error::Config("code_name.max_batch_size must be at least 1".into()));
        }
        for (key, minutes) in [
            ("failed_attempts.ban_duration_minutes", self.failed_attempts.ban_duration_minutes),
            ("failed_attempts.reset_duration_minutes", self.failed_attempts.reset_duration_minutes),
        ] {
            if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
                return Err(Error::Config(format!(
                    "{key} must be between 1 and {MAX_DURATION_MINUTES}, got {minutes}"
                )));
            }
        }
        if self.sweep_interval_secs == 0 {
            return Err(Error::Config("sweep_interval_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// The backend named by `storage.mode`.
    pub fn backend(&self, data_dir: &Path) -> BackendSpec {
        self.backend_for(self.storage.mode, data_dir)
    }

    pub fn backend_for(&self, kind: StorageKind, data_dir: &Path) -> BackendSpec {
        match kind {
            StorageKind::File => BackendSpec::File(data_dir.join(&self.storage.file_name)),
            StorageKind::Sqlite => BackendSpec::Sqlite(data_dir.join(&self.storage.sqlite_file)),
            StorageKind::MySql => BackendSpec::MySql(self.storage.mysql.clone()),
        }
    }
}
