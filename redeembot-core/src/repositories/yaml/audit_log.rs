// redeembot-core/src/repositories/yaml/audit_log.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use redeembot_common::traits::repository_traits::AuditLogRepository;
use redeembot_common::Error;

use super::{read_yaml_or_default, write_yaml_atomically};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserHistory {
    #[serde(default)]
    used: Vec<String>,
}

/// `log.yml`: `<user>: { used: [ ... ] }`.
pub struct YamlAuditLogRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl YamlAuditLogRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl AuditLogRepository for YamlAuditLogRepository {
    async fn append(&self, user: &str, line: &str) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let mut document: BTreeMap<String, UserHistory> = read_yaml_or_default(&self.path).await?;
        document
            .entry(user.to_string())
            .or_default()
            .used
            .push(line.to_string());
        write_yaml_atomically(&self.path, &document).await
    }

    async fn entries_for_user(&self, user: &str) -> Result<Vec<String>, Error> {
        let _guard = self.lock.lock().await;
        let mut document: BTreeMap<String, UserHistory> = read_yaml_or_default(&self.path).await?;
        Ok(document.remove(user).map(|h| h.used).unwrap_or_default())
    }
}
