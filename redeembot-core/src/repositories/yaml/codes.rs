// redeembot-core/src/repositories/yaml/codes.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use redeembot_common::models::cdk::{count_codes, format_expiry, parse_expiry};
use redeembot_common::models::{Cdk, CodeSet, StorageKind};
use redeembot_common::traits::repository_traits::CodeStore;
use redeembot_common::Error;

use super::{read_yaml_or_default, write_yaml_atomically};

/// One code as it appears in `cdk.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlCdkEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: i64,
    #[serde(default)]
    single: bool,
    #[serde(default)]
    commands: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiration: Option<String>,
    #[serde(rename = "redeemedPlayers", default)]
    redeemed_players: Vec<String>,
}

type YamlDocument = BTreeMap<String, BTreeMap<String, YamlCdkEntry>>;

/// Keeps every code in one YAML file nested by group then name.
pub struct YamlCodeStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlCodeStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }
}

fn entry_to_code(group_id: &str, key: &str, entry: YamlCdkEntry) -> Result<Cdk, Error> {
    let name = entry.name.unwrap_or_else(|| key.to_string());
    if name != key {
        warn!("Code stored under key '{}' in group '{}' is named '{}'", key, group_id, name);
    }
    let remaining_uses = u32::try_from(entry.quantity).map_err(|_| {
        Error::Storage(format!("code '{name}' has an invalid quantity {}", entry.quantity))
    })?;
    let expires_at = match entry.expiration.as_deref() {
        None => None,
        Some(raw) => Some(parse_expiry(raw).map_err(|e| {
            Error::Storage(format!("code '{name}' has an unreadable expiration '{raw}': {e}"))
        })?),
    };

    let mut cdk = Cdk::new(group_id, &name, remaining_uses, entry.single, &entry.commands, expires_at);
    for user in entry.redeemed_players {
        cdk.record_redemption(&user);
    }
    Ok(cdk)
}

fn code_to_entry(cdk: &Cdk) -> YamlCdkEntry {
    YamlCdkEntry {
        name: Some(cdk.name.clone()),
        quantity: i64::from(cdk.remaining_uses),
        single: cdk.single_use,
        commands: cdk.command_template.clone(),
        expiration: cdk.expires_at.map(format_expiry),
        redeemed_players: cdk.redeemed_by.iter().cloned().collect(),
    }
}

#[async_trait]
impl CodeStore for YamlCodeStore {
    fn kind(&self) -> StorageKind {
        StorageKind::File
    }

    async fn load(&self) -> Result<CodeSet, Error> {
        let document: YamlDocument = read_yaml_or_default(&self.path).await?;

        let mut codes = CodeSet::new();
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for (group_id, entries) in document {
            for (key, entry) in entries {
                let cdk = entry_to_code(&group_id, &key, entry)?;
                if let Some(first_group) = seen.get(&cdk.name) {
                    warn!(
                        "Skipping duplicate code '{}' in group '{}'; already loaded from group '{}'",
                        cdk.name, group_id, first_group
                    );
                    continue;
                }
                seen.insert(cdk.name.clone(), group_id.clone());
                crate::repositories::insert_code(&mut codes, cdk);
            }
        }
        debug!("Loaded {} codes from {}", count_codes(&codes), self.path.display());
        Ok(codes)
    }

    async fn save(&self, codes: &CodeSet) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;

        let document: YamlDocument = codes
            .iter()
            .filter(|(_, group)| !group.is_empty())
            .map(|(group_id, group)| {
                let entries = group
                    .values()
                    .map(|cdk| (cdk.name.clone(), code_to_entry(cdk)))
                    .collect();
                (group_id.clone(), entries)
            })
            .collect();

        write_yaml_atomically(&self.path, &document).await?;
        debug!("Saved {} codes to {}", count_codes(codes), self.path.display());
        Ok(())
    }

    async fn close(&self) {
        info!("YAML code store at {} closed", self.path.display());
    }
}
