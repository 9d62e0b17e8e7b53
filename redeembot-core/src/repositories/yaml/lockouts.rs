// redeembot-core/src/repositories/yaml/lockouts.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use redeembot_common::Error;

use super::{read_yaml_or_default, write_yaml_atomically};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LockoutDocument {
    /// user -> unban time in epoch milliseconds
    #[serde(default)]
    banned_players: BTreeMap<String, i64>,
}

/// Persists active redemption bans in `failed_attempts.yml`.
pub struct YamlLockoutRepository {
    path: PathBuf,
}

impl YamlLockoutRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn load_bans(&self) -> Result<BTreeMap<String, DateTime<Utc>>, Error> {
        let document: LockoutDocument = read_yaml_or_default(&self.path).await?;
        Ok(document
            .banned_players
            .into_iter()
            .filter_map(|(user, millis)| {
                DateTime::<Utc>::from_timestamp_millis(millis).map(|until| (user, until))
            })
            .collect())
    }

    pub async fn save_bans(&self, bans: &BTreeMap<String, DateTime<Utc>>) -> Result<(), Error> {
        let document = LockoutDocument {
            banned_players: bans
                .iter()
                .map(|(user, until)| (user.clone(), until.timestamp_millis()))
                .collect(),
        };
        write_yaml_atomically(&self.path, &document).await
    }
}
