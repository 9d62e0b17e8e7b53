// redeembot-core/src/repositories/mod.rs

use std::collections::BTreeMap;

use tracing::warn;

use redeembot_common::models::cdk::parse_expiry;
use redeembot_common::models::{Cdk, CodeSet};
use redeembot_common::traits::repository_traits::CodeStore;
use redeembot_common::Error;

use crate::config::BackendSpec;

pub mod yaml;
pub mod sqlite;
pub mod mysql;

pub use self::yaml::codes::YamlCodeStore;
pub use self::yaml::audit_log::YamlAuditLogRepository;
pub use self::sqlite::codes::SqliteCodeStore;
pub use self::mysql::codes::MySqlCodeStore;

/// Opens the store described by `spec`, creating files or tables as needed.
pub async fn open_store(spec: &BackendSpec) -> Result<Box<dyn CodeStore>, Error> {
    let store: Box<dyn CodeStore> = match spec {
        BackendSpec::File(path) => Box::new(YamlCodeStore::new(path.clone())),
        BackendSpec::Sqlite(path) => {
            let pool = crate::db::connect_sqlite(path).await?;
            Box::new(SqliteCodeStore::new(pool).await?)
        }
        BackendSpec::MySql(settings) => {
            let pool = crate::db::connect_mysql(settings).await?;
            Box::new(MySqlCodeStore::new(pool, &settings.table_prefix).await?)
        }
    };
    Ok(store)
}

/// Builds a code from the column values the relational stores keep.
pub(crate) fn code_from_columns(
    group_id: String,
    name: String,
    quantity: i64,
    single_use: bool,
    commands: String,
    expiration: Option<String>,
) -> Result<Cdk, Error> {
    let remaining_uses = u32::try_from(quantity).map_err(|_| {
        Error::Storage(format!("code '{name}' has an invalid quantity {quantity}"))
    })?;
    let expires_at = match expiration.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_expiry(raw).map_err(|e| {
            Error::Storage(format!("code '{name}' has an unreadable expiration '{raw}': {e}"))
        })?),
    };
    Ok(Cdk::new(&group_id, &name, remaining_uses, single_use, &commands, expires_at))
}

/// Inserts a loaded code, attaching it to its group.
pub(crate) fn insert_code(codes: &mut CodeSet, cdk: Cdk) {
    codes
        .entry(cdk.group_id.clone())
        .or_default()
        .insert(cdk.name.clone(), cdk);
}

/// Applies `(code_name, user)` rows to the codes they belong to.
pub(crate) fn attach_redemptions(codes: &mut CodeSet, pairs: Vec<(String, String)>) {
    let index: BTreeMap<String, String> = codes
        .iter()
        .flat_map(|(group_id, group)| {
            group.keys().map(move |name| (name.clone(), group_id.clone()))
        })
        .collect();

    for (code_name, user) in pairs {
        let target = index
            .get(&code_name)
            .and_then(|group_id| codes.get_mut(group_id))
            .and_then(|group| group.get_mut(&code_name));
        match target {
            Some(cdk) => cdk.record_redemption(&user),
            None => warn!("Ignoring redemption row for unknown code '{}'", code_name),
        }
    }
}
