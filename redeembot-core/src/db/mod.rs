// redeembot-core/src/db/mod.rs

use std::path::Path;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use redeembot_common::Error;

use crate::config::MySqlSettings;

/// Opens (creating if needed) a single-file SQLite database.
pub async fn connect_sqlite(path: &Path) -> Result<SqlitePool, Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    info!("Connecting to SQLite database at: {}", path.display());
    // One connection keeps every statement of a save on the same handle.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    info!("Connected to SQLite database!");
    Ok(pool)
}

pub fn mysql_options(settings: &MySqlSettings) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.username)
        .password(&settings.password)
        .database(&settings.database)
}

pub async fn connect_mysql(settings: &MySqlSettings) -> Result<MySqlPool, Error> {
    info!("Connecting to MySQL at {}", settings.target());
    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .connect_with(mysql_options(settings))
        .await?;
    info!("Connected to MySQL!");
    Ok(pool)
}

/// Builds a pool that only connects on first use.
pub fn connect_mysql_lazy(settings: &MySqlSettings) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(5)
        .connect_lazy_with(mysql_options(settings))
}

/// Table prefixes are spliced into SQL text, so only `[A-Za-z0-9_]` is allowed.
pub fn validate_table_prefix(prefix: &str) -> Result<(), Error> {
    if prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "table prefix '{prefix}' may only contain letters, digits and '_'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_prefix() {
        assert!(validate_table_prefix("").is_ok());
        assert!(validate_table_prefix("cdk_").is_ok());
        assert!(validate_table_prefix("Tenant42_").is_ok());
        assert!(validate_table_prefix("x; DROP TABLE y").is_err());
        assert!(validate_table_prefix("a-b").is_err());
    }
}
