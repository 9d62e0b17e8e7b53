// redeembot-core/src/repositories/mysql/codes.rs

use async_trait::async_trait;
use sqlx::{MySql, Pool, Row};
use tracing::{debug, info};

use redeembot_common::models::cdk::{count_codes, format_expiry};
use redeembot_common::models::{CodeSet, StorageKind};
use redeembot_common::traits::repository_traits::CodeStore;
use redeembot_common::Error;

use crate::db::validate_table_prefix;
use crate::repositories::{attach_redemptions, code_from_columns, insert_code};

/// Networked store. Both tables carry the configured prefix.
///
/// Key columns use a binary collation so names and users stay case-sensitive.
#[derive(Clone)]
pub struct MySqlCodeStore {
    pool: Pool<MySql>,
    codes_table: String,
    redemptions_table: String,
}

impl MySqlCodeStore {
    /// Validates `prefix` and creates the tables if they are missing.
    pub async fn new(pool: Pool<MySql>, prefix: &str) -> Result<Self, Error> {
        let store = Self::lazy(pool, prefix)?;
        store.create_tables().await?;
        Ok(store)
    }

    /// Same as [`MySqlCodeStore::new`] without touching the server.
    pub fn lazy(pool: Pool<MySql>, prefix: &str) -> Result<Self, Error> {
        validate_table_prefix(prefix)?;
        Ok(Self {
            pool,
            codes_table: format!("{prefix}codes"),
            redemptions_table: format!("{prefix}redemptions"),
        })
    }

    pub fn codes_table(&self) -> &str {
        &self.codes_table
    }

    async fn create_tables(&self) -> Result<(), Error> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                group_id VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
                name VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL PRIMARY KEY,
                quantity INT NOT NULL,
                single_use BOOLEAN NOT NULL,
                commands TEXT NOT NULL,
                expiration_date VARCHAR(16) NULL
            )
            "#,
            self.codes_table
        ))
            .execute(&self.pool)
            .await?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                code_name VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
                user_name VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
                PRIMARY KEY (code_name, user_name)
            )
            "#,
            self.redemptions_table
        ))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CodeStore for MySqlCodeStore {
    fn kind(&self) -> StorageKind {
        StorageKind::MySql
    }

    async fn load(&self) -> Result<CodeSet, Error> {
        let rows = sqlx::query(&format!(
            "SELECT group_id, name, quantity, single_use, commands, expiration_date FROM {}",
            self.codes_table
        ))
            .fetch_all(&self.pool)
            .await?;

        let mut codes = CodeSet::new();
        for r in rows {
            let cdk = code_from_columns(
                r.try_get("group_id")?,
                r.try_get("name")?,
                i64::from(r.try_get::<i32, _>("quantity")?),
                r.try_get("single_use")?,
                r.try_get("commands")?,
                r.try_get("expiration_date")?,
            )?;
            insert_code(&mut codes, cdk);
        }

        let pairs = sqlx::query(&format!(
            "SELECT code_name, user_name FROM {}",
            self.redemptions_table
        ))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|r| -> Result<(String, String), sqlx::Error> {
                Ok((r.try_get("code_name")?, r.try_get("user_name")?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        attach_redemptions(&mut codes, pairs);

        debug!("Loaded {} codes from MySQL table {}", count_codes(&codes), self.codes_table);
        Ok(codes)
    }

    async fn save(&self, codes: &CodeSet) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {}", self.codes_table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM {}", self.redemptions_table))
            .execute(&mut *tx)
            .await?;

        let insert_code_sql = format!(
            "INSERT INTO {} (group_id, name, quantity, single_use, commands, expiration_date) \
             VALUES (?, ?, ?, ?, ?, ?)",
            self.codes_table
        );
        let insert_redemption_sql = format!(
            "INSERT INTO {} (code_name, user_name) VALUES (?, ?)",
            self.redemptions_table
        );

        for cdk in codes.values().flat_map(|group| group.values()) {
            let quantity = i32::try_from(cdk.remaining_uses).map_err(|_| {
                Error::Storage(format!("code '{}' quantity does not fit the column", cdk.name))
            })?;
            sqlx::query(&insert_code_sql)
                .bind(&cdk.group_id)
                .bind(&cdk.name)
                .bind(quantity)
                .bind(cdk.single_use)
                .bind(&cdk.command_template)
                .bind(cdk.expires_at.map(format_expiry))
                .execute(&mut *tx)
                .await?;

            for user in &cdk.redeemed_by {
                sqlx::query(&insert_redemption_sql)
                    .bind(&cdk.name)
                    .bind(user)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        debug!("Saved {} codes to MySQL table {}", count_codes(codes), self.codes_table);
        Ok(())
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("MySQL code store closed");
        }
    }
}
