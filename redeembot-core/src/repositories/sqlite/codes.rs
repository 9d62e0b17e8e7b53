// redeembot-core/src/repositories/sqlite/codes.rs

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

use redeembot_common::models::cdk::{count_codes, format_expiry};
use redeembot_common::models::{CodeSet, StorageKind};
use redeembot_common::traits::repository_traits::CodeStore;
use redeembot_common::Error;

use crate::repositories::{attach_redemptions, code_from_columns, insert_code};

/// Embedded single-file store. Tables are unprefixed.
#[derive(Clone)]
pub struct SqliteCodeStore {
    pool: Pool<Sqlite>,
}

impl SqliteCodeStore {
    /// Wraps `pool` and makes sure both tables exist.
    pub async fn new(pool: Pool<Sqlite>) -> Result<Self, Error> {
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn create_tables(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS codes (
                group_id TEXT NOT NULL,
                name TEXT NOT NULL PRIMARY KEY,
                quantity INTEGER NOT NULL,
                single_use BOOLEAN NOT NULL,
                commands TEXT NOT NULL,
                expiration_date TEXT
            )
            "#,
        )
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS redemptions (
                code_name TEXT NOT NULL,
                user_name TEXT NOT NULL,
                PRIMARY KEY (code_name, user_name)
            )
            "#,
        )
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CodeStore for SqliteCodeStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Sqlite
    }

    async fn load(&self) -> Result<CodeSet, Error> {
        let rows = sqlx::query(
            r#"
            SELECT group_id, name, quantity, single_use, commands, expiration_date
            FROM codes
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let mut codes = CodeSet::new();
        for r in rows {
            let cdk = code_from_columns(
                r.try_get("group_id")?,
                r.try_get("name")?,
                r.try_get::<i64, _>("quantity")?,
                r.try_get("single_use")?,
                r.try_get("commands")?,
                r.try_get("expiration_date")?,
            )?;
            insert_code(&mut codes, cdk);
        }

        let pairs = sqlx::query("SELECT code_name, user_name FROM redemptions")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|r| -> Result<(String, String), sqlx::Error> {
                Ok((r.try_get("code_name")?, r.try_get("user_name")?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        attach_redemptions(&mut codes, pairs);

        debug!("Loaded {} codes from SQLite", count_codes(&codes));
        Ok(codes)
    }

    async fn save(&self, codes: &CodeSet) -> Result<(), Error> {
        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM codes").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM redemptions").execute(&mut *tx).await?;

        for cdk in codes.values().flat_map(|group| group.values()) {
            sqlx::query(
                r#"
                INSERT INTO codes (group_id, name, quantity, single_use, commands, expiration_date)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
                .bind(&cdk.group_id)
                .bind(&cdk.name)
                .bind(i64::from(cdk.remaining_uses))
                .bind(cdk.single_use)
                .bind(&cdk.command_template)
                .bind(cdk.expires_at.map(format_expiry))
                .execute(&mut *tx)
                .await?;

            for user in &cdk.redeemed_by {
                sqlx::query("INSERT INTO redemptions (code_name, user_name) VALUES (?, ?)")
                    .bind(&cdk.name)
                    .bind(user)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        debug!("Saved {} codes to SQLite", count_codes(codes));
        Ok(())
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("SQLite code store closed");
        }
    }
}
