// File: redeembot-common/src/traits/repository_traits.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::{CodeSet, StorageKind};

/// Durable load/replace of the entire code set.
///
/// Implementations must make `save` all-or-nothing: a failed save leaves the
/// previous durable state in place.
#[async_trait]
pub trait CodeStore: Send + Sync {
    fn kind(&self) -> StorageKind;

    /// Reads every code, including its redemption set.
    async fn load(&self) -> Result<CodeSet, Error>;

    /// Replaces everything in durable storage with `codes`.
    async fn save(&self, codes: &CodeSet) -> Result<(), Error>;

    /// Releases connections. Safe to call more than once.
    async fn close(&self);
}

/// Append-only per-user redemption history.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, user: &str, line: &str) -> Result<(), Error>;
    async fn entries_for_user(&self, user: &str) -> Result<Vec<String>, Error>;
}
