// File: redeembot-common/src/models/migration.rs

use crate::models::storage::StorageKind;

/// Result of copying the full code set from one backend to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Number of codes written to the target.
    Migrated(usize),
    /// Direction is not supported; neither side was touched.
    Unsupported { source: StorageKind, target: StorageKind },
}
