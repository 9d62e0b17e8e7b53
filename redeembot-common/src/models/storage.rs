// File: redeembot-common/src/models/storage.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which persistence backend a store (or a config entry) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Hierarchical YAML file.
    File,
    /// Embedded single-file SQLite database.
    Sqlite,
    /// Networked MySQL server.
    #[serde(rename = "mysql")]
    MySql,
}

impl StorageKind {
    pub fn is_relational(self) -> bool {
        matches!(self, StorageKind::Sqlite | StorageKind::MySql)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::File => "file",
            StorageKind::Sqlite => "sqlite",
            StorageKind::MySql => "mysql",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "yaml" | "yml" => Ok(StorageKind::File),
            "sqlite" | "embedded-sql" => Ok(StorageKind::Sqlite),
            "mysql" | "networked-sql" => Ok(StorageKind::MySql),
            other => Err(format!("Unknown storage mode '{other}' (expected file, sqlite or mysql)")),
        }
    }
}
