// redeembot-core/src/repositories/yaml/mod.rs

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use redeembot_common::Error;

pub mod codes;
pub mod audit_log;
pub mod lockouts;
pub mod export;

/// Reads a YAML document, treating a missing or blank file as `T::default()`.
pub(crate) async fn read_yaml_or_default<T>(path: &Path) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_str(&raw)?)
}

/// Writes to a sibling temp file and renames it over `path`, so readers never
/// observe a half-written document.
pub(crate) async fn write_yaml_atomically<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let rendered = serde_yaml::to_string(value)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = temp_path_for(path);
    tokio::fs::write(&tmp, rendered).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
