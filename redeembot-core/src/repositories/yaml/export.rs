// redeembot-core/src/repositories/yaml/export.rs

use std::collections::BTreeMap;
use std::path::Path;

use redeembot_common::models::CodeSet;
use redeembot_common::Error;

use super::write_yaml_atomically;

/// Writes `group -> [code names]` for handing codes out. Returns how many names were written.
pub async fn export_code_names(path: &Path, codes: &CodeSet) -> Result<usize, Error> {
    let listing: BTreeMap<&str, Vec<&str>> = codes
        .iter()
        .filter(|(_, group)| !group.is_empty())
        .map(|(group_id, group)| {
            (group_id.as_str(), group.keys().map(String::as_str).collect())
        })
        .collect();
    let written = listing.values().map(Vec::len).sum();
    write_yaml_atomically(path, &listing).await?;
    Ok(written)
}
