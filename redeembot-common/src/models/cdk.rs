// File: redeembot-common/src/models/cdk.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Format every backend uses for `expires_at` (always UTC).
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The full code set, keyed by group id then code name.
pub type CodeSet = BTreeMap<String, BTreeMap<String, Cdk>>;

/// One redeemable code ("CDK").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cdk {
    pub group_id: String,
    pub name: String,
    pub remaining_uses: u32,
    pub single_use: bool,
    /// `|`-separated command strings, `%player%` is replaced on redemption.
    pub command_template: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub redeemed_by: BTreeSet<String>,
}

impl Cdk {
    pub fn new(
        group_id: &str,
        name: &str,
        remaining_uses: u32,
        single_use: bool,
        command_template: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            group_id: group_id.to_string(),
            name: name.to_string(),
            remaining_uses,
            single_use,
            command_template: command_template.to_string(),
            expires_at,
            redeemed_by: BTreeSet::new(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }

    pub fn has_redeemed(&self, user: &str) -> bool {
        self.redeemed_by.contains(user)
    }

    pub fn record_redemption(&mut self, user: &str) {
        self.redeemed_by.insert(user.to_string());
    }

    /// Never goes below zero. Removing an exhausted code is the registry's job.
    pub fn decrement(&mut self) {
        self.remaining_uses = self.remaining_uses.saturating_sub(1);
    }

    pub fn increase(&mut self, amount: u32) {
        self.remaining_uses = self.remaining_uses.saturating_add(amount);
    }

    /// The individual commands with `%player%` substituted.
    pub fn render_commands(&self, user: &str) -> Vec<String> {
        self.command_template
            .split('|')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| fragment.replace("%player%", user))
            .collect()
    }

    pub fn expiry_label(&self) -> String {
        match self.expires_at {
            Some(at) => format_expiry(at),
            None => "never".to_string(),
        }
    }
}

impl fmt::Display for Cdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CDK group: {}, name: {}, remaining: {}, type: {}, expires: {}",
            self.group_id,
            self.name,
            self.remaining_uses,
            if self.single_use { "single-use" } else { "multi-use" },
            self.expiry_label()
        )
    }
}

pub fn format_expiry(at: DateTime<Utc>) -> String {
    at.format(EXPIRY_FORMAT).to_string()
}

/// Parses `yyyy-mm-dd HH:MM` as UTC.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, chrono::format::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), EXPIRY_FORMAT).map(|naive| naive.and_utc())
}

/// Expirations are stored with minute precision, so anything finer is dropped up front.
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(TimeDelta::minutes(1)).unwrap_or(at)
}

/// Total number of codes across all groups.
pub fn count_codes(codes: &CodeSet) -> usize {
    codes.values().map(|group| group.len()).sum()
}
