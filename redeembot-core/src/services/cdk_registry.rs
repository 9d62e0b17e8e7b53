// redeembot-core/src/services/cdk_registry.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, error, info, warn};

use redeembot_common::models::cdk::{count_codes, truncate_to_minute};
use redeembot_common::models::{Cdk, CodeSet, StorageKind};
use redeembot_common::traits::repository_traits::CodeStore;
use redeembot_common::Error;

use crate::config::CodeNameSettings;

/// Upper bound on random draws before name generation gives up.
const MAX_NAME_ATTEMPTS: usize = 10_000;

/// What `extend_group` did to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupExtension {
    /// Single-use group: new codes cloned from the group's first code.
    Cloned(Vec<String>),
    /// Multi-use group: the first code's quantity was raised.
    Increased { name: String, remaining_uses: u32 },
}

/// What happened to a code after one successful redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionState {
    Removed,
    Remaining(u32),
}

/// The authoritative in-memory code set, backed by one store.
pub struct CodeRegistry {
    codes: CodeSet,
    store: Box<dyn CodeStore>,
    names: CodeNameSettings,
}

impl CodeRegistry {
    /// Loads from `store`. A failed load is logged and the registry starts empty.
    pub async fn open(store: Box<dyn CodeStore>, names: CodeNameSettings) -> Self {
        let codes = match store.load().await {
            Ok(codes) => {
                info!("Loaded {} codes from the {} store", count_codes(&codes), store.kind());
                codes
            }
            Err(e) => {
                error!("Could not load codes from the {} store, starting empty: {}", store.kind(), e);
                CodeSet::new()
            }
        };
        Self { codes, store, names }
    }

    pub fn store_kind(&self) -> StorageKind {
        self.store.kind()
    }

    pub fn store(&self) -> &dyn CodeStore {
        self.store.as_ref()
    }

    pub fn len(&self) -> usize {
        count_codes(&self.codes)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The live code set.
    pub fn get_all(&self) -> &CodeSet {
        &self.codes
    }

    pub async fn persist(&self) -> Result<(), Error> {
        self.store.save(&self.codes).await.map_err(|e| {
            error!("Saving codes to the {} store failed: {}", self.store.kind(), e);
            e
        })
    }

    /// Replaces the in-memory set with a fresh load. On failure the current set is kept.
    pub async fn reload(&mut self) -> Result<usize, Error> {
        let codes = self.store.load().await?;
        self.codes = codes;
        info!("Reloaded {} codes from the {} store", self.len(), self.store.kind());
        Ok(self.len())
    }

    /// Inserts a code and persists. Any code with the same name, in any group, is replaced.
    pub async fn create(
        &mut self,
        group_id: &str,
        name: &str,
        quantity: u32,
        single_use: bool,
        command_template: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Cdk, Error> {
        let cdk = self.insert_new(group_id, name, quantity, single_use, command_template, expires_at)?;
        self.persist().await?;
        info!("Created {}", cdk);
        Ok(cdk)
    }

    /// Creates `count` single-use codes with generated names and persists once.
    pub async fn create_single_batch(
        &mut self,
        group_id: &str,
        count: u32,
        command_template: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Cdk>, Error> {
        self.check_batch_size(count)?;
        let mut created = Vec::new();
        for _ in 0..count {
            let name = self.generate_unique_name()?;
            created.push(self.insert_new(group_id, &name, 1, true, command_template, expires_at)?);
        }
        self.persist().await?;
        info!("Created {} single-use codes in group '{}'", created.len(), group_id);
        Ok(created)
    }

    fn check_batch_size(&self, count: u32) -> Result<(), Error> {
        if count == 0 {
            return Err(Error::UserInput("count must be at least 1".into()));
        }
        if count > self.names.max_batch_size {
            return Err(Error::UserInput(format!(
                "at most {} codes can be generated at once, got {count}",
                self.names.max_batch_size
            )));
        }
        Ok(())
    }

    /// Draws names from the configured alphabet until one is not used by any code.
    pub fn generate_unique_name(&self) -> Result<String, Error> {
        let alphabet: Vec<char> = self.names.characters.chars().collect();
        if alphabet.is_empty() || self.names.length == 0 {
            return Err(Error::Config("code name alphabet and length must be non-empty".into()));
        }

        let mut rng = rand::rng();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let candidate: String = (0..self.names.length)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect();
            if self.find_by_name(&candidate).is_none() {
                return Ok(candidate);
            }
        }
        Err(Error::Config(format!(
            "no free code name after {MAX_NAME_ATTEMPTS} attempts; raise code_name.length"
        )))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Cdk> {
        self.codes.values().find_map(|group| group.get(name))
    }

    fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Cdk> {
        self.codes.values_mut().find_map(|group| group.get_mut(name))
    }

    pub fn find_group(&self, group_id: &str) -> Option<&BTreeMap<String, Cdk>> {
        self.codes.get(group_id)
    }

    pub async fn delete_by_group(&mut self, group_id: &str) -> Result<bool, Error> {
        if self.codes.remove(group_id).is_none() {
            return Ok(false);
        }
        self.persist().await?;
        info!("Deleted group '{}'", group_id);
        Ok(true)
    }

    pub async fn delete_by_name(&mut self, name: &str) -> Result<bool, Error> {
        if self.remove_code(name).is_none() {
            return Ok(false);
        }
        self.persist().await?;
        info!("Deleted CDK '{}'", name);
        Ok(true)
    }

    /// Grows a group by `count`: clones for single-use groups, quantity for multi-use ones.
    pub async fn extend_group(&mut self, group_id: &str, count: u32) -> Result<GroupExtension, Error> {
        if count == 0 {
            return Err(Error::UserInput("count must be at least 1".into()));
        }
        let template = self
            .codes
            .get(group_id)
            .and_then(|group| group.values().next())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("group '{group_id}'")))?;

        let outcome = if template.single_use {
            self.check_batch_size(count)?;
            let mut names = Vec::new();
            for _ in 0..count {
                let name = self.generate_unique_name()?;
                self.insert_new(
                    group_id,
                    &name,
                    1,
                    true,
                    &template.command_template,
                    template.expires_at,
                )?;
                names.push(name);
            }
            GroupExtension::Cloned(names)
        } else {
            let cdk = self
                .find_by_name_mut(&template.name)
                .ok_or_else(|| Error::CodeNotFound(template.name.clone()))?;
            cdk.increase(count);
            GroupExtension::Increased {
                name: cdk.name.clone(),
                remaining_uses: cdk.remaining_uses,
            }
        };

        self.persist().await?;
        debug!("Extended group '{}': {:?}", group_id, outcome);
        Ok(outcome)
    }

    /// Applies one successful redemption by `user` and persists.
    ///
    /// Single-use codes are removed regardless of quantity; multi-use codes are
    /// removed once the decremented quantity hits zero.
    pub async fn apply_redemption(&mut self, name: &str, user: &str) -> Result<RedemptionState, Error> {
        let cdk = self
            .find_by_name_mut(name)
            .ok_or_else(|| Error::CodeNotFound(name.to_string()))?;
        let single_use = cdk.single_use;
        cdk.decrement();
        let remaining = cdk.remaining_uses;
        cdk.record_redemption(user);

        let state = if single_use || remaining == 0 {
            self.remove_code(name);
            RedemptionState::Removed
        } else {
            RedemptionState::Remaining(remaining)
        };
        self.persist().await?;
        Ok(state)
    }

    /// Removes every code expired at `now`, persisting once if anything was removed.
    pub async fn sweep_expired(&mut self, now: DateTime<Utc>) -> Result<usize, Error> {
        let mut removed = 0;
        for group in self.codes.values_mut() {
            let before = group.len();
            group.retain(|_, cdk| !cdk.is_expired(now));
            removed += before - group.len();
        }
        self.codes.retain(|_, group| !group.is_empty());

        if removed > 0 {
            self.persist().await?;
            info!("Expiry sweep removed {} codes", removed);
        }
        Ok(removed)
    }

    fn insert_new(
        &mut self,
        group_id: &str,
        name: &str,
        quantity: u32,
        single_use: bool,
        command_template: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Cdk, Error> {
        if group_id.trim().is_empty() || name.trim().is_empty() {
            return Err(Error::UserInput("group id and code name must not be empty".into()));
        }
        if command_template.trim().is_empty() {
            return Err(Error::UserInput("command template must not be empty".into()));
        }
        let quantity = if single_use { 1 } else { quantity };
        if quantity == 0 {
            return Err(Error::UserInput("quantity must be at least 1".into()));
        }

        if let Some(previous) = self.remove_code(name) {
            warn!("Replacing existing CDK '{}' from group '{}'", name, previous.group_id);
        }
        let cdk = Cdk::new(
            group_id,
            name,
            quantity,
            single_use,
            command_template,
            expires_at.map(truncate_to_minute),
        );
        self.codes
            .entry(group_id.to_string())
            .or_default()
            .insert(name.to_string(), cdk.clone());
        Ok(cdk)
    }

    /// Removes a code without persisting, dropping its group if it becomes empty.
    fn remove_code(&mut self, name: &str) -> Option<Cdk> {
        let group_id = self
            .codes
            .iter()
            .find(|(_, group)| group.contains_key(name))
            .map(|(group_id, _)| group_id.clone())?;
        let group = self.codes.get_mut(&group_id)?;
        let removed = group.remove(name);
        if group.is_empty() {
            self.codes.remove(&group_id);
        }
        removed
    }
}
