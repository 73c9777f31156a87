// Settings service - typed access to the key/value settings table and the
// universe directory.
//
// NO Discord dependencies here. The Discord layer only ever sees typed keys,
// credentials and universes.

use super::settings_models::{Credentials, SettingKey, Universe};
use crate::core::roblox::UniverseId;
use async_trait::async_trait;
use thiserror::Error;

/// Discord caps autocomplete responses at 25 choices.
pub const MAX_AUTOCOMPLETE_CHOICES: usize = 25;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: SettingKey, reason: String },

    #[error("Invalid universe: {0}")]
    InvalidUniverse(String),
}

// ============================================================================
// STORAGE TRAITS (PORTS)
// ============================================================================

/// Key/value settings persistence.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError>;
    async fn set(&self, key: SettingKey, value: &str) -> Result<(), SettingsError>;
    /// Returns whether a value was present.
    async fn clear(&self, key: SettingKey) -> Result<bool, SettingsError>;
}

/// Registered universes, used for autocomplete and appeal display names.
#[async_trait]
pub trait UniverseDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<Universe>, SettingsError>;
    async fn upsert(&self, universe: Universe) -> Result<(), SettingsError>;
    /// Returns whether a universe was removed.
    async fn remove(&self, id: &str) -> Result<bool, SettingsError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct SettingsService<S: SettingsStore + UniverseDirectory> {
    store: S,
}

impl<S: SettingsStore + UniverseDirectory> SettingsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read a setting. Empty strings count as absent.
    pub async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsError> {
        Ok(self
            .store
            .get(key)
            .await?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// Store a setting after basic validation.
    pub async fn set(&self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SettingsError::InvalidValue {
                key,
                reason: "value must not be empty".to_string(),
            });
        }
        if key.is_snowflake() && value.parse::<u64>().map_or(true, |id| id == 0) {
            return Err(SettingsError::InvalidValue {
                key,
                reason: "expected a numeric Discord id".to_string(),
            });
        }
        self.store.set(key, value).await
    }

    pub async fn clear(&self, key: SettingKey) -> Result<bool, SettingsError> {
        self.store.clear(key).await
    }

    /// Both API keys, or `None` when either is missing.
    pub async fn credentials(&self) -> Result<Option<Credentials>, SettingsError> {
        let messaging_key = self.get(SettingKey::MessagingApiKey).await?;
        let datastore_key = self.get(SettingKey::DatastoreApiKey).await?;

        Ok(match (messaging_key, datastore_key) {
            (Some(messaging_key), Some(datastore_key)) => Some(Credentials {
                messaging_key,
                datastore_key,
            }),
            _ => None,
        })
    }

    /// A setting holding a Discord snowflake. Unparseable values are treated
    /// as unset.
    pub async fn snowflake(&self, key: SettingKey) -> Result<Option<u64>, SettingsError> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|id| *id != 0))
    }

    pub async fn log_channel(&self) -> Result<Option<u64>, SettingsError> {
        self.snowflake(SettingKey::LogChannel).await
    }

    /// The appeal channel, falling back to the log channel.
    pub async fn appeal_channel(&self) -> Result<Option<u64>, SettingsError> {
        match self.snowflake(SettingKey::AppealChannel).await? {
            Some(id) => Ok(Some(id)),
            None => self.log_channel().await,
        }
    }

    pub async fn universes(&self) -> Result<Vec<Universe>, SettingsError> {
        self.store.list().await
    }

    pub async fn universe_name(&self, id: &str) -> Result<Option<String>, SettingsError> {
        let id = id.trim();
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .map(|u| u.name))
    }

    pub async fn register_universe(&self, id: &str, name: &str) -> Result<(), SettingsError> {
        let id = id.trim();
        let name = name.trim();
        if UniverseId::parse(id).is_none() {
            return Err(SettingsError::InvalidUniverse(format!(
                "universe id `{}` is not numeric",
                id
            )));
        }
        if name.is_empty() {
            return Err(SettingsError::InvalidUniverse(
                "universe name must not be empty".to_string(),
            ));
        }
        self.store
            .upsert(Universe {
                id: id.to_string(),
                name: name.to_string(),
            })
            .await
    }

    pub async fn remove_universe(&self, id: &str) -> Result<bool, SettingsError> {
        self.store.remove(id.trim()).await
    }

    /// Autocomplete candidates for a partially typed universe name.
    pub async fn autocomplete_universes(
        &self,
        partial: &str,
    ) -> Result<Vec<Universe>, SettingsError> {
        let universes = self.store.list().await?;
        Ok(filter_by_prefix(universes, partial))
    }
}

/// Case-insensitive prefix match on universe names, capped at the Discord limit.
pub fn filter_by_prefix(universes: Vec<Universe>, partial: &str) -> Vec<Universe> {
    let needle = partial.to_lowercase();
    universes
        .into_iter()
        .filter(|u| u.name.to_lowercase().starts_with(&needle))
        .take(MAX_AUTOCOMPLETE_CHOICES)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
