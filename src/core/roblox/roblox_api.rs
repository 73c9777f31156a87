use super::roblox_models::{
    DatastoreEntry, DatastoreError, PlayerIdentifier, PlayerLookup, PublishError, UniverseId,
};
use async_trait::async_trait;

/// The Roblox calls the workflows need. Implemented over HTTP in infra/.
///
/// API keys are passed per call: they live in the settings table and are
/// read fresh for every workflow.
#[async_trait]
pub trait RobloxApi: Send + Sync {
    /// Resolve a username or user id.
    async fn validate_player(&self, identifier: &PlayerIdentifier) -> PlayerLookup;

    /// Headshot for decoration only. Any failure yields `None`.
    async fn avatar_url(&self, user_id: u64) -> Option<String>;

    /// Publish `message` (already JSON-encoded) to live servers of a universe.
    async fn publish_message(
        &self,
        api_key: &str,
        universe_id: UniverseId,
        topic: &str,
        message: &str,
    ) -> Result<(), PublishError>;

    /// Write a durable entry keyed by the player's user id. Returns the
    /// stored entry as the API reports it.
    async fn write_datastore_entry(
        &self,
        api_key: &str,
        universe_id: UniverseId,
        player_id: u64,
        entry: &DatastoreEntry,
    ) -> Result<serde_json::Value, DatastoreError>;
}
