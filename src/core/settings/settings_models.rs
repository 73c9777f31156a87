// Settings domain models.
//
// Rows are plain (id, name) pairs in storage; `SettingKey` gives the ids a
// typed face so the rest of the code never spells raw key strings.

use serde::{Deserialize, Serialize};

/// Every setting the workflows know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// API key for the messaging-service (kick, warn, shutdown).
    MessagingApiKey,
    /// API key for the datastore API (ban, unban, appeals).
    DatastoreApiKey,
    /// Channel that receives the "Command Executed" audit embeds.
    LogChannel,
    /// Channel appeals are posted to. Falls back to `LogChannel`.
    AppealChannel,
    /// Role allowed to vote on appeals. Unset means any non-bot member.
    AppealReviewerRole,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::MessagingApiKey,
        SettingKey::DatastoreApiKey,
        SettingKey::LogChannel,
        SettingKey::AppealChannel,
        SettingKey::AppealReviewerRole,
    ];

    /// The id column value used in the settings table.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::MessagingApiKey => "msgServAPIKey",
            SettingKey::DatastoreApiKey => "datastoreAPIKey",
            SettingKey::LogChannel => "logChannel",
            SettingKey::AppealChannel => "appealChannel",
            SettingKey::AppealReviewerRole => "appealReviewerRole",
        }
    }

    /// Human label for admin output.
    pub fn label(&self) -> &'static str {
        match self {
            SettingKey::MessagingApiKey => "Messaging API Key",
            SettingKey::DatastoreApiKey => "Datastore API Key",
            SettingKey::LogChannel => "Log Channel",
            SettingKey::AppealChannel => "Appeal Channel",
            SettingKey::AppealReviewerRole => "Appeal Reviewer Role",
        }
    }

    /// Secrets are masked whenever settings are echoed back to Discord.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            SettingKey::MessagingApiKey | SettingKey::DatastoreApiKey
        )
    }

    /// Keys that hold Discord snowflakes must parse as one.
    pub fn is_snowflake(&self) -> bool {
        matches!(
            self,
            SettingKey::LogChannel | SettingKey::AppealChannel | SettingKey::AppealReviewerRole
        )
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered Roblox universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    pub id: String,
    pub name: String,
}

/// Both API keys, fetched together because every moderation action needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub messaging_key: String,
    pub datastore_key: String,
}

/// Mask an API key for display: keep the last four characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
