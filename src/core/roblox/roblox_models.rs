// Roblox domain models - players, moderation records and API error mapping.
//
// These are pure types. The HTTP client in infra/ fills them in; the
// workflows in core/ consume them.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Topic the game servers subscribe to on the messaging-service.
pub const MESSAGING_TOPIC: &str = "DTR";
/// Datastore the game servers read moderation records from on join.
pub const DATASTORE_NAME: &str = "DTR_Production001";
/// Body the messaging-service returns when the payload exceeds its limit.
pub const MESSAGE_TOO_LONG_BODY: &str =
    "requestMessage cannot be longer than 1024 characters. (Parameter 'requestMessage')";

/// A numeric universe id. The only form a universe id takes on its way into
/// an Open Cloud URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniverseId(u64);

impl UniverseId {
    /// Digits only. Anything else (paths, query strings, blanks) is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        trimmed.parse::<u64>().ok().map(UniverseId)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UniverseId {
    fn from(id: u64) -> Self {
        UniverseId(id)
    }
}

impl std::fmt::Display for UniverseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an administrator referred to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerIdentifier {
    Username(String),
    UserId(u64),
}

impl PlayerIdentifier {
    /// Numeric input is a user id, anything else is a username.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u64>() {
            Ok(id) => PlayerIdentifier::UserId(id),
            Err(_) => PlayerIdentifier::Username(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for PlayerIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerIdentifier::Username(name) => write!(f, "{}", name),
            PlayerIdentifier::UserId(id) => write!(f, "{}", id),
        }
    }
}

/// A player resolved against the Roblox identity API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobloxUser {
    pub id: u64,
    pub name: String,
}

/// The three outcomes of a player lookup. Callers must treat them distinctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerLookup {
    Found(RobloxUser),
    NotFound,
    /// Transport or decoding failure, with a human-readable message.
    Failed(String),
}

/// Unit of a timed ban, serialized with the short codes the game expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BanLength {
    #[serde(rename = "mi")]
    Minute,
    #[serde(rename = "hr")]
    Hour,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "wk")]
    Week,
    #[serde(rename = "mo")]
    Month,
    #[serde(rename = "yr")]
    Year,
}

impl BanLength {
    pub fn code(&self) -> &'static str {
        match self {
            BanLength::Minute => "mi",
            BanLength::Hour => "hr",
            BanLength::Day => "day",
            BanLength::Week => "wk",
            BanLength::Month => "mo",
            BanLength::Year => "yr",
        }
    }
}

impl std::fmt::Display for BanLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The `Method` field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordMethod {
    Kick,
    Warn,
    Ban,
    Unban,
    Shutdown,
}

/// A moderation record as the game server reads it. Field order is the wire
/// order and must not change: the datastore digest is computed over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModerationRecord {
    pub method: RecordMethod,
    pub message: Option<String>,
    pub time: Option<i64>,
    pub length: Option<BanLength>,
    pub player: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<i64>,
}

impl ModerationRecord {
    pub fn unban(player: u64) -> Self {
        Self {
            method: RecordMethod::Unban,
            message: None,
            time: None,
            length: None,
            player,
            timestamp: None,
        }
    }
}

/// Payload telling every live server of a universe to shut down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShutdownSignal {
    pub method: RecordMethod,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self {
            method: RecordMethod::Shutdown,
        }
    }
}

/// A serialized datastore entry and the digest sent alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreEntry {
    pub body: String,
    pub content_md5: String,
}

impl DatastoreEntry {
    /// Serialize once; the digest covers exactly the bytes that are sent.
    pub fn encode(record: &ModerationRecord) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(record)?;
        let content_md5 = content_md5(body.as_bytes());
        Ok(Self { body, content_md5 })
    }
}

/// Base64 (standard, padded) of the MD5 of `bytes`.
pub fn content_md5(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    BASE64.encode(digest)
}

// ============================================================================
// ERRORS
// ============================================================================

/// Messaging-service failures, worded for the outcome embed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("API key not valid for operation, user does not have authorization")]
    Unauthorized,
    #[error("Publish is not allowed on the universe.")]
    Forbidden,
    #[error("The request message cannot be longer than 1024 characters.")]
    MessageTooLong,
    #[error("Bad request.")]
    BadRequest,
    #[error("Server internal error / Unknown error.")]
    ServerError,
    #[error("An unknown issue has occurred.")]
    Unknown,
    #[error("Error with messageService API | {0}")]
    Transport(String),
    #[error("Failed to encode message: {0}")]
    Encode(String),
}

impl PublishError {
    /// Map a messaging-service response. Only HTTP 200 counts as delivered.
    pub fn check_response(status: u16, body: &str) -> Result<(), PublishError> {
        match status {
            200 => Ok(()),
            401 => Err(PublishError::Unauthorized),
            403 => Err(PublishError::Forbidden),
            400 if body.trim() == MESSAGE_TOO_LONG_BODY => Err(PublishError::MessageTooLong),
            400 => Err(PublishError::BadRequest),
            500 => Err(PublishError::ServerError),
            _ => Err(PublishError::Unknown),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatastoreError {
    #[error("Error with datastore API | {0}")]
    Transport(String),
    #[error("Error with datastore API | status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to encode datastore entry: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_id_accepts_digits_only() {
        assert_eq!(UniverseId::parse(" 4242 ").map(|u| u.get()), Some(4242));
        assert_eq!(UniverseId::parse(""), None);
        assert_eq!(UniverseId::parse("+4242"), None);
        assert_eq!(UniverseId::parse("4242/standard-datastores"), None);
        assert_eq!(
            UniverseId::parse(
                "4242/standard-datastores/datastore/entries/entry?datastoreName=Other&entryKey=1#"
            ),
            None
        );
        assert_eq!(UniverseId::parse("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(
            PlayerIdentifier::parse("123456"),
            PlayerIdentifier::UserId(123456)
        );
        assert_eq!(
            PlayerIdentifier::parse(" Builderman "),
            PlayerIdentifier::Username("Builderman".to_string())
        );
        assert_eq!(
            PlayerIdentifier::parse("-5"),
            PlayerIdentifier::Username("-5".to_string())
        );
    }

    #[test]
    fn test_ban_record_wire_format() {
        let record = ModerationRecord {
            method: RecordMethod::Ban,
            message: Some("spamming".to_string()),
            time: Some(7),
            length: Some(BanLength::Day),
            player: 123456,
            timestamp: Some(1_700_000_000),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Method":"Ban","Message":"spamming","Time":7,"Length":"day","Player":123456,"Timestamp":1700000000}"#
        );
    }

    #[test]
    fn test_unban_record_omits_timestamp() {
        let json = serde_json::to_string(&ModerationRecord::unban(42)).unwrap();
        assert_eq!(
            json,
            r#"{"Method":"Unban","Message":null,"Time":null,"Length":null,"Player":42}"#
        );
    }

    #[test]
    fn test_shutdown_signal_wire_format() {
        let json = serde_json::to_string(&ShutdownSignal::default()).unwrap();
        assert_eq!(json, r#"{"Method":"Shutdown"}"#);
    }

    #[test]
    fn test_content_md5_known_value() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[test]
    fn test_entry_digest_matches_body() {
        let entry = DatastoreEntry::encode(&ModerationRecord::unban(7)).unwrap();
        assert_eq!(entry.content_md5, content_md5(entry.body.as_bytes()));

        // Same logical record, same bytes, same digest.
        let again = DatastoreEntry::encode(&ModerationRecord::unban(7)).unwrap();
        assert_eq!(entry, again);

        let decoded: ModerationRecord = serde_json::from_str(&entry.body).unwrap();
        assert_eq!(
            DatastoreEntry::encode(&decoded).unwrap().content_md5,
            entry.content_md5
        );
    }

    #[test]
    fn test_publish_status_mapping() {
        assert_eq!(PublishError::check_response(200, ""), Ok(()));
        assert_eq!(
            PublishError::check_response(401, ""),
            Err(PublishError::Unauthorized)
        );
        assert_eq!(
            PublishError::check_response(403, "").unwrap_err().to_string(),
            "Publish is not allowed on the universe."
        );
        assert_eq!(
            PublishError::check_response(400, MESSAGE_TOO_LONG_BODY),
            Err(PublishError::MessageTooLong)
        );
        assert_eq!(
            PublishError::check_response(400, "nope"),
            Err(PublishError::BadRequest)
        );
        assert_eq!(
            PublishError::check_response(500, ""),
            Err(PublishError::ServerError)
        );
        assert_eq!(
            PublishError::check_response(204, ""),
            Err(PublishError::Unknown)
        );
        assert_eq!(
            PublishError::check_response(429, ""),
            Err(PublishError::Unknown)
        );
    }
}
