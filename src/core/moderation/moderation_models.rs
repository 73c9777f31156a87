// Moderation domain models - requests, views and outcomes of the
// confirm -> dispatch -> report workflow.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer turns `ModerationView`s into embeds.

use crate::core::roblox::{
    BanLength, DatastoreError, ModerationRecord, PublishError, RecordMethod, RobloxUser,
};
use thiserror::Error;

/// How long a ban lasts, e.g. `7day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanDuration {
    pub amount: i64,
    pub unit: BanLength,
}

impl std::fmt::Display for BanDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.unit)
    }
}

/// The four actions that go through confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Kick,
    Warn,
    Ban(BanDuration),
    Unban,
}

/// Where an action is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    /// Messaging-service publish. Needs the server online.
    Ephemeral,
    /// Datastore entry read by the server on player join.
    Durable,
}

impl ActionKind {
    pub fn title(&self) -> &'static str {
        match self {
            ActionKind::Kick => "Kick",
            ActionKind::Warn => "Warn",
            ActionKind::Ban(_) => "Ban",
            ActionKind::Unban => "Unban",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Kick => "kick",
            ActionKind::Warn => "warn",
            ActionKind::Ban(_) => "ban",
            ActionKind::Unban => "unban",
        }
    }

    pub fn delivery(&self) -> DeliveryPath {
        match self {
            ActionKind::Kick | ActionKind::Warn => DeliveryPath::Ephemeral,
            ActionKind::Ban(_) | ActionKind::Unban => DeliveryPath::Durable,
        }
    }

    pub fn method(&self) -> RecordMethod {
        match self {
            ActionKind::Kick => RecordMethod::Kick,
            ActionKind::Warn => RecordMethod::Warn,
            ActionKind::Ban(_) => RecordMethod::Ban,
            ActionKind::Unban => RecordMethod::Unban,
        }
    }

    pub fn duration(&self) -> Option<BanDuration> {
        match self {
            ActionKind::Ban(duration) => Some(*duration),
            _ => None,
        }
    }
}

/// An in-flight proposal. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationRequest {
    pub action: ActionKind,
    /// The player exactly as the administrator typed it.
    pub player: String,
    /// Absent for unban.
    pub reason: Option<String>,
    pub universe_id: String,
    pub requested_by: u64,
}

impl ModerationRequest {
    /// Build the record for a resolved target. `now` is a unix timestamp,
    /// stamped on bans only.
    pub fn record(&self, target: &RobloxUser, now: i64) -> ModerationRecord {
        match self.action {
            ActionKind::Unban => ModerationRecord::unban(target.id),
            ActionKind::Ban(duration) => ModerationRecord {
                method: RecordMethod::Ban,
                message: self.reason.clone(),
                time: Some(duration.amount),
                length: Some(duration.unit),
                player: target.id,
                timestamp: Some(now),
            },
            ActionKind::Kick | ActionKind::Warn => ModerationRecord {
                method: self.action.method(),
                message: self.reason.clone(),
                time: None,
                length: None,
                player: target.id,
                timestamp: None,
            },
        }
    }

    pub fn audit_entry(&self) -> AuditEntry {
        AuditEntry {
            requested_by: self.requested_by,
            action: self.action,
            player: self.player.clone(),
            reason: self.reason.clone(),
            universe_id: self.universe_id.clone(),
        }
    }
}

/// What goes to the log channel after an action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub requested_by: u64,
    pub action: ActionKind,
    pub player: String,
    pub reason: Option<String>,
    pub universe_id: String,
}

impl AuditEntry {
    /// One-line summary, e.g. `Ban Builderman spamming 7day`.
    pub fn describe(&self) -> String {
        let mut parts = vec![self.action.title().to_string(), self.player.clone()];
        if let Some(reason) = &self.reason {
            parts.push(reason.clone());
        }
        if let Some(duration) = self.action.duration() {
            parts.push(duration.to_string());
        }
        format!("{} (universe {})", parts.join(" "), self.universe_id)
    }
}

/// Failure of the single external call made for an approved action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

/// Everything the surface is asked to show, in workflow order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationView {
    /// API keys are not configured.
    ConfigMissing,
    /// The server option was not a numeric universe id.
    InvalidUniverse {
        universe_id: String,
    },
    PlayerNotFound,
    LookupFailed,
    /// The confirmation prompt. Later views edit it in place.
    Prompt {
        action: ActionKind,
        player: String,
        reason: Option<String>,
        avatar_url: Option<String>,
    },
    Cancelled {
        action: ActionKind,
    },
    TimedOut,
    /// Sent as a follow-up; the prompt is left as is.
    CollectionFailed,
    Outcome {
        action: ActionKind,
        target: RobloxUser,
        avatar_url: Option<String>,
        error: Option<String>,
    },
    Shutdown {
        universe_id: String,
        error: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    NotFound,
    Error(String),
}

/// Terminal state of one workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationOutcome {
    ConfigMissing,
    InvalidUniverse,
    ValidationFailed(ValidationFailure),
    Cancelled,
    TimedOut,
    CollectionFailed(String),
    Completed {
        target: RobloxUser,
        error: Option<String>,
    },
}
