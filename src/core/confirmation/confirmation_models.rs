use std::time::Duration;
use thiserror::Error;

/// Moderation prompts are answered within a minute or not at all.
pub const MODERATION_WINDOW: Duration = Duration::from_secs(60);

/// A pair of opposing reaction affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationEmoji {
    pub approve: &'static str,
    pub deny: &'static str,
}

/// 👍 / 👎 on moderation prompts.
pub const MODERATION_EMOJI: ConfirmationEmoji = ConfirmationEmoji {
    approve: "👍",
    deny: "👎",
};

/// ✅ / ❌ on appeal applications.
pub const APPEAL_EMOJI: ConfirmationEmoji = ConfirmationEmoji {
    approve: "✅",
    deny: "❌",
};

impl ConfirmationEmoji {
    pub fn decision_for(&self, emoji: &str) -> Option<Decision> {
        if emoji == self.approve {
            Some(Decision::Approve)
        } else if emoji == self.deny {
            Some(Decision::Deny)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Deny,
}

/// Whoever reacted, reduced to what the qualification rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: u64,
    pub is_bot: bool,
    pub role_ids: Vec<u64>,
}

/// Who is allowed to answer a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Responder {
    /// Only this user (the requesting administrator).
    User(u64),
    /// Staff review: anyone but the submitter, optionally limited to a role.
    Reviewer {
        submitter: u64,
        required_role: Option<u64>,
    },
}

impl Responder {
    pub fn accepts(&self, actor: &Actor) -> bool {
        if actor.is_bot {
            return false;
        }
        match self {
            Responder::User(user_id) => actor.user_id == *user_id,
            Responder::Reviewer {
                submitter,
                required_role,
            } => {
                actor.user_id != *submitter
                    && required_role.map_or(true, |role| actor.role_ids.contains(&role))
            }
        }
    }
}

/// Everything a surface needs to collect one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub emoji: ConfirmationEmoji,
    pub responder: Responder,
    /// `None` waits until someone answers.
    pub window: Option<Duration>,
}

impl ConfirmationRequest {
    /// The single predicate a reaction must pass to end the wait.
    /// Anything else is ignored and does not use up the one answer.
    pub fn qualifies(&self, emoji: &str, actor: &Actor) -> Option<Decision> {
        if !self.responder.accepts(actor) {
            return None;
        }
        self.emoji.decision_for(emoji)
    }
}

/// How a wait for confirmation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Decided { decision: Decision, actor_id: u64 },
    TimedOut,
    /// The collector failed for a reason other than the deadline.
    Failed(String),
}

/// Rendering failures reported by a Discord surface.
#[derive(Debug, Error)]
#[error("Failed to render to Discord: {0}")]
pub struct SurfaceError(pub String);
