use crate::core::roblox::RobloxUser;

/// Ephemeral reply when an appeal cannot be posted.
pub const APPEAL_FAILED_REPLY: &str = "An error occurred while executing this command.";
pub const APPEAL_SUBMITTED_REPLY: &str = "Your appeal has been submitted.";
pub const APPEAL_INVALID_UNIVERSE_REPLY: &str =
    "That is not a valid universe id. Please check it and submit your appeal again.";

/// Default review window. `APPEAL_REVIEW_WINDOW_SECS=0` removes the bound.
pub const DEFAULT_APPEAL_WINDOW_SECS: u64 = 86_400;

/// A submitted appeal form. Lives only as long as its review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppealRequest {
    pub universe_id: String,
    pub username: String,
    pub appeal: String,
    pub submitted_by: u64,
}

/// What the staff message shows. Every view after `Application` edits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppealView {
    Application {
        request: AppealRequest,
        /// Registered name of the universe, if known.
        universe_name: Option<String>,
    },
    Approved {
        target: RobloxUser,
        appeal: String,
        reviewer_id: u64,
    },
    Declined {
        username: String,
        appeal: String,
        reviewer_id: u64,
    },
    /// Keeps the application's fields so staff still see what was asked.
    InvalidUsername {
        username: String,
        appeal: String,
    },
    LookupFailed(String),
    ConfigMissing,
    UnbanFailed {
        target: RobloxUser,
        error: String,
    },
    TimedOut,
    CollectionFailed,
}

/// Terminal state of one appeal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppealOutcome {
    InvalidUniverse,
    NoChannel,
    PostFailed(String),
    Approved(RobloxUser),
    Declined,
    InvalidUsername,
    LookupFailed(String),
    ConfigMissing,
    UnbanFailed { target: RobloxUser, error: String },
    TimedOut,
    CollectionFailed(String),
}
