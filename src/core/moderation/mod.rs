// Core moderation module - the kick/warn/ban/unban confirmation workflow.
// Shutdown lives here too since it shares the messaging path.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
