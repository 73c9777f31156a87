// Discord layer - commands, interaction routing and the Discord-side
// surfaces the core workflows render through.

use crate::core::appeal::AppealService;
use crate::core::moderation::ModerationService;
use crate::core::settings::SettingsService;
use crate::infra::roblox::RobloxHttpClient;
use crate::infra::settings::SqliteSettingsStore;
use std::sync::Arc;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "interactions/mod.rs"]
pub mod interactions;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "appeal/mod.rs"]
pub mod appeal;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub type Settings = SettingsService<SqliteSettingsStore>;
pub type Moderation = ModerationService<RobloxHttpClient, SqliteSettingsStore>;
pub type Appeals = AppealService<RobloxHttpClient, SqliteSettingsStore>;

/// Shared state handed to every command and event.
pub struct Data {
    pub settings: Arc<Settings>,
    pub moderation: Arc<Moderation>,
    pub appeals: Arc<Appeals>,
    pub router: interactions::InteractionRouter,
}
