// This is the entry point of the Discord <-> Roblox bridge bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite, Roblox HTTP APIs)
// - `discord/` = Discord-specific adapters (commands, surfaces, routing)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::appeal::{AppealService, DEFAULT_APPEAL_WINDOW_SECS};
use crate::core::confirmation::MODERATION_WINDOW;
use crate::core::moderation::ModerationService;
use crate::core::settings::SettingsService;
use crate::discord::commands::presence;
use crate::discord::interactions::InteractionRouter;
use crate::discord::{Data, Error};
use crate::infra::roblox::{RobloxEndpoints, RobloxHttpClient};
use crate::infra::settings::SqliteSettingsStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

/// Event handler for non-command Discord events.
/// Buttons and modal submissions go through the interaction router.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::InteractionCreate { interaction } = event {
        data.router.dispatch(ctx, data, interaction).await?;
    }
    Ok(())
}

/// `APPEAL_REVIEW_WINDOW_SECS`, where 0 means reviews never time out.
fn appeal_window_from_env() -> Option<Duration> {
    let secs = std::env::var("APPEAL_REVIEW_WINDOW_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_APPEAL_WINDOW_SECS);

    (secs > 0).then(|| Duration::from_secs(secs))
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep the runtime database in a dedicated folder so the repo root stays tidy.
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    std::fs::create_dir_all(&data_dir).expect("Failed to create data directory for SQLite files");
    let db_path = format!("{}/bridge.db", data_dir);

    let dev_guild = std::env::var("DEV_GUILD_ID")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|id| *id != 0)
        .map(serenity::GuildId::new);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let store = SqliteSettingsStore::connect(&db_path)
        .await
        .expect("Failed to initialize settings database");
    let settings = Arc::new(SettingsService::new(store));

    let roblox = Arc::new(
        RobloxHttpClient::new(RobloxEndpoints::default())
            .expect("Failed to create Roblox API client"),
    );

    let moderation = Arc::new(ModerationService::new(
        Arc::clone(&roblox),
        Arc::clone(&settings),
        MODERATION_WINDOW,
    ));

    let appeal_window = appeal_window_from_env();
    match appeal_window {
        Some(window) => tracing::info!(secs = window.as_secs(), "Appeal review window"),
        None => tracing::warn!("Appeal reviews have no time limit"),
    }
    let appeals = Arc::new(AppealService::new(
        Arc::clone(&roblox),
        Arc::clone(&settings),
        appeal_window,
    ));

    let data = Data {
        settings: Arc::clone(&settings),
        moderation,
        appeals,
        router: InteractionRouter::with_default_routes(),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::game::game(),
                discord::commands::db::db(),
                discord::commands::appeal::appeal(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    if let poise::FrameworkError::Command { error, ctx, .. } = &error {
                        tracing::error!(
                            command = %ctx.command().qualified_name,
                            "Command failed: {}",
                            error
                        );
                    }
                    if let Err(e) = poise::builtins::on_error(error).await {
                        tracing::error!("Error while handling error: {}", e);
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("🤖 Bot is starting up...");

                // Global registration can take up to an hour to propagate;
                // a dev guild gets the commands immediately.
                match dev_guild {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await?
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?
                    }
                }

                tracing::info!("✅ Commands registered!");

                let universe_count = data.settings.universes().await?.len();
                presence::on_ready(ctx, universe_count);
                tracing::info!(universe_count, "🚀 Bot is ready!");

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
