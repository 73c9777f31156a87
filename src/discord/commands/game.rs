// Discord commands for in-game moderation.
//
// **Notice the pattern:**
// 1. Extract primitive data from the slash command
// 2. Hand a `ModerationRequest` to the core workflow
// 3. The surface renders whatever the workflow decides
//
// This layer is THIN - the four subcommands differ only in the action kind.

use crate::core::moderation::{ActionKind, BanDuration, ModerationRequest};
use crate::core::roblox::BanLength;
use crate::discord::moderation::DiscordModerationSurface;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Manage game-related actions
#[poise::command(
    slash_command,
    subcommands("kick", "warn", "ban", "unban", "shutdown"),
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn game(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum BanLengthChoice {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl From<BanLengthChoice> for BanLength {
    fn from(choice: BanLengthChoice) -> Self {
        match choice {
            BanLengthChoice::Minute => BanLength::Minute,
            BanLengthChoice::Hour => BanLength::Hour,
            BanLengthChoice::Day => BanLength::Day,
            BanLengthChoice::Week => BanLength::Week,
            BanLengthChoice::Month => BanLength::Month,
            BanLengthChoice::Year => BanLength::Year,
        }
    }
}

/// Universe names for the `server` option. The value sent back is the id.
async fn autocomplete_universe(
    ctx: Context<'_>,
    partial: &str,
) -> impl Iterator<Item = serenity::AutocompleteChoice> {
    let universes = match ctx.data().settings.autocomplete_universes(partial).await {
        Ok(universes) => universes,
        Err(e) => {
            tracing::warn!("Universe autocomplete failed: {}", e);
            Vec::new()
        }
    };

    universes
        .into_iter()
        .map(|u| serenity::AutocompleteChoice::new(u.name, u.id))
        .collect::<Vec<_>>()
        .into_iter()
}

/// Shared body of kick/warn/ban/unban.
async fn run_moderation(
    ctx: Context<'_>,
    action: ActionKind,
    server: String,
    player: String,
    reason: Option<String>,
) -> Result<(), Error> {
    // Lookups can outlast the interaction deadline.
    ctx.defer().await?;

    let request = ModerationRequest {
        action,
        player,
        reason,
        universe_id: server,
        requested_by: ctx.author().id.get(),
    };

    let mut surface = DiscordModerationSurface::new(ctx);
    let outcome = ctx.data().moderation.execute(request, &mut surface).await?;
    tracing::debug!(?outcome, "Moderation workflow finished");
    Ok(())
}

/// Kick a player from the game
#[poise::command(slash_command, guild_only)]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The Name of the Server to kick the user from"]
    #[autocomplete = "autocomplete_universe"]
    server: String,
    #[description = "Kick user by Username or User ID"] player: String,
    #[description = "Reason for kicking the player"] reason: String,
) -> Result<(), Error> {
    run_moderation(ctx, ActionKind::Kick, server, player, Some(reason)).await
}

/// Warn a player in the game
#[poise::command(slash_command, guild_only)]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The name of the server to warn the user"]
    #[autocomplete = "autocomplete_universe"]
    server: String,
    #[description = "The Player to warn"] player: String,
    #[description = "Reason for warning the player"] reason: String,
) -> Result<(), Error> {
    run_moderation(ctx, ActionKind::Warn, server, player, Some(reason)).await
}

/// Ban a player from the game
#[poise::command(slash_command, guild_only)]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The name of the Server to ban the user from"]
    #[autocomplete = "autocomplete_universe"]
    server: String,
    #[description = "The player to ban"] player: String,
    #[description = "Reason for banning the player"] reason: String,
    #[description = "Time to ban the user for"]
    #[min = 1]
    time: i64,
    #[description = "Length of time to ban the user for"] length: BanLengthChoice,
) -> Result<(), Error> {
    let action = ActionKind::Ban(BanDuration {
        amount: time,
        unit: length.into(),
    });
    run_moderation(ctx, action, server, player, Some(reason)).await
}

/// Unban a player from the game
#[poise::command(slash_command, guild_only)]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "The name of the server to unban the user from"]
    #[autocomplete = "autocomplete_universe"]
    server: String,
    #[description = "The player to unban"] player: String,
) -> Result<(), Error> {
    run_moderation(ctx, ActionKind::Unban, server, player, None).await
}

/// Shutdown an entire universe
#[poise::command(slash_command, guild_only)]
pub async fn shutdown(
    ctx: Context<'_>,
    #[description = "The name of the server to shutdown"]
    #[autocomplete = "autocomplete_universe"]
    server: String,
) -> Result<(), Error> {
    ctx.defer().await?;

    let mut surface = DiscordModerationSurface::new(ctx);
    ctx.data().moderation.shutdown(&server, &mut surface).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_choices_map_to_wire_codes() {
        let codes: Vec<&str> = [
            BanLengthChoice::Minute,
            BanLengthChoice::Hour,
            BanLengthChoice::Day,
            BanLengthChoice::Week,
            BanLengthChoice::Month,
            BanLengthChoice::Year,
        ]
        .into_iter()
        .map(|choice| BanLength::from(choice).code())
        .collect();

        assert_eq!(codes, vec!["mi", "hr", "day", "wk", "mo", "yr"]);
    }
}
