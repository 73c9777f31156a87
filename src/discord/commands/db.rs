// Admin commands for the settings table and universe directory.

use crate::core::settings::{mask_secret, SettingKey, SettingsError};
use crate::discord::commands::presence;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Configure API keys, channels and registered universes
#[poise::command(
    slash_command,
    subcommands("set", "clear", "show", "universe_add", "universe_remove", "universes"),
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn db(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum SettingChoice {
    #[name = "Messaging API Key"]
    MessagingApiKey,
    #[name = "Datastore API Key"]
    DatastoreApiKey,
    #[name = "Log Channel"]
    LogChannel,
    #[name = "Appeal Channel"]
    AppealChannel,
    #[name = "Appeal Reviewer Role"]
    AppealReviewerRole,
}

impl From<SettingChoice> for SettingKey {
    fn from(choice: SettingChoice) -> Self {
        match choice {
            SettingChoice::MessagingApiKey => SettingKey::MessagingApiKey,
            SettingChoice::DatastoreApiKey => SettingKey::DatastoreApiKey,
            SettingChoice::LogChannel => SettingKey::LogChannel,
            SettingChoice::AppealChannel => SettingKey::AppealChannel,
            SettingChoice::AppealReviewerRole => SettingKey::AppealReviewerRole,
        }
    }
}

/// Keep the presence line in step with the directory.
async fn refresh_presence(ctx: Context<'_>) {
    match ctx.data().settings.universes().await {
        Ok(universes) => presence::set_status(ctx.serenity_context(), universes.len()),
        Err(e) => tracing::warn!("Could not refresh presence: {}", e),
    }
}

async fn reply_ephemeral(ctx: Context<'_>, content: String) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Store a setting
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Setting to change"] setting: SettingChoice,
    #[description = "New value (channel and role settings take the numeric id)"] value: String,
) -> Result<(), Error> {
    let key = SettingKey::from(setting);

    match ctx.data().settings.set(key, &value).await {
        Ok(()) => {
            tracing::info!(key = %key, admin = ctx.author().id.get(), "Setting updated");
            reply_ephemeral(ctx, format!("✅ Saved **{}**.", key.label())).await
        }
        Err(SettingsError::InvalidValue { reason, .. }) => {
            reply_ephemeral(ctx, format!("❌ {}: {}", key.label(), reason)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a setting
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "Setting to remove"] setting: SettingChoice,
) -> Result<(), Error> {
    let key = SettingKey::from(setting);
    let removed = ctx.data().settings.clear(key).await?;

    let message = if removed {
        format!("🗑️ Cleared **{}**.", key.label())
    } else {
        format!("**{}** was not set.", key.label())
    };
    reply_ephemeral(ctx, message).await
}

/// Show current settings (API keys are masked)
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let mut embed = serenity::CreateEmbed::new()
        .title("⚙️ Settings")
        .color(0x0099ff);

    for key in SettingKey::ALL {
        let value = match ctx.data().settings.get(key).await? {
            None => "*not set*".to_string(),
            Some(v) if key.is_secret() => mask_secret(&v),
            Some(v) if key == SettingKey::AppealReviewerRole => format!("<@&{}>", v),
            Some(v) => format!("<#{}>", v),
        };
        embed = embed.field(key.label(), value, false);
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Register a universe for autocomplete and appeals
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn universe_add(
    ctx: Context<'_>,
    #[description = "Universe id"] id: String,
    #[description = "Display name"] name: String,
) -> Result<(), Error> {
    match ctx.data().settings.register_universe(&id, &name).await {
        Ok(()) => {
            tracing::info!(universe = %id, "Universe registered");
            refresh_presence(ctx).await;
            reply_ephemeral(ctx, format!("✅ Registered **{}** ({}).", name.trim(), id.trim())).await
        }
        Err(SettingsError::InvalidUniverse(reason)) => {
            reply_ephemeral(ctx, format!("❌ {}", reason)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a registered universe
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn universe_remove(
    ctx: Context<'_>,
    #[description = "Universe id"] id: String,
) -> Result<(), Error> {
    let removed = ctx.data().settings.remove_universe(&id).await?;

    if removed {
        refresh_presence(ctx).await;
    }

    let message = if removed {
        format!("🗑️ Removed universe {}.", id.trim())
    } else {
        format!("No universe registered with id {}.", id.trim())
    };
    reply_ephemeral(ctx, message).await
}

/// List registered universes
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn universes(ctx: Context<'_>) -> Result<(), Error> {
    let universes = ctx.data().settings.universes().await?;

    let description = if universes.is_empty() {
        "No universes registered. Use `/db universe_add`.".to_string()
    } else {
        universes
            .iter()
            .map(|u| format!("**{}** - `{}`", u.name, u.id))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = serenity::CreateEmbed::new()
        .title("🌐 Universes")
        .description(description)
        .color(0x0099ff);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
