// Appeal panel command. The form and review live in discord/appeal.

use crate::discord::appeal::appeal_form::appeal_button;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Ban appeal tools
#[poise::command(
    slash_command,
    subcommands("panel"),
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn appeal(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Post the appeal panel in this channel
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn panel(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("⚖️ Ban Appeals")
        .description("Banned from the game? Press the button below to submit an appeal.")
        .color(0x0099ff);

    let components = vec![serenity::CreateActionRow::Buttons(vec![appeal_button()])];

    ctx.channel_id()
        .send_message(
            ctx.http(),
            serenity::CreateMessage::new()
                .embed(embed)
                .components(components),
        )
        .await?;

    ctx.send(
        poise::CreateReply::default()
            .content("✅ Appeal panel posted.")
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
