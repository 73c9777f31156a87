// Discord side of the moderation workflow.
//
// The first render answers the (deferred) slash command; later renders edit
// that reply in place. Collection failures go out as a follow-up.

use super::moderation_embeds::{audit_embed, render_view};
use crate::core::confirmation::{ConfirmationOutcome, ConfirmationRequest, SurfaceError};
use crate::core::moderation::{AuditEntry, ModerationSurface, ModerationView};
use crate::discord::interactions::await_reaction;
use crate::discord::Context;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

fn surface_error(e: serenity::Error) -> SurfaceError {
    SurfaceError(e.to_string())
}

pub struct DiscordModerationSurface<'a> {
    ctx: Context<'a>,
    reply: Option<poise::ReplyHandle<'a>>,
}

impl<'a> DiscordModerationSurface<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self { ctx, reply: None }
    }
}

#[async_trait]
impl<'a> ModerationSurface for DiscordModerationSurface<'a> {
    async fn render(&mut self, view: ModerationView) -> Result<(), SurfaceError> {
        let follow_up = matches!(view, ModerationView::CollectionFailed);
        let reply = render_view(&view).into_reply();

        if !follow_up {
            if let Some(handle) = &self.reply {
                handle.edit(self.ctx, reply).await.map_err(surface_error)?;
                return Ok(());
            }
        }

        let handle = self.ctx.send(reply).await.map_err(surface_error)?;
        if self.reply.is_none() {
            self.reply = Some(handle);
        }
        Ok(())
    }

    async fn await_confirmation(&mut self, request: &ConfirmationRequest) -> ConfirmationOutcome {
        let Some(handle) = &self.reply else {
            return ConfirmationOutcome::Failed("no prompt to react to".to_string());
        };

        let message = match handle.message().await {
            Ok(message) => message.into_owned(),
            Err(e) => return ConfirmationOutcome::Failed(e.to_string()),
        };

        let serenity_ctx = self.ctx.serenity_context();
        await_reaction(&serenity_ctx.shard, &serenity_ctx.http, &message, request).await
    }

    async fn post_audit(&mut self, channel_id: u64, entry: &AuditEntry) -> Result<(), SurfaceError> {
        let embed = audit_embed(entry, Some(self.ctx.author().face()));

        serenity::ChannelId::new(channel_id)
            .send_message(self.ctx.http(), serenity::CreateMessage::new().embed(embed))
            .await
            .map_err(surface_error)?;
        Ok(())
    }
}
