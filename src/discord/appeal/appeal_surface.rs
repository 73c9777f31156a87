// Discord side of the appeal workflow. Owns everything it touches so a
// review can outlive the modal interaction that started it.

use super::appeal_embeds::appeal_embed;
use crate::core::appeal::{AppealSurface, AppealView};
use crate::core::confirmation::{ConfirmationOutcome, ConfirmationRequest, SurfaceError};
use crate::discord::interactions::await_reaction;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

fn surface_error(e: serenity::Error) -> SurfaceError {
    SurfaceError(e.to_string())
}

pub struct DiscordAppealSurface {
    http: Arc<serenity::Http>,
    shard: serenity::ShardMessenger,
    interaction: serenity::ModalInteraction,
    message: Option<serenity::Message>,
}

impl DiscordAppealSurface {
    pub fn new(
        http: Arc<serenity::Http>,
        shard: serenity::ShardMessenger,
        interaction: serenity::ModalInteraction,
    ) -> Self {
        Self {
            http,
            shard,
            interaction,
            message: None,
        }
    }
}

#[async_trait]
impl AppealSurface for DiscordAppealSurface {
    async fn post(&mut self, channel_id: u64, view: AppealView) -> Result<(), SurfaceError> {
        let message = serenity::ChannelId::new(channel_id)
            .send_message(&self.http, serenity::CreateMessage::new().embed(appeal_embed(&view)))
            .await
            .map_err(surface_error)?;
        self.message = Some(message);
        Ok(())
    }

    async fn acknowledge(&mut self, message: &str) -> Result<(), SurfaceError> {
        let response = serenity::CreateInteractionResponse::Message(
            serenity::CreateInteractionResponseMessage::new()
                .content(message)
                .ephemeral(true),
        );
        self.interaction
            .create_response(&self.http, response)
            .await
            .map_err(surface_error)
    }

    async fn await_confirmation(&mut self, request: &ConfirmationRequest) -> ConfirmationOutcome {
        let Some(message) = &self.message else {
            return ConfirmationOutcome::Failed("appeal was never posted".to_string());
        };
        await_reaction(&self.shard, &self.http, message, request).await
    }

    async fn render(&mut self, view: AppealView) -> Result<(), SurfaceError> {
        let Some(message) = self.message.as_mut() else {
            return Err(SurfaceError("appeal was never posted".to_string()));
        };
        message
            .edit(&self.http, serenity::EditMessage::new().embed(appeal_embed(&view)))
            .await
            .map_err(surface_error)
    }
}
