// Interaction routing for components and modals.
//
// Slash commands and autocomplete go through poise. Buttons and modal
// submissions are looked up by custom id in tables built once at startup.

use crate::discord::appeal::{
    handle_appeal_button, handle_appeal_modal, APPEAL_BUTTON_ID, APPEAL_MODAL_ID,
};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

pub type ButtonHandler = for<'a> fn(
    &'a serenity::Context,
    &'a Data,
    &'a serenity::ComponentInteraction,
) -> HandlerFuture<'a>;

pub type ModalHandler = for<'a> fn(
    &'a serenity::Context,
    &'a Data,
    &'a serenity::ModalInteraction,
) -> HandlerFuture<'a>;

const HANDLER_FAILED_REPLY: &str = "An error occurred while executing this command.";

#[derive(Default)]
pub struct InteractionRouter {
    buttons: HashMap<&'static str, ButtonHandler>,
    modals: HashMap<&'static str, ModalHandler>,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables the bot runs with.
    pub fn with_default_routes() -> Self {
        Self::new()
            .button(APPEAL_BUTTON_ID, handle_appeal_button)
            .modal(APPEAL_MODAL_ID, handle_appeal_modal)
    }

    pub fn button(mut self, custom_id: &'static str, handler: ButtonHandler) -> Self {
        self.buttons.insert(custom_id, handler);
        self
    }

    pub fn modal(mut self, custom_id: &'static str, handler: ModalHandler) -> Self {
        self.modals.insert(custom_id, handler);
        self
    }

    pub fn button_handler(&self, custom_id: &str) -> Option<ButtonHandler> {
        self.buttons.get(custom_id).copied()
    }

    pub fn modal_handler(&self, custom_id: &str) -> Option<ModalHandler> {
        self.modals.get(custom_id).copied()
    }

    /// Route one interaction. Unknown ids are logged and dropped.
    pub async fn dispatch(
        &self,
        ctx: &serenity::Context,
        data: &Data,
        interaction: &serenity::Interaction,
    ) -> Result<(), Error> {
        match interaction {
            serenity::Interaction::Component(component) => {
                let custom_id = component.data.custom_id.as_str();
                let Some(handler) = self.button_handler(custom_id) else {
                    tracing::warn!(custom_id, "Button handler not found");
                    return Ok(());
                };

                if let Err(e) = handler(ctx, data, component).await {
                    tracing::error!(custom_id, "Error executing button handler: {}", e);
                    let reply = serenity::CreateInteractionResponse::Message(
                        serenity::CreateInteractionResponseMessage::new()
                            .content(HANDLER_FAILED_REPLY)
                            .ephemeral(true),
                    );
                    if let Err(e) = component.create_response(&ctx.http, reply).await {
                        tracing::warn!("Failed to report button error: {}", e);
                    }
                }
            }
            serenity::Interaction::Modal(modal) => {
                let custom_id = modal.data.custom_id.as_str();
                let Some(handler) = self.modal_handler(custom_id) else {
                    tracing::warn!(custom_id, "Modal handler not found");
                    return Ok(());
                };

                if let Err(e) = handler(ctx, data, modal).await {
                    tracing::error!(custom_id, "Error executing modal handler: {}", e);
                }
            }
            // Commands and autocomplete are poise's.
            _ => {}
        }
        Ok(())
    }
}
