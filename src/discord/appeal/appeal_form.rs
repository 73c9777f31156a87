// The appeal form: the button that opens it, the modal itself, and the
// handler that turns a submission into an `AppealRequest`.

use super::appeal_surface::DiscordAppealSurface;
use crate::core::appeal::{AppealRequest, APPEAL_FAILED_REPLY};
use crate::discord::interactions::HandlerFuture;
use crate::discord::Data;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Arc;

pub const APPEAL_BUTTON_ID: &str = "appealButton";
pub const APPEAL_MODAL_ID: &str = "appealModal";

const SERVER_INPUT: &str = "serverInput";
const USER_INPUT: &str = "userInput";
const APPEAL_FIELD: &str = "appealField";

pub fn appeal_button() -> serenity::CreateButton {
    serenity::CreateButton::new(APPEAL_BUTTON_ID)
        .label("Appeal")
        .style(serenity::ButtonStyle::Primary)
}

pub fn appeal_modal() -> serenity::CreateModal {
    serenity::CreateModal::new(APPEAL_MODAL_ID, "Ban Appeal").components(vec![
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(serenity::InputTextStyle::Short, "Universe ID", SERVER_INPUT)
                .required(true),
        ),
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(serenity::InputTextStyle::Short, "Roblox username", USER_INPUT)
                .required(true),
        ),
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(
                serenity::InputTextStyle::Paragraph,
                "Why should you be unbanned?",
                APPEAL_FIELD,
            )
            .required(true)
            .max_length(1000),
        ),
    ])
}

/// Text inputs of a submitted modal, by custom id.
fn collect_inputs(rows: &[serenity::ActionRow]) -> HashMap<String, String> {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) => input
                .value
                .clone()
                .map(|value| (input.custom_id.clone(), value)),
            _ => None,
        })
        .collect()
}

/// All three fields are required and must be non-blank.
fn appeal_from_inputs(inputs: &HashMap<String, String>, submitted_by: u64) -> Option<AppealRequest> {
    let field = |id: &str| {
        inputs
            .get(id)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Some(AppealRequest {
        universe_id: field(SERVER_INPUT)?,
        username: field(USER_INPUT)?,
        appeal: field(APPEAL_FIELD)?,
        submitted_by,
    })
}

pub fn handle_appeal_button<'a>(
    ctx: &'a serenity::Context,
    _data: &'a Data,
    component: &'a serenity::ComponentInteraction,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        component
            .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(appeal_modal()))
            .await?;
        Ok(())
    })
}

pub fn handle_appeal_modal<'a>(
    ctx: &'a serenity::Context,
    data: &'a Data,
    modal: &'a serenity::ModalInteraction,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let inputs = collect_inputs(&modal.data.components);
        let Some(request) = appeal_from_inputs(&inputs, modal.user.id.get()) else {
            let reply = serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(APPEAL_FAILED_REPLY)
                    .ephemeral(true),
            );
            modal.create_response(&ctx.http, reply).await?;
            return Ok(());
        };

        let appeals = Arc::clone(&data.appeals);
        let mut surface =
            DiscordAppealSurface::new(Arc::clone(&ctx.http), ctx.shard.clone(), modal.clone());

        // Reviews can take a day; don't hold the event handler.
        tokio::spawn(async move {
            match appeals.handle(request, &mut surface).await {
                Ok(outcome) => tracing::info!(?outcome, "Appeal finished"),
                Err(e) => tracing::error!("Appeal workflow failed: {}", e),
            }
        });
        Ok(())
    })
}
