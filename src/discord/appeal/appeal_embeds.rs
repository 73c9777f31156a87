use crate::core::appeal::AppealView;
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateEmbedFooter};

pub const APPEAL_COLOR: u32 = 0x0099ff;
pub const VERDICT_COLOR: u32 = 0x00ff44;
pub const FAILURE_COLOR: u32 = 0xeb4034;

const SYSTEM_NAME: &str = "Discord <-> Roblox System";

pub fn appeal_embed(view: &AppealView) -> CreateEmbed {
    match view {
        AppealView::Application {
            request,
            universe_name,
        } => {
            let description = match universe_name {
                Some(name) => format!("Place name: **{}** in universe", name),
                None => format!("No places found for {}", request.universe_id),
            };
            CreateEmbed::new()
                .title("⏲️ Appeal Application")
                .description(description)
                .color(APPEAL_COLOR)
                .field("Username", &request.username, false)
                .field("Appeal", &request.appeal, false)
                .footer(CreateEmbedFooter::new(format!(
                    "Sent by {}",
                    request.submitted_by
                )))
                .timestamp(serenity::Timestamp::now())
        }
        AppealView::Approved {
            target,
            appeal,
            reviewer_id,
        } => CreateEmbed::new()
            .title(format!("✔️ {}", SYSTEM_NAME))
            .color(VERDICT_COLOR)
            .field(
                "Application",
                format!("Successfully Unbanned **{}**", target.name),
                false,
            )
            .field("Response", appeal, false)
            .field("Administrator", format!("Accepted by: <@{}>", reviewer_id), false),
        AppealView::Declined {
            username,
            appeal,
            reviewer_id,
        } => CreateEmbed::new()
            .title(format!("✔️ {}", SYSTEM_NAME))
            .color(VERDICT_COLOR)
            .field(
                "Application",
                format!("Successfully Declined **{}**", username),
                false,
            )
            .field("Response", appeal, false)
            .field("Administrator", format!("Declined by: <@{}>", reviewer_id), false),
        AppealView::InvalidUsername { username, appeal } => CreateEmbed::new()
            .title("❌ Appeal Application")
            .description("Invalid username.")
            .color(APPEAL_COLOR)
            .field("Username", username, false)
            .field("Appeal", appeal, false),
        AppealView::LookupFailed(message) => CreateEmbed::new()
            .title("❌ Appeal Application")
            .description(message)
            .color(APPEAL_COLOR),
        AppealView::ConfigMissing => CreateEmbed::new()
            .title("Settings Setup: ❌")
            .description("Be sure you have configured your API Keys! Run /db ")
            .color(FAILURE_COLOR),
        AppealView::UnbanFailed { target, error } => CreateEmbed::new()
            .title("📢 Unban Failed")
            .field("Username", &target.name, false)
            .field("User ID", target.id.to_string(), false)
            .field("Error", error, false)
            .color(FAILURE_COLOR),
        AppealView::TimedOut => CreateEmbed::new()
            .title(format!("🕔 {}", SYSTEM_NAME))
            .color(VERDICT_COLOR)
            .field("Timeout", "Timed out", false),
        AppealView::CollectionFailed => CreateEmbed::new()
            .title("❌ Appeal Application")
            .description("An error occurred while awaiting reactions.")
            .color(FAILURE_COLOR),
    }
}
