use crate::core::moderation::{AuditEntry, ModerationView};
use poise::serenity_prelude::{self as serenity, CreateEmbed};

pub const PROMPT_COLOR: u32 = 0x333333;
pub const SUCCESS_COLOR: u32 = 0x5dca83;
pub const FAILURE_COLOR: u32 = 0xeb4034;
pub const NOTICE_COLOR: u32 = 0x00ff44;

const SYSTEM_NAME: &str = "Discord <-> Roblox System";

/// A moderation view as Discord shows it.
#[derive(Debug, Clone)]
pub enum Rendered {
    Embed(CreateEmbed),
    Text(&'static str),
}

impl Rendered {
    pub fn into_reply(self) -> poise::CreateReply {
        match self {
            Rendered::Embed(embed) => poise::CreateReply::default().embed(embed),
            Rendered::Text(text) => poise::CreateReply::default().content(text),
        }
    }
}

fn with_thumbnail(embed: CreateEmbed, url: &Option<String>) -> CreateEmbed {
    match url {
        Some(url) => embed.thumbnail(url),
        None => embed,
    }
}

pub fn render_view(view: &ModerationView) -> Rendered {
    match view {
        ModerationView::ConfigMissing => Rendered::Embed(
            CreateEmbed::new()
                .title("Settings Setup: ❌")
                .description("Be sure you have configured your API Keys! Run /db ")
                .color(FAILURE_COLOR),
        ),
        ModerationView::InvalidUniverse { universe_id } => Rendered::Embed(
            CreateEmbed::new()
                .title("Unknown Server: ❌")
                .description(format!(
                    "`{}` is not a universe id. Pick a server from the list or register it with /db universe_add.",
                    universe_id
                ))
                .color(FAILURE_COLOR),
        ),
        ModerationView::PlayerNotFound => Rendered::Text("Unable to find that user on Roblox."),
        ModerationView::LookupFailed => {
            Rendered::Text("An error occurred while trying to fetch data from the Roblox API.")
        }
        ModerationView::CollectionFailed => {
            Rendered::Text("An error occurred while awaiting reactions.")
        }
        ModerationView::Prompt {
            action,
            player,
            reason,
            avatar_url,
        } => {
            let mut description = format!("Are you sure you want to {} **{}**?", action.verb(), player);
            if let Some(reason) = reason {
                description.push_str(&format!("\n\n**Reason:**\n{}", reason));
            }
            if let Some(duration) = action.duration() {
                description.push_str(&format!("\n\n**Time:**\n{}", duration));
            }

            let embed = CreateEmbed::new()
                .title(format!("{} {}❓", action.title(), player))
                .description(description)
                .color(PROMPT_COLOR)
                .timestamp(serenity::Timestamp::now());
            Rendered::Embed(with_thumbnail(embed, avatar_url))
        }
        ModerationView::Cancelled { action } => Rendered::Embed(
            CreateEmbed::new()
                .title(format!("❌ {}", SYSTEM_NAME))
                .color(NOTICE_COLOR)
                .field(
                    format!("{} Cancelled", action.title()),
                    format!("Cancelled the {} process", action.verb()),
                    false,
                ),
        ),
        ModerationView::TimedOut => Rendered::Embed(
            CreateEmbed::new()
                .title(format!("🕔 {}", SYSTEM_NAME))
                .color(NOTICE_COLOR)
                .field("Timeout", "Timed out", false),
        ),
        ModerationView::Outcome {
            action,
            target,
            avatar_url,
            error,
        } => {
            let (status, color) = match error {
                None => ("Successful", SUCCESS_COLOR),
                Some(_) => ("Failed", FAILURE_COLOR),
            };
            let mut embed = CreateEmbed::new()
                .title(format!("📢 {} {}", action.title(), status))
                .field("Username", &target.name, false)
                .field("User ID", target.id.to_string(), false)
                .color(color)
                .timestamp(serenity::Timestamp::now());
            if let Some(error) = error {
                embed = embed.field("Error", error, false);
            }
            Rendered::Embed(with_thumbnail(embed, avatar_url))
        }
        ModerationView::Shutdown { universe_id, error } => {
            let (status, color) = match error {
                None => ("Successful", SUCCESS_COLOR),
                Some(_) => ("Failed", FAILURE_COLOR),
            };
            let mut embed = CreateEmbed::new()
                .title(format!("📢 Shutdown {}", status))
                .field("Server ID", universe_id, false)
                .color(color)
                .timestamp(serenity::Timestamp::now());
            if let Some(error) = error {
                embed = embed.field("Error", error, false);
            }
            Rendered::Embed(embed)
        }
    }
}

/// The log channel copy of a completed action.
pub fn audit_embed(entry: &AuditEntry, admin_avatar: Option<String>) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title("📝 Command Executed")
        .field("Administrator", format!("<@{}>", entry.requested_by), false)
        .field("Action", entry.describe(), false)
        .color(FAILURE_COLOR)
        .timestamp(serenity::Timestamp::now());
    with_thumbnail(embed, &admin_avatar)
}
