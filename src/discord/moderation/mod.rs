pub mod moderation_embeds;
pub mod moderation_surface;

pub use moderation_surface::DiscordModerationSurface;
