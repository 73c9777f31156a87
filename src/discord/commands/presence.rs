// Bot presence. Discord SDK types only.

use poise::serenity_prelude as serenity;

/// Show how many universes the bot is bridging.
pub fn set_status(ctx: &serenity::Context, universe_count: usize) {
    let activity = serenity::ActivityData::watching(format!(
        "{} universe{}",
        universe_count,
        if universe_count == 1 { "" } else { "s" }
    ));
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}

/// Called once the bot is ready.
pub fn on_ready(ctx: &serenity::Context, universe_count: usize) {
    set_status(ctx, universe_count);
}
