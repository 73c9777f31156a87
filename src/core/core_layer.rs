// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "settings/mod.rs"]
pub mod settings;

#[path = "roblox/mod.rs"]
pub mod roblox;

#[path = "confirmation/mod.rs"]
pub mod confirmation;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "appeal/mod.rs"]
pub mod appeal;
