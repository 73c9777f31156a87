// Roblox domain types and the API port the workflows call through.

pub mod roblox_api;
pub mod roblox_models;

pub use roblox_api::*;
pub use roblox_models::*;
