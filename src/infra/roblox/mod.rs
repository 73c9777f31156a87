pub mod roblox_client;

pub use roblox_client::{RobloxEndpoints, RobloxHttpClient};
