// Discord commands module.
// Each feature gets its own command file.

pub mod game;

pub mod db;

pub mod appeal;

// Bot presence management
pub mod presence;
