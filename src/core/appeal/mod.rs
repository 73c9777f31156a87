// Core appeal module - staff review of ban appeals submitted through the form.

pub mod appeal_models;
pub mod appeal_service;

pub use appeal_models::*;
pub use appeal_service::*;
