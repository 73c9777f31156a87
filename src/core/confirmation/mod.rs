// Reaction-confirmation primitives shared by the moderation and appeal
// workflows: which emoji mean what, who may answer, and how long to wait.

pub mod confirmation_models;

pub use confirmation_models::*;
