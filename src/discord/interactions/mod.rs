pub mod reactions;
pub mod router;

pub use reactions::await_reaction;
pub use router::{ButtonHandler, HandlerFuture, InteractionRouter, ModalHandler};
