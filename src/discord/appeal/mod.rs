pub mod appeal_embeds;
pub mod appeal_form;
pub mod appeal_surface;

pub use appeal_form::{handle_appeal_button, handle_appeal_modal, APPEAL_BUTTON_ID, APPEAL_MODAL_ID};
pub use appeal_surface::DiscordAppealSurface;
