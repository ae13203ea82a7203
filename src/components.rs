mod auth_switch;
pub use auth_switch::*;
mod nav;
pub use nav::*;
mod notice;
pub use notice::*;
mod recommend_modal;
pub use recommend_modal::*;
mod reminder_modal;
pub use reminder_modal::*;
mod title_card;
pub use title_card::*;
mod toasts;
pub use toasts::*;
pub mod user;
