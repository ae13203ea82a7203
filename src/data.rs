//! Records mirrored from the backend tables.
mod friend;
pub use friend::*;
mod group;
pub use group::*;
mod profile;
pub use profile::*;
mod push;
pub use push::*;
mod reminder;
pub use reminder::*;
mod theme;
pub use theme::*;
mod title;
pub use title::*;
mod watchlist;
pub use watchlist::*;

/// A record stored in one of the backend's tables.
pub trait Record {
	fn table() -> &'static str;
}
