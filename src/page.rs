mod friends;
pub use friends::*;
mod group;
pub use group::*;
mod groups;
pub use groups::*;
mod home;
pub use home::*;
mod profile;
pub use profile::*;
mod reminders;
pub use reminders::*;
mod search;
pub use search::*;
mod sign_in;
pub use sign_in::*;
mod sign_up;
pub use sign_up::*;
mod title;
pub use title::*;
mod watchlist;
pub use watchlist::*;
