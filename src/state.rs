//! Client-side stores shared between pages.
use crate::{
	data::{Profile, Theme, TitleRef, WatchlistEntry},
	session::SessionValue,
	storage::default_store,
};
use uuid::Uuid;
use yewdux::store::Store;

/// The signed-in user's own profile row, once loaded.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct MyProfile(pub Option<Profile>);

/// The signed-in user's watchlist, loaded once per user and kept in sync by local edits.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct WatchlistState {
	pub loaded_for: Option<Uuid>,
	pub entries: Vec<WatchlistEntry>,
}

impl WatchlistState {
	pub fn is_loaded_for(&self, user: Uuid) -> bool {
		self.loaded_for == Some(user)
	}

	pub fn contains(&self, title: &TitleRef) -> bool {
		self.entries.iter().any(|entry| &entry.movie_id == title)
	}

	pub fn replace(&mut self, user: Uuid, entries: Vec<WatchlistEntry>) {
		self.loaded_for = Some(user);
		self.entries = entries;
	}

	/// Newest first, a title is only listed once.
	pub fn insert(&mut self, entry: WatchlistEntry) {
		self.remove(&entry.movie_id);
		self.entries.insert(0, entry);
	}

	pub fn remove(&mut self, title: &TitleRef) -> bool {
		let before = self.entries.len();
		self.entries.retain(|entry| &entry.movie_id != title);
		before != self.entries.len()
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}
}

/// Unread friend recommendations, shown as a badge in the navbar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Store)]
pub struct Nudges {
	pub unread: usize,
}

impl Nudges {
	pub fn set(&mut self, unread: usize) {
		self.unread = unread;
	}

	pub fn mark_one_read(&mut self) {
		self.unread = self.unread.saturating_sub(1);
	}

	pub fn badge(&self) -> Option<String> {
		match self.unread {
			0 => None,
			count if count > 99 => Some("99+".to_owned()),
			count => Some(count.to_string()),
		}
	}
}

/// The theme preference. Persisted locally so the first paint already uses it,
/// the profile copy wins once it has loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThemeState(pub Theme);

impl Store for ThemeState {
	fn new() -> Self {
		let theme = Theme::load(&*default_store()).unwrap_or_default();
		apply_theme(theme);
		Self(theme)
	}

	fn should_notify(&self, old: &Self) -> bool {
		self != old
	}
}

impl ThemeState {
	pub fn set(&mut self, theme: Theme) {
		if self.0 == theme {
			return;
		}
		self.0 = theme;
		if let Err(err) = theme.save(&*default_store()) {
			log::warn!("theme not saved: {err}");
		}
		apply_theme(theme);
	}
}

#[cfg(target_family = "wasm")]
fn apply_theme(theme: Theme) {
	let root = gloo_utils::document_element();
	let result = match theme.attribute() {
		Some(value) => root.set_attribute("data-bs-theme", value),
		None => root.remove_attribute("data-bs-theme"),
	};
	if let Err(err) = result {
		log::warn!("failed to apply theme: {err:?}");
	}
}

#[cfg(not(target_family = "wasm"))]
fn apply_theme(_theme: Theme) {}
