use super::Database;
use crate::{
	api::{
		filter::{Order, Query},
		ApiError,
	},
	data::{TitleRef, TitleSnapshot, WatchlistEntry},
};
use serde::Serialize;
use uuid::Uuid;

pub static ALREADY_ON_WATCHLIST: &str = "Already on your watchlist";

#[derive(Serialize)]
struct NewEntry<'a> {
	user_id: Uuid,
	#[serde(flatten)]
	title: &'a TitleSnapshot,
}

impl Database {
	pub async fn watchlist(&self, user: Uuid) -> Result<Vec<WatchlistEntry>, ApiError> {
		self.select(&Query::new().eq("user_id", user).order("added_at", Order::Desc))
			.await
	}

	pub async fn add_to_watchlist(&self, user: Uuid, title: &TitleSnapshot) -> Result<WatchlistEntry, ApiError> {
		let entry = NewEntry { user_id: user, title };
		self.insert(&entry).await.map_err(|err| err.map_conflict(ALREADY_ON_WATCHLIST))
	}

	pub async fn remove_from_watchlist(&self, user: Uuid, movie: TitleRef) -> Result<(), ApiError> {
		self.delete::<WatchlistEntry>(&Query::new().eq("user_id", user).eq("movie_id", movie))
			.await
	}
}
