use super::{Record, TitleRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
	pub id: Uuid,
	pub user_id: Uuid,
	pub movie_id: TitleRef,
	pub movie_title: String,
	#[serde(default)]
	pub poster_path: Option<String>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub added_at: Option<OffsetDateTime>,
}

impl Record for WatchlistEntry {
	fn table() -> &'static str {
		"watchlist"
	}
}
