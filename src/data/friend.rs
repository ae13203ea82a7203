use super::{Record, TitleRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A directed edge, `user_id` follows `friend_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
	pub user_id: Uuid,
	pub friend_id: Uuid,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for Friendship {
	fn table() -> &'static str {
		"friendships"
	}
}

/// A public share, shown in the sender's friends' feeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
	pub id: Uuid,
	pub user_id: Uuid,
	pub movie_id: TitleRef,
	pub movie_title: String,
	#[serde(default)]
	pub poster_path: Option<String>,
	#[serde(default)]
	pub note: Option<String>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for Recommendation {
	fn table() -> &'static str {
		"recommendations"
	}
}

/// A title sent directly to one friend. Unique per sender, recipient and title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FriendRecommendation {
	pub id: Uuid,
	pub sender_id: Uuid,
	pub recipient_id: Uuid,
	pub movie_id: TitleRef,
	pub movie_title: String,
	#[serde(default)]
	pub poster_path: Option<String>,
	#[serde(default)]
	pub note: Option<String>,
	#[serde(default)]
	pub read: bool,
	#[serde(default)]
	pub watched: bool,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub remind_at: Option<OffsetDateTime>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub remind_notified_at: Option<OffsetDateTime>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for FriendRecommendation {
	fn table() -> &'static str {
		"friend_recommendations"
	}
}

impl FriendRecommendation {
	pub fn is_reminder_due(&self, now: OffsetDateTime) -> bool {
		matches!(self.remind_at, Some(at) if at <= now) && self.remind_notified_at.is_none()
	}
}
