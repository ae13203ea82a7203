use super::{Record, TitleRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A user's own reminder to watch a title. One per user and title.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchReminder {
	pub id: Uuid,
	pub user_id: Uuid,
	pub movie_id: TitleRef,
	pub movie_title: String,
	#[serde(with = "time::serde::rfc3339")]
	pub remind_at: OffsetDateTime,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub notified_at: Option<OffsetDateTime>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub canceled_at: Option<OffsetDateTime>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Record for WatchReminder {
	fn table() -> &'static str {
		"watch_reminders"
	}
}

impl WatchReminder {
	pub fn is_active(&self) -> bool {
		self.notified_at.is_none() && self.canceled_at.is_none()
	}

	pub fn is_due(&self, now: OffsetDateTime) -> bool {
		self.is_active() && self.remind_at <= now
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use time::macros::datetime;

	#[test]
	fn due_requires_active_and_past() {
		let mut reminder = WatchReminder {
			id: Uuid::new_v4(),
			user_id: Uuid::new_v4(),
			movie_id: TitleRef::movie(438631),
			movie_title: "Dune".into(),
			remind_at: datetime!(2026-10-16 20:00 UTC),
			notified_at: None,
			canceled_at: None,
			created_at: None,
		};
		assert!(!reminder.is_due(datetime!(2026-10-16 19:59 UTC)));
		assert!(reminder.is_due(datetime!(2026-10-16 20:00 UTC)));
		reminder.canceled_at = Some(datetime!(2026-10-16 19:00 UTC));
		assert!(!reminder.is_due(datetime!(2026-10-16 21:00 UTC)));
	}
}
