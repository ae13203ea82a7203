use super::Database;
use crate::{
	api::{
		filter::{timestamp, Order, Query},
		ApiError,
	},
	data::{TitleRef, TitleSnapshot, WatchReminder},
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Serialize)]
struct ReminderRow<'a> {
	user_id: Uuid,
	#[serde(flatten)]
	title: &'a TitleSnapshot,
	#[serde(with = "time::serde::rfc3339")]
	remind_at: OffsetDateTime,
	// rescheduling clears any earlier delivery or cancellation
	#[serde(with = "time::serde::rfc3339::option")]
	notified_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339::option")]
	canceled_at: Option<OffsetDateTime>,
}

impl Database {
	pub async fn get_watch_reminder_for_movie(
		&self,
		user: Uuid,
		movie: TitleRef,
	) -> Result<Option<WatchReminder>, ApiError> {
		self.select_one(Query::new().eq("user_id", user).eq("movie_id", movie)).await
	}

	/// Create or reschedule the reminder for `user` and this title.
	pub async fn upsert_watch_reminder(
		&self,
		user: Uuid,
		title: &TitleSnapshot,
		remind_at: OffsetDateTime,
	) -> Result<WatchReminder, ApiError> {
		let row = ReminderRow {
			user_id: user,
			title,
			remind_at,
			notified_at: None,
			canceled_at: None,
		};
		self.upsert(&row, &["user_id", "movie_id"]).await
	}

	pub async fn delete_watch_reminder(&self, user: Uuid, movie: TitleRef) -> Result<(), ApiError> {
		self.delete::<WatchReminder>(&Query::new().eq("user_id", user).eq("movie_id", movie))
			.await
	}

	/// Keep the row but stop it from ever becoming due.
	pub async fn cancel_watch_reminder(
		&self,
		user: Uuid,
		movie: TitleRef,
		now: OffsetDateTime,
	) -> Result<(), ApiError> {
		let changes = serde_json::json!({ "canceled_at": timestamp(now) });
		let _: Vec<WatchReminder> =
			self.update(&Query::new().eq("user_id", user).eq("movie_id", movie), &changes).await?;
		Ok(())
	}

	/// Reminders still waiting to fire, soonest first.
	pub async fn list_upcoming_reminders(&self, user: Uuid) -> Result<Vec<WatchReminder>, ApiError> {
		let query = Query::new()
			.eq("user_id", user)
			.is_null("notified_at")
			.is_null("canceled_at")
			.order("remind_at", Order::Asc);
		self.select(&query).await
	}

	/// At most `limit` reminders that are due at `now`. Selection happens on the server,
	/// the client never flags anything as notified.
	pub async fn poll_due_reminders(
		&self,
		user: Uuid,
		now: OffsetDateTime,
		limit: usize,
	) -> Result<Vec<WatchReminder>, ApiError> {
		let query = Query::new()
			.eq("user_id", user)
			.lte_time("remind_at", now)
			.is_null("notified_at")
			.is_null("canceled_at")
			.order("remind_at", Order::Asc)
			.limit(limit);
		self.select(&query).await
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::database;
	use super::*;
	use futures::executor::block_on;
	use time::macros::datetime;

	fn title(id: u64, name: &str) -> TitleSnapshot {
		TitleSnapshot {
			movie_id: TitleRef::movie(id),
			movie_title: name.into(),
			poster_path: None,
		}
	}

	#[test]
	fn upsert_then_get_returns_saved_time() {
		let (db, _) = database();
		let me = Uuid::new_v4();
		let dune = title(438631, "Dune");
		let first = block_on(db.upsert_watch_reminder(me, &dune, datetime!(2026-10-16 20:00 UTC))).unwrap();
		let saved = block_on(db.get_watch_reminder_for_movie(me, dune.movie_id)).unwrap().unwrap();
		assert_eq!(saved.remind_at, datetime!(2026-10-16 20:00 UTC));

		let second = block_on(db.upsert_watch_reminder(me, &dune, datetime!(2026-10-17 09:30 UTC))).unwrap();
		assert_eq!(second.id, first.id);
		let saved = block_on(db.get_watch_reminder_for_movie(me, dune.movie_id)).unwrap().unwrap();
		assert_eq!(saved.remind_at, datetime!(2026-10-17 09:30 UTC));
	}

	#[test]
	fn poll_returns_only_due_active_reminders() {
		let (db, _) = database();
		let me = Uuid::new_v4();
		let now = datetime!(2026-10-16 20:45 UTC);
		block_on(db.upsert_watch_reminder(me, &title(1, "Dune"), datetime!(2026-10-16 20:00 UTC))).unwrap();
		block_on(db.upsert_watch_reminder(me, &title(2, "Heat"), datetime!(2026-10-16 21:00 UTC))).unwrap();
		block_on(db.upsert_watch_reminder(me, &title(3, "Alien"), datetime!(2026-10-16 19:00 UTC))).unwrap();
		block_on(db.cancel_watch_reminder(me, TitleRef::movie(3), now)).unwrap();
		block_on(db.upsert_watch_reminder(Uuid::new_v4(), &title(4, "Up"), now)).unwrap();

		let due = block_on(db.poll_due_reminders(me, now, 5)).unwrap();
		assert_eq!(due.iter().map(|r| r.movie_title.as_str()).collect::<Vec<_>>(), vec!["Dune"]);
		let upcoming = block_on(db.list_upcoming_reminders(me)).unwrap();
		assert_eq!(upcoming.len(), 2);

		// rescheduling a canceled reminder makes it active again
		block_on(db.upsert_watch_reminder(me, &title(3, "Alien"), datetime!(2026-10-16 20:30 UTC))).unwrap();
		let due = block_on(db.poll_due_reminders(me, now, 1)).unwrap();
		assert_eq!(due[0].movie_title, "Dune");
		assert_eq!(block_on(db.poll_due_reminders(me, now, 5)).unwrap().len(), 2);
	}

	#[test]
	fn deleted_reminders_are_gone() {
		let (db, _) = database();
		let me = Uuid::new_v4();
		block_on(db.upsert_watch_reminder(me, &title(1, "Dune"), datetime!(2026-10-16 20:00 UTC))).unwrap();
		block_on(db.delete_watch_reminder(me, TitleRef::movie(1))).unwrap();
		assert_eq!(block_on(db.get_watch_reminder_for_movie(me, TitleRef::movie(1))), Ok(None));
	}
}
