use super::{DueNotice, DueSource};
use crate::{api::ApiError, clock::unix_millis, database::Database};
use futures_util::future::LocalBoxFuture;
use time::OffsetDateTime;
use uuid::Uuid;

/// The user's own watch reminders.
pub struct WatchReminders(pub Database);

impl DueSource for WatchReminders {
	fn poll_due(
		&self,
		user: Uuid,
		now: OffsetDateTime,
		limit: usize,
	) -> LocalBoxFuture<'_, Result<Vec<DueNotice>, ApiError>> {
		Box::pin(async move {
			let due = self.0.poll_due_reminders(user, now, limit).await?;
			Ok(due
				.into_iter()
				.map(|reminder| DueNotice {
					server_id: reminder.id.to_string(),
					occurrence: unix_millis(reminder.remind_at),
					title: format!("Watch reminder: {}", reminder.movie_title),
					body: Some("It's time to watch it.".to_owned()),
					target: reminder.movie_id,
				})
				.collect())
		})
	}
}

/// Reminders set on recommendations received from friends.
pub struct RecommendationReminders(pub Database);

impl DueSource for RecommendationReminders {
	fn poll_due(
		&self,
		user: Uuid,
		now: OffsetDateTime,
		limit: usize,
	) -> LocalBoxFuture<'_, Result<Vec<DueNotice>, ApiError>> {
		Box::pin(async move {
			let due = self.0.poll_due_recommendation_reminders(user, now, limit).await?;
			Ok(due
				.into_iter()
				.map(|entry| {
					let sender = entry.author_name().to_owned();
					let recommendation = entry.item;
					DueNotice {
						server_id: recommendation.id.to_string(),
						occurrence: recommendation.remind_at.map(unix_millis).unwrap_or_default(),
						title: format!("Reminder from {sender}: {}", recommendation.movie_title),
						body: recommendation.note,
						target: recommendation.movie_id,
					}
				})
				.collect())
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		clock::{Clock, ManualClock},
		data::{TitleRef, TitleSnapshot},
		database::test_support::{database, profile},
		notify::{deliver_native, poll_once, testing::FakeSink, Permission, PermissionGate, ReminderCenter, TOAST_TTL},
	};
	use futures::executor::block_on;
	use std::{cell::RefCell, time::Duration};
	use time::macros::datetime;

	#[test]
	fn dune_reminder_end_to_end() {
		let (db, backend) = database();
		let me = profile(&backend, "viewer");
		let schedule_at = datetime!(2026-10-16 20:00 UTC);
		let dune = TitleSnapshot {
			movie_id: TitleRef::movie(438631),
			movie_title: "Dune".into(),
			poster_path: None,
		};
		block_on(db.upsert_watch_reminder(me.id, &dune, schedule_at)).unwrap();

		let center = RefCell::new(ReminderCenter::default());
		center.borrow_mut().set_user(Some(me.id));
		let source = WatchReminders(db);
		let sink = FakeSink::new(Permission::Granted);
		let clock = ManualClock::at(schedule_at - Duration::from_secs(60));
		assert!(block_on(poll_once(&center, &source, &clock)).is_empty());

		clock.advance(time::Duration::minutes(46));
		let toasts = block_on(poll_once(&center, &source, &clock));
		assert_eq!(toasts.len(), 1);
		assert_eq!(toasts[0].title, "Watch reminder: Dune");
		assert_eq!(toasts[0].target, TitleRef::movie(438631));
		block_on(deliver_native(&sink, &PermissionGate::default(), &toasts));
		assert_eq!(sink.shown.borrow().len(), 1);

		// the server still reports it as due, the seen set keeps it from repeating
		clock.advance(time::Duration::seconds(45));
		assert!(block_on(poll_once(&center, &source, &clock)).is_empty());
		center.borrow_mut().expire(clock.now());
		assert_eq!(center.borrow().toasts().count(), 0);
		assert_eq!(toasts[0].expires_at(), toasts[0].created_at + TOAST_TTL);
	}

	#[test]
	fn recommendation_reminders_name_the_sender() {
		let (db, backend) = database();
		let (ann, me) = (profile(&backend, "ann"), profile(&backend, "me"));
		let dune = TitleSnapshot {
			movie_id: TitleRef::movie(438631),
			movie_title: "Dune".into(),
			poster_path: None,
		};
		let sent = block_on(db.send_friend_recommendation(ann.id, me.id, &dune, "")).unwrap();
		let at = datetime!(2026-10-16 20:00 UTC);
		block_on(db.set_recommendation_reminder(sent.id, Some(at))).unwrap();
		let source = RecommendationReminders(db);
		let due = block_on(source.poll_due(me.id, at, 5)).unwrap();
		assert_eq!(due[0].title, "Reminder from ann: Dune");
		assert_eq!(due[0].server_id, sent.id.to_string());
	}
}
