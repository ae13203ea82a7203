use super::{Attributed, Database};
use crate::{
	api::{
		filter::{Order, Query},
		retry::retry_when,
		ApiError,
	},
	data::{FriendRecommendation, Recommendation, TitleSnapshot},
	util::sleep,
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

pub static ALREADY_RECOMMENDED: &str = "You already recommended this title to them";

const FEED_LIMIT: usize = 50;

#[derive(Serialize)]
struct NewRecommendation<'a> {
	user_id: Uuid,
	#[serde(flatten)]
	title: &'a TitleSnapshot,
	note: Option<&'a str>,
}

#[derive(Serialize)]
struct NewFriendRecommendation<'a> {
	sender_id: Uuid,
	recipient_id: Uuid,
	#[serde(flatten)]
	title: &'a TitleSnapshot,
	note: Option<&'a str>,
	read: bool,
	watched: bool,
}

#[derive(Serialize)]
struct ReminderChange {
	#[serde(with = "time::serde::rfc3339::option")]
	remind_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339::option")]
	remind_notified_at: Option<OffsetDateTime>,
}

fn clean_note(note: &str) -> Option<&str> {
	Some(note.trim()).filter(|note| !note.is_empty())
}

impl Database {
	/// Share a title publicly with everyone who follows `user`.
	pub async fn share_recommendation(
		&self,
		user: Uuid,
		title: &TitleSnapshot,
		note: &str,
	) -> Result<Recommendation, ApiError> {
		let row = NewRecommendation {
			user_id: user,
			title,
			note: clean_note(note),
		};
		self.insert(&row).await
	}

	/// Newest public shares from the people `user` follows.
	pub async fn friend_feed(&self, user: Uuid) -> Result<Vec<Attributed<Recommendation>>, ApiError> {
		let friends = self.friend_ids(user).await?;
		if friends.is_empty() {
			return Ok(Vec::new());
		}
		let query = Query::new()
			.is_in("user_id", friends)
			.order("created_at", Order::Desc)
			.limit(FEED_LIMIT);
		let shares = self.select::<Recommendation>(&query).await?;
		self.attribute(shares, |share| share.user_id).await
	}

	/// Send a title straight to one friend. Retried while the backend reports it is busy.
	pub async fn send_friend_recommendation(
		&self,
		sender: Uuid,
		recipient: Uuid,
		title: &TitleSnapshot,
		note: &str,
	) -> Result<FriendRecommendation, ApiError> {
		if sender == recipient {
			return Err(ApiError::invalid("You can't recommend a title to yourself"));
		}
		let row = NewFriendRecommendation {
			sender_id: sender,
			recipient_id: recipient,
			title,
			note: clean_note(note),
			read: false,
			watched: false,
		};
		let sent = retry_when(self.retry, ApiError::is_busy, || self.insert(&row), sleep).await;
		sent.map_err(|err| err.map_conflict(ALREADY_RECOMMENDED))
	}

	pub async fn recommendation_inbox(
		&self,
		user: Uuid,
	) -> Result<Vec<Attributed<FriendRecommendation>>, ApiError> {
		let query = Query::new()
			.eq("recipient_id", user)
			.order("created_at", Order::Desc)
			.limit(FEED_LIMIT);
		let items = self.select::<FriendRecommendation>(&query).await?;
		self.attribute(items, |item| item.sender_id).await
	}

	/// What `user` has sent, attributed to the recipient.
	pub async fn sent_recommendations(
		&self,
		user: Uuid,
	) -> Result<Vec<Attributed<FriendRecommendation>>, ApiError> {
		let query = Query::new()
			.eq("sender_id", user)
			.order("created_at", Order::Desc)
			.limit(FEED_LIMIT);
		let items = self.select::<FriendRecommendation>(&query).await?;
		self.attribute(items, |item| item.recipient_id).await
	}

	pub async fn unread_recommendation_count(&self, user: Uuid) -> Result<usize, ApiError> {
		let query = Query::new().select("id").eq("recipient_id", user).eq("read", false);
		let rows: Vec<serde_json::Value> = self
			.gateway
			.table(crate::api::Method::Get, "friend_recommendations")
			.with_query(&query)
			.send()
			.await?;
		Ok(rows.len())
	}

	pub async fn mark_recommendation_read(&self, id: Uuid) -> Result<(), ApiError> {
		let _: Vec<FriendRecommendation> =
			self.update(&Query::new().eq("id", id), &serde_json::json!({ "read": true })).await?;
		Ok(())
	}

	pub async fn set_recommendation_watched(&self, id: Uuid, watched: bool) -> Result<(), ApiError> {
		let changes = serde_json::json!({ "watched": watched, "read": true });
		let _: Vec<FriendRecommendation> = self.update(&Query::new().eq("id", id), &changes).await?;
		Ok(())
	}

	/// Schedule (or with `None`, clear) a reminder on a received recommendation.
	/// Rescheduling makes the reminder eligible for delivery again.
	pub async fn set_recommendation_reminder(
		&self,
		id: Uuid,
		remind_at: Option<OffsetDateTime>,
	) -> Result<FriendRecommendation, ApiError> {
		let changes = ReminderChange {
			remind_at,
			remind_notified_at: None,
		};
		let mut rows: Vec<FriendRecommendation> = self.update(&Query::new().eq("id", id), &changes).await?;
		rows.pop().ok_or_else(|| ApiError::invalid("Recommendation not found"))
	}

	/// Received recommendations whose reminder time has passed and which the server
	/// has not flagged as delivered. Nothing is marked here.
	pub async fn poll_due_recommendation_reminders(
		&self,
		user: Uuid,
		now: OffsetDateTime,
		limit: usize,
	) -> Result<Vec<Attributed<FriendRecommendation>>, ApiError> {
		let query = Query::new()
			.eq("recipient_id", user)
			.lte_time("remind_at", now)
			.is_null("remind_notified_at")
			.order("remind_at", Order::Asc)
			.limit(limit);
		let items = self.select::<FriendRecommendation>(&query).await?;
		self.attribute(items, |item| item.sender_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::{database, profile};
	use super::*;
	use crate::data::TitleRef;
	use futures::executor::block_on;
	use serde_json::json;
	use time::macros::datetime;

	fn dune() -> TitleSnapshot {
		TitleSnapshot {
			movie_id: TitleRef::movie(438631),
			movie_title: "Dune".into(),
			poster_path: None,
		}
	}

	#[test]
	fn duplicate_recommendations_are_reported() {
		let (db, backend) = database();
		let (ann, ben, me) = (profile(&backend, "ann"), profile(&backend, "ben"), profile(&backend, "me"));
		block_on(db.send_friend_recommendation(ann.id, me.id, &dune(), "")).unwrap();
		// a different sender may recommend the same title
		block_on(db.send_friend_recommendation(ben.id, me.id, &dune(), "so good")).unwrap();
		let err = block_on(db.send_friend_recommendation(ann.id, me.id, &dune(), "")).unwrap_err();
		assert_eq!(err.user_message(None), ALREADY_RECOMMENDED);
		assert_eq!(block_on(db.recommendation_inbox(me.id)).unwrap().len(), 2);
	}

	#[test]
	fn busy_backend_is_retried() {
		let (db, backend) = database();
		let (ann, me) = (profile(&backend, "ann"), profile(&backend, "me"));
		backend.push_response(503, json!({ "code": "PGRST003", "message": "Timed out acquiring connection" }));
		let sent = block_on(db.send_friend_recommendation(ann.id, me.id, &dune(), " watch it ")).unwrap();
		assert_eq!(sent.note.as_deref(), Some("watch it"));
		assert_eq!(backend.requests().len(), 2);
	}

	#[test]
	fn busy_retries_are_bounded() {
		let (db, backend) = database();
		let (ann, me) = (profile(&backend, "ann"), profile(&backend, "me"));
		for _ in 0..3 {
			backend.push_response(503, json!({ "message": "unavailable" }));
		}
		let err = block_on(db.send_friend_recommendation(ann.id, me.id, &dune(), "")).unwrap_err();
		assert!(err.is_busy());
		assert_eq!(backend.requests().len(), 3);
	}

	#[test]
	fn inbox_is_attributed_and_counts_unread() {
		let (db, backend) = database();
		let (ann, me) = (profile(&backend, "ann"), profile(&backend, "me"));
		let sent = block_on(db.send_friend_recommendation(ann.id, me.id, &dune(), "")).unwrap();
		let inbox = block_on(db.recommendation_inbox(me.id)).unwrap();
		assert_eq!(inbox[0].author_name(), "ann");
		assert_eq!(block_on(db.unread_recommendation_count(me.id)), Ok(1));
		block_on(db.mark_recommendation_read(sent.id)).unwrap();
		assert_eq!(block_on(db.unread_recommendation_count(me.id)), Ok(0));
		let outbox = block_on(db.sent_recommendations(ann.id)).unwrap();
		assert_eq!(outbox[0].author_name(), "me");
	}

	#[test]
	fn feed_shows_friends_shares_newest_first() {
		let (db, backend) = database();
		let (ann, me, stranger) = (profile(&backend, "ann"), profile(&backend, "me"), profile(&backend, "x"));
		block_on(db.add_friend(me.id, ann.id)).unwrap();
		block_on(db.share_recommendation(ann.id, &dune(), "")).unwrap();
		let arrival = TitleSnapshot {
			movie_id: TitleRef::movie(329865),
			movie_title: "Arrival".into(),
			poster_path: None,
		};
		block_on(db.share_recommendation(ann.id, &arrival, "")).unwrap();
		block_on(db.share_recommendation(stranger.id, &arrival, "")).unwrap();
		let feed = block_on(db.friend_feed(me.id)).unwrap();
		let titles = feed.iter().map(|share| share.item.movie_title.as_str()).collect::<Vec<_>>();
		assert_eq!(titles, vec!["Arrival", "Dune"]);
		assert!(block_on(db.friend_feed(stranger.id)).unwrap().is_empty());
	}

	#[test]
	fn due_recommendation_reminders_are_polled() {
		let (db, backend) = database();
		let (ann, me) = (profile(&backend, "ann"), profile(&backend, "me"));
		let sent = block_on(db.send_friend_recommendation(ann.id, me.id, &dune(), "")).unwrap();
		let now = datetime!(2026-10-16 20:00 UTC);
		assert!(block_on(db.poll_due_recommendation_reminders(me.id, now, 5)).unwrap().is_empty());
		let updated = block_on(db.set_recommendation_reminder(sent.id, Some(datetime!(2026-10-16 19:30 UTC)))).unwrap();
		assert!(updated.is_reminder_due(now));
		let due = block_on(db.poll_due_recommendation_reminders(me.id, now, 5)).unwrap();
		assert_eq!(due.len(), 1);
		assert_eq!(due[0].by.as_ref().map(|p| p.username.as_str()), Some("ann"));
		block_on(db.set_recommendation_reminder(sent.id, None)).unwrap();
		assert!(block_on(db.poll_due_recommendation_reminders(me.id, now, 5)).unwrap().is_empty());
	}
}
