use super::Database;
use crate::{
	api::{filter::Query, ApiError},
	data::PushSubscription,
};

impl Database {
	/// Register the browser's push endpoint. An endpoint moves to whoever saved it last.
	pub async fn save_push_subscription(&self, subscription: &PushSubscription) -> Result<PushSubscription, ApiError> {
		if subscription.endpoint.trim().is_empty() {
			return Err(ApiError::invalid("push endpoint is empty"));
		}
		self.upsert(subscription, &["endpoint"]).await
	}

	pub async fn delete_push_subscription(&self, endpoint: &str) -> Result<(), ApiError> {
		self.delete::<PushSubscription>(&Query::new().eq("endpoint", endpoint)).await
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::database;
	use super::*;
	use futures::executor::block_on;
	use uuid::Uuid;

	#[test]
	fn endpoints_are_unique() {
		let (db, backend) = database();
		let mut subscription = PushSubscription {
			user_id: Uuid::new_v4(),
			endpoint: "https://push.example.com/abc".into(),
			p256dh: "key".into(),
			auth: "secret".into(),
		};
		block_on(db.save_push_subscription(&subscription)).unwrap();
		subscription.user_id = Uuid::new_v4();
		let saved = block_on(db.save_push_subscription(&subscription)).unwrap();
		assert_eq!(saved, subscription);
		assert_eq!(backend.rows("push_subscriptions").len(), 1);
		block_on(db.delete_push_subscription(&subscription.endpoint)).unwrap();
		assert!(backend.rows("push_subscriptions").is_empty());
	}
}
