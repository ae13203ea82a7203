use super::Database;
use crate::{
	api::{filter::Query, ApiError},
	data::{Friendship, Profile},
};
use serde::Serialize;
use uuid::Uuid;

pub static ALREADY_FRIENDS: &str = "You are already friends";

#[derive(Serialize)]
struct NewFriendship {
	user_id: Uuid,
	friend_id: Uuid,
}

impl Database {
	pub async fn friend_ids(&self, user: Uuid) -> Result<Vec<Uuid>, ApiError> {
		let edges: Vec<Friendship> = self.select(&Query::new().eq("user_id", user)).await?;
		Ok(edges.into_iter().map(|edge| edge.friend_id).collect())
	}

	/// Profiles of everyone `user` has added, sorted by display name.
	pub async fn list_friends(&self, user: Uuid) -> Result<Vec<Profile>, ApiError> {
		let ids = self.friend_ids(user).await?;
		let mut friends = self.profiles_by_id(ids).await?.into_values().collect::<Vec<_>>();
		friends.sort_by_cached_key(|profile| profile.display_name().to_lowercase());
		Ok(friends)
	}

	pub async fn add_friend(&self, user: Uuid, friend: Uuid) -> Result<Friendship, ApiError> {
		if user == friend {
			return Err(ApiError::invalid("You can't add yourself as a friend"));
		}
		let edge = NewFriendship {
			user_id: user,
			friend_id: friend,
		};
		self.insert(&edge).await.map_err(|err| err.map_conflict(ALREADY_FRIENDS))
	}

	pub async fn remove_friend(&self, user: Uuid, friend: Uuid) -> Result<(), ApiError> {
		self.delete::<Friendship>(&Query::new().eq("user_id", user).eq("friend_id", friend))
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::super::test_support::{database, profile};
	use super::*;
	use futures::executor::block_on;

	#[test]
	fn friends_are_added_once() {
		let (db, backend) = database();
		let me = profile(&backend, "viewer");
		let sam = profile(&backend, "sam");
		block_on(db.add_friend(me.id, sam.id)).unwrap();
		let again = block_on(db.add_friend(me.id, sam.id)).unwrap_err();
		assert_eq!(again.user_message(None), ALREADY_FRIENDS);
		assert_eq!(block_on(db.list_friends(me.id)).unwrap(), vec![sam.clone()]);
		// the edge is directed
		assert!(block_on(db.list_friends(sam.id)).unwrap().is_empty());
	}

	#[test]
	fn self_friendship_is_rejected_locally() {
		let (db, backend) = database();
		let me = profile(&backend, "viewer");
		assert!(block_on(db.add_friend(me.id, me.id)).is_err());
		assert!(backend.requests().is_empty());
	}

	#[test]
	fn removing_a_friend_drops_the_edge() {
		let (db, backend) = database();
		let me = profile(&backend, "viewer");
		let sam = profile(&backend, "sam");
		let ann = profile(&backend, "ann");
		block_on(db.add_friend(me.id, sam.id)).unwrap();
		block_on(db.add_friend(me.id, ann.id)).unwrap();
		block_on(db.remove_friend(me.id, sam.id)).unwrap();
		assert_eq!(block_on(db.friend_ids(me.id)).unwrap(), vec![ann.id]);
	}
}
