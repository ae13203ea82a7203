use crate::{
	api::TokenSource,
	data::Theme,
	storage::{scoped_key, KeyValueStore, StorageError},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::rc::Rc;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// A value persisted under a fixed key in the app's key-value storage.
pub trait SessionValue: Sized {
	fn id() -> &'static str;

	fn load(store: &dyn KeyValueStore) -> Option<Self>
	where
		Self: DeserializeOwned,
	{
		let raw = store.get_raw(&scoped_key(Self::id()))?;
		match serde_json::from_str(&raw) {
			Ok(value) => Some(value),
			Err(err) => {
				log::warn!("discarding unreadable {}: {err}", Self::id());
				store.delete(&scoped_key(Self::id()));
				None
			}
		}
	}

	fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError>
	where
		Self: Serialize,
	{
		let raw = serde_json::to_string(self).map_err(|err| StorageError::Encoding {
			key: Self::id().to_owned(),
			reason: err.to_string(),
		})?;
		store.set_raw(&scoped_key(Self::id()), raw)
	}

	fn delete(store: &dyn KeyValueStore) {
		store.delete(&scoped_key(Self::id()));
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
	pub id: Uuid,
	#[serde(default)]
	pub email: Option<String>,
}

/// The signed-in session as issued by the auth service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
	pub access_token: String,
	pub refresh_token: String,
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
	pub user: SessionUser,
}

impl SessionValue for AuthSession {
	fn id() -> &'static str {
		"session"
	}
}

impl SessionValue for Theme {
	fn id() -> &'static str {
		"theme"
	}
}

impl AuthSession {
	// refresh a little early so in-flight requests don't race the expiry
	const EXPIRY_LEEWAY: Duration = Duration::seconds(30);

	pub fn is_expired(&self, now: OffsetDateTime) -> bool {
		self.expires_at - Self::EXPIRY_LEEWAY <= now
	}

	pub fn user_id(&self) -> Uuid {
		self.user.id
	}
}

/// Handle to the persisted session, shared by the gateway and the auth client.
#[derive(Clone)]
pub struct SessionStore {
	store: Rc<dyn KeyValueStore>,
}

impl SessionStore {
	pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	pub fn get(&self) -> Option<AuthSession> {
		AuthSession::load(&*self.store)
	}

	pub fn set(&self, session: &AuthSession) -> Result<(), StorageError> {
		session.save(&*self.store)
	}

	pub fn clear(&self) {
		AuthSession::delete(&*self.store);
	}

	pub fn backing(&self) -> &Rc<dyn KeyValueStore> {
		&self.store
	}
}

impl TokenSource for SessionStore {
	fn access_token(&self) -> Option<String> {
		self.get().map(|session| session.access_token)
	}
}

#[cfg(test)]
pub(crate) fn test_session(user: Uuid, expires_at: OffsetDateTime) -> AuthSession {
	AuthSession {
		access_token: format!("access-{user}"),
		refresh_token: format!("refresh-{user}"),
		expires_at,
		user: SessionUser {
			id: user,
			email: Some("viewer@example.com".into()),
		},
	}
}
