//! Typed reads and writes against the backend tables, one file per feature.
use crate::{
	api::{
		filter::{Query, PREFER_MERGE, PREFER_REPRESENTATION},
		retry::RetryPolicy,
		ApiError, Gateway, Method,
	},
	data::{Profile, Record},
};
use itertools::Itertools;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

mod friends;
pub use friends::*;
mod groups;
pub use groups::*;
mod profiles;
mod push;
mod recommendations;
pub use recommendations::*;
mod reminders;
mod watchlist;
pub use watchlist::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Database {
	gateway: Gateway,
	retry: RetryPolicy,
}

/// A row together with the profile of the user who created it.
#[derive(Clone, Debug, PartialEq)]
pub struct Attributed<T> {
	pub item: T,
	pub by: Option<Profile>,
}

impl<T> Attributed<T> {
	pub fn author_name(&self) -> &str {
		self.by.as_ref().map(Profile::display_name).unwrap_or("Someone")
	}
}

impl Database {
	pub fn new(gateway: Gateway) -> Self {
		Self {
			gateway,
			retry: RetryPolicy::SERVER_BUSY,
		}
	}

	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn gateway(&self) -> &Gateway {
		&self.gateway
	}

	async fn select<T>(&self, query: &Query) -> Result<Vec<T>, ApiError>
	where
		T: Record + DeserializeOwned,
	{
		self.gateway.table(Method::Get, T::table()).with_query(query).send().await
	}

	async fn select_one<T>(&self, query: Query) -> Result<Option<T>, ApiError>
	where
		T: Record + DeserializeOwned,
	{
		let mut rows = self.select::<T>(&query.limit(1)).await?;
		Ok(rows.pop())
	}

	async fn insert<T, R>(&self, row: &R) -> Result<T, ApiError>
	where
		T: Record + DeserializeOwned,
		R: Serialize + ?Sized,
	{
		self.gateway
			.table(Method::Post, T::table())
			.prefer(PREFER_REPRESENTATION)
			.with_json(row)
			.send_one()
			.await
	}

	/// Insert, or merge into the row that already holds the same `on_conflict` key.
	async fn upsert<T, R>(&self, row: &R, on_conflict: &[&str]) -> Result<T, ApiError>
	where
		T: Record + DeserializeOwned,
		R: Serialize + ?Sized,
	{
		self.gateway
			.table(Method::Post, T::table())
			.with_query(&Query::new().on_conflict(on_conflict))
			.prefer(PREFER_REPRESENTATION)
			.prefer(PREFER_MERGE)
			.with_json(row)
			.send_one()
			.await
	}

	async fn update<T, R>(&self, query: &Query, changes: &R) -> Result<Vec<T>, ApiError>
	where
		T: Record + DeserializeOwned,
		R: Serialize + ?Sized,
	{
		self.gateway
			.table(Method::Patch, T::table())
			.with_query(query)
			.prefer(PREFER_REPRESENTATION)
			.with_json(changes)
			.send()
			.await
	}

	async fn delete<T: Record>(&self, query: &Query) -> Result<(), ApiError> {
		if query.is_empty() {
			return Err(ApiError::invalid("refusing to delete without a filter"));
		}
		self.gateway.table::<()>(Method::Delete, T::table()).with_query(query).send_empty().await
	}

	/// Profiles for `ids`, fetched in a single request.
	pub async fn profiles_by_id<I>(&self, ids: I) -> Result<HashMap<Uuid, Profile>, ApiError>
	where
		I: IntoIterator<Item = Uuid>,
	{
		let ids = ids.into_iter().unique().collect::<Vec<_>>();
		if ids.is_empty() {
			return Ok(HashMap::new());
		}
		let profiles = self.select::<Profile>(&Query::new().is_in("id", ids)).await?;
		Ok(profiles.into_iter().map(|profile| (profile.id, profile)).collect())
	}

	async fn attribute<T>(&self, items: Vec<T>, author: impl Fn(&T) -> Uuid) -> Result<Vec<Attributed<T>>, ApiError> {
		let profiles = self.profiles_by_id(items.iter().map(&author)).await?;
		Ok(items
			.into_iter()
			.map(|item| {
				let by = profiles.get(&author(&item)).cloned();
				Attributed { item, by }
			})
			.collect())
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::*;
	use crate::{api::testing::MemoryBackend, data::Theme};
	use std::time::Duration;

	pub fn database() -> (Database, MemoryBackend) {
		let backend = MemoryBackend::with_schema();
		let database = Database::new(backend.gateway(Some("user-jwt"))).with_retry(RetryPolicy {
			attempts: 3,
			backoff: Duration::from_millis(1),
		});
		(database, backend)
	}

	pub fn profile(backend: &MemoryBackend, username: &str) -> Profile {
		let profile = Profile {
			id: Uuid::new_v4(),
			username: username.to_owned(),
			email: Some(format!("{username}@example.com")),
			name: None,
			avatar_url: None,
			theme: Theme::System,
		};
		backend.seed("profiles", vec![serde_json::to_value(&profile).expect("profile serializes")]);
		profile
	}
}
