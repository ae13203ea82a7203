use super::Database;
use crate::{
	api::{
		filter::{Filter, Query},
		ApiError,
	},
	data::{Profile, ProfileUpdate},
};
use uuid::Uuid;

impl Database {
	pub async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, ApiError> {
		self.select_one(Query::new().eq("id", id)).await
	}

	/// Profiles whose username or name contains `text`, excluding the searcher.
	pub async fn search_profiles(&self, text: &str, exclude: Uuid) -> Result<Vec<Profile>, ApiError> {
		let text = text.trim();
		if text.chars().count() < 2 {
			return Ok(Vec::new());
		}
		let query = Query::new()
			.or(&[("username", Filter::contains(text)), ("name", Filter::contains(text))])
			.filter("id", Filter::Neq(exclude.to_string()))
			.order("username", crate::api::filter::Order::Asc)
			.limit(20);
		self.select(&query).await
	}

	pub async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile, ApiError> {
		if update.is_empty() {
			return self.get_profile(id).await?.ok_or_else(|| ApiError::invalid("Profile not found"));
		}
		let mut rows: Vec<Profile> = self.update(&Query::new().eq("id", id), update).await?;
		rows.pop().ok_or_else(|| ApiError::invalid("Profile not found"))
	}
}
