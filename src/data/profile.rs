use super::{Record, Theme};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	pub id: Uuid,
	pub username: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub avatar_url: Option<String>,
	#[serde(default)]
	pub theme: Theme,
}

impl Record for Profile {
	fn table() -> &'static str {
		"profiles"
	}
}

impl Profile {
	pub fn display_name(&self) -> &str {
		match self.name.as_deref().map(str::trim) {
			Some(name) if !name.is_empty() => name,
			_ => &self.username,
		}
	}
}

/// Editable profile fields, unset fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub avatar_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub theme: Option<Theme>,
}

impl ProfileUpdate {
	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.avatar_url.is_none() && self.theme.is_none()
	}
}
