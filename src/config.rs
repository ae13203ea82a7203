use enumset::{EnumSet, EnumSetType};
use std::time::Duration;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub static DEFAULT_TMDB_URL: &str = "https://api.themoviedb.org/3";
pub static TMDB_IMAGE_URL: &str = "https://image.tmdb.org/t/p";

pub const REST_TIMEOUT: Duration = Duration::from_secs(12);
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(25);
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(8);

/// Features which are switched on by the presence of their configuration.
/// A missing value disables the feature, it is never an error.
#[derive(EnumSetType, Debug)]
pub enum Feature {
	Backend,
	Metadata,
	PushNotifications,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackendConfig {
	pub url: String,
	pub anon_key: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataConfig {
	pub url: String,
	pub api_key: String,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct AppConfig {
	pub backend: Option<BackendConfig>,
	pub metadata: Option<MetadataConfig>,
	pub vapid_key: Option<String>,
}

impl AppConfig {
	/// Values are baked in at build time (`trunk build` forwards the environment).
	pub fn from_env() -> Self {
		Self::from_values(
			option_env!("WATCHWITH_BACKEND_URL"),
			option_env!("WATCHWITH_ANON_KEY"),
			option_env!("WATCHWITH_TMDB_KEY"),
			option_env!("WATCHWITH_VAPID_KEY"),
		)
	}

	pub fn from_values(
		backend_url: Option<&str>,
		anon_key: Option<&str>,
		tmdb_key: Option<&str>,
		vapid_key: Option<&str>,
	) -> Self {
		let present = |value: Option<&str>| value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
		let backend = match (present(backend_url), present(anon_key)) {
			(Some(url), Some(anon_key)) => Some(BackendConfig {
				url: url.trim_end_matches('/').to_owned(),
				anon_key,
			}),
			_ => None,
		};
		let metadata = present(tmdb_key).map(|api_key| MetadataConfig {
			url: DEFAULT_TMDB_URL.to_owned(),
			api_key,
		});
		Self {
			backend,
			metadata,
			vapid_key: present(vapid_key),
		}
	}

	pub fn features(&self) -> EnumSet<Feature> {
		let mut features = EnumSet::new();
		if self.backend.is_some() {
			features.insert(Feature::Backend);
			// push subscriptions are stored in the backend
			if self.vapid_key.is_some() {
				features.insert(Feature::PushNotifications);
			}
		}
		if self.metadata.is_some() {
			features.insert(Feature::Metadata);
		}
		features
	}

	pub fn has(&self, feature: Feature) -> bool {
		self.features().contains(feature)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_values_disable_features() {
		let config = AppConfig::from_values(None, Some("anon"), None, Some("vapid"));
		assert!(config.backend.is_none());
		assert!(config.features().is_empty());
	}

	#[test]
	fn blank_values_count_as_missing() {
		let config = AppConfig::from_values(Some("https://x.supabase.co"), Some("   "), Some(""), None);
		assert!(!config.has(Feature::Backend));
		assert!(!config.has(Feature::Metadata));
	}

	#[test]
	fn full_config_enables_everything() {
		let config = AppConfig::from_values(
			Some("https://x.supabase.co/"),
			Some("anon"),
			Some("tmdb"),
			Some("vapid"),
		);
		assert_eq!(config.features(), EnumSet::all());
		assert_eq!(config.backend.unwrap().url, "https://x.supabase.co");
	}

	#[test]
	fn push_requires_backend() {
		let config = AppConfig::from_values(None, None, Some("tmdb"), Some("vapid"));
		assert!(!config.has(Feature::PushNotifications));
		assert!(config.has(Feature::Metadata));
	}
}
