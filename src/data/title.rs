use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
	Movie,
	Tv,
}

impl MediaKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Movie => "movie",
			Self::Tv => "tv",
		}
	}
}

impl FromStr for MediaKind {
	type Err = TitleRefError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"movie" => Ok(Self::Movie),
			"tv" => Ok(Self::Tv),
			_ => Err(TitleRefError::UnknownKind(s.to_owned())),
		}
	}
}

/// Points at a title, either in the metadata catalog or one entered by hand.
/// Stored as text: `tmdb:<movie|tv>:<id>` or `local:<uuid>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TitleRef {
	Tmdb { kind: MediaKind, id: u64 },
	Local(Uuid),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TitleRefError {
	#[error("unknown title source in {0:?}")]
	UnknownSource(String),
	#[error("unknown media kind {0:?}")]
	UnknownKind(String),
	#[error("invalid title id {0:?}")]
	InvalidId(String),
}

impl TitleRef {
	pub fn movie(id: u64) -> Self {
		Self::Tmdb {
			kind: MediaKind::Movie,
			id,
		}
	}

	pub fn tv(id: u64) -> Self {
		Self::Tmdb { kind: MediaKind::Tv, id }
	}

	/// The `:kind` and `:id` segments of the title detail route.
	pub fn route_segments(&self) -> (String, String) {
		match self {
			Self::Tmdb { kind, id } => (kind.as_str().to_owned(), id.to_string()),
			Self::Local(id) => ("local".to_owned(), id.to_string()),
		}
	}

	pub fn from_route_segments(kind: &str, id: &str) -> Result<Self, TitleRefError> {
		match kind {
			"local" => format!("local:{id}").parse(),
			kind => format!("tmdb:{kind}:{id}").parse(),
		}
	}
}

impl fmt::Display for TitleRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tmdb { kind, id } => write!(f, "tmdb:{}:{id}", kind.as_str()),
			Self::Local(id) => write!(f, "local:{id}"),
		}
	}
}

impl FromStr for TitleRef {
	type Err = TitleRefError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parts = s.splitn(3, ':');
		match (parts.next(), parts.next(), parts.next()) {
			(Some("tmdb"), Some(kind), Some(id)) => Ok(Self::Tmdb {
				kind: kind.parse()?,
				id: id.parse().map_err(|_| TitleRefError::InvalidId(id.to_owned()))?,
			}),
			(Some("local"), Some(id), None) => Ok(Self::Local(
				Uuid::parse_str(id).map_err(|_| TitleRefError::InvalidId(id.to_owned()))?,
			)),
			_ => Err(TitleRefError::UnknownSource(s.to_owned())),
		}
	}
}

/// The parts of a title copied onto every row that points at it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitleSnapshot {
	pub movie_id: TitleRef,
	pub movie_title: String,
	#[serde(default)]
	pub poster_path: Option<String>,
}

impl Serialize for TitleRef {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for TitleRef {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		text.parse().map_err(serde::de::Error::custom)
	}
}
