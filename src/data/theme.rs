use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	#[default]
	System,
	Light,
	Dark,
}

impl Theme {
	pub const ALL: [Self; 3] = [Self::System, Self::Light, Self::Dark];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::System => "system",
			Self::Light => "light",
			Self::Dark => "dark",
		}
	}

	pub fn display_name(&self) -> &'static str {
		match self {
			Self::System => "Match system",
			Self::Light => "Light",
			Self::Dark => "Dark",
		}
	}

	/// The `data-bs-theme` attribute for the document root, `None` follows the system.
	pub fn attribute(&self) -> Option<&'static str> {
		match self {
			Self::System => None,
			theme => Some(theme.as_str()),
		}
	}
}

impl FromStr for Theme {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL.into_iter().find(|theme| theme.as_str() == s).ok_or(())
	}
}
