use std::time::Duration;

pub static UNIQUE_VIOLATION: &str = "23505";
/// PostgREST could not obtain a database connection in time.
pub static POOL_EXHAUSTED: &str = "PGRST003";

pub static GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
	#[error("{0} is not configured")]
	NotConfigured(&'static str),
	#[error("Request timed out after {} seconds", .0.as_secs())]
	Timeout(Duration),
	#[error("Network error: {0}")]
	Network(String),
	#[error("{message}")]
	Server {
		status: u16,
		code: Option<String>,
		message: String,
	},
	#[error("Unexpected response: {0}")]
	Parse(String),
	#[error("{0}")]
	Invalid(String),
	#[error("You need to sign in first")]
	SignedOut,
}

impl ApiError {
	pub fn invalid(message: impl Into<String>) -> Self {
		Self::Invalid(message.into())
	}

	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Server { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub fn code(&self) -> Option<&str> {
		match self {
			Self::Server { code, .. } => code.as_deref(),
			_ => None,
		}
	}

	/// The backend rejected a write because of a uniqueness constraint.
	pub fn is_conflict(&self) -> bool {
		self.code() == Some(UNIQUE_VIOLATION) || self.status() == Some(409)
	}

	/// The backend is temporarily overloaded and the same request may succeed later.
	pub fn is_busy(&self) -> bool {
		self.code() == Some(POOL_EXHAUSTED) || self.status() == Some(503)
	}

	/// The string shown inline to the user. Conflicts use `on_conflict` when given,
	/// parse failures fall back to a generic message.
	pub fn user_message(&self, on_conflict: Option<&str>) -> String {
		match (self, on_conflict) {
			(err, Some(message)) if err.is_conflict() => message.to_owned(),
			(Self::Parse(_), _) => GENERIC_FAILURE.to_owned(),
			(Self::Server { message, .. }, _) if message.trim().is_empty() => GENERIC_FAILURE.to_owned(),
			(err, _) => err.to_string(),
		}
	}

	/// Replace a conflict with a feature specific validation error.
	pub fn map_conflict(self, message: &str) -> Self {
		match self.is_conflict() {
			true => Self::Invalid(message.to_owned()),
			false => self,
		}
	}
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

impl From<url::ParseError> for ApiError {
	fn from(err: url::ParseError) -> Self {
		Self::Invalid(format!("bad url: {err}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn server(status: u16, code: Option<&str>, message: &str) -> ApiError {
		ApiError::Server {
			status,
			code: code.map(str::to_owned),
			message: message.into(),
		}
	}

	#[test]
	fn conflicts_are_detected_by_code_or_status() {
		assert!(server(409, None, "dup").is_conflict());
		assert!(server(400, Some("23505"), "dup").is_conflict());
		assert!(!server(400, Some("23503"), "fk").is_conflict());
	}

	#[test]
	fn busy_is_pool_exhaustion_or_unavailable() {
		assert!(server(504, Some("PGRST003"), "timeout").is_busy());
		assert!(server(503, None, "").is_busy());
		assert!(!server(500, None, "boom").is_busy());
		assert!(!ApiError::Timeout(Duration::from_secs(1)).is_busy());
	}

	#[test]
	fn user_messages_follow_taxonomy() {
		let dup = server(409, Some("23505"), "duplicate key value violates unique constraint");
		assert_eq!(dup.user_message(Some("Already there")), "Already there");
		assert_eq!(dup.user_message(None), "duplicate key value violates unique constraint");
		assert_eq!(
			ApiError::Timeout(Duration::from_secs(8)).user_message(None),
			"Request timed out after 8 seconds"
		);
		assert_eq!(ApiError::Parse("eof".into()).user_message(None), GENERIC_FAILURE);
		assert_eq!(server(500, None, "  ").user_message(None), GENERIC_FAILURE);
	}

	#[test]
	fn conflict_mapping_keeps_other_errors() {
		let mapped = server(409, None, "dup").map_conflict("Already friends");
		assert_eq!(mapped, ApiError::Invalid("Already friends".into()));
		let kept = ApiError::Network("offline".into()).map_conflict("Already friends");
		assert_eq!(kept, ApiError::Network("offline".into()));
	}
}
