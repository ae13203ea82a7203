use crate::api::{ApiError, RawResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A response body: JSON when it parses, the raw text otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
	Empty,
	Json(Value),
	Text(String),
}

impl Payload {
	pub fn parse(body: &str) -> Self {
		if body.trim().is_empty() {
			return Self::Empty;
		}
		match serde_json::from_str::<Value>(body) {
			Ok(value) => Self::Json(value),
			Err(_) => Self::Text(body.to_owned()),
		}
	}

	pub fn into_typed<T>(self) -> Result<T, ApiError>
	where
		T: DeserializeOwned,
	{
		let value = match self {
			Self::Empty => Value::Null,
			Self::Json(value) => value,
			Self::Text(text) => {
				return serde_json::from_value(Value::String(text.clone()))
					.map_err(|_| ApiError::from(InvalidJson(text)));
			}
		};
		Ok(serde_json::from_value(value)?)
	}

	fn field(&self, keys: &[&str]) -> Option<String> {
		let Self::Json(Value::Object(map)) = self else {
			return None;
		};
		keys.iter().find_map(|key| match map.get(*key) {
			Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
			Some(Value::Number(n)) => Some(n.to_string()),
			_ => None,
		})
	}
}

/// Turn a raw transport response into a payload, normalizing failures into [`ApiError::Server`].
pub fn into_result(response: RawResponse) -> Result<Payload, ApiError> {
	let payload = Payload::parse(&response.body);
	if (200..300).contains(&response.status) {
		return Ok(payload);
	}
	let message = payload
		.field(&["message", "msg", "error_description", "status_message", "error"])
		.or_else(|| match &payload {
			Payload::Text(text) => Some(text.trim().to_owned()),
			_ => None,
		})
		.unwrap_or_else(|| format!("Request failed with status {}", response.status));
	Err(ApiError::Server {
		status: response.status,
		code: payload.field(&["code", "error_code"]),
		message,
	})
}

#[derive(thiserror::Error, Debug)]
#[error("Invalid json: {0:?}")]
pub struct InvalidJson(pub String);

impl From<InvalidJson> for ApiError {
	fn from(err: InvalidJson) -> Self {
		Self::Parse(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(status: u16, body: &str) -> RawResponse {
		RawResponse {
			status,
			body: body.into(),
		}
	}

	#[test]
	fn text_bodies_fall_back() {
		assert_eq!(Payload::parse("OK"), Payload::Text("OK".into()));
		assert_eq!(Payload::parse("  "), Payload::Empty);
		assert_eq!(Payload::parse("[1]"), Payload::Json(serde_json::json!([1])));
		let text: String = Payload::parse("OK").into_typed().unwrap();
		assert_eq!(text, "OK");
		assert!(matches!(Payload::parse("OK").into_typed::<Vec<u8>>(), Err(ApiError::Parse(_))));
	}

	#[test]
	fn empty_bodies_decode_as_unit_or_none() {
		Payload::Empty.into_typed::<()>().unwrap();
		assert_eq!(Payload::Empty.into_typed::<Option<u32>>().unwrap(), None);
	}

	#[test]
	fn server_errors_carry_message_and_code() {
		let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"picks_unique\""}"#;
		let err = into_result(raw(409, body)).unwrap_err();
		assert_eq!(err.code(), Some("23505"));
		assert_eq!(err.status(), Some(409));
		assert!(err.to_string().starts_with("duplicate key value"));
	}

	#[test]
	fn auth_style_errors_are_read() {
		let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
		let err = into_result(raw(400, body)).unwrap_err();
		assert_eq!(err.to_string(), "Invalid login credentials");
		let err = into_result(raw(422, r#"{"code":422,"msg":"User already registered"}"#)).unwrap_err();
		assert_eq!(err.to_string(), "User already registered");
		assert_eq!(err.code(), Some("422"));
	}

	#[test]
	fn text_and_empty_errors_have_messages() {
		assert_eq!(into_result(raw(502, "Bad Gateway\n")).unwrap_err().to_string(), "Bad Gateway");
		assert_eq!(
			into_result(raw(500, "")).unwrap_err().to_string(),
			"Request failed with status 500"
		);
	}
}
