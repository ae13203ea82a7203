use super::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A browser push endpoint registered for a user. Unique by endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
	pub user_id: Uuid,
	pub endpoint: String,
	pub p256dh: String,
	pub auth: String,
}

impl Record for PushSubscription {
	fn table() -> &'static str {
		"push_subscriptions"
	}
}

#[derive(Deserialize)]
struct BrowserSubscription {
	endpoint: String,
	keys: BrowserKeys,
}

#[derive(Deserialize)]
struct BrowserKeys {
	p256dh: String,
	auth: String,
}

impl PushSubscription {
	/// Reads the JSON form of a browser `PushSubscription` (`subscription.toJSON()`).
	pub fn from_browser_json(user_id: Uuid, json: &str) -> Result<Self, serde_json::Error> {
		let BrowserSubscription { endpoint, keys } = serde_json::from_str(json)?;
		Ok(Self {
			user_id,
			endpoint,
			p256dh: keys.p256dh,
			auth: keys.auth,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_browser_subscription() {
		let user = Uuid::new_v4();
		let json = r#"{"endpoint":"https://push.example.com/abc","expirationTime":null,"keys":{"p256dh":"BNc","auth":"tBH"}}"#;
		let subscription = PushSubscription::from_browser_json(user, json).unwrap();
		assert_eq!(subscription.user_id, user);
		assert_eq!(subscription.endpoint, "https://push.example.com/abc");
		assert_eq!(subscription.p256dh, "BNc");
		assert_eq!(subscription.auth, "tBH");
	}

	#[test]
	fn subscriptions_without_keys_are_rejected() {
		assert!(PushSubscription::from_browser_json(Uuid::nil(), r#"{"endpoint":"x"}"#).is_err());
	}
}
