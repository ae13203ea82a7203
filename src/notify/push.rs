//! Registers this browser for server-sent push through the service worker.
use crate::{api::ApiError, data::PushSubscription, database::Database};
use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{js_sys, JsFuture};
use web_sys::{PushManager, PushSubscriptionOptionsInit, ServiceWorkerRegistration};

pub static WORKER_SCRIPT: &str = "/sw.js";

fn js_error(err: JsValue) -> ApiError {
	ApiError::Network(format!("{err:?}"))
}

async fn push_manager() -> Result<PushManager, ApiError> {
	let container = gloo_utils::window().navigator().service_worker();
	let registration = JsFuture::from(container.register(WORKER_SCRIPT)).await.map_err(js_error)?;
	let registration: ServiceWorkerRegistration = registration.dyn_into().map_err(js_error)?;
	registration.push_manager().map_err(js_error)
}

async fn existing() -> Result<Option<web_sys::PushSubscription>, ApiError> {
	let manager = push_manager().await?;
	let found = JsFuture::from(manager.get_subscription().map_err(js_error)?).await.map_err(js_error)?;
	match found.is_null() || found.is_undefined() {
		true => Ok(None),
		false => Ok(Some(found.dyn_into().map_err(js_error)?)),
	}
}

pub fn is_supported() -> bool {
	let window = gloo_utils::window();
	js_sys::Reflect::has(&window.navigator(), &JsValue::from_str("serviceWorker")).unwrap_or(false)
		&& js_sys::Reflect::has(&window, &JsValue::from_str("PushManager")).unwrap_or(false)
}

pub async fn is_subscribed() -> Result<bool, ApiError> {
	Ok(existing().await?.is_some())
}

/// Subscribes with the server's VAPID public key (base64url) and stores the endpoint for `user`.
pub async fn subscribe(database: &Database, user: Uuid, vapid_key: &str) -> Result<(), ApiError> {
	let manager = push_manager().await?;
	let options = PushSubscriptionOptionsInit::new();
	options.set_user_visible_only(true);
	options.set_application_server_key(Some(&JsValue::from_str(vapid_key)));
	let subscribed = manager.subscribe_with_options(&options).map_err(js_error)?;
	let subscription: web_sys::PushSubscription =
		JsFuture::from(subscribed).await.map_err(js_error)?.dyn_into().map_err(js_error)?;
	let json = subscription.to_json().map_err(js_error)?;
	let json = js_sys::JSON::stringify(&json).map_err(js_error)?;
	let record = PushSubscription::from_browser_json(user, &String::from(json))
		.map_err(|err| ApiError::Parse(err.to_string()))?;
	database.save_push_subscription(&record).await?;
	log::info!(target: "push", "push notifications enabled");
	Ok(())
}

pub async fn unsubscribe(database: &Database) -> Result<(), ApiError> {
	let Some(subscription) = existing().await? else {
		return Ok(());
	};
	let endpoint = subscription.endpoint();
	JsFuture::from(subscription.unsubscribe().map_err(js_error)?).await.map_err(js_error)?;
	database.delete_push_subscription(&endpoint).await?;
	log::info!(target: "push", "push notifications disabled");
	Ok(())
}
