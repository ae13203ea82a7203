use super::{NotificationSink, Permission, Toast};
use crate::data::TitleRef;
use futures_util::future::LocalBoxFuture;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{js_sys, JsFuture};
use web_sys::{Notification, NotificationOptions, NotificationPermission};
use yew::Callback;

/// Desktop notifications through the browser's Notification API.
/// Clicking one focuses the tab and emits the toast's target.
pub struct BrowserNotifications {
	pub on_click: Callback<TitleRef>,
}

fn is_supported() -> bool {
	let window = gloo_utils::window();
	js_sys::Reflect::has(&window, &JsValue::from_str("Notification")).unwrap_or(false)
}

impl NotificationSink for BrowserNotifications {
	fn permission(&self) -> Permission {
		if !is_supported() {
			return Permission::Unsupported;
		}
		match Notification::permission() {
			NotificationPermission::Granted => Permission::Granted,
			NotificationPermission::Denied => Permission::Denied,
			_ => Permission::Default,
		}
	}

	fn request_permission(&self) -> LocalBoxFuture<'_, Result<Permission, String>> {
		Box::pin(async move {
			let promise = Notification::request_permission().map_err(|err| format!("{err:?}"))?;
			let answer = JsFuture::from(promise).await.map_err(|err| format!("{err:?}"))?;
			Ok(match answer.as_string().as_deref() {
				Some("granted") => Permission::Granted,
				Some("denied") => Permission::Denied,
				_ => Permission::Default,
			})
		})
	}

	fn show(&self, toast: &Toast) -> Result<(), String> {
		let options = NotificationOptions::new();
		options.set_tag(&toast.id);
		if let Some(body) = &toast.body {
			options.set_body(body);
		}
		let notification =
			Notification::new_with_options(&toast.title, &options).map_err(|err| format!("{err:?}"))?;
		let on_click = self.on_click.clone();
		let target = toast.target;
		let handle = notification.clone();
		gloo_events::EventListener::once(&notification, "click", move |_| {
			let _ = gloo_utils::window().focus();
			handle.close();
			on_click.emit(target);
		})
		.forget();
		Ok(())
	}
}
