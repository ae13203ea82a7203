//! The app-wide view of who is signed in.
use crate::{api::auth::AuthEvent, session::AuthSession};
use uuid::Uuid;
use yewdux::store::Store;

#[derive(Clone, Debug, Default, PartialEq, Store)]
pub enum Status {
	/// The stored session has not been checked yet.
	#[default]
	Loading,
	SignedOut,
	SignedIn(AuthSession),
	/// No backend is configured, signing in is impossible.
	Unavailable,
}

impl Status {
	pub fn session(&self) -> Option<&AuthSession> {
		match self {
			Self::SignedIn(session) => Some(session),
			_ => None,
		}
	}

	pub fn user_id(&self) -> Option<Uuid> {
		self.session().map(AuthSession::user_id)
	}

	fn from_session(session: Option<AuthSession>) -> Self {
		match session {
			Some(session) => Self::SignedIn(session),
			None => Self::SignedOut,
		}
	}
}

/// Orders the two writers that race on startup: the initial session fetch and the
/// event subscription. Whichever lands first initializes the status, a fetch that
/// resolves after any event is stale and ignored. Events always apply.
#[derive(Debug, Default)]
pub struct SessionGate {
	initialized: bool,
}

impl SessionGate {
	pub fn is_initialized(&self) -> bool {
		self.initialized
	}

	pub fn on_fetch(&mut self, session: Option<AuthSession>) -> Option<Status> {
		if self.initialized {
			return None;
		}
		self.initialized = true;
		Some(Status::from_session(session))
	}

	pub fn on_event(&mut self, event: AuthEvent) -> Status {
		self.initialized = true;
		match event {
			AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => Status::SignedIn(session),
			AuthEvent::SignedOut => Status::SignedOut,
		}
	}

	/// Another tab wrote (or removed) the stored session.
	pub fn on_storage(&mut self, session: Option<AuthSession>) -> Status {
		self.on_event(match session {
			Some(session) => AuthEvent::SignedIn(session),
			None => AuthEvent::SignedOut,
		})
	}
}

#[cfg(target_family = "wasm")]
pub use provider::*;

#[cfg(target_family = "wasm")]
mod provider {
	use super::{SessionGate, Status};
	use crate::{
		api::auth::AuthClient,
		route::Route,
		services::use_services,
		session::{AuthSession, SessionStore, SessionValue},
		storage::scoped_key,
	};
	use futures::future::{AbortHandle, Abortable};
	use gloo_events::EventListener;
	use std::{cell::RefCell, rc::Rc};
	use wasm_bindgen::JsCast;
	use yew::prelude::*;
	use yew_router::prelude::Link;
	use yewdux::prelude::*;

	struct SessionWatch {
		abort: AbortHandle,
		_storage: EventListener,
	}

	impl Drop for SessionWatch {
		fn drop(&mut self) {
			self.abort.abort();
		}
	}

	fn watch_session(auth: AuthClient, sessions: SessionStore) -> SessionWatch {
		let dispatch = Dispatch::<Status>::new();
		let gate = Rc::new(RefCell::new(SessionGate::default()));
		let (abort, registration) = AbortHandle::new_pair();

		let events = auth.subscribe();
		wasm_bindgen_futures::spawn_local({
			let gate = gate.clone();
			let dispatch = dispatch.clone();
			let auth = auth.clone();
			async move {
				let listen = async {
					while let Ok(event) = events.recv().await {
						let status = gate.borrow_mut().on_event(event);
						dispatch.set(status);
					}
				};
				let fetch = async {
					let session = match auth.current_session().await {
						Ok(session) => session,
						Err(err) => {
							log::warn!(target: "auth", "could not restore session: {err}");
							None
						}
					};
					if let Some(status) = gate.borrow_mut().on_fetch(session) {
						dispatch.set(status);
					}
				};
				let both = futures::future::join(listen, fetch);
				let _ = Abortable::new(both, registration).await;
			}
		});

		let key = scoped_key(AuthSession::id());
		let storage = EventListener::new(&gloo_utils::window(), "storage", move |event| {
			let Some(event) = event.dyn_ref::<web_sys::StorageEvent>() else {
				return;
			};
			// a cleared storage reports no key at all
			if event.key().is_some_and(|changed| changed != key) {
				return;
			}
			log::debug!(target: "auth", "session changed in another tab");
			let status = gate.borrow_mut().on_storage(sessions.get());
			dispatch.set(status);
		});

		SessionWatch {
			abort,
			_storage: storage,
		}
	}

	#[function_component]
	pub fn Provider(props: &html::ChildrenProps) -> Html {
		let services = use_services();
		use_effect_with(services, |services| {
			let watch = match services.auth.clone() {
				Some(auth) => Some(watch_session(auth, services.sessions.clone())),
				None => {
					Dispatch::<Status>::new().set(Status::Unavailable);
					None
				}
			};
			move || drop(watch)
		});
		html! {<>{props.children.clone()}</>}
	}

	#[hook]
	pub fn use_session() -> Option<AuthSession> {
		let status = use_store_value::<Status>();
		status.session().cloned()
	}

	#[function_component]
	pub fn LoginButton() -> Html {
		let services = use_services();
		let status = use_store_value::<Status>();
		let signing_out = use_state_eq(|| false);
		match (&*status, services.auth) {
			(Status::SignedIn(_), Some(auth)) => {
				let onclick = Callback::from({
					let signing_out = signing_out.clone();
					move |_: MouseEvent| {
						let auth = auth.clone();
						let signing_out = signing_out.clone();
						signing_out.set(true);
						wasm_bindgen_futures::spawn_local(async move {
							auth.sign_out().await;
							signing_out.set(false);
						});
					}
				});
				html! {
					<button class="btn btn-outline-danger" {onclick} disabled={*signing_out}>
						{"Sign Out"}
					</button>
				}
			}
			(Status::Unavailable, _) | (_, None) => html! {},
			_ => html! {
				<Link<Route> classes="btn btn-success" to={Route::SignIn}>{"Sign In"}</Link<Route>>
			},
		}
	}
}
