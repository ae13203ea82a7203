use crate::{
	api::{auth::AuthClient, tmdb::MetadataClient, Gateway, Transport},
	clock::Clock,
	config::AppConfig,
	database::Database,
	notify::PermissionGate,
	session::SessionStore,
	storage::KeyValueStore,
};
use std::rc::Rc;

/// Everything the UI talks to, built once from the configuration.
/// A missing client means its feature is switched off.
#[derive(Clone)]
pub struct Services {
	pub config: Rc<AppConfig>,
	pub sessions: SessionStore,
	pub clock: Rc<dyn Clock>,
	pub database: Option<Database>,
	pub auth: Option<AuthClient>,
	pub metadata: Option<MetadataClient>,
	/// Shared by every reminder center so notification permission is asked once per session.
	pub permissions: PermissionGate,
}

impl PartialEq for Services {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.config, &other.config)
	}
}

impl Services {
	pub fn new(
		config: AppConfig,
		store: Rc<dyn KeyValueStore>,
		transport: Rc<dyn Transport>,
		clock: Rc<dyn Clock>,
	) -> Self {
		let sessions = SessionStore::new(store);
		let gateway = config.backend.as_ref().and_then(|backend| {
			Gateway::new(backend, Rc::new(sessions.clone()), transport.clone())
				.map_err(|err| log::error!("backend disabled: {err}"))
				.ok()
		});
		let metadata = config.metadata.as_ref().and_then(|metadata| {
			MetadataClient::new(metadata, transport.clone())
				.map_err(|err| log::error!("metadata disabled: {err}"))
				.ok()
		});
		if gateway.is_none() {
			log::warn!("backend is not configured, sign in and sharing are unavailable");
		}
		if metadata.is_none() {
			log::warn!("metadata key is not configured, title search is unavailable");
		}
		let auth = gateway
			.as_ref()
			.map(|gateway| AuthClient::new(gateway.clone(), sessions.clone(), clock.clone()));
		// table requests renew an expiring session through the auth client before they are signed
		let database = gateway
			.zip(auth.clone())
			.map(|(gateway, auth)| Database::new(gateway.with_tokens(Rc::new(auth))));
		Self {
			config: Rc::new(config),
			database,
			auth,
			metadata,
			sessions,
			clock,
			permissions: PermissionGate::default(),
		}
	}
}

#[cfg(target_family = "wasm")]
pub use provider::*;

#[cfg(target_family = "wasm")]
mod provider {
	use super::Services;
	use crate::{api::HttpTransport, clock::SystemClock, config::AppConfig, storage::default_store};
	use std::rc::Rc;
	use yew::prelude::*;

	#[function_component]
	pub fn Provider(props: &html::ChildrenProps) -> Html {
		let services = use_memo((), |_| {
			Services::new(
				AppConfig::from_env(),
				default_store(),
				Rc::new(HttpTransport::default()),
				Rc::new(SystemClock),
			)
		});
		html! {
			<ContextProvider<Services> context={(*services).clone()}>
				{props.children.clone()}
			</ContextProvider<Services>>
		}
	}

	thread_local! {
		static DISABLED: Services = Services::new(
			AppConfig::default(),
			default_store(),
			Rc::new(HttpTransport::default()),
			Rc::new(SystemClock),
		);
	}

	/// Outside of a [`Provider`] every caller gets the same disabled instance,
	/// so effects keyed on it stay put across renders.
	#[hook]
	pub fn use_services() -> Services {
		use_context::<Services>().unwrap_or_else(|| {
			log::error!("Services used outside of services::Provider");
			DISABLED.with(Services::clone)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		api::testing::RecordingTransport, clock::SystemClock, config::Feature, notify::Permission, storage::MemoryStore,
	};

	#[test]
	fn missing_config_disables_clients() {
		let services = Services::new(
			AppConfig::from_values(None, None, Some("tmdb"), None),
			Rc::new(MemoryStore::default()),
			Rc::new(RecordingTransport::default()),
			Rc::new(SystemClock),
		);
		assert!(services.database.is_none());
		assert!(services.auth.is_none());
		assert!(services.metadata.is_some());
		assert!(services.config.has(Feature::Metadata));
	}

	#[test]
	fn full_config_enables_clients() {
		let services = Services::new(
			AppConfig::from_values(Some("https://x.supabase.co"), Some("anon"), Some("tmdb"), None),
			Rc::new(MemoryStore::default()),
			Rc::new(RecordingTransport::default()),
			Rc::new(SystemClock),
		);
		assert!(services.database.is_some());
		assert!(services.auth.is_some());
	}

	fn disabled() -> Services {
		Services::new(
			AppConfig::default(),
			Rc::new(MemoryStore::default()),
			Rc::new(RecordingTransport::default()),
			Rc::new(SystemClock),
		)
	}

	#[test]
	fn clones_stay_equal_and_share_the_permission_gate() {
		let services = disabled();
		let copy = services.clone();
		assert!(copy == services);
		// a rebuilt instance is a different set of clients, effects keyed on it restart
		assert!(disabled() != services);
		assert!(services.permissions.should_request(Permission::Default));
		assert!(!copy.permissions.should_request(Permission::Default));
	}
}
