use crate::{
	auth,
	components::{CenterKind, Nav, ReminderToasts},
	page,
	route::{Route, RouteHtml},
	services::{self, use_services},
	state::{MyProfile, Nudges, WatchlistState},
};
use futures::future::{AbortHandle, Abortable};
use gloo_timers::callback::Interval;
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::BrowserRouter;
use yewdux::prelude::Dispatch;

/// How often the unread badge is refreshed while the app is open.
static UNREAD_REFRESH_MS: u32 = 60_000;

#[function_component]
pub fn App() -> Html {
	html! {
		<BrowserRouter>
			<services::Provider>
				<auth::Provider>
					<SessionData />
					<Nav />
					<main class="container-fluid py-3">
						{<Route as RouteHtml>::switch()}
					</main>
					<div class="toast-container position-fixed bottom-0 end-0 p-3">
						<ReminderToasts kind={CenterKind::WatchReminders} />
						<ReminderToasts kind={CenterKind::Recommendations} />
					</div>
				</auth::Provider>
			</services::Provider>
		</BrowserRouter>
	}
}

impl RouteHtml for Route {
	fn html(self) -> Html {
		match self {
			Self::Home => html!(<page::Home />),
			Self::Search => html!(<page::Search />),
			Self::Title { .. } => match self.title_ref() {
				Some(Ok(title)) => html!(<page::TitlePage {title} />),
				Some(Err(err)) => {
					log::debug!("bad title route: {err}");
					Self::NotFound.html()
				}
				None => Self::NotFound.html(),
			},
			Self::Friends => html!(<page::Friends />),
			Self::Groups => html!(<page::Groups />),
			Self::Group { id } => html!(<page::GroupPage {id} />),
			Self::Reminders => html!(<page::Reminders />),
			Self::Watchlist => html!(<page::Watchlist />),
			Self::Profile => html!(<page::ProfilePage />),
			Self::SignIn => html!(<page::SignIn />),
			Self::SignUp => html!(<page::SignUp />),
			Self::NotFound => html! {
				<div class="text-center my-5">
					<h1>{"404"}</h1>
					<p class="text-muted">{"Nothing lives at this address."}</p>
				</div>
			},
		}
	}
}

/// Loads the per-user stores whenever the signed-in user changes, and empties them on sign out.
#[function_component]
fn SessionData() -> Html {
	let services = use_services();
	let user = auth::use_session().map(|session| session.user_id());

	use_effect_with((user, services), |(user, services)| {
		let profile = Dispatch::<MyProfile>::new();
		let watchlist = Dispatch::<WatchlistState>::new();
		let nudges = Dispatch::<Nudges>::new();
		let mut cleanup = None;
		match (*user, services.database.clone()) {
			(Some(user), Some(database)) => {
				let (abort, registration) = AbortHandle::new_pair();
				wasm_bindgen_futures::spawn_local({
					let database = database.clone();
					async move {
						let load = load_user(database, user, profile, watchlist, nudges.clone());
						let _ = Abortable::new(load, registration).await;
					}
				});
				let refresh = Interval::new(UNREAD_REFRESH_MS, move || {
					let database = database.clone();
					let nudges = nudges.clone();
					wasm_bindgen_futures::spawn_local(async move {
						match database.unread_recommendation_count(user).await {
							Ok(unread) => nudges.reduce_mut(|state| state.set(unread)),
							Err(err) => log::debug!(target: "inbox", "unread refresh failed: {err}"),
						}
					});
				});
				cleanup = Some((abort, refresh));
			}
			_ => {
				profile.set(MyProfile::default());
				watchlist.reduce_mut(|state| state.clear());
				nudges.set(Nudges::default());
			}
		}
		move || {
			if let Some((abort, refresh)) = cleanup {
				abort.abort();
				drop(refresh);
			}
		}
	});

	html! {}
}

async fn load_user(
	database: crate::database::Database,
	user: Uuid,
	profile: Dispatch<MyProfile>,
	watchlist: Dispatch<WatchlistState>,
	nudges: Dispatch<Nudges>,
) {
	match database.get_profile(user).await {
		Ok(Some(loaded)) => {
			page::sync_theme(loaded.theme);
			profile.set(MyProfile(Some(loaded)));
		}
		Ok(None) => log::warn!(target: "profile", "no profile row for {user}"),
		Err(err) => log::error!(target: "profile", "failed to load profile: {err}"),
	}
	let entries = database.watchlist(user).await.unwrap_or_else(|err| {
		log::error!(target: "watchlist", "failed to load watchlist: {err}");
		Vec::new()
	});
	watchlist.reduce_mut(|state| state.replace(user, entries));
	match database.unread_recommendation_count(user).await {
		Ok(unread) => nudges.reduce_mut(|state| state.set(unread)),
		Err(err) => log::warn!(target: "inbox", "failed to count unread: {err}"),
	}
}
