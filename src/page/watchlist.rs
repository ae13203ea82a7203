use crate::{
	auth::use_session,
	components::{ErrorText, RequireSession, Spinner, TitleCard},
	data::TitleRef,
	route::Route,
	services::use_services,
	state::WatchlistState,
};
use yew::prelude::*;
use yew_router::prelude::Link;
use yewdux::prelude::use_store;

#[function_component]
pub fn Watchlist() -> Html {
	html! {
		<RequireSession>
			<WatchlistBody />
		</RequireSession>
	}
}

#[function_component]
fn WatchlistBody() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let (watchlist, dispatch) = use_store::<WatchlistState>();
	let error = use_state_eq(|| None::<String>);

	let remove = Callback::from({
		let database = services.database.clone();
		let error = error.clone();
		move |title: TitleRef| {
			let (Some(database), Some(user)) = (database.clone(), user) else {
				return;
			};
			let dispatch = dispatch.clone();
			let error = error.clone();
			wasm_bindgen_futures::spawn_local(async move {
				match database.remove_from_watchlist(user, title).await {
					Ok(()) => {
						dispatch.reduce_mut(|state| {
							state.remove(&title);
						});
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});

	if !user.is_some_and(|user| watchlist.is_loaded_for(user)) {
		return html!(<Spinner />);
	}
	html! {
		<div class="container">
			<h4>{"Your watchlist"}</h4>
			<ErrorText message={(*error).clone()} />
			{match watchlist.entries.is_empty() {
				true => html! {
					<p class="text-muted">
						{"Nothing saved yet. "}
						<Link<Route> to={Route::Search}>{"Find something to watch"}</Link<Route>>
					</p>
				},
				false => html! {
					<div class="d-flex flex-wrap">
						{watchlist.entries.iter().map(|entry| {
							let onclick = remove.reform({
								let title = entry.movie_id;
								move |_: MouseEvent| title
							});
							html! {
								<TitleCard
									key={entry.id.to_string()}
									title={entry.movie_id}
									name={entry.movie_title.clone()}
									poster_path={entry.poster_path.clone()}
								>
									<button class="btn btn-sm btn-outline-danger" {onclick}>{"Remove"}</button>
								</TitleCard>
							}
						}).collect::<Vec<_>>()}
					</div>
				},
			}}
		</div>
	}
}
