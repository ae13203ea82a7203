use crate::{
	api::{
		tmdb::{PosterSize, TitleDetails},
		ApiError,
	},
	auth::use_session,
	components::{AuthSwitch, ErrorText, FeatureDisabled, Poster, RecommendModal, ReminderModal, Spinner},
	data::{TitleRef, TitleSnapshot, WatchGroup},
	hooks::use_async,
	services::use_services,
	state::WatchlistState,
	util::web_ext::InputExt,
};
use futures_util::FutureExt;
use uuid::Uuid;
use yew::prelude::*;
use yewdux::prelude::use_store;

#[derive(Clone, PartialEq, Properties)]
pub struct TitlePageProps {
	pub title: TitleRef,
}

#[function_component]
pub fn TitlePage(TitlePageProps { title }: &TitlePageProps) -> Html {
	let services = use_services();
	let details = use_async(false, {
		let metadata = services.metadata.clone();
		let title = *title;
		move || {
			let metadata = metadata.clone();
			async move {
				match (title, metadata) {
					(TitleRef::Tmdb { kind, id }, Some(metadata)) => metadata.details(kind, id).await.map(Some),
					(TitleRef::Tmdb { .. }, None) => Err(ApiError::NotConfigured("Title details")),
					(TitleRef::Local(_), _) => Ok(None),
				}
			}
			.boxed_local()
		}
	});
	{
		let details = details.clone();
		use_effect_with(*title, move |_| details.run());
	}
	let (watchlist, _) = use_store::<WatchlistState>();

	if details.loading {
		return html!(<Spinner />);
	}
	if let Some(ApiError::NotConfigured(feature)) = &details.error {
		return html!(<FeatureDisabled feature={*feature} />);
	}
	if let Some(err) = &details.error {
		return html!(<ErrorText message={Some(err.user_message(None))} />);
	}
	match details.data.clone().flatten() {
		Some(details) => {
			let snapshot = details.summary.snapshot();
			html! {
				<div class="container">
					<DetailHeader details={details} />
					<AuthSwitch identified={html!(<TitleActions {snapshot} />)} />
				</div>
			}
		}
		// hand-entered titles only exist on the rows that reference them
		None => match watchlist.entries.iter().find(|entry| &entry.movie_id == title) {
			Some(entry) => {
				let snapshot = TitleSnapshot {
					movie_id: entry.movie_id,
					movie_title: entry.movie_title.clone(),
					poster_path: entry.poster_path.clone(),
				};
				html! {
					<div class="container">
						<h2>{&entry.movie_title}</h2>
						<TitleActions {snapshot} />
					</div>
				}
			}
			None => html!(<p class="text-muted container">{"This title was added by hand and has no catalog entry."}</p>),
		},
	}
}

#[derive(Clone, PartialEq, Properties)]
struct DetailHeaderProps {
	details: TitleDetails,
}

#[function_component]
fn DetailHeader(DetailHeaderProps { details }: &DetailHeaderProps) -> Html {
	let summary = &details.summary;
	let mut facts = Vec::new();
	if let Some(year) = summary.year {
		facts.push(year.to_string());
	}
	if let Some(minutes) = details.runtime_minutes {
		facts.push(format!("{}h {:02}m", minutes / 60, minutes % 60));
	}
	if let Some(seasons) = details.seasons {
		facts.push(match seasons {
			1 => "1 season".to_owned(),
			n => format!("{n} seasons"),
		});
	}
	if let Some(rating) = summary.rating {
		facts.push(format!("\u{2605} {rating:.1}"));
	}
	html! {
		<div class="d-flex flex-column flex-md-row gap-4 mb-4">
			<Poster title={summary.title} poster_path={summary.poster_path.clone()} size={PosterSize::Detail} classes="poster-detail rounded shadow" />
			<div>
				<h2>{&summary.name}</h2>
				{details.tagline.as_ref().map(|tagline| html!(<p class="fst-italic text-muted">{tagline}</p>))}
				<p class="text-muted">{facts.join(" \u{b7} ")}</p>
				<div class="mb-2">
					{summary.genres.iter().map(|genre| html!(<span class="badge text-bg-secondary me-1">{*genre}</span>)).collect::<Vec<_>>()}
				</div>
				<p>{&summary.overview}</p>
			</div>
		</div>
	}
}

#[derive(Clone, Copy, PartialEq)]
enum Modal {
	Recommend,
	Reminder,
}

#[derive(Clone, PartialEq, Properties)]
struct TitleActionsProps {
	snapshot: TitleSnapshot,
}

#[function_component]
fn TitleActions(TitleActionsProps { snapshot }: &TitleActionsProps) -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let (watchlist, dispatch) = use_store::<WatchlistState>();
	let modal = use_state_eq(|| None::<Modal>);
	let busy = use_state_eq(|| false);
	let message = use_state_eq(|| None::<Result<String, String>>);

	let Some(database) = services.database.clone() else {
		return html!(<FeatureDisabled feature="Sharing" />);
	};
	let Some(user) = user else {
		return html!();
	};
	let on_list = watchlist.contains(&snapshot.movie_id);
	let (watchlist_class, watchlist_icon, watchlist_label) = match on_list {
		true => ("btn-success", "bi-bookmark-check-fill", "On watchlist"),
		false => ("btn-outline-success", "bi-bookmark-plus", "Add to watchlist"),
	};

	let toggle_watchlist = Callback::from({
		let database = database.clone();
		let snapshot = snapshot.clone();
		let dispatch = dispatch.clone();
		let busy = busy.clone();
		let message = message.clone();
		move |_: MouseEvent| {
			let database = database.clone();
			let snapshot = snapshot.clone();
			let dispatch = dispatch.clone();
			let busy = busy.clone();
			let message = message.clone();
			busy.set(true);
			wasm_bindgen_futures::spawn_local(async move {
				let result = match on_list {
					true => database.remove_from_watchlist(user, snapshot.movie_id).await.map(|()| {
						dispatch.reduce_mut(|state| {
							state.remove(&snapshot.movie_id);
						});
						"Removed from your watchlist"
					}),
					false => database.add_to_watchlist(user, &snapshot).await.map(|entry| {
						dispatch.reduce_mut(|state| state.insert(entry));
						"Added to your watchlist"
					}),
				};
				busy.set(false);
				message.set(Some(result.map(str::to_owned).map_err(|err| err.user_message(None))));
			});
		}
	});
	let open = |which: Modal| {
		let modal = modal.clone();
		Callback::from(move |_: MouseEvent| modal.set(Some(which)))
	};
	let close = {
		let modal = modal.clone();
		Callback::from(move |_: ()| modal.set(None))
	};

	html! {
		<div class="mb-4">
			<div class="d-flex flex-wrap gap-2">
				<button class={classes!("btn", watchlist_class)} onclick={toggle_watchlist} disabled={*busy}>
					<i class={classes!("bi", watchlist_icon, "me-1")} />
					{watchlist_label}
				</button>
				<button class="btn btn-outline-primary" onclick={open(Modal::Recommend)}>
					<i class="bi bi-send me-1" />{"Recommend"}
				</button>
				<button class="btn btn-outline-primary" onclick={open(Modal::Reminder)}>
					<i class="bi bi-alarm me-1" />{"Remind me"}
				</button>
				<AddToGroup snapshot={snapshot.clone()} {user} />
			</div>
			{match &*message {
				Some(Ok(text)) => html!(<div class="text-success small mt-2">{text}</div>),
				Some(Err(text)) => html!(<ErrorText message={Some(text.clone())} />),
				None => html!(),
			}}
			{match *modal {
				Some(Modal::Recommend) => html!(<RecommendModal title={snapshot.clone()} on_close={close} />),
				Some(Modal::Reminder) => html!(<ReminderModal title={snapshot.clone()} on_close={close} />),
				None => html!(),
			}}
		</div>
	}
}

#[derive(Clone, PartialEq, Properties)]
struct AddToGroupProps {
	snapshot: TitleSnapshot,
	user: Uuid,
}

#[function_component]
fn AddToGroup(AddToGroupProps { snapshot, user }: &AddToGroupProps) -> Html {
	let services = use_services();
	let status = use_state_eq(|| None::<Result<String, String>>);
	let groups = use_async(true, {
		let database = services.database.clone();
		let user = *user;
		move || {
			let database = database.clone();
			async move {
				match database {
					Some(database) => database.my_groups(user).await,
					None => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	let groups: Vec<WatchGroup> = groups.data.clone().unwrap_or_default();
	if groups.is_empty() {
		return html!();
	}

	let pick = Callback::from({
		let database = services.database.clone();
		let snapshot = snapshot.clone();
		let user = *user;
		let status = status.clone();
		let groups = groups.clone();
		move |evt: web_sys::Event| {
			let Some(group) = evt.select_value().and_then(|id| Uuid::parse_str(&id).ok()) else {
				return;
			};
			let Some(database) = database.clone() else {
				return;
			};
			let name = groups.iter().find(|g| g.id == group).map(|g| g.name.clone()).unwrap_or_default();
			let snapshot = snapshot.clone();
			let status = status.clone();
			wasm_bindgen_futures::spawn_local(async move {
				let result = database.add_group_pick(group, user, &snapshot).await;
				status.set(Some(match result {
					Ok(_) => Ok(format!("Added to {name}")),
					Err(err) => Err(err.user_message(None)),
				}));
			});
		}
	});

	html! {
		<div class="d-inline-flex align-items-center gap-2">
			<select class="form-select" onchange={pick}>
				<option value="" selected=true>{"Add to a group..."}</option>
				{groups.iter().map(|group| html! {
					<option value={group.id.to_string()}>{&group.name}</option>
				}).collect::<Vec<_>>()}
			</select>
			{match &*status {
				Some(Ok(text)) => html!(<span class="text-success small">{text}</span>),
				Some(Err(text)) => html!(<span class="text-danger small">{text}</span>),
				None => html!(),
			}}
		</div>
	}
}
