use crate::{
	api::ApiError,
	auth::use_session,
	components::{user::Avatar, AuthSwitch, ErrorText, FeatureDisabled, Poster, Spinner},
	data::{FriendRecommendation, Recommendation},
	database::{Attributed, Database},
	hooks::use_async,
	route::Route,
	services::use_services,
	state::Nudges,
	util::{
		datetime::{format_display, format_input, local_offset, parse_input},
		web_ext::bind_input,
	},
};
use futures_util::{future::LocalBoxFuture, FutureExt};
use yew::prelude::*;
use yew_router::prelude::Link;
use yewdux::prelude::Dispatch;

#[function_component]
pub fn Home() -> Html {
	html! {
		<AuthSwitch
			identified={html!(<Dashboard />)}
			anonymous={html!(<Landing />)}
			loading={html!(<Spinner />)}
		/>
	}
}

#[function_component]
fn Landing() -> Html {
	html! {
		<div class="container text-center my-5">
			<h1 class="display-5">{"Watch with your friends"}</h1>
			<p class="lead">{"Send the shows and movies you love to the people you love, and never forget what they sent you."}</p>
			<div class="d-flex justify-content-center gap-2">
				<Link<Route> classes="btn btn-primary" to={Route::SignUp}>{"Create an account"}</Link<Route>>
				<Link<Route> classes="btn btn-outline-secondary" to={Route::Search}>{"Browse titles"}</Link<Route>>
			</div>
		</div>
	}
}

#[function_component]
fn Dashboard() -> Html {
	let services = use_services();
	if services.database.is_none() {
		return html!(<FeatureDisabled feature="Sharing" />);
	}
	html! {
		<div class="container">
			<div class="row">
				<div class="col-lg-6">
					<h4>{"Sent to you"}</h4>
					<Inbox />
				</div>
				<div class="col-lg-6">
					<h4>{"From your friends"}</h4>
					<Feed />
				</div>
			</div>
		</div>
	}
}

#[function_component]
fn Inbox() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let inbox = use_async(true, {
		let database = services.database.clone();
		move || {
			let database = database.clone();
			async move {
				let (Some(database), Some(user)) = (database, user) else {
					return Err(ApiError::SignedOut);
				};
				let items = database.recommendation_inbox(user).await?;
				// the inbox is the source of truth for the badge whenever it loads
				let unread = items.iter().filter(|entry| !entry.item.read).count();
				Dispatch::<Nudges>::new().reduce_mut(|nudges| nudges.set(unread));
				Ok(items)
			}
			.boxed_local()
		}
	});
	let reload = Callback::from({
		let inbox = inbox.clone();
		move |_: ()| inbox.run()
	});

	if inbox.loading && inbox.data.is_none() {
		return html!(<Spinner />);
	}
	if let Some(err) = &inbox.error {
		return html!(<ErrorText message={Some(err.user_message(None))} />);
	}
	let items = inbox.data.clone().unwrap_or_default();
	if items.is_empty() {
		return html!(<p class="text-muted">{"Nothing yet. Recommendations from friends show up here."}</p>);
	}
	html! {
		<div class="list-group mb-4">
			{items.into_iter().map(|entry| html! {
				<InboxItem key={entry.item.id.to_string()} {entry} on_change={reload.clone()} />
			}).collect::<Vec<_>>()}
		</div>
	}
}

type Change = Box<dyn FnOnce(Database) -> LocalBoxFuture<'static, Result<(), ApiError>>>;

#[derive(Clone, PartialEq, Properties)]
struct InboxItemProps {
	entry: Attributed<FriendRecommendation>,
	on_change: Callback<()>,
}

#[function_component]
fn InboxItem(InboxItemProps { entry, on_change }: &InboxItemProps) -> Html {
	let services = use_services();
	let item = &entry.item;
	let when = use_state_eq({
		let remind_at = item.remind_at;
		move || remind_at.map(|at| format_input(at, local_offset())).unwrap_or_default()
	});
	let editing_reminder = use_state_eq(|| false);
	let error = use_state_eq(|| None::<String>);

	let run = {
		let database = services.database.clone();
		let error = error.clone();
		let on_change = on_change.clone();
		move |change: Change| {
			let Some(database) = database.clone() else {
				return;
			};
			let error = error.clone();
			let on_change = on_change.clone();
			wasm_bindgen_futures::spawn_local(async move {
				match change(database).await {
					Ok(()) => {
						error.set(None);
						on_change.emit(());
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	};

	let mark_read = Callback::from({
		let run = run.clone();
		let id = item.id;
		move |_: MouseEvent| {
			Dispatch::<Nudges>::new().reduce_mut(Nudges::mark_one_read);
			run(Box::new(move |database: Database| async move { database.mark_recommendation_read(id).await }.boxed_local()));
		}
	});
	let toggle_watched = Callback::from({
		let run = run.clone();
		let id = item.id;
		let watched = !item.watched;
		let was_read = item.read;
		move |_: MouseEvent| {
			if !was_read {
				Dispatch::<Nudges>::new().reduce_mut(Nudges::mark_one_read);
			}
			run(Box::new(move |database: Database| {
				async move { database.set_recommendation_watched(id, watched).await }.boxed_local()
			}));
		}
	});
	let save_reminder = Callback::from({
		let run = run.clone();
		let id = item.id;
		let when = when.clone();
		let error = error.clone();
		let editing_reminder = editing_reminder.clone();
		move |evt: SubmitEvent| {
			evt.prevent_default();
			let Some(remind_at) = parse_input(&when, local_offset()) else {
				error.set(Some("Pick a date and time".to_owned()));
				return;
			};
			editing_reminder.set(false);
			run(Box::new(move |database: Database| {
				async move { database.set_recommendation_reminder(id, Some(remind_at)).await.map(|_| ()) }.boxed_local()
			}));
		}
	});
	let clear_reminder = Callback::from({
		let run = run.clone();
		let id = item.id;
		let editing_reminder = editing_reminder.clone();
		move |_: MouseEvent| {
			editing_reminder.set(false);
			run(Box::new(move |database: Database| {
				async move { database.set_recommendation_reminder(id, None).await.map(|_| ()) }.boxed_local()
			}));
		}
	});
	let edit_reminder = Callback::from({
		let editing_reminder = editing_reminder.clone();
		move |_: MouseEvent| editing_reminder.set(!*editing_reminder)
	});

	html! {
		<div class={classes!("list-group-item", (!item.read).then_some("list-group-item-primary"))}>
			<div class="d-flex gap-3">
				<Link<Route> to={Route::title(&item.movie_id)}>
					<Poster title={item.movie_id} poster_path={item.poster_path.clone()}
						size={crate::api::tmdb::PosterSize::Thumb} classes="poster-thumb rounded" />
				</Link<Route>>
				<div class="flex-grow-1">
					<div class="d-flex align-items-center gap-2">
						{entry.by.clone().map(|profile| html!(<Avatar {profile} size={20} />))}
						<small class="text-muted">{format!("{} recommends", entry.author_name())}</small>
					</div>
					<Link<Route> classes="fw-semibold" to={Route::title(&item.movie_id)}>{&item.movie_title}</Link<Route>>
					{item.note.as_ref().map(|note| html!(<p class="mb-1 fst-italic">{format!("\u{201c}{note}\u{201d}")}</p>))}
					{item.remind_at.map(|at| html! {
						<div class="small text-muted">
							<i class="bi bi-alarm me-1" />
							{format!("Reminder {}", format_display(at, local_offset()))}
						</div>
					})}
					<div class="d-flex flex-wrap gap-1 mt-1">
						{(!item.read).then(|| html! {
							<button class="btn btn-sm btn-outline-secondary" onclick={mark_read}>{"Mark read"}</button>
						})}
						<button class="btn btn-sm btn-outline-success" onclick={toggle_watched}>
							{match item.watched { true => "Watched \u{2713}", false => "Mark watched" }}
						</button>
						<button class="btn btn-sm btn-outline-primary" onclick={edit_reminder}>
							<i class="bi bi-alarm" />
						</button>
					</div>
					{editing_reminder.then(|| html! {
						<form class="d-flex gap-1 mt-2" onsubmit={save_reminder}>
							<input type="datetime-local" class="form-control form-control-sm"
								value={(*when).clone()} oninput={bind_input(&when)} />
							<button type="submit" class="btn btn-sm btn-primary">{"Set"}</button>
							{item.remind_at.is_some().then(|| html! {
								<button type="button" class="btn btn-sm btn-outline-danger" onclick={clear_reminder}>{"Clear"}</button>
							})}
						</form>
					})}
					<ErrorText message={(*error).clone()} />
				</div>
			</div>
		</div>
	}
}

#[function_component]
fn Feed() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let feed = use_async(true, {
		let database = services.database.clone();
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.friend_feed(user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	if feed.loading {
		return html!(<Spinner />);
	}
	if let Some(err) = &feed.error {
		return html!(<ErrorText message={Some(err.user_message(None))} />);
	}
	let shares = feed.data.clone().unwrap_or_default();
	if shares.is_empty() {
		return html! {
			<p class="text-muted">
				{"Your friends haven't shared anything yet. "}
				<Link<Route> to={Route::Friends}>{"Find friends"}</Link<Route>>
			</p>
		};
	}
	html! {
		<div class="list-group">
			{shares.into_iter().map(|share| html!(<FeedItem key={share.item.id.to_string()} {share} />)).collect::<Vec<_>>()}
		</div>
	}
}

#[derive(Clone, PartialEq, Properties)]
struct FeedItemProps {
	share: Attributed<Recommendation>,
}

#[function_component]
fn FeedItem(FeedItemProps { share }: &FeedItemProps) -> Html {
	let item = &share.item;
	html! {
		<div class="list-group-item d-flex gap-3">
			<Link<Route> to={Route::title(&item.movie_id)}>
				<Poster title={item.movie_id} poster_path={item.poster_path.clone()}
					size={crate::api::tmdb::PosterSize::Thumb} classes="poster-thumb rounded" />
			</Link<Route>>
			<div>
				<small class="text-muted">{format!("{} shared", share.author_name())}</small>
				<div>
					<Link<Route> classes="fw-semibold" to={Route::title(&item.movie_id)}>{&item.movie_title}</Link<Route>>
				</div>
				{item.note.as_ref().map(|note| html!(<p class="mb-0 fst-italic">{note}</p>))}
			</div>
		</div>
	}
}
