use crate::{
	api::ApiError,
	auth::use_session,
	components::{ErrorText, FeatureDisabled, Poster, ReminderModal, RequireSession, Spinner},
	data::{TitleSnapshot, WatchReminder},
	hooks::use_async,
	route::Route,
	services::use_services,
	util::datetime::{format_display, local_offset},
};
use futures_util::FutureExt;
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component]
pub fn Reminders() -> Html {
	html! {
		<RequireSession>
			<div class="container">
				<div class="row">
					<div class="col-lg-7">
						<h4>{"Upcoming reminders"}</h4>
						<UpcomingReminders />
					</div>
					<div class="col-lg-5">
						<h4>{"Sent recommendations"}</h4>
						<SentRecommendations />
					</div>
				</div>
			</div>
		</RequireSession>
	}
}

#[function_component]
fn UpcomingReminders() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let editing = use_state_eq(|| None::<TitleSnapshot>);
	let error = use_state_eq(|| None::<String>);
	let reminders = use_async(true, {
		let database = services.database.clone();
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.list_upcoming_reminders(user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	let (Some(database), Some(user)) = (services.database.clone(), user) else {
		return html!(<FeatureDisabled feature="Reminders" />);
	};

	let cancel = Callback::from({
		let reminders = reminders.clone();
		let error = error.clone();
		let clock = services.clock.clone();
		move |reminder: WatchReminder| {
			let database = database.clone();
			let reminders = reminders.clone();
			let error = error.clone();
			let now = clock.now();
			wasm_bindgen_futures::spawn_local(async move {
				match database.cancel_watch_reminder(user, reminder.movie_id, now).await {
					Ok(()) => reminders.run(),
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});
	let close_editor = Callback::from({
		let editing = editing.clone();
		let reminders = reminders.clone();
		move |_: ()| {
			editing.set(None);
			reminders.run();
		}
	});

	let list = match (&reminders.data, &reminders.error) {
		(_, Some(err)) => return html!(<ErrorText message={Some(err.user_message(None))} />),
		(Some(list), _) => list.clone(),
		(None, None) => return html!(<Spinner />),
	};
	html! {<>
		<ErrorText message={(*error).clone()} />
		{match list.is_empty() {
			true => html!(<p class="text-muted">{"No reminders scheduled. Open a title and choose \u{201c}Remind me\u{201d}."}</p>),
			false => html! {
				<ul class="list-group">
					{list.into_iter().map(|reminder| {
						let snapshot = TitleSnapshot {
							movie_id: reminder.movie_id,
							movie_title: reminder.movie_title.clone(),
							poster_path: None,
						};
						let on_edit = {
							let editing = editing.clone();
							let snapshot = snapshot.clone();
							Callback::from(move |_: MouseEvent| editing.set(Some(snapshot.clone())))
						};
						let on_cancel = cancel.reform({
							let reminder = reminder.clone();
							move |_: MouseEvent| reminder.clone()
						});
						html! {
							<li class="list-group-item d-flex align-items-center gap-3" key={reminder.id.to_string()}>
								<div class="me-auto">
									<Link<Route> classes="fw-semibold" to={Route::title(&reminder.movie_id)}>{&reminder.movie_title}</Link<Route>>
									<div class="small text-muted">
										<i class="bi bi-alarm me-1" />
										{format_display(reminder.remind_at, local_offset())}
									</div>
								</div>
								<button class="btn btn-sm btn-outline-primary" onclick={on_edit}>{"Change"}</button>
								<button class="btn btn-sm btn-outline-danger" onclick={on_cancel}>{"Cancel"}</button>
							</li>
						}
					}).collect::<Vec<_>>()}
				</ul>
			},
		}}
		{editing.as_ref().map(|title| html!(<ReminderModal title={title.clone()} on_close={close_editor} />))}
	</>}
}

#[function_component]
fn SentRecommendations() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let sent = use_async(true, {
		let database = services.database.clone();
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.sent_recommendations(user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	let list = match (&sent.data, &sent.error) {
		(_, Some(err)) => return html!(<ErrorText message={Some(err.user_message(None))} />),
		(Some(list), _) => list.clone(),
		(None, _) => return html!(<Spinner />),
	};
	if list.is_empty() {
		return html!(<p class="text-muted">{"You haven't sent anything yet."}</p>);
	}
	html! {
		<ul class="list-group">
			{list.into_iter().map(|entry| {
				let item = &entry.item;
				let status = match (item.watched, item.read) {
					(true, _) => html!(<span class="badge text-bg-success">{"Watched"}</span>),
					(false, true) => html!(<span class="badge text-bg-secondary">{"Seen"}</span>),
					(false, false) => html!(<span class="badge text-bg-light">{"Sent"}</span>),
				};
				html! {
					<li class="list-group-item d-flex align-items-center gap-2" key={item.id.to_string()}>
						<Poster title={item.movie_id} poster_path={item.poster_path.clone()}
							size={crate::api::tmdb::PosterSize::Thumb} classes="poster-thumb rounded" />
						<div class="me-auto">
							<Link<Route> to={Route::title(&item.movie_id)}>{&item.movie_title}</Link<Route>>
							<div class="small text-muted">{format!("to {}", entry.author_name())}</div>
						</div>
						{status}
					</li>
				}
			}).collect::<Vec<_>>()}
		</ul>
	}
}
