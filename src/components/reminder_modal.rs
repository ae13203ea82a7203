use crate::{
	api::ApiError,
	auth::use_session,
	components::{ErrorText, Spinner},
	data::{TitleSnapshot, WatchReminder},
	hooks::use_async,
	services::use_services,
	util::{
		datetime::{format_display, format_input, local_offset, parse_input},
		web_ext::bind_input,
	},
};
use futures_util::FutureExt;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ReminderModalProps {
	pub title: TitleSnapshot,
	pub on_close: Callback<()>,
}

/// Schedule, move or remove the signed-in user's reminder for one title.
#[function_component]
pub fn ReminderModal(ReminderModalProps { title, on_close }: &ReminderModalProps) -> Html {
	let services = use_services();
	let session = use_session();
	let user = session.as_ref().map(|session| session.user_id());
	let when = use_state_eq(String::new);
	let busy = use_state_eq(|| false);
	let error = use_state_eq(|| None::<String>);

	let existing = use_async(true, {
		let database = services.database.clone();
		let movie = title.movie_id;
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.get_watch_reminder_for_movie(user, movie).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	let current: Option<WatchReminder> = existing.data.clone().flatten().filter(WatchReminder::is_active);
	{
		let when = when.clone();
		use_effect_with(current.clone(), move |current| {
			if let Some(reminder) = current {
				when.set(format_input(reminder.remind_at, local_offset()));
			}
		});
	}

	let save = {
		let database = services.database.clone();
		let clock = services.clock.clone();
		let title = title.clone();
		let when = when.clone();
		let busy = busy.clone();
		let error = error.clone();
		let on_close = on_close.clone();
		Callback::from(move |evt: SubmitEvent| {
			evt.prevent_default();
			let (Some(database), Some(user)) = (database.clone(), user) else {
				error.set(Some(ApiError::SignedOut.to_string()));
				return;
			};
			let Some(remind_at) = parse_input(&when, local_offset()) else {
				error.set(Some("Pick a date and time".to_owned()));
				return;
			};
			if remind_at <= clock.now() {
				error.set(Some("Pick a time in the future".to_owned()));
				return;
			}
			let title = title.clone();
			let busy = busy.clone();
			let error = error.clone();
			let on_close = on_close.clone();
			busy.set(true);
			error.set(None);
			wasm_bindgen_futures::spawn_local(async move {
				let result = database.upsert_watch_reminder(user, &title, remind_at).await;
				busy.set(false);
				match result {
					Ok(_) => on_close.emit(()),
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		})
	};

	let remove = {
		let database = services.database.clone();
		let movie = title.movie_id;
		let busy = busy.clone();
		let error = error.clone();
		let on_close = on_close.clone();
		Callback::from(move |_: MouseEvent| {
			let (Some(database), Some(user)) = (database.clone(), user) else {
				return;
			};
			let busy = busy.clone();
			let error = error.clone();
			let on_close = on_close.clone();
			busy.set(true);
			wasm_bindgen_futures::spawn_local(async move {
				let result = database.delete_watch_reminder(user, movie).await;
				busy.set(false);
				match result {
					Ok(()) => on_close.emit(()),
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		})
	};

	html! {
		<div class="modal d-block" tabindex="-1" style="background: rgba(0, 0, 0, 0.5);">
			<div class="modal-dialog">
				<form class="modal-content" onsubmit={save}>
					<div class="modal-header">
						<h5 class="modal-title">{format!("Remind me to watch {}", title.movie_title)}</h5>
						<button type="button" class="btn-close" onclick={on_close.reform(|_| ())} />
					</div>
					<div class="modal-body">
						{existing.loading.then(|| html!(<Spinner />))}
						{current.as_ref().map(|reminder| html! {
							<p class="text-muted">
								{format!("Currently set for {}.", format_display(reminder.remind_at, local_offset()))}
							</p>
						})}
						<label class="form-label" for="remind_at">{"When"}</label>
						<input type="datetime-local" class="form-control" id="remind_at"
							value={(*when).clone()}
							oninput={bind_input(&when)}
						/>
						<div class="form-text">{"You'll get a notification while the app is open."}</div>
						<ErrorText message={(*error).clone()} />
					</div>
					<div class="modal-footer">
						{current.is_some().then(|| html! {
							<button type="button" class="btn btn-outline-danger me-auto" onclick={remove} disabled={*busy}>
								{"Remove reminder"}
							</button>
						})}
						<button type="button" class="btn btn-outline-secondary" onclick={on_close.reform(|_| ())}>{"Cancel"}</button>
						<button type="submit" class="btn btn-primary" disabled={*busy}>{"Save"}</button>
					</div>
				</form>
			</div>
		</div>
	}
}
