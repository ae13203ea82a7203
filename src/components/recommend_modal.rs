use crate::{
	api::ApiError,
	auth::use_session,
	components::{ErrorText, Spinner},
	data::{Profile, TitleSnapshot},
	hooks::use_async,
	services::use_services,
	util::web_ext::{bind_textarea, InputExt},
};
use futures_util::FutureExt;
use uuid::Uuid;
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct RecommendModalProps {
	pub title: TitleSnapshot,
	pub on_close: Callback<()>,
}

/// Send a title to one friend, or share it on the feed of all of them.
#[function_component]
pub fn RecommendModal(RecommendModalProps { title, on_close }: &RecommendModalProps) -> Html {
	let services = use_services();
	let session = use_session();
	let user = session.as_ref().map(|session| session.user_id());
	let recipient = use_state_eq(|| None::<Uuid>);
	let note = use_state_eq(String::new);
	let sending = use_state_eq(|| false);
	let error = use_state_eq(|| None::<String>);

	let friends = use_async(true, {
		let database = services.database.clone();
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.list_friends(user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});

	let pick_recipient = Callback::from({
		let recipient = recipient.clone();
		move |evt: web_sys::Event| {
			recipient.set(evt.select_value().and_then(|id| Uuid::parse_str(&id).ok()));
		}
	});

	let submit = {
		let database = services.database.clone();
		let title = title.clone();
		let recipient = recipient.clone();
		let note = note.clone();
		let sending = sending.clone();
		let error = error.clone();
		let on_close = on_close.clone();
		Callback::from(move |evt: SubmitEvent| {
			evt.prevent_default();
			let (Some(database), Some(user)) = (database.clone(), user) else {
				error.set(Some(ApiError::SignedOut.to_string()));
				return;
			};
			let title = title.clone();
			let recipient = *recipient;
			let note = (*note).clone();
			let sending = sending.clone();
			let error = error.clone();
			let on_close = on_close.clone();
			sending.set(true);
			error.set(None);
			wasm_bindgen_futures::spawn_local(async move {
				let result = match recipient {
					Some(friend) => database
						.send_friend_recommendation(user, friend, &title, &note)
						.await
						.map(|_| ()),
					None => database.share_recommendation(user, &title, &note).await.map(|_| ()),
				};
				sending.set(false);
				match result {
					Ok(()) => on_close.emit(()),
					Err(err) => {
						log::debug!(target: "recommend", "{err:?}");
						error.set(Some(err.user_message(None)));
					}
				}
			});
		})
	};

	let friend_options = match (&friends.data, &friends.error) {
		(Some(friends), _) => friends
			.iter()
			.map(|friend: &Profile| {
				html! {
					<option value={friend.id.to_string()} selected={*recipient == Some(friend.id)}>
						{format!("{} (@{})", friend.display_name(), friend.username)}
					</option>
				}
			})
			.collect::<Html>(),
		_ => html!(),
	};

	html! {
		<div class="modal d-block" tabindex="-1" style="background: rgba(0, 0, 0, 0.5);">
			<div class="modal-dialog">
				<form class="modal-content" onsubmit={submit}>
					<div class="modal-header">
						<h5 class="modal-title">{format!("Recommend {}", title.movie_title)}</h5>
						<button type="button" class="btn-close" onclick={on_close.reform(|_| ())} />
					</div>
					<div class="modal-body">
						{friends.loading.then(|| html!(<Spinner />))}
						<ErrorText message={friends.error.as_ref().map(|err| err.user_message(None))} />
						<div class="mb-3">
							<label class="form-label" for="recipient">{"Send to"}</label>
							<select class="form-select" id="recipient" onchange={pick_recipient}>
								<option value="" selected={recipient.is_none()}>{"Everyone (share on my feed)"}</option>
								{friend_options}
							</select>
						</div>
						<div class="mb-3">
							<label class="form-label" for="note">{"Note"}</label>
							<textarea class="form-control" id="note" rows="3"
								placeholder="Why should they watch it?"
								value={(*note).clone()}
								oninput={bind_textarea(&note)}
							/>
						</div>
						<ErrorText message={(*error).clone()} />
					</div>
					<div class="modal-footer">
						<button type="button" class="btn btn-outline-secondary" onclick={on_close.reform(|_| ())}>{"Cancel"}</button>
						<button type="submit" class="btn btn-primary" disabled={*sending}>
							{match *sending { true => "Sending...", false => "Send" }}
						</button>
					</div>
				</form>
			</div>
		</div>
	}
}
