use crate::{
	api::ApiError,
	auth::use_session,
	components::{ErrorText, FeatureDisabled, RequireSession, Spinner},
	database::InviteView,
	hooks::use_async,
	route::Route,
	services::use_services,
	util::web_ext::{bind_input, bind_textarea},
};
use futures_util::FutureExt;
use yew::prelude::*;
use yew_router::prelude::{use_navigator, Link};

#[function_component]
pub fn Groups() -> Html {
	html! {
		<RequireSession>
			<GroupsBody />
		</RequireSession>
	}
}

#[function_component]
fn GroupsBody() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let groups = use_async(true, {
		let database = services.database.clone();
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.my_groups(user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	if services.database.is_none() {
		return html!(<FeatureDisabled feature="Watch groups" />);
	}
	let reload = Callback::from({
		let groups = groups.clone();
		move |_: ()| groups.run()
	});

	html! {
		<div class="container">
			<div class="row">
				<div class="col-md-7">
					<h4>{"Your groups"}</h4>
					{match (&groups.data, &groups.error) {
						(_, Some(err)) => html!(<ErrorText message={Some(err.user_message(None))} />),
						(Some(list), _) if list.is_empty() => html!(<p class="text-muted">{"You're not in any groups yet."}</p>),
						(Some(list), _) => html! {
							<div class="list-group">
								{list.iter().map(|group| html! {
									<Link<Route> key={group.id.to_string()} classes="list-group-item list-group-item-action" to={Route::Group { id: group.id }}>
										<div class="fw-semibold">{&group.name}</div>
										{group.description.as_ref().map(|text| html!(<small class="text-muted">{text}</small>))}
									</Link<Route>>
								}).collect::<Vec<_>>()}
							</div>
						},
						(None, None) => html!(<Spinner />),
					}}
				</div>
				<div class="col-md-5">
					<PendingInvites on_change={reload} />
					<CreateGroup />
				</div>
			</div>
		</div>
	}
}

#[function_component]
fn CreateGroup() -> Html {
	let services = use_services();
	let navigator = use_navigator();
	let user = use_session().map(|session| session.user_id());
	let name = use_state_eq(String::new);
	let description = use_state_eq(String::new);
	let busy = use_state_eq(|| false);
	let error = use_state_eq(|| None::<String>);

	let submit = Callback::from({
		let database = services.database.clone();
		let name = name.clone();
		let description = description.clone();
		let busy = busy.clone();
		let error = error.clone();
		move |evt: SubmitEvent| {
			evt.prevent_default();
			let (Some(database), Some(user)) = (database.clone(), user) else {
				return;
			};
			let (name, description) = ((*name).clone(), (*description).clone());
			let busy = busy.clone();
			let error = error.clone();
			let navigator = navigator.clone();
			busy.set(true);
			wasm_bindgen_futures::spawn_local(async move {
				let result = database.create_group(user, &name, &description).await;
				busy.set(false);
				match result {
					Ok(group) => {
						if let Some(navigator) = navigator {
							navigator.push(&Route::Group { id: group.id });
						}
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});

	html! {
		<form class="card card-body mt-3" onsubmit={submit}>
			<h5>{"Start a group"}</h5>
			<input class="form-control mb-2" placeholder="Group name" value={(*name).clone()} oninput={bind_input(&name)} />
			<textarea class="form-control mb-2" rows="2" placeholder="What's it for? (optional)"
				value={(*description).clone()} oninput={bind_textarea(&description)} />
			<ErrorText message={(*error).clone()} />
			<button type="submit" class="btn btn-primary" disabled={*busy}>{"Create"}</button>
		</form>
	}
}

#[derive(Clone, PartialEq, Properties)]
struct PendingInvitesProps {
	on_change: Callback<()>,
}

#[function_component]
fn PendingInvites(PendingInvitesProps { on_change }: &PendingInvitesProps) -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let error = use_state_eq(|| None::<String>);
	let invites = use_async(true, {
		let database = services.database.clone();
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.pending_invites(user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	let respond = Callback::from({
		let database = services.database.clone();
		let invites = invites.clone();
		let error = error.clone();
		let on_change = on_change.clone();
		move |(view, accept): (InviteView, bool)| {
			let Some(database) = database.clone() else {
				return;
			};
			let invites = invites.clone();
			let error = error.clone();
			let on_change = on_change.clone();
			wasm_bindgen_futures::spawn_local(async move {
				match database.respond_to_invite(&view.invite, accept).await {
					Ok(()) => {
						invites.run();
						on_change.emit(());
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});

	let list = invites.data.clone().unwrap_or_default();
	if list.is_empty() {
		return html!();
	}
	html! {
		<div class="card">
			<div class="card-header">{"Invitations"}</div>
			<ul class="list-group list-group-flush">
				{list.into_iter().map(|view| {
					let group_name = view.group.as_ref().map(|group| group.name.clone()).unwrap_or_else(|| "a group".to_owned());
					let inviter = view.inviter.as_ref().map(|profile| profile.display_name().to_owned()).unwrap_or_else(|| "Someone".to_owned());
					let accept = respond.reform({
						let view = view.clone();
						move |_: MouseEvent| (view.clone(), true)
					});
					let decline = respond.reform({
						let view = view.clone();
						move |_: MouseEvent| (view.clone(), false)
					});
					html! {
						<li class="list-group-item d-flex align-items-center gap-2" key={view.invite.id.to_string()}>
							<span>{format!("{inviter} invited you to {group_name}")}</span>
							<button class="btn btn-sm btn-success ms-auto" onclick={accept}>{"Join"}</button>
							<button class="btn btn-sm btn-outline-secondary" onclick={decline}>{"Decline"}</button>
						</li>
					}
				}).collect::<Vec<_>>()}
			</ul>
			<ErrorText message={(*error).clone()} />
		</div>
	}
}
