use crate::{
	api::ApiError,
	auth::use_session,
	components::{user::ProfileLine, ErrorText, FeatureDisabled, RequireSession, Spinner},
	data::Profile,
	hooks::{use_async, use_debounced_search},
	services::use_services,
	util::web_ext::bind_input,
};
use futures_util::FutureExt;
use uuid::Uuid;
use yew::prelude::*;

#[function_component]
pub fn Friends() -> Html {
	html! {
		<RequireSession>
			<FriendsBody />
		</RequireSession>
	}
}

#[function_component]
fn FriendsBody() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
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
	let (Some(database), Some(user)) = (services.database.clone(), user) else {
		return html!(<FeatureDisabled feature="Friends" />);
	};

	let change = {
		let friends = friends.clone();
		let error = error.clone();
		move |add: bool| {
			let database = database.clone();
			let friends = friends.clone();
			let error = error.clone();
			Callback::from(move |friend: Uuid| {
				let database = database.clone();
				let friends = friends.clone();
				let error = error.clone();
				wasm_bindgen_futures::spawn_local(async move {
					let result = match add {
						true => database.add_friend(user, friend).await.map(|_| ()),
						false => database.remove_friend(user, friend).await,
					};
					match result {
						Ok(()) => {
							error.set(None);
							friends.run();
						}
						Err(err) => error.set(Some(err.user_message(None))),
					}
				});
			})
		}
	};
	let add = change(true);
	let remove = change(false);

	let known = friends
		.data
		.as_ref()
		.map(|friends| friends.iter().map(|friend| friend.id).collect::<Vec<_>>())
		.unwrap_or_default();

	html! {
		<div class="container">
			<div class="row">
				<div class="col-md-6">
					<h4>{"Your friends"}</h4>
					<ErrorText message={(*error).clone()} />
					{match (&friends.data, &friends.error) {
						(_, Some(err)) => html!(<ErrorText message={Some(err.user_message(None))} />),
						(Some(list), _) if list.is_empty() => html!(<p class="text-muted">{"No friends yet. Find people by username."}</p>),
						(Some(list), _) => list.iter().map(|friend| {
							let onclick = remove.reform({
								let id = friend.id;
								move |_: MouseEvent| id
							});
							html! {
								<ProfileLine key={friend.id.to_string()} profile={friend.clone()}>
									<button class="btn btn-sm btn-outline-danger" {onclick}>{"Remove"}</button>
								</ProfileLine>
							}
						}).collect::<Html>(),
						(None, None) => html!(<Spinner />),
					}}
				</div>
				<div class="col-md-6">
					<h4>{"Find people"}</h4>
					<PeopleSearch {known} on_add={add} />
				</div>
			</div>
		</div>
	}
}

#[derive(Clone, PartialEq, Properties)]
struct PeopleSearchProps {
	known: Vec<Uuid>,
	on_add: Callback<Uuid>,
}

#[function_component]
fn PeopleSearch(PeopleSearchProps { known, on_add }: &PeopleSearchProps) -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let query = use_state_eq(String::new);
	let results = use_debounced_search((*query).clone(), 300, {
		let database = services.database.clone();
		move |text: String| {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => database.search_profiles(&text, user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	let people: Vec<Profile> = results.data.clone().unwrap_or_default();
	html! {<>
		<input type="search" class="form-control mb-2" placeholder="Username or name"
			value={(*query).clone()} oninput={bind_input(&query)} />
		{results.loading.then(|| html!(<Spinner />))}
		<ErrorText message={results.error.as_ref().map(|err| err.user_message(None))} />
		{people.into_iter().map(|person| {
			let action = match known.contains(&person.id) {
				true => html!(<span class="badge text-bg-success">{"Friends"}</span>),
				false => {
					let onclick = on_add.reform({
						let id = person.id;
						move |_: MouseEvent| id
					});
					html!(<button class="btn btn-sm btn-primary" {onclick}>{"Add friend"}</button>)
				}
			};
			html!(<ProfileLine key={person.id.to_string()} profile={person}>{action}</ProfileLine>)
		}).collect::<Vec<_>>()}
	</>}
}
