use crate::{
	api::ApiError,
	auth::use_session,
	components::{user::ProfileLine, ErrorText, FeatureDisabled, Poster, RequireSession, Spinner},
	data::{GroupMember, GroupRole, Profile, WatchGroup},
	database::{Attributed, Database, PickTally},
	hooks::use_async,
	route::Route,
	services::use_services,
	util::web_ext::InputExt,
};
use futures_util::{future::LocalBoxFuture, FutureExt};
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::{use_navigator, Link};

#[derive(Clone, PartialEq, Properties)]
pub struct GroupPageProps {
	pub id: Uuid,
}

#[function_component]
pub fn GroupPage(GroupPageProps { id }: &GroupPageProps) -> Html {
	html! {
		<RequireSession>
			<GroupBody id={*id} />
		</RequireSession>
	}
}

#[derive(Clone, Debug, PartialEq)]
struct GroupView {
	group: WatchGroup,
	members: Vec<Attributed<GroupMember>>,
	tally: Vec<PickTally>,
	friends: Vec<Profile>,
}

async fn load_group(database: Database, group: Uuid, user: Uuid) -> Result<Option<GroupView>, ApiError> {
	let Some(found) = database.get_group(group).await? else {
		return Ok(None);
	};
	let members = database.group_members(group).await?;
	let tally = database.group_tally(group).await?;
	let friends = database.list_friends(user).await?;
	Ok(Some(GroupView {
		group: found,
		members,
		tally,
		friends,
	}))
}

type Change = Box<dyn FnOnce(Database) -> LocalBoxFuture<'static, Result<(), ApiError>>>;

#[function_component]
fn GroupBody(GroupPageProps { id }: &GroupPageProps) -> Html {
	let services = use_services();
	let navigator = use_navigator();
	let user = use_session().map(|session| session.user_id());
	let error = use_state_eq(|| None::<String>);
	let notice = use_state_eq(|| None::<String>);
	let view = use_async(false, {
		let database = services.database.clone();
		let group = *id;
		move || {
			let database = database.clone();
			async move {
				match (database, user) {
					(Some(database), Some(user)) => load_group(database, group, user).await,
					_ => Err(ApiError::SignedOut),
				}
			}
			.boxed_local()
		}
	});
	{
		let view = view.clone();
		use_effect_with(*id, move |_| view.run());
	}

	let (Some(database), Some(user)) = (services.database.clone(), user) else {
		return html!(<FeatureDisabled feature="Watch groups" />);
	};
	let run = {
		let view = view.clone();
		let error = error.clone();
		move |change: Change| {
			let database = database.clone();
			let view = view.clone();
			let error = error.clone();
			wasm_bindgen_futures::spawn_local(async move {
				match change(database).await {
					Ok(()) => {
						error.set(None);
						view.run();
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	};

	if view.loading && view.data.is_none() {
		return html!(<Spinner />);
	}
	if let Some(err) = &view.error {
		return html!(<ErrorText message={Some(err.user_message(None))} />);
	}
	let Some(Some(GroupView {
		group,
		members,
		tally,
		friends,
	})) = view.data.clone()
	else {
		return html!(<p class="container text-muted">{"This group doesn't exist or you're not a member."}</p>);
	};
	let is_owner = group.owner_id == user;

	let vote = Callback::from({
		let run = run.clone();
		move |(pick, voted): (Uuid, bool)| {
			run(Box::new(move |database: Database| {
				async move {
					match voted {
						true => database.remove_vote(pick, user).await,
						false => database.vote_for_pick(pick, user).await.map(|_| ()),
					}
				}
				.boxed_local()
			}));
		}
	});
	let remove_pick = Callback::from({
		let run = run.clone();
		move |pick: Uuid| {
			run(Box::new(move |database: Database| {
				async move { database.remove_group_pick(pick).await }.boxed_local()
			}));
		}
	});
	let invite = Callback::from({
		let run = run.clone();
		let notice = notice.clone();
		let group = group.id;
		move |evt: web_sys::Event| {
			let Some(friend) = evt.select_value().and_then(|id| Uuid::parse_str(&id).ok()) else {
				return;
			};
			notice.set(Some("Invite sent".to_owned()));
			run(Box::new(move |database: Database| {
				async move { database.invite_to_group(group, user, friend).await.map(|_| ()) }.boxed_local()
			}));
		}
	});
	let leave = Callback::from({
		let group = group.id;
		let error = error.clone();
		let database = services.database.clone();
		move |_: MouseEvent| {
			let Some(database) = database.clone() else {
				return;
			};
			let navigator = navigator.clone();
			let error = error.clone();
			wasm_bindgen_futures::spawn_local(async move {
				match database.leave_group(group, user).await {
					Ok(()) => {
						if let Some(navigator) = navigator {
							navigator.push(&Route::Groups);
						}
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});

	let member_ids = members.iter().map(|member| member.item.user_id).collect::<Vec<_>>();
	let invitable = friends.into_iter().filter(|friend| !member_ids.contains(&friend.id)).collect::<Vec<_>>();

	html! {
		<div class="container">
			<div class="d-flex align-items-center mb-3">
				<div>
					<h3 class="mb-0">{&group.name}</h3>
					{group.description.as_ref().map(|text| html!(<p class="text-muted mb-0">{text}</p>))}
				</div>
				<button class="btn btn-outline-danger ms-auto" onclick={leave}>{"Leave group"}</button>
			</div>
			<ErrorText message={(*error).clone()} />
			<div class="row">
				<div class="col-md-8">
					<h5>{"Picks"}</h5>
					{match tally.is_empty() {
						true => html! {
							<p class="text-muted">
								{"No picks yet. Open a title and add it to this group."}
								{" "}<Link<Route> to={Route::Search}>{"Search titles"}</Link<Route>>
							</p>
						},
						false => html! {
							<ol class="list-group list-group-numbered">
								{tally.iter().map(|entry| {
									let pick = &entry.pick;
									let voted = entry.has_vote_from(user);
									let on_vote = vote.reform({
										let id = pick.id;
										move |_: MouseEvent| (id, voted)
									});
									let can_remove = is_owner || pick.added_by == user;
									let on_remove = remove_pick.reform({
										let id = pick.id;
										move |_: MouseEvent| id
									});
									html! {
										<li class="list-group-item d-flex align-items-center gap-3" key={pick.id.to_string()}>
											<Link<Route> to={Route::title(&pick.movie_id)}>
												<Poster title={pick.movie_id} poster_path={pick.poster_path.clone()}
													size={crate::api::tmdb::PosterSize::Thumb} classes="poster-thumb rounded" />
											</Link<Route>>
											<Link<Route> classes="fw-semibold me-auto" to={Route::title(&pick.movie_id)}>{&pick.movie_title}</Link<Route>>
											<span class="badge text-bg-primary rounded-pill">{entry.votes()}</span>
											<button class={classes!("btn", "btn-sm", if voted { "btn-primary" } else { "btn-outline-primary" })} onclick={on_vote}>
												<i class="bi bi-hand-thumbs-up" />
											</button>
											{can_remove.then(|| html! {
												<button class="btn btn-sm btn-outline-danger" onclick={on_remove}>
													<i class="bi bi-trash" />
												</button>
											})}
										</li>
									}
								}).collect::<Vec<_>>()}
							</ol>
						},
					}}
				</div>
				<div class="col-md-4">
					<h5>{"Members"}</h5>
					{members.iter().filter_map(|member| {
						let profile = member.by.clone()?;
						let role = match member.item.role {
							GroupRole::Owner => html!(<span class="badge text-bg-secondary">{"Owner"}</span>),
							GroupRole::Member => html!(),
						};
						Some(html!(<ProfileLine key={profile.id.to_string()} {profile}>{role}</ProfileLine>))
					}).collect::<Vec<_>>()}
					{(!invitable.is_empty()).then(|| html! {
						<div class="mt-3">
							<select class="form-select" onchange={invite}>
								<option value="" selected=true>{"Invite a friend..."}</option>
								{invitable.iter().map(|friend| html! {
									<option value={friend.id.to_string()}>{friend.display_name()}</option>
								}).collect::<Vec<_>>()}
							</select>
							{notice.as_ref().filter(|_| error.is_none()).map(|text| html!(<div class="small text-success mt-1">{text}</div>))}
						</div>
					})}
				</div>
			</div>
		</div>
	}
}
