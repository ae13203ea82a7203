use crate::{
	auth::use_session,
	components::{user::Avatar, ErrorText, FeatureDisabled, RequireSession, Spinner},
	config::Feature,
	data::{ProfileUpdate, Theme},
	notify::push,
	services::use_services,
	state::{MyProfile, ThemeState},
	util::web_ext::{bind_input, InputExt},
};
use std::str::FromStr;
use yew::prelude::*;
use yewdux::prelude::{use_store, Dispatch};

#[function_component]
pub fn ProfilePage() -> Html {
	html! {
		<RequireSession>
			<ProfileEditor />
		</RequireSession>
	}
}

#[function_component]
fn ProfileEditor() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let (profile, profile_dispatch) = use_store::<MyProfile>();
	let (theme, theme_dispatch) = use_store::<ThemeState>();
	let name = use_state_eq(String::new);
	let avatar_url = use_state_eq(String::new);
	let saved = use_state_eq(|| false);
	let error = use_state_eq(|| None::<String>);

	{
		let name = name.clone();
		let avatar_url = avatar_url.clone();
		use_effect_with(profile.0.clone(), move |profile| {
			if let Some(profile) = profile {
				name.set(profile.name.clone().unwrap_or_default());
				avatar_url.set(profile.avatar_url.clone().unwrap_or_default());
			}
		});
	}

	let Some(database) = services.database.clone() else {
		return html!(<FeatureDisabled feature="Profiles" />);
	};
	let Some(current) = profile.0.clone() else {
		return html!(<Spinner />);
	};

	let save = {
		let database = database.clone();
		let profile_dispatch = profile_dispatch.clone();
		let saved = saved.clone();
		let error = error.clone();
		move |update: ProfileUpdate| {
			let Some(user) = user else {
				return;
			};
			let database = database.clone();
			let profile_dispatch = profile_dispatch.clone();
			let saved = saved.clone();
			let error = error.clone();
			wasm_bindgen_futures::spawn_local(async move {
				match database.update_profile(user, &update).await {
					Ok(profile) => {
						profile_dispatch.set(MyProfile(Some(profile)));
						saved.set(true);
						error.set(None);
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	};

	let submit = Callback::from({
		let save = save.clone();
		let name = name.clone();
		let avatar_url = avatar_url.clone();
		move |evt: SubmitEvent| {
			evt.prevent_default();
			save(ProfileUpdate {
				name: Some(name.trim().to_owned()),
				avatar_url: Some(avatar_url.trim().to_owned()),
				theme: None,
			});
		}
	});
	let pick_theme = Callback::from({
		let save = save.clone();
		move |evt: web_sys::Event| {
			let Some(picked) = evt.select_value().and_then(|value| Theme::from_str(&value).ok()) else {
				return;
			};
			theme_dispatch.reduce_mut(|state| state.set(picked));
			save(ProfileUpdate {
				theme: Some(picked),
				..Default::default()
			});
		}
	});

	html! {
		<div class="container" style="max-width: 560px;">
			<div class="d-flex align-items-center gap-3 mb-3">
				<Avatar profile={current.clone()} size={64} />
				<div>
					<h4 class="mb-0">{current.display_name()}</h4>
					<div class="text-muted">{format!("@{}", current.username)}</div>
				</div>
			</div>
			<form onsubmit={submit}>
				<div class="mb-3">
					<label class="form-label" for="name">{"Display name"}</label>
					<input class="form-control" id="name" value={(*name).clone()} oninput={bind_input(&name)} />
				</div>
				<div class="mb-3">
					<label class="form-label" for="avatar">{"Avatar url"}</label>
					<input class="form-control" id="avatar" type="url" value={(*avatar_url).clone()} oninput={bind_input(&avatar_url)} />
				</div>
				<ErrorText message={(*error).clone()} />
				{saved.then(|| html!(<div class="text-success small mb-2">{"Saved"}</div>))}
				<button type="submit" class="btn btn-primary">{"Save"}</button>
			</form>
			<hr />
			<label class="form-label" for="theme">{"Theme"}</label>
			<select class="form-select" id="theme" onchange={pick_theme}>
				{Theme::ALL.iter().map(|option| html! {
					<option value={option.as_str()} selected={theme.0 == *option}>{option.display_name()}</option>
				}).collect::<Vec<_>>()}
			</select>
			{services.config.has(Feature::PushNotifications).then(|| html!(<PushToggle />))}
		</div>
	}
}

#[function_component]
fn PushToggle() -> Html {
	let services = use_services();
	let user = use_session().map(|session| session.user_id());
	let enabled = use_state_eq(|| None::<bool>);
	let error = use_state_eq(|| None::<String>);

	{
		let enabled = enabled.clone();
		use_effect_with((), move |_| {
			if push::is_supported() {
				wasm_bindgen_futures::spawn_local(async move {
					match push::is_subscribed().await {
						Ok(subscribed) => enabled.set(Some(subscribed)),
						Err(err) => log::debug!(target: "push", "subscription check failed: {err}"),
					}
				});
			}
		});
	}

	let (Some(database), Some(user), Some(vapid_key)) =
		(services.database.clone(), user, services.config.vapid_key.clone())
	else {
		return html! {};
	};
	if !push::is_supported() {
		return html!(<p class="text-muted small mt-3">{"This browser cannot receive push notifications."}</p>);
	}
	let Some(is_enabled) = *enabled else {
		return html! {};
	};
	let onclick = Callback::from({
		let enabled = enabled.clone();
		let error = error.clone();
		move |_: MouseEvent| {
			let database = database.clone();
			let vapid_key = vapid_key.clone();
			let enabled = enabled.clone();
			let error = error.clone();
			wasm_bindgen_futures::spawn_local(async move {
				let result = match is_enabled {
					true => push::unsubscribe(&database).await,
					false => push::subscribe(&database, user, &vapid_key).await,
				};
				match result {
					Ok(()) => {
						enabled.set(Some(!is_enabled));
						error.set(None);
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});
	let (icon, label) = match is_enabled {
		true => ("bi bi-bell-slash me-1", "Turn off push notifications"),
		false => ("bi bi-bell me-1", "Turn on push notifications"),
	};
	html! {
		<div class="mt-3">
			<button class="btn btn-outline-secondary" {onclick}>
				<i class={icon} />
				{label}
			</button>
			<ErrorText message={(*error).clone()} />
		</div>
	}
}

/// Keeps the local theme in step with the one saved on the profile.
pub fn sync_theme(theme: Theme) {
	Dispatch::<ThemeState>::new().reduce_mut(|state| state.set(theme));
}
