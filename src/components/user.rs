use crate::{data::Profile, state::MyProfile};
use yew::prelude::*;
use yewdux::prelude::use_store_value;

#[derive(Clone, PartialEq, Properties)]
pub struct AvatarProps {
	pub profile: Profile,
	#[prop_or(32)]
	pub size: u32,
}

#[function_component]
pub fn Avatar(AvatarProps { profile, size }: &AvatarProps) -> Html {
	let style = format!("width: {size}px; height: {size}px;");
	match &profile.avatar_url {
		Some(url) if !url.is_empty() => html! {
			<img class="rounded-circle object-fit-cover" src={url.clone()} alt={profile.username.clone()} {style} />
		},
		_ => {
			let initial = profile.display_name().chars().next().unwrap_or('?').to_uppercase().to_string();
			html! {
				<span class="rounded-circle bg-secondary text-white d-inline-flex align-items-center justify-content-center" {style}>
					{initial}
				</span>
			}
		}
	}
}

#[derive(Clone, PartialEq, Properties)]
pub struct ProfileLineProps {
	pub profile: Profile,
	#[prop_or_default]
	pub children: Html,
}

/// Avatar, name and handle on one line, with optional trailing actions.
#[function_component]
pub fn ProfileLine(ProfileLineProps { profile, children }: &ProfileLineProps) -> Html {
	html! {
		<div class="d-flex align-items-center gap-2 py-1">
			<Avatar profile={profile.clone()} />
			<div>
				<div>{profile.display_name()}</div>
				<small class="text-muted">{format!("@{}", profile.username)}</small>
			</div>
			<div class="ms-auto d-flex gap-2">{children.clone()}</div>
		</div>
	}
}

/// The signed-in user's name, as shown in the navbar.
#[function_component]
pub fn Identification() -> Html {
	let profile = use_store_value::<MyProfile>();
	match &profile.0 {
		Some(profile) => html! {
			<span class="d-inline-flex align-items-center gap-2">
				<Avatar profile={profile.clone()} size={24} />
				{profile.display_name()}
			</span>
		},
		None => html!("Account"),
	}
}
