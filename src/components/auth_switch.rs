use crate::auth::Status;
use yew::prelude::*;
use yewdux::prelude::use_store_value;

#[derive(Debug, Clone, PartialEq, Properties)]
pub struct AuthSwitchProps {
	#[prop_or_default]
	pub identified: Option<Html>,
	#[prop_or_default]
	pub anonymous: Option<Html>,
	/// Shown while the stored session is still being checked.
	#[prop_or_default]
	pub loading: Option<Html>,
}

#[function_component]
pub fn AuthSwitch(props: &AuthSwitchProps) -> Html {
	let status = use_store_value::<Status>();
	let empty = || html! {};
	match &*status {
		Status::Loading => props.loading.clone().unwrap_or_else(empty),
		Status::SignedIn(_) => props.identified.clone().unwrap_or_else(empty),
		Status::SignedOut | Status::Unavailable => props.anonymous.clone().unwrap_or_else(empty),
	}
}
