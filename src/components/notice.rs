use crate::{auth::Status, route::Route};
use yew::prelude::*;
use yew_router::prelude::Link;
use yewdux::prelude::use_store_value;

#[derive(Clone, PartialEq, Properties)]
pub struct FeatureDisabledProps {
	pub feature: AttrValue,
}

/// Rendered in place of a feature whose configuration is missing.
#[function_component]
pub fn FeatureDisabled(FeatureDisabledProps { feature }: &FeatureDisabledProps) -> Html {
	html! {
		<div class="alert alert-secondary" role="alert">
			<i class="bi bi-plug me-2" />
			{format!("{feature} is not available on this deployment.")}
		</div>
	}
}

#[derive(Clone, PartialEq, Properties)]
pub struct ErrorTextProps {
	pub message: Option<String>,
}

#[function_component]
pub fn ErrorText(ErrorTextProps { message }: &ErrorTextProps) -> Html {
	match message {
		None => html!(),
		Some(message) => html! {
			<div class="alert alert-danger py-2" role="alert">{message}</div>
		},
	}
}

#[function_component]
pub fn Spinner() -> Html {
	html! {
		<div class="d-flex justify-content-center my-3">
			<div class="spinner-border" role="status">
				<span class="visually-hidden">{"Loading..."}</span>
			</div>
		</div>
	}
}

/// Wraps a page which needs a signed-in user.
#[function_component]
pub fn RequireSession(props: &html::ChildrenProps) -> Html {
	let status = use_store_value::<Status>();
	match &*status {
		Status::Loading => html!(<Spinner />),
		Status::SignedIn(_) => html!(<>{props.children.clone()}</>),
		Status::Unavailable => html!(<FeatureDisabled feature="Signing in" />),
		Status::SignedOut => html! {
			<div class="text-center my-5">
				<p>{"Sign in to see this page."}</p>
				<Link<Route> classes="btn btn-success" to={Route::SignIn}>{"Sign In"}</Link<Route>>
			</div>
		},
	}
}
