use crate::{
	api::auth::{SignUp as SignUpRequest, SignUpOutcome},
	components::{ErrorText, FeatureDisabled},
	route::Route,
	services::use_services,
	util::web_ext::bind_input,
};
use yew::prelude::*;
use yew_router::prelude::{use_navigator, Link};

#[function_component]
pub fn SignUp() -> Html {
	let services = use_services();
	let navigator = use_navigator();
	let email = use_state_eq(String::new);
	let password = use_state_eq(String::new);
	let username = use_state_eq(String::new);
	let name = use_state_eq(String::new);
	let busy = use_state_eq(|| false);
	let confirm = use_state_eq(|| false);
	let error = use_state_eq(|| None::<String>);

	let Some(auth) = services.auth.clone() else {
		return html!(<FeatureDisabled feature="Signing up" />);
	};
	if *confirm {
		return html! {
			<div class="container text-center my-5" style="max-width: 420px;">
				<h4>{"Check your email"}</h4>
				<p>{"We sent you a link to confirm your address. Once confirmed you can sign in."}</p>
				<Link<Route> classes="btn btn-primary" to={Route::SignIn}>{"Sign in"}</Link<Route>>
			</div>
		};
	}

	let submit = Callback::from({
		let request = SignUpRequest {
			email: (*email).clone(),
			password: (*password).clone(),
			username: (*username).clone(),
			name: (*name).clone(),
		};
		let busy = busy.clone();
		let confirm = confirm.clone();
		let error = error.clone();
		move |evt: SubmitEvent| {
			evt.prevent_default();
			// rejected here without a request when the fields are invalid
			if let Err(err) = request.validate() {
				error.set(Some(err.user_message(None)));
				return;
			}
			let auth = auth.clone();
			let request = request.clone();
			let busy = busy.clone();
			let confirm = confirm.clone();
			let error = error.clone();
			let navigator = navigator.clone();
			busy.set(true);
			error.set(None);
			wasm_bindgen_futures::spawn_local(async move {
				let result = auth.sign_up(request).await;
				busy.set(false);
				match result {
					Ok(SignUpOutcome::SignedIn(_)) => {
						if let Some(navigator) = navigator {
							navigator.push(&Route::Friends);
						}
					}
					Ok(SignUpOutcome::ConfirmEmail) => confirm.set(true),
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});

	html! {
		<div class="container" style="max-width: 420px;">
			<h3 class="mb-3">{"Create an account"}</h3>
			<form onsubmit={submit}>
				<input class="form-control mb-2" placeholder="Username" autocomplete="username"
					value={(*username).clone()} oninput={bind_input(&username)} />
				<div class="form-text mb-2">{"3 to 24 letters, numbers, periods or underscores."}</div>
				<input class="form-control mb-2" placeholder="Display name (optional)"
					value={(*name).clone()} oninput={bind_input(&name)} />
				<input class="form-control mb-2" type="email" placeholder="Email" autocomplete="email"
					value={(*email).clone()} oninput={bind_input(&email)} />
				<input class="form-control mb-2" type="password" placeholder="Password" autocomplete="new-password"
					value={(*password).clone()} oninput={bind_input(&password)} />
				<ErrorText message={(*error).clone()} />
				<button type="submit" class="btn btn-primary w-100" disabled={*busy}>{"Sign up"}</button>
			</form>
			<p class="mt-3 text-center">
				{"Already have an account? "}
				<Link<Route> to={Route::SignIn}>{"Sign in"}</Link<Route>>
			</p>
		</div>
	}
}
