use crate::{
	components::{ErrorText, FeatureDisabled},
	route::Route,
	services::use_services,
	util::web_ext::bind_input,
};
use yew::prelude::*;
use yew_router::prelude::{use_navigator, Link};

#[function_component]
pub fn SignIn() -> Html {
	let services = use_services();
	let navigator = use_navigator();
	let email = use_state_eq(String::new);
	let password = use_state_eq(String::new);
	let busy = use_state_eq(|| false);
	let error = use_state_eq(|| None::<String>);

	let Some(auth) = services.auth.clone() else {
		return html!(<FeatureDisabled feature="Signing in" />);
	};
	let submit = Callback::from({
		let email = email.clone();
		let password = password.clone();
		let busy = busy.clone();
		let error = error.clone();
		move |evt: SubmitEvent| {
			evt.prevent_default();
			let auth = auth.clone();
			let (email, password) = ((*email).clone(), (*password).clone());
			let busy = busy.clone();
			let error = error.clone();
			let navigator = navigator.clone();
			busy.set(true);
			error.set(None);
			wasm_bindgen_futures::spawn_local(async move {
				let result = auth.sign_in(&email, &password).await;
				busy.set(false);
				match result {
					Ok(_) => {
						if let Some(navigator) = navigator {
							navigator.push(&Route::Home);
						}
					}
					Err(err) => error.set(Some(err.user_message(None))),
				}
			});
		}
	});

	html! {
		<div class="container" style="max-width: 420px;">
			<h3 class="mb-3">{"Sign in"}</h3>
			<form onsubmit={submit}>
				<input class="form-control mb-2" type="email" placeholder="Email" autocomplete="email"
					value={(*email).clone()} oninput={bind_input(&email)} />
				<input class="form-control mb-2" type="password" placeholder="Password" autocomplete="current-password"
					value={(*password).clone()} oninput={bind_input(&password)} />
				<ErrorText message={(*error).clone()} />
				<button type="submit" class="btn btn-primary w-100" disabled={*busy}>{"Sign in"}</button>
			</form>
			<p class="mt-3 text-center">
				{"New here? "}
				<Link<Route> to={Route::SignUp}>{"Create an account"}</Link<Route>>
			</p>
		</div>
	}
}
