use crate::{
	auth::LoginButton,
	components::{user::Identification, AuthSwitch},
	route::Route,
	state::Nudges,
};
use yew::prelude::*;
use yew_router::prelude::{use_route, Link};
use yewdux::prelude::use_store_value;

#[derive(Clone, PartialEq, Properties)]
struct NavLinkProps {
	to: Route,
	#[prop_or_default]
	children: Html,
}

#[function_component]
fn NavLink(NavLinkProps { to, children }: &NavLinkProps) -> Html {
	let current = use_route::<Route>();
	let classes = classes!("nav-link", (current.as_ref() == Some(to)).then_some("active"));
	html! {
		<li class="nav-item">
			<Link<Route> {classes} to={to.clone()}>{children.clone()}</Link<Route>>
		</li>
	}
}

#[function_component]
pub fn Nav() -> Html {
	let nudges = use_store_value::<Nudges>();
	let badge = nudges.badge().map(|count| {
		html! {
			<span class="badge rounded-pill text-bg-danger ms-1" title="Unread recommendations">{count}</span>
		}
	});
	html! {
		<nav class="navbar navbar-expand-lg bg-body-tertiary mb-3">
			<div class="container-fluid">
				<Link<Route> classes="navbar-brand" to={Route::Home}>
					<i class="bi bi-film me-2" />
					{"Watchwith"}
				</Link<Route>>
				<ul class="navbar-nav me-auto">
					<NavLink to={Route::Home}>{"Home"}{badge}</NavLink>
					<NavLink to={Route::Search}>{"Search"}</NavLink>
					<AuthSwitch identified={html! {<>
						<NavLink to={Route::Watchlist}>{"Watchlist"}</NavLink>
						<NavLink to={Route::Friends}>{"Friends"}</NavLink>
						<NavLink to={Route::Groups}>{"Groups"}</NavLink>
						<NavLink to={Route::Reminders}>{"Reminders"}</NavLink>
					</>}} />
				</ul>
				<div class="d-flex align-items-center gap-2">
					<AuthSwitch
						identified={html! {
							<Link<Route> classes="nav-link" to={Route::Profile}>
								<Identification />
							</Link<Route>>
						}}
						anonymous={html! {
							<Link<Route> classes="btn btn-outline-secondary" to={Route::SignUp}>{"Sign Up"}</Link<Route>>
						}}
					/>
					<LoginButton />
				</div>
			</div>
		</nav>
	}
}
