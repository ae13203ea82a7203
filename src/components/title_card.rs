use crate::{
	api::{
		artwork::poster_for,
		tmdb::{poster_url, PosterSize},
	},
	data::TitleRef,
	route::Route,
	services::use_services,
};
use yew::prelude::*;
use yew_router::prelude::Link;

#[derive(Clone, PartialEq, Properties)]
pub struct PosterProps {
	pub title: TitleRef,
	pub poster_path: Option<String>,
	#[prop_or(PosterSize::Card)]
	pub size: PosterSize,
	#[prop_or_default]
	pub classes: Classes,
}

/// A title's poster. Rows saved without one fall back to the artwork cache.
#[function_component]
pub fn Poster(props: &PosterProps) -> Html {
	let services = use_services();
	let looked_up = use_state_eq(|| None::<String>);
	use_effect_with((props.title, props.poster_path.clone()), {
		let looked_up = looked_up.clone();
		let metadata = services.metadata.clone();
		move |(title, poster_path)| {
			if let (None, Some(metadata)) = (poster_path, metadata) {
				let title = *title;
				wasm_bindgen_futures::spawn_local(async move {
					looked_up.set(poster_for(&metadata, title).await);
				});
			}
		}
	});
	let path = props.poster_path.clone().or_else(|| (*looked_up).clone());
	match path {
		Some(path) => html! {
			<img class={classes!("poster", props.classes.clone())} src={poster_url(&path, props.size)} loading="lazy" alt="" />
		},
		None => html! {
			<div class={classes!("poster", "poster-missing", "bg-secondary-subtle", "d-flex", "align-items-center", "justify-content-center", props.classes.clone())}>
				<i class="bi bi-film fs-1 text-secondary" />
			</div>
		},
	}
}

#[derive(Clone, PartialEq, Properties)]
pub struct TitleCardProps {
	pub title: TitleRef,
	pub name: AttrValue,
	#[prop_or_default]
	pub poster_path: Option<String>,
	#[prop_or_default]
	pub subtitle: Option<Html>,
	/// Footer actions.
	#[prop_or_default]
	pub children: Html,
}

#[function_component]
pub fn TitleCard(props: &TitleCardProps) -> Html {
	let route = Route::title(&props.title);
	html! {
		<div class="card title-card m-2">
			<Link<Route> to={route.clone()}>
				<Poster title={props.title} poster_path={props.poster_path.clone()} classes="card-img-top" />
			</Link<Route>>
			<div class="card-body">
				<h6 class="card-title">
					<Link<Route> classes="link-body-emphasis text-decoration-none" to={route}>{props.name.clone()}</Link<Route>>
				</h6>
				{props.subtitle.clone().unwrap_or_default()}
			</div>
			<div class="card-footer d-flex flex-wrap gap-1">
				{props.children.clone()}
			</div>
		</div>
	}
}
