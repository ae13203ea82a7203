use crate::{
	api::{tmdb::SearchPage, ApiError},
	components::{ErrorText, FeatureDisabled, Spinner, TitleCard},
	hooks::use_debounced_search,
	services::use_services,
	util::web_ext::bind_input,
};
use futures_util::FutureExt;
use yew::prelude::*;

static SEARCH_DELAY_MS: u32 = 350;

#[function_component]
pub fn Search() -> Html {
	let services = use_services();
	let query = use_state_eq(String::new);
	let results = use_debounced_search((*query).clone(), SEARCH_DELAY_MS, {
		let metadata = services.metadata.clone();
		move |text: String| {
			let metadata = metadata.clone();
			async move {
				match metadata {
					Some(metadata) => metadata.search(&text, 1).await,
					None => Err(ApiError::NotConfigured("Title search")),
				}
			}
			.boxed_local()
		}
	});
	if services.metadata.is_none() {
		return html!(<FeatureDisabled feature="Title search" />);
	}

	let body = match (&results.data, &results.error) {
		(_, Some(err)) => html!(<ErrorText message={Some(err.user_message(None))} />),
		(Some(page), _) if page.results.is_empty() => {
			html!(<p class="text-muted">{format!("No titles match \u{201c}{}\u{201d}.", query.trim())}</p>)
		}
		(Some(page), _) => results_grid(page),
		(None, None) if results.loading => html!(<Spinner />),
		(None, None) => html!(<p class="text-muted">{"Search for a movie or show to get started."}</p>),
	};

	html! {
		<div class="container">
			<input
				type="search" class="form-control form-control-lg mb-3"
				placeholder="Search movies and shows"
				value={(*query).clone()}
				oninput={bind_input(&query)}
			/>
			{body}
		</div>
	}
}

fn results_grid(page: &SearchPage) -> Html {
	html! {
		<div class="d-flex flex-wrap">
			{page.results.iter().map(|summary| {
				let subtitle = html! {
					<small class="text-muted">
						{summary.year.map(|year| year.to_string()).unwrap_or_default()}
						{(!summary.genres.is_empty()).then(|| format!(" \u{b7} {}", summary.genres.join(", ")))}
					</small>
				};
				html! {
					<TitleCard
						key={summary.title.to_string()}
						title={summary.title}
						name={summary.name.clone()}
						poster_path={summary.poster_path.clone()}
						{subtitle}
					/>
				}
			}).collect::<Vec<_>>()}
		</div>
	}
}
