use crate::data::{TitleRef, TitleRefError};
use uuid::Uuid;
use yew::{html, Component, Context, Html};
use yew_router::Routable;

#[derive(Debug, Clone, PartialEq, Routable)]
pub enum Route {
	#[at("/")]
	Home,
	#[at("/search")]
	Search,
	#[at("/title/:kind/:id")]
	Title { kind: String, id: String },
	#[at("/friends")]
	Friends,
	#[at("/groups")]
	Groups,
	#[at("/groups/:id")]
	Group { id: Uuid },
	#[at("/reminders")]
	Reminders,
	#[at("/watchlist")]
	Watchlist,
	#[at("/profile")]
	Profile,
	#[at("/signin")]
	SignIn,
	#[at("/signup")]
	SignUp,
	#[not_found]
	#[at("/404")]
	NotFound,
}

impl Route {
	pub fn title(title: &TitleRef) -> Self {
		let (kind, id) = title.route_segments();
		Self::Title { kind, id }
	}

	pub fn title_ref(&self) -> Option<Result<TitleRef, TitleRefError>> {
		match self {
			Self::Title { kind, id } => Some(TitleRef::from_route_segments(kind, id)),
			_ => None,
		}
	}
}

pub struct Switch<T>(std::marker::PhantomData<T>);
impl<T> Component for Switch<T>
where
	T: Routable + RouteHtml + 'static,
{
	type Message = ();
	type Properties = ();

	fn create(_ctx: &Context<Self>) -> Self {
		Self(Default::default())
	}

	fn view(&self, _ctx: &Context<Self>) -> Html {
		html! {
			<yew_router::Switch<T> render={T::html} />
		}
	}
}

/// A routable enum which knows how to render each of its pages.
pub trait RouteHtml {
	fn html(self) -> Html;

	fn switch() -> Html
	where
		Self: Routable + 'static,
	{
		html! { <Switch<Self> /> }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn title_routes_round_trip() {
		let route = Route::title(&TitleRef::tv(1399));
		assert_eq!(route.to_path(), "/title/tv/1399");
		let parsed = Route::recognize("/title/tv/1399").unwrap();
		assert_eq!(parsed.title_ref(), Some(Ok(TitleRef::tv(1399))));
	}

	#[test]
	fn unknown_paths_are_not_found() {
		assert_eq!(Route::recognize("/nope/at/all"), Some(Route::NotFound));
		assert_eq!(Route::recognize("/title/film/1"), Some(Route::Title { kind: "film".into(), id: "1".into() }));
		assert!(Route::recognize("/title/film/1").unwrap().title_ref().unwrap().is_err());
	}
}
