use crate::{
	auth::Status,
	data::TitleRef,
	notify::{
		browser::BrowserNotifications, deliver_native, poll_once, DueSource, RecommendationReminders, ReminderCenter,
		Toast, WatchReminders, POLL_INTERVAL, TOAST_TTL,
	},
	route::Route,
	services::use_services,
	util::sleep,
};
use futures::future::{AbortHandle, Abortable};
use gloo_timers::callback::Timeout;
use std::{collections::HashMap, rc::Rc};
use yew::prelude::*;
use yew_router::prelude::use_navigator;
use yewdux::prelude::use_store_value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CenterKind {
	WatchReminders,
	Recommendations,
}

impl CenterKind {
	fn icon(&self) -> &'static str {
		match self {
			Self::WatchReminders => "bi bi-alarm",
			Self::Recommendations => "bi bi-people",
		}
	}
}

#[derive(Clone, PartialEq, Properties)]
pub struct ReminderToastsProps {
	pub kind: CenterKind,
}

/// Polls one kind of due reminder for the signed-in user and shows them as toasts.
/// Signing out (or in as someone else) stops the loop and forgets every toast.
#[function_component]
pub fn ReminderToasts(ReminderToastsProps { kind }: &ReminderToastsProps) -> Html {
	let services = use_services();
	let navigator = use_navigator();
	let user = use_store_value::<Status>().user_id();
	let center = use_mut_ref(ReminderCenter::default);
	let timers = use_mut_ref(HashMap::<String, Timeout>::new);
	let update = use_force_update();

	let open = Callback::from(move |target: TitleRef| {
		if let Some(navigator) = &navigator {
			navigator.push(&Route::title(&target));
		}
	});
	let dismiss = Callback::from({
		let center = center.clone();
		let timers = timers.clone();
		let update = update.clone();
		move |id: String| {
			timers.borrow_mut().remove(&id);
			if center.borrow_mut().dismiss(&id) {
				update.force_update();
			}
		}
	});

	use_effect_with((*kind, user, services), {
		let center = center.clone();
		let timers = timers.clone();
		let update = update.clone();
		let open = open.clone();
		move |(kind, user, services)| {
			if center.borrow_mut().set_user(*user) {
				timers.borrow_mut().clear();
				update.force_update();
			}
			let source: Option<Box<dyn DueSource>> = match (user, services.database.clone(), kind) {
				(Some(_), Some(database), CenterKind::WatchReminders) => Some(Box::new(WatchReminders(database))),
				(Some(_), Some(database), CenterKind::Recommendations) => {
					Some(Box::new(RecommendationReminders(database)))
				}
				_ => None,
			};
			let abort = source.map(|source| {
				let (abort, registration) = AbortHandle::new_pair();
				let clock = services.clock.clone();
				let gate = services.permissions.clone();
				let sink = Rc::new(BrowserNotifications { on_click: open });
				let timers = timers.clone();
				let poll_loop = async move {
					loop {
						let created = poll_once(&center, &*source, &*clock).await;
						for toast in &created {
							let expire = {
								let center = center.clone();
								let clock = clock.clone();
								let timers = timers.clone();
								let update = update.clone();
								let id = toast.id.clone();
								move || {
									timers.borrow_mut().remove(&id);
									if center.borrow_mut().expire(clock.now()) {
										update.force_update();
									}
								}
							};
							let timeout = Timeout::new(TOAST_TTL.as_millis() as u32, expire);
							timers.borrow_mut().insert(toast.id.clone(), timeout);
							update.force_update();
						}
						if !created.is_empty() {
							// a permission prompt may stay open indefinitely, the loop keeps ticking
							let sink = sink.clone();
							let gate = gate.clone();
							wasm_bindgen_futures::spawn_local(async move {
								deliver_native(&*sink, &gate, &created).await;
							});
						}
						sleep(POLL_INTERVAL).await;
					}
				};
				wasm_bindgen_futures::spawn_local(async move {
					let _ = Abortable::new(poll_loop, registration).await;
				});
				abort
			});
			move || {
				if let Some(abort) = abort {
					abort.abort();
				}
			}
		}
	});

	let toasts = center.borrow().toasts().cloned().collect::<Vec<Toast>>();
	html! {<>
		{toasts.into_iter().map(|toast| {
			let on_open = {
				let open = open.clone();
				let dismiss = dismiss.clone();
				let id = toast.id.clone();
				let target = toast.target;
				Callback::from(move |_: MouseEvent| {
					dismiss.emit(id.clone());
					open.emit(target);
				})
			};
			let on_dismiss = dismiss.reform({
				let id = toast.id.clone();
				move |_: MouseEvent| id.clone()
			});
			html! {
				<div class="toast show" role="alert" key={toast.id.clone()}>
					<div class="toast-header">
						<i class={classes!(kind.icon(), "me-2")} />
						<strong class="me-auto">{&toast.title}</strong>
						<button type="button" class="btn-close" aria-label="Close" onclick={on_dismiss} />
					</div>
					<div class="toast-body d-flex align-items-center gap-2">
						<span>{toast.body.clone().unwrap_or_default()}</span>
						<button type="button" class="btn btn-sm btn-primary ms-auto" onclick={on_open}>{"Open"}</button>
					</div>
				</div>
			}
		}).collect::<Vec<_>>()}
	</>}
}
