use crate::util::RequestSequence;
use futures_util::future::LocalBoxFuture;
use std::rc::Rc;
use yew::prelude::*;
use yew_hooks::{use_mount, UseAsyncState};

pub struct AsyncHandle<T, E> {
	state: UseStateHandle<UseAsyncState<T, E>>,
	sequence: Rc<RequestSequence>,
	run: Rc<dyn Fn()>,
}
impl<T, E> AsyncHandle<T, E> {
	pub fn run(&self) {
		(*self.run)();
	}

	/// Forget the last result and ignore any run still in flight.
	pub fn reset(&self) {
		self.sequence.cancel();
		self.state.set(UseAsyncState {
			loading: false,
			data: None,
			error: None,
		});
	}
}
impl<T, E> Clone for AsyncHandle<T, E> {
	fn clone(&self) -> Self {
		Self {
			state: self.state.clone(),
			sequence: self.sequence.clone(),
			run: self.run.clone(),
		}
	}
}
impl<T, E> std::ops::Deref for AsyncHandle<T, E> {
	type Target = UseAsyncState<T, E>;

	fn deref(&self) -> &Self::Target {
		&self.state
	}
}

/// Like `yew_hooks::use_async`, but the future is rebuilt on every run and only the
/// most recent run may write its result. Earlier runs that resolve late are dropped.
#[hook]
pub fn use_async<F, T, E>(run_first_mount: bool, make_future: F) -> AsyncHandle<T, E>
where
	F: Fn() -> LocalBoxFuture<'static, Result<T, E>> + 'static,
	T: 'static,
	E: 'static,
{
	let state = use_state(|| UseAsyncState {
		loading: false,
		data: None,
		error: None,
	});
	let sequence = use_memo((), |_| RequestSequence::default());
	let make_future = yew_hooks::use_latest(make_future);
	let run = {
		let state = state.clone();
		let sequence = sequence.clone();
		Rc::new(move || {
			state.set(UseAsyncState {
				loading: true,
				data: None,
				error: None,
			});
			let ticket = sequence.next();
			let sequence = sequence.clone();
			let async_state = state.clone();
			let future = (*make_future.current())();
			wasm_bindgen_futures::spawn_local(async move {
				let final_state = match future.await {
					Ok(data) => UseAsyncState {
						loading: false,
						data: Some(data),
						error: None,
					},
					Err(err) => UseAsyncState {
						loading: false,
						data: None,
						error: Some(err),
					},
				};
				if sequence.is_current(ticket) {
					async_state.set(final_state);
				}
			})
		})
	};
	let run_on_mount = run.clone();
	use_mount(move || {
		if run_first_mount {
			run_on_mount();
		}
	});
	AsyncHandle { state, sequence, run }
}

/// Runs `search` once `query` has been stable for `delay_ms`. Blank queries clear the result.
#[hook]
pub fn use_debounced_search<F, T, E>(query: String, delay_ms: u32, search: F) -> AsyncHandle<T, E>
where
	F: Fn(String) -> LocalBoxFuture<'static, Result<T, E>> + 'static,
	T: 'static,
	E: 'static,
{
	let current = use_mut_ref(String::new);
	let handle = use_async(false, {
		let current = current.clone();
		move || search(current.borrow().clone())
	});
	{
		let handle = handle.clone();
		use_effect_with(query, move |query| {
			*current.borrow_mut() = query.trim().to_owned();
			let timeout = match query.trim().is_empty() {
				true => {
					handle.reset();
					None
				}
				false => Some(gloo_timers::callback::Timeout::new(delay_ms, move || handle.run())),
			};
			move || drop(timeout)
		});
	}
	handle
}
