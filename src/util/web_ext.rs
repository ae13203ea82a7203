use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::Callback;

pub trait InputExt {
	fn input_value(&self) -> Option<String>;
	fn select_value(&self) -> Option<String>;
	fn textarea_value(&self) -> Option<String>;
}

impl<E> InputExt for E
where
	E: AsRef<web_sys::Event>,
{
	fn input_value(&self) -> Option<String> {
		let target = self.as_ref().target()?;
		Some(target.dyn_into::<HtmlInputElement>().ok()?.value())
	}

	fn select_value(&self) -> Option<String> {
		let target = self.as_ref().target()?;
		Some(target.dyn_into::<HtmlSelectElement>().ok()?.value())
	}

	fn textarea_value(&self) -> Option<String> {
		let target = self.as_ref().target()?;
		Some(target.dyn_into::<HtmlTextAreaElement>().ok()?.value())
	}
}

/// A setter for `UseStateHandle<String>` fed by an input's `oninput`.
pub fn bind_input(state: &yew::UseStateHandle<String>) -> Callback<web_sys::InputEvent> {
	let state = state.clone();
	Callback::from(move |evt: web_sys::InputEvent| {
		if let Some(value) = evt.input_value() {
			state.set(value);
		}
	})
}

pub fn bind_textarea(state: &yew::UseStateHandle<String>) -> Callback<web_sys::InputEvent> {
	let state = state.clone();
	Callback::from(move |evt: web_sys::InputEvent| {
		if let Some(value) = evt.textarea_value() {
			state.set(value);
		}
	})
}
