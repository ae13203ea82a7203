pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod data;
pub mod database;
pub mod logging;
pub mod notify;
pub mod response;
pub mod route;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod util;

#[cfg(target_family = "wasm")]
pub mod app;
#[cfg(target_family = "wasm")]
pub mod components;
#[cfg(target_family = "wasm")]
pub mod hooks;
#[cfg(target_family = "wasm")]
pub mod page;

#[cfg(target_family = "wasm")]
fn main() {
	logging::wasm::init(logging::wasm::Config::default().prefer_target());
	yew::Renderer::<app::App>::new().render();
}

#[cfg(not(target_family = "wasm"))]
fn main() {
	logging::init_terminal(log::LevelFilter::Info);
	log::error!("watchwith-rs is a browser app, build it for wasm32-unknown-unknown (e.g. `trunk serve`)");
}
