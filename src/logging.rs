#[cfg(target_family = "wasm")]
pub mod wasm;

#[cfg(not(target_family = "wasm"))]
pub fn init_terminal(level: log::LevelFilter) {
	use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
	let config = ConfigBuilder::new().add_filter_allow_str(env!("CARGO_CRATE_NAME")).build();
	let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}
