use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

#[derive(Clone, Debug)]
pub struct Config {
	pub level: LevelFilter,
	/// Prefix every line with the record's target, e.g. `[reminders] poll failed`.
	pub show_target: bool,
	/// Only log records whose target starts with this prefix.
	pub target_prefix: Option<&'static str>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			level: if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info },
			show_target: false,
			target_prefix: None,
		}
	}
}

impl Config {
	pub fn prefer_target(mut self) -> Self {
		self.show_target = true;
		self
	}

	pub fn only_crate(mut self) -> Self {
		self.target_prefix = Some(env!("CARGO_CRATE_NAME"));
		self
	}
}

struct ConsoleLogger(Config);

impl Log for ConsoleLogger {
	fn enabled(&self, metadata: &Metadata) -> bool {
		if metadata.level() > self.0.level {
			return false;
		}
		match self.0.target_prefix {
			Some(prefix) => metadata.target().starts_with(prefix),
			None => true,
		}
	}

	fn log(&self, record: &Record) {
		if !self.enabled(record.metadata()) {
			return;
		}
		let line = match self.0.show_target {
			true => format!("[{}] {}", record.target(), record.args()),
			false => format!("{}", record.args()),
		};
		let line = JsValue::from_str(&line);
		match record.level() {
			Level::Error => web_sys::console::error_1(&line),
			Level::Warn => web_sys::console::warn_1(&line),
			Level::Info => web_sys::console::info_1(&line),
			Level::Debug => web_sys::console::log_1(&line),
			Level::Trace => web_sys::console::debug_1(&line),
		}
	}

	fn flush(&self) {}
}

pub fn init(config: Config) {
	let level = config.level;
	if log::set_boxed_logger(Box::new(ConsoleLogger(config))).is_ok() {
		log::set_max_level(level);
	}
}
