use time::{format_description::FormatItem, macros::format_description, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// The value format of `<input type="datetime-local">`.
static INPUT_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]T[hour]:[minute]");
static INPUT_FORMAT_SECONDS: &[FormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
static DISPLAY_FORMAT: &[FormatItem<'static>] =
	format_description!("[weekday repr:short], [month repr:short] [day padding:none] at [hour]:[minute]");

pub fn parse_input(value: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
	let value = value.trim();
	let local = PrimitiveDateTime::parse(value, INPUT_FORMAT)
		.or_else(|_| PrimitiveDateTime::parse(value, INPUT_FORMAT_SECONDS))
		.ok()?;
	Some(local.assume_offset(offset))
}

pub fn format_input(at: OffsetDateTime, offset: UtcOffset) -> String {
	at.to_offset(offset).format(INPUT_FORMAT).unwrap_or_default()
}

pub fn format_display(at: OffsetDateTime, offset: UtcOffset) -> String {
	at.to_offset(offset).format(DISPLAY_FORMAT).unwrap_or_default()
}

/// The browser's current offset from UTC.
#[cfg(target_family = "wasm")]
pub fn local_offset() -> UtcOffset {
	// getTimezoneOffset is UTC minus local, in minutes
	let minutes = wasm_bindgen_futures::js_sys::Date::new_0().get_timezone_offset() as i32;
	UtcOffset::from_whole_seconds(-minutes * 60).unwrap_or(UtcOffset::UTC)
}

#[cfg(not(target_family = "wasm"))]
pub fn local_offset() -> UtcOffset {
	UtcOffset::UTC
}

#[cfg(test)]
mod tests {
	use super::*;
	use time::macros::{datetime, offset};

	#[test]
	fn input_values_use_the_local_offset() {
		let at = parse_input("2026-10-16T20:00", offset!(-4)).unwrap();
		assert_eq!(at, datetime!(2026-10-17 00:00 UTC));
		assert_eq!(format_input(at, offset!(-4)), "2026-10-16T20:00");
		assert_eq!(parse_input("2026-10-16T20:00:30", UtcOffset::UTC), Some(datetime!(2026-10-16 20:00:30 UTC)));
	}

	#[test]
	fn bad_input_is_rejected() {
		assert_eq!(parse_input("", UtcOffset::UTC), None);
		assert_eq!(parse_input("tomorrow", UtcOffset::UTC), None);
	}

	#[test]
	fn display_is_readable() {
		assert_eq!(format_display(datetime!(2026-10-16 20:05 UTC), UtcOffset::UTC), "Fri, Oct 16 at 20:05");
	}
}
