use time::OffsetDateTime;

pub trait Clock {
	fn now(&self) -> OffsetDateTime;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Milliseconds since the unix epoch, used for client-side ids.
pub fn unix_millis(at: OffsetDateTime) -> i64 {
	(at.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
pub use manual::ManualClock;


#[cfg(test)]
mod tests {
	use super::*;
	use time::macros::datetime;

	#[test]
	fn millis_are_truncated() {
		assert_eq!(unix_millis(datetime!(1970-01-01 00:00:01.2345 UTC)), 1234);
	}

	#[test]
	fn manual_clock_advances() {
		let clock = ManualClock::at(datetime!(2026-01-01 00:00 UTC));
		clock.advance(time::Duration::seconds(45));
		assert_eq!(clock.now(), datetime!(2026-01-01 00:00:45 UTC));
	}
}
