use super::ApiError;
use std::{future::Future, time::Duration};

/// Bounded retry with a fixed pause between attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
	pub attempts: usize,
	pub backoff: Duration,
}

impl RetryPolicy {
	pub const SERVER_BUSY: Self = Self {
		attempts: 3,
		backoff: Duration::from_millis(750),
	};
}

/// Run `operation` until it succeeds, fails with an error `should_retry` rejects,
/// or the policy's attempts are used up. `pause` is awaited between attempts.
pub async fn retry_when<Op, Fut, T, Pause, PauseFut>(
	policy: RetryPolicy,
	should_retry: impl Fn(&ApiError) -> bool,
	mut operation: Op,
	pause: Pause,
) -> Result<T, ApiError>
where
	Op: FnMut() -> Fut,
	Fut: Future<Output = Result<T, ApiError>>,
	Pause: Fn(Duration) -> PauseFut,
	PauseFut: Future<Output = ()>,
{
	let mut attempt = 1;
	loop {
		match operation().await {
			Ok(value) => return Ok(value),
			Err(err) if attempt < policy.attempts && should_retry(&err) => {
				log::debug!(target: "retry", "attempt {attempt} failed ({err}), retrying");
				pause(policy.backoff).await;
				attempt += 1;
			}
			Err(err) => return Err(err),
		}
	}
}
