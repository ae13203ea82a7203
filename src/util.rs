use crate::api::ApiError;
use futures_util::future::{select, Either};
use std::{future::Future, pin::pin, time::Duration};

pub mod datetime;
mod sequence;
pub use sequence::*;
#[cfg(target_family = "wasm")]
pub mod web_ext;

pub async fn sleep(duration: Duration) {
	let _ = wasm_timer::Delay::new(duration).await;
}

/// Race `future` against a timer. When the timer wins the request future is dropped,
/// which cancels the underlying fetch.
pub async fn with_timeout<F, T>(future: F, limit: Duration) -> Result<T, ApiError>
where
	F: Future<Output = Result<T, ApiError>>,
{
	let future = pin!(future);
	let timer = pin!(sleep(limit));
	match select(future, timer).await {
		Either::Left((result, _)) => result,
		Either::Right(((), _)) => Err(ApiError::Timeout(limit)),
	}
}
