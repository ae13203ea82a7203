use super::tmdb::MetadataClient;
use crate::{
	clock::{Clock, SystemClock},
	data::TitleRef,
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use time::{Duration, OffsetDateTime};

pub const ARTWORK_TTL: Duration = Duration::hours(6);

/// Poster paths looked up by title, kept for [`ARTWORK_TTL`].
/// A `None` poster is cached too, so titles without artwork are not re-requested.
pub struct ArtworkCache {
	clock: Rc<dyn Clock>,
	ttl: Duration,
	entries: HashMap<TitleRef, (Option<String>, OffsetDateTime)>,
}

impl ArtworkCache {
	pub fn new(clock: Rc<dyn Clock>, ttl: Duration) -> Self {
		Self {
			clock,
			ttl,
			entries: HashMap::new(),
		}
	}

	pub fn get(&self, title: &TitleRef) -> Option<Option<String>> {
		let (poster, stored_at) = self.entries.get(title)?;
		match self.clock.now() - *stored_at < self.ttl {
			true => Some(poster.clone()),
			false => None,
		}
	}

	pub fn insert(&mut self, title: TitleRef, poster: Option<String>) {
		let now = self.clock.now();
		self.entries.insert(title, (poster, now));
	}

	pub fn prune(&mut self) {
		let now = self.clock.now();
		let ttl = self.ttl;
		self.entries.retain(|_, (_, stored_at)| now - *stored_at < ttl);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}
}

thread_local! {
	static CACHE: RefCell<ArtworkCache> = RefCell::new(ArtworkCache::new(Rc::new(SystemClock), ARTWORK_TTL));
}

pub fn with_cache<R>(apply: impl FnOnce(&mut ArtworkCache) -> R) -> R {
	CACHE.with(|cache| apply(&mut cache.borrow_mut()))
}

/// The poster for `title`, from the shared cache or the catalog.
/// Local titles have no catalog entry and lookup failures are not cached.
pub async fn poster_for(client: &MetadataClient, title: TitleRef) -> Option<String> {
	let TitleRef::Tmdb { kind, id } = title else {
		return None;
	};
	if let Some(poster) = with_cache(|cache| cache.get(&title)) {
		return poster;
	}
	match client.details(kind, id).await {
		Ok(details) => {
			let poster = details.summary.poster_path;
			with_cache(|cache| {
				cache.prune();
				cache.insert(title, poster.clone());
			});
			poster
		}
		Err(err) => {
			log::debug!(target: "artwork", "no poster for {title}: {err}");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{api::testing::RecordingTransport, clock::ManualClock, config::MetadataConfig};
	use futures::executor::block_on;
	use time::macros::datetime;

	#[test]
	fn entries_expire_after_ttl() {
		let clock = ManualClock::at(datetime!(2026-10-16 12:00 UTC));
		let mut cache = ArtworkCache::new(Rc::new(clock.clone()), ARTWORK_TTL);
		cache.insert(TitleRef::movie(1), Some("/a.jpg".into()));
		cache.insert(TitleRef::movie(2), None);
		clock.advance(Duration::hours(5));
		assert_eq!(cache.get(&TitleRef::movie(1)), Some(Some("/a.jpg".into())));
		assert_eq!(cache.get(&TitleRef::movie(2)), Some(None));
		clock.advance(Duration::hours(1));
		assert_eq!(cache.get(&TitleRef::movie(1)), None);
		cache.prune();
		assert_eq!(cache.len(), 0);
	}

	#[test]
	fn lookups_fill_the_shared_cache_once() {
		let transport = Rc::new(RecordingTransport::default());
		transport.respond(200, r#"{"id":99001,"title":"Heat","poster_path":"/heat.jpg"}"#);
		let config = MetadataConfig {
			url: "https://api.themoviedb.org/3".into(),
			api_key: "key".into(),
		};
		let client = MetadataClient::new(&config, transport.clone()).unwrap();
		let title = TitleRef::movie(99001);
		assert_eq!(block_on(poster_for(&client, title)), Some("/heat.jpg".into()));
		assert_eq!(block_on(poster_for(&client, title)), Some("/heat.jpg".into()));
		assert_eq!(transport.requests().len(), 1);
		assert_eq!(block_on(poster_for(&client, TitleRef::Local(uuid::Uuid::nil()))), None);
	}
}
