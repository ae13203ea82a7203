//! Title search and detail lookups against the metadata catalog (TMDB).
use super::{ApiError, ApiRequest, Method, Transport};
use crate::{
	config::{MetadataConfig, METADATA_TIMEOUT, TMDB_IMAGE_URL},
	data::{MediaKind, TitleRef, TitleSnapshot},
	response::into_result,
	util::with_timeout,
};
use serde::{de::DeserializeOwned, Deserialize};
use std::rc::Rc;
use url::Url;

static GENRES: phf::Map<u32, &'static str> = phf::phf_map! {
	28u32 => "Action",
	12u32 => "Adventure",
	16u32 => "Animation",
	35u32 => "Comedy",
	80u32 => "Crime",
	99u32 => "Documentary",
	18u32 => "Drama",
	10751u32 => "Family",
	14u32 => "Fantasy",
	36u32 => "History",
	27u32 => "Horror",
	10402u32 => "Music",
	9648u32 => "Mystery",
	10749u32 => "Romance",
	878u32 => "Science Fiction",
	10770u32 => "TV Movie",
	53u32 => "Thriller",
	10752u32 => "War",
	37u32 => "Western",
	10759u32 => "Action & Adventure",
	10762u32 => "Kids",
	10763u32 => "News",
	10764u32 => "Reality",
	10765u32 => "Sci-Fi & Fantasy",
	10766u32 => "Soap",
	10767u32 => "Talk",
	10768u32 => "War & Politics",
};

pub fn genre_name(id: u32) -> Option<&'static str> {
	GENRES.get(&id).copied()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterSize {
	Thumb,
	Card,
	Detail,
	Original,
}

impl PosterSize {
	fn segment(&self) -> &'static str {
		match self {
			Self::Thumb => "w92",
			Self::Card => "w342",
			Self::Detail => "w500",
			Self::Original => "original",
		}
	}
}

/// Full image url for a catalog `poster_path`. Absolute urls pass through unchanged.
pub fn poster_url(path: &str, size: PosterSize) -> String {
	if path.starts_with("http://") || path.starts_with("https://") {
		return path.to_owned();
	}
	format!("{TMDB_IMAGE_URL}/{}/{}", size.segment(), path.trim_start_matches('/'))
}

#[derive(Clone, Debug, PartialEq)]
pub struct TitleSummary {
	pub title: TitleRef,
	pub name: String,
	pub year: Option<i32>,
	pub poster_path: Option<String>,
	pub overview: String,
	pub genres: Vec<&'static str>,
	pub rating: Option<f32>,
}

impl TitleSummary {
	pub fn snapshot(&self) -> TitleSnapshot {
		TitleSnapshot {
			movie_id: self.title,
			movie_title: self.name.clone(),
			poster_path: self.poster_path.clone(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchPage {
	pub page: u32,
	pub total_pages: u32,
	pub results: Vec<TitleSummary>,
}

impl SearchPage {
	pub fn empty() -> Self {
		Self {
			page: 1,
			total_pages: 0,
			results: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TitleDetails {
	pub summary: TitleSummary,
	pub tagline: Option<String>,
	pub runtime_minutes: Option<u32>,
	pub seasons: Option<u32>,
	pub backdrop_path: Option<String>,
}

#[derive(Deserialize)]
struct RawPage {
	page: u32,
	total_pages: u32,
	results: Vec<RawTitle>,
}

#[derive(Deserialize)]
struct RawGenre {
	id: u32,
}

#[derive(Deserialize)]
struct RawTitle {
	id: u64,
	#[serde(default)]
	media_type: Option<String>,
	#[serde(default)]
	title: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	release_date: Option<String>,
	#[serde(default)]
	first_air_date: Option<String>,
	#[serde(default)]
	poster_path: Option<String>,
	#[serde(default)]
	backdrop_path: Option<String>,
	#[serde(default)]
	overview: String,
	#[serde(default)]
	genre_ids: Vec<u32>,
	#[serde(default)]
	genres: Vec<RawGenre>,
	#[serde(default)]
	vote_average: Option<f32>,
	#[serde(default)]
	tagline: Option<String>,
	#[serde(default)]
	runtime: Option<u32>,
	#[serde(default)]
	episode_run_time: Vec<u32>,
	#[serde(default)]
	number_of_seasons: Option<u32>,
}

impl RawTitle {
	fn kind(&self, fallback: Option<MediaKind>) -> Option<MediaKind> {
		match self.media_type.as_deref() {
			Some(kind) => kind.parse().ok(),
			None => fallback,
		}
	}

	fn into_summary(self, kind: MediaKind) -> TitleSummary {
		let date = self.release_date.as_deref().or(self.first_air_date.as_deref());
		let year = date.and_then(|date| date.get(..4)).and_then(|year| year.parse().ok());
		let genre_ids = match self.genre_ids.is_empty() {
			true => self.genres.iter().map(|genre| genre.id).collect(),
			false => self.genre_ids,
		};
		TitleSummary {
			title: TitleRef::Tmdb { kind, id: self.id },
			name: self.title.or(self.name).unwrap_or_default(),
			year,
			poster_path: self.poster_path.filter(|path| !path.is_empty()),
			overview: self.overview,
			genres: genre_ids.into_iter().filter_map(genre_name).collect(),
			rating: self.vote_average.filter(|rating| *rating > 0.0),
		}
	}
}

#[derive(Clone)]
pub struct MetadataClient {
	base_url: Url,
	api_key: Rc<str>,
	transport: Rc<dyn Transport>,
}

impl PartialEq for MetadataClient {
	fn eq(&self, other: &Self) -> bool {
		self.base_url == other.base_url && Rc::ptr_eq(&self.transport, &other.transport)
	}
}

impl MetadataClient {
	pub fn new(config: &MetadataConfig, transport: Rc<dyn Transport>) -> Result<Self, ApiError> {
		Ok(Self {
			base_url: Url::parse(&format!("{}/", config.url.trim_end_matches('/')))?,
			api_key: config.api_key.as_str().into(),
			transport,
		})
	}

	fn request(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiRequest, ApiError> {
		let mut url = self.base_url.join(path)?;
		{
			let mut pairs = url.query_pairs_mut();
			pairs.append_pair("api_key", &self.api_key);
			for (key, value) in params {
				pairs.append_pair(key, value);
			}
		}
		Ok(ApiRequest::new(Method::Get, url, METADATA_TIMEOUT))
	}

	async fn get<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
		let limit = request.timeout;
		let response = with_timeout(self.transport.execute(request), limit).await?;
		into_result(response)?.into_typed()
	}

	/// Movies and shows matching `query`. People in the results are skipped.
	pub async fn search(&self, query: &str, page: u32) -> Result<SearchPage, ApiError> {
		let query = query.trim();
		if query.is_empty() {
			return Ok(SearchPage::empty());
		}
		let page = page.max(1).to_string();
		let request = self.request(
			"search/multi",
			&[("query", query), ("page", &page), ("include_adult", "false")],
		)?;
		let raw: RawPage = self.get(request).await?;
		let results = raw
			.results
			.into_iter()
			.filter_map(|title| {
				let kind = title.kind(None)?;
				Some(title.into_summary(kind))
			})
			.collect();
		Ok(SearchPage {
			page: raw.page,
			total_pages: raw.total_pages,
			results,
		})
	}

	pub async fn details(&self, kind: MediaKind, id: u64) -> Result<TitleDetails, ApiError> {
		let request = self.request(&format!("{}/{id}", kind.as_str()), &[])?;
		let raw: RawTitle = self.get(request).await?;
		let kind = raw.kind(Some(kind)).unwrap_or(kind);
		let runtime_minutes = raw.runtime.or_else(|| raw.episode_run_time.first().copied());
		let (tagline, seasons, backdrop_path) = (
			raw.tagline.clone().filter(|tagline| !tagline.is_empty()),
			raw.number_of_seasons,
			raw.backdrop_path.clone(),
		);
		Ok(TitleDetails {
			summary: raw.into_summary(kind),
			tagline,
			runtime_minutes: runtime_minutes.filter(|minutes| *minutes > 0),
			seasons,
			backdrop_path,
		})
	}
}
