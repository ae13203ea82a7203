use super::{filter::Query, ApiError};
use crate::{
	config::{BackendConfig, APP_USER_AGENT, AUTH_TIMEOUT, REST_TIMEOUT},
	response::{into_result, Payload},
	util::with_timeout,
};
use futures_util::future::LocalBoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use std::{rc::Rc, time::Duration};
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
	Patch,
	Delete,
}

impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => Self::GET,
			Method::Post => Self::POST,
			Method::Patch => Self::PATCH,
			Method::Delete => Self::DELETE,
		}
	}
}

/// A fully prepared request, headers included, ready for a [`Transport`].
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	pub method: Method,
	pub url: Url,
	pub headers: Vec<(String, String)>,
	pub body: Option<serde_json::Value>,
	pub timeout: Duration,
}

impl ApiRequest {
	pub fn new(method: Method, url: Url, timeout: Duration) -> Self {
		Self {
			method,
			url,
			headers: Vec::new(),
			body: None,
			timeout,
		}
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	fn set_header(&mut self, name: &str, value: String) {
		match self.headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
			Some((_, existing)) => *existing = value,
			None => self.headers.push((name.to_owned(), value)),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
	pub status: u16,
	pub body: String,
}

/// Moves a prepared request over the wire.
pub trait Transport {
	fn execute(&self, request: ApiRequest) -> LocalBoxFuture<'_, Result<RawResponse, ApiError>>;
}

pub trait TokenSource {
	fn access_token(&self) -> Option<String>;

	/// Called before a table request is signed. Sources backed by an expiring session
	/// renew it here; failures keep whatever token is current.
	fn renew(&self) -> LocalBoxFuture<'_, ()> {
		Box::pin(async {})
	}
}

/// Signs and sends requests to the backend's REST and auth endpoints.
#[derive(Clone)]
pub struct Gateway {
	base_url: Url,
	anon_key: Rc<str>,
	tokens: Rc<dyn TokenSource>,
	transport: Rc<dyn Transport>,
}

impl PartialEq for Gateway {
	fn eq(&self, other: &Self) -> bool {
		self.base_url == other.base_url && Rc::ptr_eq(&self.transport, &other.transport)
	}
}

impl std::fmt::Debug for Gateway {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Gateway({})", self.base_url)
	}
}

impl Gateway {
	pub fn new(
		config: &BackendConfig,
		tokens: Rc<dyn TokenSource>,
		transport: Rc<dyn Transport>,
	) -> Result<Self, ApiError> {
		let base_url = Url::parse(&format!("{}/", config.url.trim_end_matches('/')))?;
		Ok(Self {
			base_url,
			anon_key: config.anon_key.as_str().into(),
			tokens,
			transport,
		})
	}

	/// The same backend, signing with another token source.
	pub fn with_tokens(&self, tokens: Rc<dyn TokenSource>) -> Self {
		Self {
			tokens,
			..self.clone()
		}
	}

	pub fn table<T>(&self, method: Method, table: &str) -> Request<'_, T> {
		let mut request = self.request(method, &format!("rest/v1/{table}"), REST_TIMEOUT);
		request.renew = true;
		request
	}

	pub fn auth<T>(&self, method: Method, path: &str) -> Request<'_, T> {
		self.request(method, &format!("auth/v1/{path}"), AUTH_TIMEOUT)
	}

	fn request<T>(&self, method: Method, path: &str, timeout: Duration) -> Request<'_, T> {
		let url = match self.base_url.join(path) {
			Ok(url) => url,
			Err(err) => return Request::failed(self, err.into()),
		};
		let mut request = ApiRequest::new(method, url, timeout);
		self.sign(&mut request);
		request.set_header("x-client-info", APP_USER_AGENT.to_owned());
		Request {
			gateway: self,
			request,
			error: None,
			renew: false,
			marker: Default::default(),
		}
	}

	fn sign(&self, request: &mut ApiRequest) {
		let bearer = self.tokens.access_token().unwrap_or_else(|| self.anon_key.to_string());
		request.set_header("apikey", self.anon_key.to_string());
		request.set_header("Authorization", format!("Bearer {bearer}"));
	}

	pub async fn execute(&self, request: ApiRequest) -> Result<Payload, ApiError> {
		let url = request.url.path().to_owned();
		let limit = request.timeout;
		let response = with_timeout(self.transport.execute(request), limit).await;
		if let Err(err) = &response {
			log::debug!(target: "gateway", "{url}: {err}");
		}
		into_result(response?)
	}
}

pub struct Request<'gateway, T> {
	gateway: &'gateway Gateway,
	request: ApiRequest,
	error: Option<ApiError>,
	/// Renew the session and re-sign right before sending.
	renew: bool,
	marker: std::marker::PhantomData<T>,
}

impl<'gateway, T> std::fmt::Debug for Request<'gateway, T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.request.fmt(f)
	}
}

impl<'gateway, T> Request<'gateway, T> {
	fn failed(gateway: &'gateway Gateway, error: ApiError) -> Self {
		// the url is never sent once an error is recorded
		let request = ApiRequest::new(Method::Get, gateway.base_url.clone(), REST_TIMEOUT);
		Self {
			gateway,
			request,
			error: Some(error),
			renew: false,
			marker: Default::default(),
		}
	}

	pub fn with_query(mut self, query: &Query) -> Self {
		if query.is_empty() {
			return self;
		}
		{
			let mut pairs = self.request.url.query_pairs_mut();
			for (key, value) in query.pairs() {
				pairs.append_pair(&key, &value);
			}
		}
		self
	}

	pub fn with_param(mut self, key: &str, value: &str) -> Self {
		self.request.url.query_pairs_mut().append_pair(key, value);
		self
	}

	pub fn with_json<Q>(mut self, json: &Q) -> Self
	where
		Q: Serialize + ?Sized,
	{
		match serde_json::to_value(json) {
			Ok(value) => self.request.body = Some(value),
			Err(err) => self.error = Some(err.into()),
		}
		self
	}

	/// Append a `Prefer` directive, e.g. `return=representation`.
	pub fn prefer(mut self, directive: &str) -> Self {
		let value = match self.request.header("Prefer") {
			Some(existing) => format!("{existing},{directive}"),
			None => directive.to_owned(),
		};
		self.request.set_header("Prefer", value);
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.request.timeout = timeout;
		self
	}

	pub fn into_request(self) -> Result<ApiRequest, ApiError> {
		match self.error {
			Some(err) => Err(err),
			None => Ok(self.request),
		}
	}

	async fn prepare(self) -> Result<(&'gateway Gateway, ApiRequest), ApiError> {
		let (gateway, renew) = (self.gateway, self.renew);
		let mut request = self.into_request()?;
		if renew {
			gateway.tokens.renew().await;
			gateway.sign(&mut request);
		}
		Ok((gateway, request))
	}

	/// Send and discard the body.
	pub async fn send_empty(self) -> Result<(), ApiError> {
		let (gateway, request) = self.prepare().await?;
		gateway.execute(request).await?;
		Ok(())
	}
}

impl<'gateway, T> Request<'gateway, T>
where
	T: DeserializeOwned,
{
	pub async fn send(self) -> Result<T, ApiError> {
		let (gateway, request) = self.prepare().await?;
		let payload = gateway.execute(request).await?;
		payload.into_typed()
	}

	/// Send and return the first row of a `return=representation` response.
	pub async fn send_one(self) -> Result<T, ApiError> {
		let (gateway, request) = self.prepare().await?;
		let payload = gateway.execute(request).await?;
		let mut rows: Vec<T> = payload.into_typed()?;
		match rows.is_empty() {
			true => Err(ApiError::Parse("expected a row in the response".into())),
			false => Ok(rows.swap_remove(0)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::testing::{MemoryBackend, RecordingTransport};
	use futures::executor::block_on;

	struct NoToken;
	impl TokenSource for NoToken {
		fn access_token(&self) -> Option<String> {
			None
		}
	}

	struct FixedToken;
	impl TokenSource for FixedToken {
		fn access_token(&self) -> Option<String> {
			Some("user-jwt".into())
		}
	}

	fn config() -> BackendConfig {
		BackendConfig {
			url: "https://demo.supabase.co/".into(),
			anon_key: "anon".into(),
		}
	}

	#[test]
	fn requests_are_signed() {
		let transport = Rc::new(RecordingTransport::default());
		let gateway = Gateway::new(&config(), Rc::new(FixedToken), transport.clone()).unwrap();
		let request = gateway
			.table::<()>(Method::Get, "profiles")
			.with_query(&Query::new().eq("id", 4))
			.prefer("return=representation")
			.prefer("count=exact")
			.into_request()
			.unwrap();
		assert_eq!(request.url.as_str(), "https://demo.supabase.co/rest/v1/profiles?id=eq.4");
		assert_eq!(request.header("apikey"), Some("anon"));
		assert_eq!(request.header("authorization"), Some("Bearer user-jwt"));
		assert_eq!(request.header("Prefer"), Some("return=representation,count=exact"));
		assert_eq!(request.timeout, REST_TIMEOUT);
	}

	#[test]
	fn anon_key_is_the_fallback_bearer() {
		let transport = Rc::new(RecordingTransport::default());
		let gateway = Gateway::new(&config(), Rc::new(NoToken), transport).unwrap();
		let request = gateway.auth::<()>(Method::Post, "signup").into_request().unwrap();
		assert_eq!(request.header("Authorization"), Some("Bearer anon"));
		assert_eq!(request.timeout, AUTH_TIMEOUT);
	}

	#[test]
	fn transport_timeouts_become_errors() {
		let transport = Rc::new(RecordingTransport::stalled());
		let gateway = Gateway::new(&config(), Rc::new(NoToken), transport).unwrap();
		let result = block_on(
			gateway
				.table::<Vec<serde_json::Value>>(Method::Get, "profiles")
				.with_timeout(Duration::from_millis(10))
				.send(),
		);
		assert_eq!(result, Err(ApiError::Timeout(Duration::from_millis(10))));
	}

	#[test]
	fn send_one_takes_first_row() {
		let backend = MemoryBackend::default();
		let gateway = backend.gateway(None);
		let row: serde_json::Value = block_on(
			gateway
				.table(Method::Post, "profiles")
				.with_json(&serde_json::json!({ "id": "a", "username": "sam" }))
				.prefer("return=representation")
				.send_one(),
		)
		.unwrap();
		assert_eq!(row["username"], "sam");
	}
}
