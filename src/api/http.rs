use super::{ApiError, ApiRequest, RawResponse, Transport};
use futures_util::future::LocalBoxFuture;

/// [`Transport`] over `reqwest`, which is backed by `fetch` in the browser.
#[derive(Clone, Default)]
pub struct HttpTransport {
	client: reqwest::Client,
}

impl Transport for HttpTransport {
	fn execute(&self, request: ApiRequest) -> LocalBoxFuture<'_, Result<RawResponse, ApiError>> {
		Box::pin(async move {
			let mut builder = self.client.request(request.method.into(), request.url);
			builder = builder.header("Accept", "application/json");
			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}
			let response = builder.send().await.map_err(|err| ApiError::Network(err.to_string()))?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(|err| ApiError::Network(err.to_string()))?;
			Ok(RawResponse { status, body })
		})
	}
}
