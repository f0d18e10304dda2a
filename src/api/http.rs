// src/api/http.rs

//! Production `BatchApi` over HTTP.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, RequestBuilder, Url};
use tracing::{debug, info};

use crate::config::ServerSection;
use crate::errors::{BatchrouteError, Result};
use crate::types::BatchId;

use super::backend::{ApiError, ApiFuture, BatchApi};
use super::wire::{BatchResource, CreateBatchRequest};

/// `reqwest`-backed client for `/delivery-batches/`.
///
/// Requests carry `Authorization: Token <key>` when a token is configured.
/// The client never retries: a failed creation is reported once and a failed
/// poll is left to the tracker's next tick.
#[derive(Debug, Clone)]
pub struct HttpBatchApi {
    client: Client,
    base_url: Url,
}

impl HttpBatchApi {
    pub fn new(server: &ServerSection) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = server.api_token.as_deref().filter(|t| !t.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("Token {}", token.trim())).map_err(|e| {
                BatchrouteError::ConfigError(format!("[server].api_token is not a valid header value: {e}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(Duration::from_secs(server.timeout_secs))
            .connect_timeout(Duration::from_secs(server.timeout_secs.min(10)))
            .build()
            .map_err(|e| BatchrouteError::ConfigError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: collection_url(&server.base_url)?,
        })
    }

    /// `<base>/delivery-batches/`
    pub fn collection_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/delivery-batches/<id>/`
    ///
    /// The id always lands in a single percent-encoded path segment, so ids
    /// containing `/`, `?` or a full URL stay under the collection. Empty,
    /// `.` and `..` ids have no segment form and are rejected.
    pub fn batch_url(&self, id: &BatchId) -> std::result::Result<Url, ApiError> {
        if matches!(id.as_str(), "" | "." | "..") {
            return Err(ApiError::Transport(format!("{:?} is not a usable batch id", id.as_str())));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ApiError::Transport(format!("base url {} cannot hold batch {id}", self.base_url))
            })?;
            segments.pop_if_empty().push(id.as_str()).push("");
        }
        Ok(url)
    }
}

fn collection_url(base: &str) -> Result<Url> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|u| u.join("delivery-batches/"))
        .map_err(|e| BatchrouteError::ConfigError(format!("invalid [server].base_url {base:?}: {e}")))
}

async fn send_json(request: RequestBuilder) -> std::result::Result<BatchResource, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiError::Status {
            code: status.as_u16(),
            body,
        });
    }

    response
        .json::<BatchResource>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

impl BatchApi for HttpBatchApi {
    fn create_batch(&self, request: &CreateBatchRequest) -> ApiFuture<'_, BatchResource> {
        let builder = self.client.post(self.base_url.clone()).json(request);
        let deliveries = request.deliveries.len();

        Box::pin(async move {
            info!(url = %self.base_url, deliveries, "creating delivery batch");
            send_json(builder).await
        })
    }

    fn fetch_batch(&self, id: &BatchId) -> ApiFuture<'_, BatchResource> {
        let url = self.batch_url(id);

        Box::pin(async move {
            let url = url?;
            debug!(%url, "fetching delivery batch");
            send_json(self.client.get(url)).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_tolerates_trailing_slash() {
        let a = collection_url("http://localhost:8000/api").unwrap();
        let b = collection_url("http://localhost:8000/api/").unwrap();
        assert_eq!(a.as_str(), "http://localhost:8000/api/delivery-batches/");
        assert_eq!(a, b);
    }

    #[test]
    fn batch_url_appends_id_with_trailing_slash() {
        let api = HttpBatchApi::new(&ServerSection::default()).unwrap();
        let url = api.batch_url(&BatchId::new("b1")).unwrap();
        assert!(url.as_str().ends_with("/delivery-batches/b1/"));
    }

    #[test]
    fn hostile_ids_stay_in_one_segment() {
        let api = HttpBatchApi::new(&ServerSection::default()).unwrap();
        let collection = "http://localhost:8000/api/delivery-batches/";

        for id in ["../users", "b1?format=csv", "http://evil.example/", "a/b", "x#frag", "..."] {
            let url = api.batch_url(&BatchId::new(id)).unwrap();
            assert_eq!(url.host_str(), Some("localhost"), "{id} changed the host");
            assert_eq!(url.port(), Some(8000));
            assert!(url.as_str().starts_with(collection), "{id} left the collection: {url}");
            assert_eq!(url.query(), None, "{id} produced a query");
            assert_eq!(url.fragment(), None, "{id} produced a fragment");

            let segments: Vec<&str> = url.path_segments().unwrap().collect();
            assert_eq!(segments.len(), 4, "{id} split into several segments: {url}");
            assert_eq!(&segments[..2], ["api", "delivery-batches"]);
            assert_eq!(segments[3], "");
        }

        let url = api.batch_url(&BatchId::new("a/b")).unwrap();
        assert_eq!(url.as_str(), format!("{collection}a%2Fb/"));
        let url = api.batch_url(&BatchId::new("b1?format=csv")).unwrap();
        assert_eq!(url.as_str(), format!("{collection}b1%3Fformat=csv/"));

        for id in ["", ".", ".."] {
            assert!(api.batch_url(&BatchId::new(id)).is_err(), "{id:?} should be rejected");
        }
    }
}
