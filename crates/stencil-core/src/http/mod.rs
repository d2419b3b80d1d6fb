//! HTTP access for raw files and archives.
//!
//! Network access goes through the [`HttpTransport`] seam so the redirect
//! logic in [`redirect`] is the only place redirects are followed.

mod redirect;

pub use redirect::{MAX_REDIRECTS, fetch_following_redirects};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::LOCATION;

use crate::error::{FetchError, FetchResult};

/// Streamed response body.
pub type BodyStream = BoxStream<'static, FetchResult<Bytes>>;

/// A single HTTP response, before any redirect handling.
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Raw `Location` header value, if present
    pub location: Option<String>,
    /// Response body
    pub body: BodyStream,
}

impl HttpResponse {
    /// Whether the status is one of the followed redirect codes.
    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 307 | 308)
    }

    /// Read and discard the remaining body.
    pub async fn drain(mut self) -> FetchResult<()> {
        while let Some(chunk) = self.body.next().await {
            chunk?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Issues single GET requests without following redirects.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a GET request and return the raw response.
    async fn get(&self, url: &str) -> FetchResult<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given user agent and redirects disabled.
    pub fn new(user_agent: &str) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::network("<client>", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> FetchResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body_url = url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| FetchError::network(body_url.as_str(), e)))
            .boxed();

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}
