//! Remote image retrieval.

use std::time::Duration;

use reqwest::{Client, redirect};
use url::Url;

use crate::constants::fetch::{MAX_REDIRECTS, TIMEOUT_MS};
use crate::error::{CarouselError, Result};

/// Fetch raw image bytes by URL.
///
/// Implementations report failure for error statuses and empty bodies; the
/// coordinator adds the timeout and cancellation on top.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// HTTP fetcher with connection pooling and redirect following.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpImageFetcher {
    /// Create a fetcher with the default 30s client timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_millis(TIMEOUT_MS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("rowcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CarouselError::Fetch(format!("client setup: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Whole-request timeout the client was built with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request_error(&self, err: reqwest::Error) -> CarouselError {
        if err.is_timeout() {
            CarouselError::Timeout(self.timeout)
        } else {
            CarouselError::Fetch(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "image/*")
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarouselError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.request_error(e))?;
        if bytes.is_empty() {
            return Err(CarouselError::EmptyBody(url.to_string()));
        }

        log::trace!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
