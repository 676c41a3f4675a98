use super::{ByteStream, Fetcher};
use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// HTTP(S) fetcher backed by a blocking reqwest client
///
/// The timeout covers the whole exchange, including reading the body.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rhythm-analyzer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<ByteStream, FetchError> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        match response.status() {
            status if status.is_success() => Ok(Box::new(response)),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(url.to_string())),
            status => Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}
