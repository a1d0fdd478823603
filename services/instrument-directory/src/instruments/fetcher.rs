//! Catalog download and decompression
//!
//! The catalog is a single unauthenticated GET returning a gzip byte stream.
//! There is no retry here: a failed download ends that refresh attempt.

use async_trait::async_trait;
use flate2::read::MultiGzDecoder;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::io::Read;
use tracing::{debug, info};

use crate::config::CatalogConfig;
use crate::error::{DirectoryError, Result};

/// Anything that can produce the decompressed catalog text
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Download and decompress the full catalog document
    async fn fetch_catalog(&self) -> Result<String>;
}

/// HTTP catalog fetcher
pub struct DirectoryFetcher {
    client: Client,
    url: String,
    user_agent: String,
}

impl DirectoryFetcher {
    /// Build a fetcher with the configured timeouts
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .build()
            .map_err(|e| DirectoryError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            user_agent: config.user_agent(),
        })
    }

    /// Catalog URL this fetcher downloads from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET `url` and return the raw (still compressed) body
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!(url, "Downloading instrument catalog");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_ENCODING, "gzip")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DirectoryError::Network(format!(
                "catalog download failed with HTTP {status}"
            )));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(DirectoryError::Network(
                "catalog download returned an empty body".to_string(),
            ));
        }

        info!(bytes = body.len(), "Downloaded compressed catalog");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl CatalogSource for DirectoryFetcher {
    async fn fetch_catalog(&self) -> Result<String> {
        let bytes = self.fetch(&self.url).await?;
        let text = decompress(&bytes)?;
        debug!(chars = text.len(), "Decompressed catalog");
        Ok(text)
    }
}

/// Gzip-decode `bytes` into UTF-8 text, reading every concatenated member
pub fn decompress(bytes: &[u8]) -> Result<String> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut raw = Vec::with_capacity(bytes.len().saturating_mul(4));
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| DirectoryError::Decode(format!("invalid gzip stream: {e}")))?;

    String::from_utf8(raw)
        .map_err(|e| DirectoryError::Decode(format!("catalog is not valid UTF-8: {e}")))
}
