use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::error::FetchError;

/// Downloads raw document bytes from a link.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns `FetchError` for transport failures and non-2xx responses.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// `DocumentFetcher` backed by a plain HTTP GET.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let bytes = response.bytes().await?;
        debug!("fetched {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }
}
