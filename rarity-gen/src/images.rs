//! Token image lookup
//!
//! Fetches a token's metadata JSON from its `tokenUri` and returns the
//! `image` link rewritten through the configured IPFS gateway.

use rarity_common::links::resolve_link;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("rarity-gen/", env!("CARGO_PKG_VERSION"));

/// Image lookup errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0} from {1}")]
    HttpStatus(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No image in metadata at {0}")]
    MissingImage(String),
}

impl From<FetchError> for rarity_common::Error {
    fn from(err: FetchError) -> Self {
        rarity_common::Error::Fetch(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TokenMetadata {
    image: Option<String>,
}

/// HTTP client resolving token images
pub struct ImageResolver {
    http_client: reqwest::Client,
    gateway: String,
}

impl ImageResolver {
    pub fn new(gateway: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            gateway: gateway.into(),
        })
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    /// Rewrite a known image link through the gateway
    pub fn resolve(&self, link: &str) -> String {
        resolve_link(link, &self.gateway)
    }

    /// Fetch the metadata at `token_uri` and return its resolved image link
    pub async fn image_for(&self, token_uri: &str) -> Result<String, FetchError> {
        let url = self.resolve(token_uri);

        debug!(url = %url, "Fetching token metadata");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16(), url));
        }

        let metadata: TokenMetadata = response
            .json()
            .await
            .map_err(|e| FetchError::ParseError(e.to_string()))?;

        match metadata.image.filter(|image| !image.trim().is_empty()) {
            Some(image) => Ok(self.resolve(&image)),
            None => Err(FetchError::MissingImage(url)),
        }
    }
}
