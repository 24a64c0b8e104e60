//! Page fetching.
//!
//! The only suspension points of the scraping path live here, so everything
//! above this trait can be exercised without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::ScraperConfig;
use crate::utils::http::create_async_client;

/// Source of raw page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    ///
    /// Any network failure, timeout or non-2xx status is an error; there is no retry.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// `PageFetcher` backed by a shared reqwest client with browser-like headers.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the client from scraper settings.
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        log::debug!("GET {} (timeout {}s)", url, timeout.as_secs());

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}
