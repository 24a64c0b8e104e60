//! Fetch + parse of the releases listing with fallback to the cached snapshot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Config, ReleaseRecord};
use crate::services::{PageFetcher, ReleaseParser};
use crate::storage::ReleaseCache;

/// The releases listing as seen by the monitor and the listing commands.
pub struct ReleaseSource {
    fetcher: Arc<dyn PageFetcher>,
    parser: ReleaseParser,
    url: String,
    timeout: Duration,
    cache: Mutex<ReleaseCache>,
}

impl ReleaseSource {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: ReleaseParser,
        url: impl Into<String>,
        timeout: Duration,
        cache: ReleaseCache,
    ) -> Self {
        Self {
            fetcher,
            parser,
            url: url.into(),
            timeout,
            cache: Mutex::new(cache),
        }
    }

    /// Build from configuration with the given fetcher and loaded cache.
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        cache: ReleaseCache,
    ) -> Result<Self> {
        Ok(Self::new(
            fetcher,
            ReleaseParser::new(&config.scraper)?,
            config.scraper.releases_url(),
            config.scraper.releases_timeout(),
            cache,
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the live listing.
    ///
    /// On success with at least one record the cache is overwritten. Zero records
    /// is reported as [`AppError::EmptyListing`] and leaves the cache untouched.
    pub async fn fetch_fresh(&self) -> Result<Vec<ReleaseRecord>> {
        let html = self.fetcher.fetch(&self.url, self.timeout).await?;
        let releases = self.parser.parse(&html);

        if releases.is_empty() {
            return Err(AppError::EmptyListing {
                url: self.url.clone(),
            });
        }

        log::info!("Successfully parsed {} releases", releases.len());

        let mut cache = self.cache.lock().await;
        if let Err(e) = cache.save(&releases).await {
            log::error!("Failed to persist release cache: {}", e);
        }

        Ok(releases)
    }

    /// Best available listing: live data, or the cached snapshot when the
    /// fetch fails or parses to nothing. Empty only if both are empty.
    pub async fn releases(&self) -> Vec<ReleaseRecord> {
        match self.fetch_fresh().await {
            Ok(releases) => releases,
            Err(e) => {
                let cached = self.cached().await;
                if e.is_fetch_failure() {
                    log::error!(
                        "Error fetching releases: {}. Returning {} cached releases",
                        e,
                        cached.len()
                    );
                } else {
                    log::warn!("{}. Returning {} cached releases", e, cached.len());
                }
                cached
            }
        }
    }

    /// Snapshot currently held by the cache.
    pub async fn cached(&self) -> Vec<ReleaseRecord> {
        self.cache.lock().await.current().to_vec()
    }
}
