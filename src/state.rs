//! Process-wide state, built once at startup and shared by handle.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::Config;
use crate::notify::{Notifier, RenderStyle};
use crate::pipeline::{ReleaseMonitor, ReleaseSource};
use crate::services::{BrowseParser, HttpFetcher, PageFetcher, SearchParser};
use crate::storage::{LocalStorage, ReleaseCache, SeenSet};

/// Everything the monitor and the commands share.
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: LocalStorage,
    pub fetcher: Arc<dyn PageFetcher>,
    pub source: Arc<ReleaseSource>,
    pub seen: Arc<Mutex<SeenSet>>,
    pub search: SearchParser,
    pub browse: BrowseParser,
    pub style: RenderStyle,
}

impl AppState {
    /// Load persisted state and build an HTTP-backed fetcher.
    pub async fn load(config: Config, storage: LocalStorage) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::from_config(&config.scraper)?);
        Self::with_fetcher(config, storage, fetcher).await
    }

    /// Load persisted state around an arbitrary fetcher.
    pub async fn with_fetcher(
        config: Config,
        storage: LocalStorage,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let cache = ReleaseCache::load(storage.clone(), &config.storage.cache_file).await;
        let seen = SeenSet::load(storage.clone(), &config.storage.seen_file).await;

        let source = ReleaseSource::from_config(&config, Arc::clone(&fetcher), cache)?;
        let search = SearchParser::new(&config.scraper, config.listing.search_max_results)?;
        let browse = BrowseParser::new(&config.scraper)?;
        let style = RenderStyle::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            storage,
            fetcher,
            source: Arc::new(source),
            seen: Arc::new(Mutex::new(seen)),
            search,
            browse,
            style,
        })
    }

    /// A monitor posting through `notifier`, sharing this state's stores.
    pub fn monitor(&self, notifier: Arc<dyn Notifier>) -> ReleaseMonitor {
        ReleaseMonitor::new(
            Arc::clone(&self.source),
            Arc::clone(&self.seen),
            notifier,
            self.config.monitor.clone(),
            self.style.clone(),
        )
    }
}
