//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Upper bound on fields per message imposed by the chat platform.
const MAX_FIELDS_PER_MESSAGE: usize = 25;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Recurring release monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// On-demand command rendering settings
    #[serde(default)]
    pub listing: ListingConfig,

    /// Chat platform settings
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Persisted state file names
    #[serde(default)]
    pub storage: StorageConfig,

    /// Health-check responder
    #[serde(default)]
    pub keep_alive: KeepAliveConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        url::Url::parse(&self.scraper.site_url)?;
        if self.scraper.releases_timeout_secs == 0
            || self.scraper.search_timeout_secs == 0
            || self.scraper.detail_timeout_secs == 0
        {
            return Err(AppError::validation("scraper timeouts must be > 0"));
        }
        if self.scraper.row_marker.trim().is_empty() {
            return Err(AppError::validation("scraper.row_marker is empty"));
        }
        if self.scraper.column_markers.len() != 3 {
            return Err(AppError::validation(
                "scraper.column_markers must list exactly 3 markers (title, release, group)",
            ));
        }
        if self.monitor.interval_secs == 0 {
            return Err(AppError::validation("monitor.interval_secs must be > 0"));
        }
        if !(1..=MAX_FIELDS_PER_MESSAGE).contains(&self.monitor.batch_size) {
            return Err(AppError::validation(format!(
                "monitor.batch_size must be between 1 and {MAX_FIELDS_PER_MESSAGE}"
            )));
        }
        if !(1..=MAX_FIELDS_PER_MESSAGE).contains(&self.listing.page_size) {
            return Err(AppError::validation(format!(
                "listing.page_size must be between 1 and {MAX_FIELDS_PER_MESSAGE}"
            )));
        }
        if self.listing.title_max_chars < 4 {
            return Err(AppError::validation("listing.title_max_chars must be >= 4"));
        }
        if self.discord.prefix.trim().is_empty() {
            return Err(AppError::validation("discord.prefix is empty"));
        }
        if self.discord.release_channel_id == 0 || self.discord.welcome_channel_id == 0 {
            return Err(AppError::validation("discord channel ids must be non-zero"));
        }
        Ok(())
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Browser-like User-Agent header
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header sent with every request
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header sent with every request
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Base URL of the tracked site
    #[serde(default = "defaults::site_url")]
    pub site_url: String,

    /// Path of the releases listing
    #[serde(default = "defaults::releases_path")]
    pub releases_path: String,

    /// Path of the series search/browse page
    #[serde(default = "defaults::series_path")]
    pub series_path: String,

    /// Timeout for the releases listing
    #[serde(default = "defaults::releases_timeout")]
    pub releases_timeout_secs: u64,

    /// Timeout for search and browse requests
    #[serde(default = "defaults::search_timeout")]
    pub search_timeout_secs: u64,

    /// Timeout for series detail pages
    #[serde(default = "defaults::detail_timeout")]
    pub detail_timeout_secs: u64,

    /// Series type filter used by the browse page
    #[serde(default = "defaults::browse_type")]
    pub browse_type: String,

    /// Class substring marking a release row
    #[serde(default = "defaults::row_marker")]
    pub row_marker: String,

    /// Class substrings of the title, release and group columns
    #[serde(default = "defaults::column_markers")]
    pub column_markers: Vec<String>,
}

impl ScraperConfig {
    /// Full URL of the releases listing.
    pub fn releases_url(&self) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), self.releases_path)
    }

    /// Full URL of the series page without query.
    pub fn series_url(&self) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), self.series_path)
    }

    pub fn releases_timeout(&self) -> Duration {
        Duration::from_secs(self.releases_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            site_url: defaults::site_url(),
            releases_path: defaults::releases_path(),
            series_path: defaults::series_path(),
            releases_timeout_secs: defaults::releases_timeout(),
            search_timeout_secs: defaults::search_timeout(),
            detail_timeout_secs: defaults::detail_timeout(),
            browse_type: defaults::browse_type(),
            row_marker: defaults::row_marker(),
            column_markers: defaults::column_markers(),
        }
    }
}

/// Recurring release monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sleep between detection cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Releases per notification
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Pause after each notification
    #[serde(default = "defaults::batch_delay")]
    pub batch_delay_ms: u64,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            batch_size: defaults::batch_size(),
            batch_delay_ms: defaults::batch_delay(),
        }
    }
}

/// On-demand command rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Releases per page of the full listing
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Pause between listing pages
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,

    /// Longest title shown in a field name
    #[serde(default = "defaults::title_max_chars")]
    pub title_max_chars: usize,

    /// Search rows considered
    #[serde(default = "defaults::search_max_results")]
    pub search_max_results: usize,

    /// Search rows rendered
    #[serde(default = "defaults::search_display")]
    pub search_display: usize,

    /// Extra letters tried after an empty first browse
    #[serde(default = "defaults::random_retries")]
    pub random_retries: usize,

    /// Extra series suggested next to the random pick
    #[serde(default = "defaults::random_extra")]
    pub random_extra: usize,

    /// Longest series description shown
    #[serde(default = "defaults::description_max_chars")]
    pub description_max_chars: usize,
}

impl ListingConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
            page_delay_ms: defaults::page_delay(),
            title_max_chars: defaults::title_max_chars(),
            search_max_results: defaults::search_max_results(),
            search_display: defaults::search_display(),
            random_retries: defaults::random_retries(),
            random_extra: defaults::random_extra(),
            description_max_chars: defaults::description_max_chars(),
        }
    }
}

/// Chat platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Command prefix
    #[serde(default = "defaults::prefix")]
    pub prefix: String,

    /// Channel receiving new release posts
    #[serde(default = "defaults::release_channel")]
    pub release_channel_id: u64,

    /// Channel receiving welcome messages
    #[serde(default = "defaults::welcome_channel")]
    pub welcome_channel_id: u64,

    /// Embed accent color
    #[serde(default = "defaults::embed_color")]
    pub embed_color: u32,

    /// Image attached to welcome messages
    #[serde(default = "defaults::welcome_image")]
    pub welcome_image_url: String,

    /// Users allowed to run admin commands besides guild administrators
    #[serde(default)]
    pub admin_user_ids: Vec<u64>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            prefix: defaults::prefix(),
            release_channel_id: defaults::release_channel(),
            welcome_channel_id: defaults::welcome_channel(),
            embed_color: defaults::embed_color(),
            welcome_image_url: defaults::welcome_image(),
            admin_user_ids: Vec::new(),
        }
    }
}

/// Persisted state file names, relative to the storage directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::seen_file")]
    pub seen_file: String,

    #[serde(default = "defaults::cache_file")]
    pub cache_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seen_file: defaults::seen_file(),
            cache_file: defaults::cache_file(),
        }
    }
}

/// Health-check responder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    #[serde(default = "defaults::keep_alive_enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::keep_alive_bind")]
    pub bind: String,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::keep_alive_enabled(),
            bind: defaults::keep_alive_bind(),
        }
    }
}

mod defaults {
    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.5".into()
    }
    pub fn site_url() -> String {
        "https://www.mangaupdates.com".into()
    }
    pub fn releases_path() -> String {
        "/releases.html".into()
    }
    pub fn series_path() -> String {
        "/series.html".into()
    }
    pub fn releases_timeout() -> u64 {
        20
    }
    pub fn search_timeout() -> u64 {
        15
    }
    pub fn detail_timeout() -> u64 {
        10
    }
    pub fn browse_type() -> String {
        "manhwa".into()
    }
    pub fn row_marker() -> String {
        "new-release-item".into()
    }
    pub fn column_markers() -> Vec<String> {
        vec!["col-6".into(), "col-2".into(), "col-4".into()]
    }

    // Monitor defaults
    pub fn interval() -> u64 {
        3600
    }
    pub fn batch_size() -> usize {
        5
    }
    pub fn batch_delay() -> u64 {
        1000
    }

    // Listing defaults
    pub fn page_size() -> usize {
        10
    }
    pub fn page_delay() -> u64 {
        500
    }
    pub fn title_max_chars() -> usize {
        80
    }
    pub fn search_max_results() -> usize {
        10
    }
    pub fn search_display() -> usize {
        8
    }
    pub fn random_retries() -> usize {
        3
    }
    pub fn random_extra() -> usize {
        5
    }
    pub fn description_max_chars() -> usize {
        300
    }

    // Discord defaults
    pub fn prefix() -> String {
        ".".into()
    }
    pub fn release_channel() -> u64 {
        1071812515945783397
    }
    pub fn welcome_channel() -> u64 {
        948140724816330782
    }
    pub fn embed_color() -> u32 {
        0xCC99FF
    }
    pub fn welcome_image() -> String {
        "https://media.discordapp.net/attachments/1256270163997888512/1423327225423466496/ba5d741935a6ad1ad678033a0d66ef72.jpg".into()
    }

    // Storage defaults
    pub fn seen_file() -> String {
        "seen_releases.json".into()
    }
    pub fn cache_file() -> String {
        "releases_cache.json".into()
    }

    // Keep-alive defaults
    pub fn keep_alive_enabled() -> bool {
        true
    }
    pub fn keep_alive_bind() -> String {
        "0.0.0.0:8080".into()
    }
}
