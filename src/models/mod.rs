// src/models/mod.rs

//! Domain models for the release bot.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod release;
mod series;

// Re-export all public types
pub use config::{
    Config, DiscordConfig, KeepAliveConfig, ListingConfig, MonitorConfig, ScraperConfig,
    StorageConfig,
};
pub use release::{KEY_DELIMITER, ReleaseRecord, UNKNOWN_GROUP};
pub use series::{SeriesHit, SeriesLink};
