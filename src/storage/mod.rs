//! Storage for the bot's persisted state.
//!
//! Two independent JSON documents live under the storage directory:
//! - `seen_releases.json`: array of release keys already announced
//! - `releases_cache.json`: array of `{title, chapter, group, key}` objects
//!   from the last successful parse
//!
//! Both are rewritten in full on each save. There is no transactional coupling
//! between them.

pub mod cache;
pub mod local;
pub mod seen;

// Re-export for convenience
pub use cache::ReleaseCache;
pub use local::LocalStorage;
pub use seen::SeenSet;
