//! Release record data structure.

use serde::{Deserialize, Serialize};

/// Group name used when a release row has no group text.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Separator between the fields that make up a release key.
pub const KEY_DELIMITER: char = '|';

/// A single release row scraped from the releases listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Series title as displayed on the page
    pub title: String,

    /// Release label (chapter, volume, ...)
    pub chapter: String,

    /// Scanlation group, `Unknown` when the page lists none
    pub group: String,

    /// Identity used for deduplication
    pub key: String,
}

impl ReleaseRecord {
    /// Build a record from the scraped column texts.
    ///
    /// The key is derived from the texts as scraped; only the displayed group
    /// falls back to `Unknown`, so an empty group keeps an empty key segment.
    pub fn new(
        title: impl Into<String>,
        chapter: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let chapter = chapter.into();
        let raw_group = group.into();

        let key = Self::make_key(&title, &chapter, &raw_group);
        let group = if raw_group.trim().is_empty() {
            UNKNOWN_GROUP.to_string()
        } else {
            raw_group
        };
        Self {
            title,
            chapter,
            group,
            key,
        }
    }

    /// Derive the identity key from the three display fields.
    ///
    /// Not a content hash: any whitespace drift on the source page yields a new key.
    pub fn make_key(title: &str, chapter: &str, group: &str) -> String {
        format!("{title}{KEY_DELIMITER}{chapter}{KEY_DELIMITER}{group}")
    }

    /// One-line summary used in logs and the diagnostic command.
    pub fn summary(&self) -> String {
        format!("{} - {} by {}", self.title, self.chapter, self.group)
    }
}
