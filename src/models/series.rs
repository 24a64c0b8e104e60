//! Series entries returned by the search and browse pages.

use serde::{Deserialize, Serialize};

/// A search result row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesHit {
    /// Display title
    pub title: String,

    /// Absolute link to the series page (empty when the row had no anchor)
    pub link: String,

    /// Surrounding row text, empty when it adds nothing over the title
    pub info: String,
}

/// A series link picked up from the letter-indexed browse page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesLink {
    /// Display title
    pub title: String,

    /// Absolute link to the series page
    pub url: String,
}
