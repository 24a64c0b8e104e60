//! Service layer for the release bot.
//!
//! This module contains the scraping logic for:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Release listing parsing (`ReleaseParser`)
//! - Series search parsing (`SearchParser`)
//! - Letter-indexed browsing (`BrowseParser`)

mod browse;
mod fetcher;
mod releases;
mod search;

pub use browse::BrowseParser;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use releases::ReleaseParser;
pub use search::SearchParser;

use scraper::{ElementRef, Selector};

use crate::error::{AppError, Result};
use crate::utils::normalize_whitespace;

/// Compile a CSS selector, reporting the offending string on failure.
pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Each text node trimmed, then concatenated with no separator.
///
/// Inner spacing of a node is kept as-is, so formatting drift on the page stays visible.
pub(crate) fn stripped_text(element: &ElementRef) -> String {
    element.text().map(str::trim).collect()
}

/// Whether the element's class attribute contains any of the given lowercase needles.
pub(crate) fn class_contains_any(element: &ElementRef, needles: &[&str]) -> bool {
    element
        .value()
        .attr("class")
        .map(|class| {
            let class = class.to_lowercase();
            needles.iter().any(|needle| class.contains(needle))
        })
        .unwrap_or(false)
}
