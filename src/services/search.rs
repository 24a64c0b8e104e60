//! Series search parser.
//!
//! The search page has no stable row marker, so candidate rows are any `div`
//! whose class mentions `series`, `result` or `item`.

use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{ScraperConfig, SeriesHit};
use crate::services::{class_contains_any, element_text, parse_selector};
use crate::utils::{clip, resolve_url, with_query};

const ROW_CLASS_HINTS: [&str; 3] = ["series", "result", "item"];

/// Longest row text kept as extra info.
const INFO_MAX_CHARS: usize = 200;

/// Parser for the series search page.
pub struct SearchParser {
    base: Url,
    search_url: String,
    div_sel: Selector,
    anchor_sel: Selector,
    span_sel: Selector,
    max_results: usize,
}

impl SearchParser {
    pub fn new(config: &ScraperConfig, max_results: usize) -> Result<Self> {
        Ok(Self {
            base: Url::parse(&config.site_url)?,
            search_url: config.series_url(),
            div_sel: parse_selector("div[class]")?,
            anchor_sel: parse_selector("a")?,
            span_sel: parse_selector("span")?,
            max_results,
        })
    }

    /// URL of the search page for `query`, spaces encoded as `+`.
    pub fn search_url(&self, query: &str) -> String {
        with_query(&self.search_url, &[("search", query)])
    }

    /// Extract search hits from the first `max_results` candidate rows.
    pub fn parse(&self, html: &str) -> Vec<SeriesHit> {
        let document = Html::parse_document(html);

        document
            .select(&self.div_sel)
            .filter(|div| class_contains_any(div, &ROW_CLASS_HINTS))
            .take(self.max_results)
            .filter_map(|item| {
                let anchor = item.select(&self.anchor_sel).next();
                let title_elem = anchor.or_else(|| item.select(&self.span_sel).next())?;

                let title = element_text(&title_elem);
                if title.chars().count() <= 2 {
                    return None;
                }

                let link = anchor
                    .and_then(|a| a.value().attr("href"))
                    .filter(|href| !href.is_empty())
                    .map(|href| resolve_url(&self.base, href))
                    .unwrap_or_default();

                let row_text = element_text(&item);
                let info = if row_text.chars().count() > title.chars().count() {
                    clip(&row_text, INFO_MAX_CHARS)
                } else {
                    String::new()
                };

                Some(SeriesHit { title, link, info })
            })
            .collect()
    }
}
