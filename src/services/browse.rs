//! Letter-indexed series browsing, used for random picks.

use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{ScraperConfig, SeriesLink};
use crate::services::{class_contains_any, element_text, parse_selector};
use crate::utils::{excerpt, resolve_url, with_query};

/// Parser for the browse listing and series detail pages.
pub struct BrowseParser {
    base: Url,
    series_url: String,
    series_type: String,
    link_sel: Selector,
    div_sel: Selector,
}

impl BrowseParser {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            base: Url::parse(&config.site_url)?,
            series_url: config.series_url(),
            series_type: config.browse_type.clone(),
            link_sel: parse_selector("a[href*=\"/series.html?id=\"]")?,
            div_sel: parse_selector("div[class]")?,
        })
    }

    /// Browse page listing series starting with `letter`.
    pub fn letter_url(&self, letter: char) -> String {
        with_query(
            &self.series_url,
            &[
                ("letter", letter.to_string().as_str()),
                ("type", self.series_type.as_str()),
            ],
        )
    }

    /// Browse page for the series type without a letter filter.
    pub fn type_url(&self) -> String {
        with_query(&self.series_url, &[("type", self.series_type.as_str())])
    }

    /// Collect series links from a browse page.
    pub fn parse_listing(&self, html: &str) -> Vec<SeriesLink> {
        let document = Html::parse_document(html);

        document
            .select(&self.link_sel)
            .filter_map(|link| {
                let title = element_text(&link);
                if title.chars().count() <= 2 {
                    return None;
                }
                let href = link.value().attr("href").unwrap_or("");
                Some(SeriesLink {
                    title,
                    url: resolve_url(&self.base, href),
                })
            })
            .collect()
    }

    /// First description block of a series detail page, cut to `max_chars`.
    pub fn parse_description(&self, html: &str, max_chars: usize) -> Option<String> {
        let document = Html::parse_document(html);

        document
            .select(&self.div_sel)
            .find(|div| class_contains_any(div, &["description"]))
            .map(|div| excerpt(&element_text(&div), max_chars))
            .filter(|text| !text.is_empty())
    }
}
