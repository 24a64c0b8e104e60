// src/services/releases.rs

//! Release listing parser.
//!
//! Extracts release rows from the releases page. Each row is a `div` whose class
//! contains the row marker; inside it, three column `div`s (title, release,
//! group) are located by class substrings. Rows that do not fit are skipped,
//! never fatal.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{ReleaseRecord, ScraperConfig};
use crate::services::{parse_selector, stripped_text};

/// Parser for the releases listing markup.
pub struct ReleaseParser {
    row_sel: Selector,
    column_sel: Selector,
    label_sel: Selector,
}

impl ReleaseParser {
    /// Build a parser from the configured class markers.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let row_sel = parse_selector(&format!("div[class*=\"{}\"]", config.row_marker))?;
        let column_sel = parse_selector(
            &config
                .column_markers
                .iter()
                .map(|marker| format!("div[class*=\"{marker}\"]"))
                .collect::<Vec<_>>()
                .join(", "),
        )?;
        let label_sel = parse_selector("span")?;

        Ok(Self {
            row_sel,
            column_sel,
            label_sel,
        })
    }

    /// Parse every well-formed release row, in page order.
    ///
    /// Returns an empty list when nothing matched; callers decide how to degrade.
    pub fn parse(&self, html: &str) -> Vec<ReleaseRecord> {
        let document = Html::parse_document(html);

        let rows: Vec<ElementRef> = document.select(&self.row_sel).collect();
        log::info!("Found {} release rows", rows.len());

        let mut releases = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match self.parse_row(&row) {
                Some(release) => {
                    log::debug!("Parsed: {}", release.summary());
                    releases.push(release);
                }
                None => log::debug!("Skipped malformed release row #{}", index),
            }
        }
        releases
    }

    /// Extract one record, or `None` if the row lacks columns or required text.
    fn parse_row(&self, row: &ElementRef) -> Option<ReleaseRecord> {
        let columns: Vec<ElementRef> = row.select(&self.column_sel).collect();
        if columns.len() < 3 {
            return None;
        }

        // The title column wraps the series name in a label element when linked.
        let title = match columns[0].select(&self.label_sel).next() {
            Some(label) => stripped_text(&label),
            None => stripped_text(&columns[0]),
        };
        let chapter = stripped_text(&columns[1]);
        let group = stripped_text(&columns[2]);

        if title.is_empty() || chapter.is_empty() {
            return None;
        }

        Some(ReleaseRecord::new(title, chapter, group))
    }
}
