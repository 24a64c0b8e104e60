//! Rendering of releases and series lookups into notifications.

use chrono::{DateTime, Utc};

use crate::models::{Config, ReleaseRecord, SeriesHit, SeriesLink};
use crate::notify::Notification;
use crate::utils::{clip, truncate};

/// Platform cap on a field value.
const FIELD_VALUE_MAX: usize = 1024;

/// Platform cap on a title.
const TITLE_MAX: usize = 256;

/// Platform cap on the combined text of one message.
const EMBED_TEXT_MAX: usize = 6000;

const DEFAULT_SERIES_DESCRIPTION: &str = "Click the title to read more on MangaUpdates!";

/// Shared presentation settings.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub color: u32,
    pub title_max_chars: usize,
}

impl RenderStyle {
    pub fn from_config(config: &Config) -> Self {
        Self {
            color: config.discord.embed_color,
            title_max_chars: config.listing.title_max_chars,
        }
    }

    fn release_name(&self, title: &str) -> String {
        format!("📖 {}", truncate(title, self.title_max_chars))
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Render one monitor batch of new releases.
pub fn render_batch(records: &[ReleaseRecord], now: DateTime<Utc>, style: &RenderStyle) -> Notification {
    records.iter().fold(
        Notification::new("🆕 New Manga/Manhwa Releases", style.color)
            .description("Fresh updates from MangaUpdates!")
            .timestamp(now)
            .footer("MangaUpdates Release Monitor"),
        |notification, release| {
            notification.field(
                style.release_name(&release.title),
                clip(
                    &format!(
                        "**Release:** {}\n**Group:** {}",
                        release.chapter, release.group
                    ),
                    FIELD_VALUE_MAX,
                ),
            )
        },
    )
}

/// Split new releases into batches of at most `batch_size`, preserving order.
pub fn render_batches(
    records: &[ReleaseRecord],
    batch_size: usize,
    now: DateTime<Utc>,
    style: &RenderStyle,
) -> Vec<Notification> {
    records
        .chunks(batch_size.max(1))
        .map(|batch| render_batch(batch, now, style))
        .collect()
}

/// Render the full listing as pages of `page_size`.
pub fn render_listing(
    records: &[ReleaseRecord],
    page_size: usize,
    releases_url: &str,
    now: DateTime<Utc>,
    style: &RenderStyle,
) -> Vec<Notification> {
    let total = records.len();
    let page_size = page_size.max(1);

    records
        .chunks(page_size)
        .enumerate()
        .map(|(page, chunk)| {
            let first = page * page_size + 1;
            let last = (page * page_size + chunk.len()).min(total);

            let header = Notification::new("📚 MangaUpdates Releases", style.color)
                .url(releases_url)
                .description(format!("Showing {first}-{last} of {total} total releases"))
                .timestamp(now)
                .footer("Live data from MangaUpdates");

            let names: Vec<String> = chunk
                .iter()
                .map(|release| style.release_name(&release.title))
                .collect();

            // Values share whatever the header and names leave of the message cap.
            let fixed = header.text_len()
                + names.iter().map(|n| n.chars().count()).sum::<usize>();
            let value_max = (EMBED_TEXT_MAX.saturating_sub(fixed) / chunk.len().max(1))
                .min(FIELD_VALUE_MAX);

            chunk
                .iter()
                .zip(names)
                .fold(header, |notification, (release, name)| {
                    notification.field(
                        name,
                        clip(
                            &format!(
                                "**Release:** {}\n**Groups:** {}",
                                release.chapter, release.group
                            ),
                            value_max,
                        ),
                    )
                })
        })
        .collect()
}

/// Render search hits, or a "go look yourself" message when there are none.
pub fn render_search(
    query: &str,
    search_url: &str,
    hits: &[SeriesHit],
    display: usize,
    style: &RenderStyle,
) -> Notification {
    let title = clip(&format!("🔎 Search Results for '{query}'"), TITLE_MAX);

    if hits.is_empty() {
        return Notification::new(title, style.color)
            .url(search_url)
            .description(
                "No results found. Click the link above to search directly on MangaUpdates.",
            );
    }

    hits.iter().take(display).fold(
        Notification::new(title, style.color)
            .url(search_url)
            .description(format!("Found {} results", hits.len()))
            .footer("Click the title link above to see all results"),
        |notification, hit| {
            let link = if hit.link.is_empty() {
                "No link available"
            } else {
                hit.link.as_str()
            };
            let value = if hit.info.is_empty() {
                link.to_string()
            } else {
                format!("{link}\n{}", hit.info)
            };
            notification.field(
                format!("📚 {}", clip(&hit.title, 100)),
                clip(&value, FIELD_VALUE_MAX),
            )
        },
    )
}

/// Degraded reply when the search itself failed.
pub fn render_search_fallback(query: &str, search_url: &str, style: &RenderStyle) -> Notification {
    Notification::new(clip(&format!("🔎 Search for '{query}'"), TITLE_MAX), style.color)
        .url(search_url)
        .description("Click the link above to view results directly on MangaUpdates.")
}

/// Render a random pick with optional extra suggestions.
pub fn render_random(
    pick: &SeriesLink,
    description: Option<&str>,
    extras: &[SeriesLink],
    style: &RenderStyle,
) -> Notification {
    let mut notification = Notification::new(
        clip(&format!("🎲 Random Manhwa: {}", pick.title), TITLE_MAX),
        style.color,
    )
    .url(&pick.url)
    .description(description.unwrap_or(DEFAULT_SERIES_DESCRIPTION))
    .footer("🇰🇷 Random Manhwa from MangaUpdates");

    if !extras.is_empty() {
        let list = extras
            .iter()
            .map(|series| format!("• [{}]({})", series.title, series.url))
            .collect::<Vec<_>>()
            .join("\n");
        notification = notification.field("🎯 More Random Manhwa:", clip(&list, FIELD_VALUE_MAX));
    }

    notification
}

/// Degraded reply when no random series could be found.
pub fn render_random_fallback(browse_url: &str, style: &RenderStyle) -> Notification {
    Notification::new("🎲 Random Manhwa", style.color)
        .url(browse_url)
        .description("Click the link above to browse all Manhwa on MangaUpdates!")
}

/// Welcome message for a new member, `mention` being the platform mention string.
pub fn render_welcome(mention: &str, image_url: &str, style: &RenderStyle) -> Notification {
    let mut notification = Notification::new("🎉 Welcome to Manhwa 만화!", style.color).description(
        format!(
            "{mention}, we're thrilled to have you here!\n\n\
             🌸 Dive into the world of Manhwa and connect with fellow fans.\n\
             📚 Be sure to check out the rules and channel guide.\n\
             🎭 Head over to the other channels and choose what role colors you'd like!\n\
             💬 Say hi and let us know your favorite manhwa!"
        ),
    );
    if !image_url.is_empty() {
        notification = notification.image(image_url);
    }
    notification
}

/// Plain-text summary for the diagnostic fetch command.
pub fn render_fetch_summary(records: &[ReleaseRecord]) -> String {
    match records.first() {
        Some(first) => format!(
            "✅ Successfully fetched {} releases!\n**First release:** {}",
            records.len(),
            first.summary()
        ),
        None => "❌ Fetch returned no results. Check logs for details.".to_string(),
    }
}
