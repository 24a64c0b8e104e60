//! Prefix commands.
//!
//! Every command answers in the invoking channel on every path: live data,
//! cached data, or a link to the site.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::seq::IndexedRandom;
use serenity::all::{Context, Message};

use crate::discord::ChannelNotifier;
use crate::error::Result;
use crate::models::SeriesLink;
use crate::notify::{Notifier, dispatch_paced};
use crate::notify::render::{
    render_fetch_summary, render_listing, render_random, render_random_fallback, render_search,
    render_search_fallback,
};
use crate::services::{BrowseParser, PageFetcher};
use crate::state::AppState;

/// Letters the first random browse attempt draws from.
const FIRST_LETTERS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0',
];

/// Letters used for retries; the numeric bucket is skipped.
const RETRY_LETTERS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// A recognised prefix command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every release currently listed
    LatestRelease,
    /// Search series by text; the query may be empty
    Lookup(String),
    /// Suggest a random series
    RandomSeries,
    /// Admin-only scrape diagnostic
    TestFetch,
}

impl Command {
    /// Parse `content` as a command under `prefix`.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.trim_start().strip_prefix(prefix)?;
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "latestrelease" => Some(Self::LatestRelease),
            "lookup" => Some(Self::Lookup(args.to_string())),
            "randomseries" => Some(Self::RandomSeries),
            "testfetch" => Some(Self::TestFetch),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LatestRelease => "latestrelease",
            Self::Lookup(_) => "lookup",
            Self::RandomSeries => "randomseries",
            Self::TestFetch => "testfetch",
        }
    }
}

/// Run `command` in response to `msg`.
pub async fn execute(
    ctx: &Context,
    msg: &Message,
    state: &AppState,
    command: Command,
) -> Result<()> {
    log::info!("{} triggered by {}", command.name(), msg.author.name);

    match command {
        Command::LatestRelease => latest_release(ctx, msg, state).await,
        Command::Lookup(query) => lookup(ctx, msg, state, &query).await,
        Command::RandomSeries => random_series(ctx, msg, state).await,
        Command::TestFetch => test_fetch(ctx, msg, state).await,
    }
}

/// Delete a "working" placeholder; failure only costs a stray message.
async fn remove_placeholder(ctx: &Context, placeholder: Message) {
    if let Err(e) = placeholder.delete(ctx).await {
        log::warn!("Failed to delete placeholder message: {}", e);
    }
}

async fn latest_release(ctx: &Context, msg: &Message, state: &AppState) -> Result<()> {
    let placeholder = msg
        .channel_id
        .say(&ctx.http, "🔍 Fetching all releases from MangaUpdates...")
        .await?;

    let releases = state.source.releases().await;
    remove_placeholder(ctx, placeholder).await;

    if releases.is_empty() {
        msg.channel_id
            .say(
                &ctx.http,
                "📢 No release data available. Please try again in a moment!",
            )
            .await?;
        return Ok(());
    }

    let pages = render_listing(
        &releases,
        state.config.listing.page_size,
        state.source.url(),
        Utc::now(),
        &state.style,
    );
    let notifier = ChannelNotifier::new(Arc::clone(&ctx.http), msg.channel_id);
    dispatch_paced(&notifier, &pages, state.config.listing.page_delay()).await;

    Ok(())
}

async fn lookup(ctx: &Context, msg: &Message, state: &AppState, query: &str) -> Result<()> {
    if query.is_empty() {
        msg.channel_id
            .say(
                &ctx.http,
                format!("Usage: `{}lookup <series name>`", state.config.discord.prefix),
            )
            .await?;
        return Ok(());
    }

    let placeholder = msg
        .channel_id
        .say(
            &ctx.http,
            format!("🔍 Searching for '{query}' on MangaUpdates..."),
        )
        .await?;

    let search_url = state.search.search_url(query);
    let notification = match state
        .fetcher
        .fetch(&search_url, state.config.scraper.search_timeout())
        .await
    {
        Ok(html) => {
            let hits = state.search.parse(&html);
            log::info!("Lookup '{}' found {} results", query, hits.len());
            render_search(
                query,
                &search_url,
                &hits,
                state.config.listing.search_display,
                &state.style,
            )
        }
        Err(e) => {
            log::error!("Error in lookup: {}", e);
            render_search_fallback(query, &search_url, &state.style)
        }
    };

    remove_placeholder(ctx, placeholder).await;
    ChannelNotifier::new(Arc::clone(&ctx.http), msg.channel_id)
        .send(&notification)
        .await
}

async fn random_series(ctx: &Context, msg: &Message, state: &AppState) -> Result<()> {
    let placeholder = msg
        .channel_id
        .say(&ctx.http, "🎲 Finding a random Manhwa for you...")
        .await?;

    let listing = browse_random_listing(
        state.fetcher.as_ref(),
        &state.browse,
        state.config.scraper.search_timeout(),
        state.config.listing.random_retries,
    )
    .await;

    let notification = match pick_random(&listing, state.config.listing.random_extra) {
        Some((pick, extras)) => {
            let description = match state
                .fetcher
                .fetch(&pick.url, state.config.scraper.detail_timeout())
                .await
            {
                Ok(html) => state
                    .browse
                    .parse_description(&html, state.config.listing.description_max_chars),
                Err(e) => {
                    log::warn!("Failed to fetch details for {}: {}", pick.url, e);
                    None
                }
            };
            render_random(&pick, description.as_deref(), &extras, &state.style)
        }
        None => render_random_fallback(&state.browse.type_url(), &state.style),
    };

    remove_placeholder(ctx, placeholder).await;
    ChannelNotifier::new(Arc::clone(&ctx.http), msg.channel_id)
        .send(&notification)
        .await
}

/// Browse random letters until one yields series.
///
/// One first attempt over `A..Z` and `0`, then up to `retries` more over `A..Z`.
async fn browse_random_listing(
    fetcher: &dyn PageFetcher,
    browse: &BrowseParser,
    timeout: Duration,
    retries: usize,
) -> Vec<SeriesLink> {
    for attempt in 0..=retries {
        let letter = random_letter(if attempt == 0 {
            FIRST_LETTERS
        } else {
            RETRY_LETTERS
        });
        let url = browse.letter_url(letter);

        match fetcher.fetch(&url, timeout).await {
            Ok(html) => {
                let listing = browse.parse_listing(&html);
                log::debug!("Letter {} listed {} series", letter, listing.len());
                if !listing.is_empty() {
                    return listing;
                }
            }
            Err(e) => log::warn!("Random browse for letter {} failed: {}", letter, e),
        }
    }
    Vec::new()
}

fn random_letter(letters: &[char]) -> char {
    letters.choose(&mut rand::rng()).copied().unwrap_or('A')
}

/// Pick one series plus a sample of suggestions (only when there is more than one).
fn pick_random(listing: &[SeriesLink], extra: usize) -> Option<(SeriesLink, Vec<SeriesLink>)> {
    let mut rng = rand::rng();
    let pick = listing.choose(&mut rng)?.clone();
    let extras = if listing.len() > 1 {
        listing
            .choose_multiple(&mut rng, extra.min(listing.len()))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };
    Some((pick, extras))
}

async fn test_fetch(ctx: &Context, msg: &Message, state: &AppState) -> Result<()> {
    if !is_admin(ctx, msg, &state.config.discord.admin_user_ids).await {
        msg.channel_id
            .say(&ctx.http, "⛔ This command is for administrators only.")
            .await?;
        return Ok(());
    }

    msg.channel_id
        .say(&ctx.http, "🧪 Testing fetch function...")
        .await?;
    let releases = state.source.releases().await;
    msg.channel_id
        .say(&ctx.http, render_fetch_summary(&releases))
        .await?;
    Ok(())
}

/// Configured admin, or a guild member holding the administrator permission.
async fn is_admin(ctx: &Context, msg: &Message, admin_user_ids: &[u64]) -> bool {
    if admin_user_ids.contains(&msg.author.id.get()) {
        return true;
    }

    let Some(guild_id) = msg.guild_id else {
        return false;
    };

    let member = match guild_id.member(ctx, msg.author.id).await {
        Ok(member) => member,
        Err(e) => {
            log::warn!("Failed to fetch member {}: {}", msg.author.id, e);
            return false;
        }
    };

    ctx.cache
        .guild(guild_id)
        .map(|guild| guild.member_permissions(&member).administrator())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::ScraperConfig;
    use std::sync::Mutex;

    /// Serves the same page to every request and records the URLs asked for.
    struct FixedFetcher {
        page: Option<String>,
        urls: Mutex<Vec<String>>,
    }

    impl FixedFetcher {
        fn new(page: Option<&str>) -> Self {
            Self {
                page: page.map(str::to_string),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher for FixedFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
            self.urls.lock().unwrap().push(url.to_string());
            self.page
                .clone()
                .ok_or_else(|| AppError::fetch(url, "connection refused"))
        }
    }

    fn browse() -> BrowseParser {
        BrowseParser::new(&ScraperConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_random_browse_retries_after_empty_listings() {
        let fetcher = FixedFetcher::new(Some("<html><body>nothing here</body></html>"));
        let listing = browse_random_listing(&fetcher, &browse(), Duration::from_secs(1), 3).await;

        assert!(listing.is_empty());
        let urls = fetcher.urls();
        assert_eq!(urls.len(), 4);
        assert!(urls[1..].iter().all(|url| !url.contains("letter=0")));
    }

    #[tokio::test]
    async fn test_random_browse_retries_after_errors() {
        let fetcher = FixedFetcher::new(None);
        let listing = browse_random_listing(&fetcher, &browse(), Duration::from_secs(1), 3).await;
        assert!(listing.is_empty());
        assert_eq!(fetcher.urls().len(), 4);
    }

    #[tokio::test]
    async fn test_random_browse_stops_on_first_listing() {
        let fetcher = FixedFetcher::new(Some(r#"<a href="/series.html?id=7">Bastard</a>"#));
        let listing = browse_random_listing(&fetcher, &browse(), Duration::from_secs(1), 3).await;

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].title, "Bastard");
        assert_eq!(fetcher.urls().len(), 1);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(".", ".latestrelease"), Some(Command::LatestRelease));
        assert_eq!(Command::parse(".", ".randomseries"), Some(Command::RandomSeries));
        assert_eq!(Command::parse(".", ".testfetch"), Some(Command::TestFetch));
        assert_eq!(
            Command::parse(".", ".lookup  solo leveling "),
            Some(Command::Lookup("solo leveling".to_string()))
        );
    }

    #[test]
    fn test_parse_lookup_without_query() {
        assert_eq!(
            Command::parse(".", ".lookup"),
            Some(Command::Lookup(String::new()))
        );
    }

    #[test]
    fn test_parse_ignores_other_messages() {
        assert_eq!(Command::parse(".", "hello there"), None);
        assert_eq!(Command::parse(".", ".unknown"), None);
        assert_eq!(Command::parse("!", ".latestrelease"), None);
    }

    #[test]
    fn test_parse_is_case_insensitive_on_name() {
        assert_eq!(Command::parse(".", ".LatestRelease"), Some(Command::LatestRelease));
    }

    #[test]
    fn test_pick_random_single_has_no_extras() {
        let listing = vec![SeriesLink {
            title: "Only One".into(),
            url: "https://x/1".into(),
        }];
        let (pick, extras) = pick_random(&listing, 5).unwrap();
        assert_eq!(pick.title, "Only One");
        assert!(extras.is_empty());
    }

    #[test]
    fn test_pick_random_caps_extras() {
        let listing: Vec<SeriesLink> = (0..8)
            .map(|i| SeriesLink {
                title: format!("Series {i}"),
                url: format!("https://x/{i}"),
            })
            .collect();
        let (_, extras) = pick_random(&listing, 5).unwrap();
        assert_eq!(extras.len(), 5);
        assert!(pick_random(&[], 5).is_none());
    }

    #[test]
    fn test_random_letter_from_set() {
        assert!(RETRY_LETTERS.contains(&random_letter(RETRY_LETTERS)));
        assert_eq!(random_letter(&[]), 'A');
    }
}
