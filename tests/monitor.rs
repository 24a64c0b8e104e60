//! End-to-end detection cycles against scripted pages.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use mu_release_bot::error::{AppError, Result};
use mu_release_bot::models::{Config, ReleaseRecord};
use mu_release_bot::notify::{Notification, Notifier};
use mu_release_bot::services::PageFetcher;
use mu_release_bot::state::AppState;
use mu_release_bot::storage::LocalStorage;

/// Serves queued responses in order; errors once the script runs out.
struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedFetcher {
    fn new(responses: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::fetch(url, "script exhausted")))
    }
}

/// Keeps every notification; optionally rejects chosen sends.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    attempts: Mutex<usize>,
    fail_on: Option<usize>,
}

impl RecordingNotifier {
    fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on: Some(attempt),
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if self.fail_on == Some(attempt) {
            return Err(AppError::validation("rejected by test notifier"));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn row(title: &str, chapter: &str, group: &str) -> String {
    format!(
        r#"<div class="row no-gutters new-release-item">
            <div class="col-6 pbreak"><a href="/series/x"><span>{title}</span></a></div>
            <div class="col-2 pbreak">{chapter}</div>
            <div class="col-4 pbreak"><a href="/group/y">{group}</a></div>
        </div>"#
    )
}

fn page(rows: &[String]) -> String {
    format!("<html><body>{}</body></html>", rows.concat())
}

fn rows(range: std::ops::Range<usize>) -> Vec<String> {
    range
        .map(|i| row(&format!("Series {i}"), &format!("c.{i}"), "Group"))
        .collect()
}

fn config() -> Config {
    let mut config = Config::default();
    config.monitor.batch_delay_ms = 0;
    config
}

async fn app_state(dir: &TempDir, fetcher: Arc<ScriptedFetcher>) -> AppState {
    AppState::with_fetcher(config(), LocalStorage::new(dir.path()), fetcher)
        .await
        .unwrap()
}

fn stored_keys(dir: &TempDir, file: &str) -> Option<Vec<String>> {
    let bytes = std::fs::read(dir.path().join(file)).ok()?;
    Some(serde_json::from_slice(&bytes).unwrap())
}

fn stored_releases(dir: &TempDir, file: &str) -> Vec<ReleaseRecord> {
    let bytes = std::fs::read(dir.path().join(file)).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn first_run_announces_everything_in_batches() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(vec![Ok(page(&rows(0..12)))]);
    let state = app_state(&dir, fetcher).await;
    let notifier = Arc::new(RecordingNotifier::default());

    let report = state.monitor(notifier.clone()).run_cycle().await;

    assert_eq!(report.listed, 12);
    assert_eq!(report.new_releases, 12);
    assert_eq!(report.notifications, 3);
    assert_eq!(report.delivered, 3);

    let sent = notifier.sent();
    let sizes: Vec<usize> = sent.iter().map(|n| n.fields.len()).collect();
    assert_eq!(sizes, vec![5, 5, 2]);
    assert_eq!(sent[0].fields[0].name, "📖 Series 0");
    assert_eq!(sent[2].fields[1].name, "📖 Series 11");

    let config = config();
    assert_eq!(state.seen.lock().await.len(), 12);
    assert_eq!(stored_keys(&dir, &config.storage.seen_file).unwrap().len(), 12);
    assert_eq!(stored_releases(&dir, &config.storage.cache_file).len(), 12);
}

#[tokio::test]
async fn unchanged_listing_posts_nothing_and_skips_seen_write() {
    let dir = TempDir::new().unwrap();
    let listing = page(&rows(0..4));
    let fetcher = ScriptedFetcher::new(vec![Ok(listing.clone()), Ok(listing)]);
    let state = app_state(&dir, fetcher).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = state.monitor(notifier.clone());

    monitor.run_cycle().await;
    let seen_file = dir.path().join(config().storage.seen_file);
    std::fs::remove_file(&seen_file).unwrap();

    let report = monitor.run_cycle().await;
    assert_eq!(report.listed, 4);
    assert_eq!(report.new_releases, 0);
    assert_eq!(report.notifications, 0);
    assert_eq!(notifier.sent().len(), 1);
    assert!(!seen_file.exists());
}

#[tokio::test]
async fn fetch_failure_falls_back_to_cache_without_announcing() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(vec![
        Ok(page(&rows(0..3))),
        Err(AppError::fetch(
            "https://www.mangaupdates.com/releases.html",
            "operation timed out",
        )),
    ]);
    let state = app_state(&dir, fetcher).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = state.monitor(notifier.clone());

    monitor.run_cycle().await;
    let report = monitor.run_cycle().await;

    assert_eq!(report.listed, 3);
    assert_eq!(report.new_releases, 0);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn restart_with_failing_fetch_serves_persisted_listing() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(vec![Ok(page(&rows(0..3)))]);
    let state = app_state(&dir, fetcher).await;
    state
        .monitor(Arc::new(RecordingNotifier::default()))
        .run_cycle()
        .await;
    drop(state);

    let failing = ScriptedFetcher::new(vec![
        Err(AppError::fetch(
            "https://www.mangaupdates.com/releases.html",
            "operation timed out",
        )),
        Err(AppError::fetch(
            "https://www.mangaupdates.com/releases.html",
            "operation timed out",
        )),
    ]);
    let state = app_state(&dir, failing).await;

    let listing = state.source.releases().await;
    let titles: Vec<&str> = listing.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Series 0", "Series 1", "Series 2"]);

    let notifier = Arc::new(RecordingNotifier::default());
    let report = state.monitor(notifier.clone()).run_cycle().await;
    assert_eq!(report.listed, 3);
    assert_eq!(report.new_releases, 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn malformed_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mut markup = rows(0..9);
    markup.insert(
        4,
        r#"<div class="new-release-item"><div class="col-6"><span>Broken</span></div></div>"#
            .to_string(),
    );
    let fetcher = ScriptedFetcher::new(vec![Ok(page(&markup))]);
    let state = app_state(&dir, fetcher).await;
    let notifier = Arc::new(RecordingNotifier::default());

    let report = state.monitor(notifier.clone()).run_cycle().await;

    assert_eq!(report.listed, 9);
    assert_eq!(report.new_releases, 9);
    assert!(
        notifier
            .sent()
            .iter()
            .flat_map(|n| n.fields.iter())
            .all(|f| !f.name.contains("Broken"))
    );
}

#[tokio::test]
async fn empty_live_and_empty_cache_yield_empty_listing() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(vec![Ok(page(&[]))]);
    let state = app_state(&dir, fetcher).await;

    assert!(state.source.releases().await.is_empty());
    assert!(!dir.path().join(config().storage.cache_file).exists());
}

#[tokio::test]
async fn empty_live_listing_keeps_previous_cache() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(vec![
        Ok(page(&rows(0..2))),
        Ok("<html><body>Just a moment...</body></html>".to_string()),
    ]);
    let state = app_state(&dir, fetcher).await;

    assert_eq!(state.source.releases().await.len(), 2);
    let fallback = state.source.releases().await;
    assert_eq!(fallback.len(), 2);
    assert_eq!(fallback[0].title, "Series 0");
    assert_eq!(
        stored_releases(&dir, &config().storage.cache_file).len(),
        2
    );
}

#[tokio::test]
async fn seen_set_only_grows_and_survives_restart() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(vec![Ok(page(&rows(0..3))), Ok(page(&rows(2..6)))]);
    let state = app_state(&dir, fetcher).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = state.monitor(notifier.clone());

    monitor.run_cycle().await;
    let first = state.seen.lock().await.len();
    let report = monitor.run_cycle().await;
    let second = state.seen.lock().await.len();

    assert_eq!(first, 3);
    assert_eq!(report.new_releases, 3);
    assert_eq!(second, 6);

    // A fresh process over the same storage sees nothing new.
    let restarted = ScriptedFetcher::new(vec![Ok(page(&rows(0..6)))]);
    let state = app_state(&dir, restarted).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let report = state.monitor(notifier.clone()).run_cycle().await;
    assert_eq!(report.new_releases, 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn failed_send_does_not_stop_remaining_batches() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(vec![Ok(page(&rows(0..11)))]);
    let state = app_state(&dir, fetcher).await;
    let notifier = Arc::new(RecordingNotifier::failing_on(2));

    let report = state.monitor(notifier.clone()).run_cycle().await;

    assert_eq!(report.notifications, 3);
    assert_eq!(report.delivered, 2);
    let sent = notifier.sent();
    assert_eq!(sent[0].fields[0].name, "📖 Series 0");
    assert_eq!(sent[1].fields[0].name, "📖 Series 10");
    // Announced keys stay seen even when their message failed.
    assert_eq!(state.seen.lock().await.len(), 11);
}
