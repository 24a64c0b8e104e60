//! Recurring new-release monitor.
//!
//! One cycle: listing (with cache fallback) → diff against the seen set →
//! persist the seen set → batched, paced notifications. Cycles repeat on a
//! fixed interval until the process exits.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::MonitorConfig;
use crate::notify::{Notifier, RenderStyle, dispatch_paced, render::render_batches};
use crate::pipeline::{ReleaseSource, detect_new};
use crate::storage::SeenSet;

/// Summary of one detection cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Releases in the listing used for the cycle
    pub listed: usize,
    /// Releases not seen before
    pub new_releases: usize,
    /// Notifications rendered
    pub notifications: usize,
    /// Notifications accepted by the notifier
    pub delivered: usize,
}

/// Ties the release source, the seen set and a notifier together.
pub struct ReleaseMonitor {
    source: Arc<ReleaseSource>,
    seen: Arc<Mutex<SeenSet>>,
    notifier: Arc<dyn Notifier>,
    settings: MonitorConfig,
    style: RenderStyle,
}

impl ReleaseMonitor {
    pub fn new(
        source: Arc<ReleaseSource>,
        seen: Arc<Mutex<SeenSet>>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorConfig,
        style: RenderStyle,
    ) -> Self {
        Self {
            source,
            seen,
            notifier,
            settings,
            style,
        }
    }

    /// Run a single detection cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let releases = self.source.releases().await;

        // Check, add and persist under one lock so concurrent cycles cannot
        // announce the same key twice.
        let new_releases = {
            let mut seen = self.seen.lock().await;
            let new_releases = detect_new(&releases, &mut seen);
            if !new_releases.is_empty() {
                if let Err(e) = seen.persist().await {
                    log::error!("Failed to persist seen releases: {}", e);
                }
            }
            new_releases
        };

        let mut report = CycleReport {
            listed: releases.len(),
            new_releases: new_releases.len(),
            ..CycleReport::default()
        };

        if new_releases.is_empty() {
            log::info!("No new releases found this check");
            return report;
        }

        log::info!("Found {} new releases", new_releases.len());

        let notifications =
            render_batches(&new_releases, self.settings.batch_size, Utc::now(), &self.style);
        report.notifications = notifications.len();
        report.delivered = dispatch_paced(
            self.notifier.as_ref(),
            &notifications,
            self.settings.batch_delay(),
        )
        .await;

        log::info!(
            "Posted {}/{} release notifications",
            report.delivered,
            report.notifications
        );
        report
    }

    /// Run cycles forever, sleeping the configured interval after each one.
    pub async fn run(self) {
        log::info!(
            "Starting release monitor (every {}s)",
            self.settings.interval_secs
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.settings.interval()).await;
        }
    }
}
