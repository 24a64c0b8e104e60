//! Pipeline entry points for release operations.
//!
//! - `ReleaseSource`: live listing with cache fallback
//! - `detect_new`: seen-set diff
//! - `ReleaseMonitor`: the recurring detection loop
//! - `run_fetch` / `run_check`: one-shot runs for the CLI

pub mod diff;
pub mod monitor;
pub mod source;

pub use diff::detect_new;
pub use monitor::{CycleReport, ReleaseMonitor};
pub use source::ReleaseSource;

use std::sync::Arc;

use crate::models::ReleaseRecord;
use crate::notify::LogNotifier;
use crate::state::AppState;

/// Fetch the listing once, falling back to the cache, and log every record.
pub async fn run_fetch(state: &AppState) -> Vec<ReleaseRecord> {
    let releases = state.source.releases().await;

    log::info!("Fetched {} releases", releases.len());
    for (index, release) in releases.iter().enumerate() {
        log::info!("    {:>3}. {}", index + 1, release.summary());
    }
    releases
}

/// Run one detection cycle, logging notifications instead of posting them.
pub async fn run_check(state: &AppState) -> CycleReport {
    let report = state.monitor(Arc::new(LogNotifier)).run_cycle().await;

    log::info!(
        "Check complete: {} listed, {} new, {} notifications",
        report.listed,
        report.new_releases,
        report.notifications
    );
    report
}
