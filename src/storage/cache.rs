//! Last-known-good release listing.

use crate::error::Result;
use crate::models::ReleaseRecord;
use crate::storage::LocalStorage;

/// Durable snapshot of the most recent successful parse.
///
/// Overwritten in full on every save; never merged.
#[derive(Debug)]
pub struct ReleaseCache {
    storage: LocalStorage,
    file: String,
    current: Vec<ReleaseRecord>,
}

impl ReleaseCache {
    /// Load the snapshot from disk, starting empty when the file is missing.
    ///
    /// An unreadable file is copied to `{file}.bak` and treated as empty so the bot can still start.
    pub async fn load(storage: LocalStorage, file: impl Into<String>) -> Self {
        let file = file.into();
        let current = match storage.read_json::<Vec<ReleaseRecord>>(&file).await {
            Ok(Some(releases)) => {
                log::info!("Loaded {} cached releases from {}", releases.len(), file);
                releases
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                match storage.backup(&file).await {
                    Ok(backup) => log::error!(
                        "Failed to read release cache {}: {}. Kept a copy at {}. Starting empty.",
                        file,
                        e,
                        backup.display()
                    ),
                    Err(backup_err) => log::error!(
                        "Failed to read release cache {}: {}. Backup also failed: {}",
                        file,
                        e,
                        backup_err
                    ),
                }
                Vec::new()
            }
        };

        Self {
            storage,
            file,
            current,
        }
    }

    /// Replace the snapshot in memory and on disk.
    ///
    /// The in-memory copy is updated even if the write fails.
    pub async fn save(&mut self, releases: &[ReleaseRecord]) -> Result<()> {
        self.current = releases.to_vec();
        self.storage.write_json(&self.file, releases).await
    }

    /// Current snapshot, possibly from a previous run.
    pub fn current(&self) -> &[ReleaseRecord] {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
