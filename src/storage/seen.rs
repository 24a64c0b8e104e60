//! Set of release keys that have already been announced.

use std::collections::HashSet;

use crate::error::Result;
use crate::storage::LocalStorage;

/// Durable, grow-only set of announced release keys.
///
/// Keys are never pruned; the set grows for the lifetime of the deployment.
#[derive(Debug)]
pub struct SeenSet {
    storage: LocalStorage,
    file: String,
    keys: HashSet<String>,
}

impl SeenSet {
    /// Empty set that will persist to `file` under `storage`.
    pub fn new(storage: LocalStorage, file: impl Into<String>) -> Self {
        Self {
            storage,
            file: file.into(),
            keys: HashSet::new(),
        }
    }

    /// Load the key set from disk, starting empty when the file is missing.
    ///
    /// An unreadable file is copied to `{file}.bak`, logged, and treated as empty,
    /// which re-announces the current listing.
    pub async fn load(storage: LocalStorage, file: impl Into<String>) -> Self {
        let file = file.into();
        let keys = match storage.read_json::<Vec<String>>(&file).await {
            Ok(Some(keys)) => {
                log::info!("Loaded {} seen release keys from {}", keys.len(), file);
                keys.into_iter().collect()
            }
            Ok(None) => HashSet::new(),
            Err(e) => {
                match storage.backup(&file).await {
                    Ok(backup) => log::error!(
                        "Failed to read seen set {}: {}. Kept a copy at {}. Starting empty.",
                        file,
                        e,
                        backup.display()
                    ),
                    Err(backup_err) => log::error!(
                        "Failed to read seen set {}: {}. Backup also failed: {}. Starting empty.",
                        file,
                        e,
                        backup_err
                    ),
                }
                HashSet::new()
            }
        };

        Self {
            storage,
            file,
            keys,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Add a key in memory. Returns `true` if it was not present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// Write the full set to disk.
    pub async fn persist(&self) -> Result<()> {
        // Sorted so successive files diff cleanly; order carries no meaning.
        let mut keys: Vec<&String> = self.keys.iter().collect();
        keys.sort();
        self.storage.write_json(&self.file, &keys).await
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_contains() {
        let tmp = TempDir::new().unwrap();
        let mut seen = SeenSet::load(LocalStorage::new(tmp.path()), "seen.json").await;

        assert!(seen.is_empty());
        assert!(seen.insert("a|c.1|g"));
        assert!(!seen.insert("a|c.1|g"));
        assert!(seen.contains("a|c.1|g"));
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn test_persist_round_trips() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let mut seen = SeenSet::load(storage.clone(), "seen.json").await;
        seen.insert("b");
        seen.insert("a");
        seen.persist().await.unwrap();

        let raw: Vec<String> = storage.read_json("seen.json").await.unwrap().unwrap();
        assert_eq!(raw, vec!["a", "b"]);

        let reloaded = SeenSet::load(storage, "seen.json").await;
        assert!(reloaded.contains("a"));
        assert!(reloaded.contains("b"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_backed_up_before_overwrite() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.write_bytes("seen.json", b"[\"a|c.1|g\",").await.unwrap();

        let mut seen = SeenSet::load(storage.clone(), "seen.json").await;
        assert!(seen.is_empty());

        seen.insert("b|c.2|g");
        seen.persist().await.unwrap();

        let backup = storage.read_bytes("seen.json.bak").await.unwrap().unwrap();
        assert_eq!(backup, b"[\"a|c.1|g\",");
    }

    #[tokio::test]
    async fn test_duplicate_entries_in_file_collapse() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage
            .write_json("seen.json", &vec!["x", "x", "y"])
            .await
            .unwrap();

        let seen = SeenSet::load(storage, "seen.json").await;
        assert_eq!(seen.len(), 2);
    }
}
