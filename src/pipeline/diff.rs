//! New-release detection.
//!
//! Compares the current listing against the set of keys already announced.
//! Unlike a snapshot diff, nothing is ever "removed": a release drops off the
//! page but its key stays seen.

use crate::models::ReleaseRecord;
use crate::storage::SeenSet;

/// Releases from `listing` whose keys are not yet in `seen`, in listing order.
///
/// Every returned key is added to `seen` in memory; persisting is up to the caller.
pub fn detect_new(listing: &[ReleaseRecord], seen: &mut SeenSet) -> Vec<ReleaseRecord> {
    listing
        .iter()
        .filter(|release| seen.insert(release.key.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;

    fn release(title: &str) -> ReleaseRecord {
        ReleaseRecord::new(title, "c.1", "Group")
    }

    fn empty_seen() -> SeenSet {
        SeenSet::new(LocalStorage::new("unused"), "seen.json")
    }

    #[test]
    fn test_first_run_everything_is_new() {
        let mut seen = empty_seen();
        let listing = vec![release("A"), release("B"), release("C")];

        let fresh = detect_new(&listing, &mut seen);
        assert_eq!(fresh, listing);
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let mut seen = empty_seen();
        let listing = vec![release("A"), release("B")];

        detect_new(&listing, &mut seen);
        assert!(detect_new(&listing, &mut seen).is_empty());
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_only_unseen_in_page_order() {
        let mut seen = empty_seen();
        seen.insert(release("B").key);

        let listing = vec![release("C"), release("B"), release("A")];
        let fresh = detect_new(&listing, &mut seen);

        let titles: Vec<&str> = fresh.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);
    }

    #[test]
    fn test_duplicate_rows_announced_once() {
        let mut seen = empty_seen();
        let listing = vec![release("A"), release("A")];
        assert_eq!(detect_new(&listing, &mut seen).len(), 1);
    }

    #[test]
    fn test_releases_leaving_the_page_stay_seen() {
        let mut seen = empty_seen();
        detect_new(&[release("A"), release("B")], &mut seen);
        detect_new(&[release("C")], &mut seen);

        assert_eq!(seen.len(), 3);
        assert!(detect_new(&[release("A")], &mut seen).is_empty());
    }
}
