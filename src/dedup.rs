//! The reconcile step: merge freshly extracted records into a source's
//! history, keeping only records whose fingerprint has never been seen.
//!
//! Reconciliation is append-only. A stored record is never rewritten,
//! re-dated, or re-ordered; a fresh record whose fingerprint is already
//! known is dropped on the floor. A changed title at the same link hashes
//! to a new fingerprint and therefore coexists with the old entry in
//! history, mirroring the upstream pages where corrections are
//! republished rather than edited in place.

use crate::models::{SourceState, UpdateRecord};

/// Merge `fresh` into `state`, returning the updated state and the
/// records that were genuinely new.
///
/// New records are prepended to the history as a batch, preserving the
/// order they were presented in; duplicates within the batch collapse to
/// the first occurrence. After the call, `state.records` has grown by
/// exactly `new_records.len()` and `state.known_fingerprints` matches
/// the fingerprints in `state.records`.
pub fn reconcile(
    mut state: SourceState,
    fresh: Vec<UpdateRecord>,
) -> (SourceState, Vec<UpdateRecord>) {
    let mut new_records: Vec<UpdateRecord> = Vec::new();

    for record in fresh {
        if state.known_fingerprints.contains(&record.fingerprint) {
            continue;
        }
        state.known_fingerprints.insert(record.fingerprint.clone());
        new_records.push(record);
    }

    // Prepend the batch so history stays newest-observed-first.
    let mut records = Vec::with_capacity(new_records.len() + state.records.len());
    records.extend(new_records.iter().cloned());
    records.append(&mut state.records);
    state.records = records;

    (state, new_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use chrono::NaiveDate;

    fn record(title: &str, link: &str) -> UpdateRecord {
        UpdateRecord {
            title: title.to_string(),
            link: link.to_string(),
            published_date: None,
            scraped_date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            fingerprint: fingerprint(title, link),
        }
    }

    fn empty_state() -> SourceState {
        SourceState::empty("https://x.org", "X")
    }

    #[test]
    fn test_first_run_keeps_everything() {
        let fresh = vec![record("New Framework", "https://x.org/a")];
        let (state, new_records) = reconcile(empty_state(), fresh);
        assert_eq!(new_records.len(), 1);
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].title, "New Framework");
    }

    #[test]
    fn test_repeat_run_yields_nothing_new() {
        let fresh = vec![record("New Framework", "https://x.org/a")];
        let (state, first) = reconcile(empty_state(), fresh.clone());
        assert_eq!(first.len(), 1);

        let (state, second) = reconcile(state, fresh);
        assert!(second.is_empty());
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_length_grows_by_exactly_new_count() {
        let (state, _) = reconcile(
            empty_state(),
            vec![record("a", "https://x.org/a"), record("b", "https://x.org/b")],
        );
        let before = state.records.len();

        let fresh = vec![
            record("b", "https://x.org/b"),
            record("c", "https://x.org/c"),
            record("d", "https://x.org/d"),
        ];
        let (state, new_records) = reconcile(state, fresh);
        assert_eq!(state.records.len(), before + new_records.len());
        assert_eq!(new_records.len(), 2);
    }

    #[test]
    fn test_duplicates_within_batch_collapse_to_first() {
        let fresh = vec![
            record("a", "https://x.org/a"),
            record("a", "https://x.org/a"),
            record("b", "https://x.org/b"),
        ];
        let (state, new_records) = reconcile(empty_state(), fresh);
        assert_eq!(new_records.len(), 2);
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn test_new_records_preserve_presentation_order() {
        let fresh = vec![
            record("c", "https://x.org/c"),
            record("a", "https://x.org/a"),
            record("b", "https://x.org/b"),
        ];
        let (state, new_records) = reconcile(empty_state(), fresh);
        let titles: Vec<&str> = new_records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
        // History leads with the same batch order.
        let head: Vec<&str> = state.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(head, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_new_batch_is_prepended_to_history() {
        let (state, _) = reconcile(empty_state(), vec![record("old", "https://x.org/old")]);
        let (state, _) = reconcile(state, vec![record("new", "https://x.org/new")]);
        assert_eq!(state.records[0].title, "new");
        assert_eq!(state.records[1].title, "old");
    }

    #[test]
    fn test_stored_records_are_never_touched() {
        let (state, _) = reconcile(empty_state(), vec![record("a", "https://x.org/a")]);
        let original = state.records[0].clone();

        // Same fingerprint, different scraped_date: must be discarded,
        // not used to update the stored record.
        let mut resent = record("a", "https://x.org/a");
        resent.scraped_date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let (state, new_records) = reconcile(state, vec![resent]);

        assert!(new_records.is_empty());
        assert_eq!(state.records[0], original);
    }

    #[test]
    fn test_fingerprint_index_matches_records() {
        let fresh = vec![
            record("a", "https://x.org/a"),
            record("b", "https://x.org/b"),
            record("a", "https://x.org/a"),
        ];
        let (state, _) = reconcile(empty_state(), fresh);
        let from_records: std::collections::HashSet<String> = state
            .records
            .iter()
            .map(|r| r.fingerprint.clone())
            .collect();
        assert_eq!(state.known_fingerprints, from_records);
    }

    #[test]
    fn test_changed_title_at_same_link_is_a_new_record() {
        let (state, _) = reconcile(empty_state(), vec![record("Draft", "https://x.org/a")]);
        let (state, new_records) = reconcile(state, vec![record("Final", "https://x.org/a")]);
        assert_eq!(new_records.len(), 1);
        assert_eq!(state.records.len(), 2, "old entry remains alongside the new one");
    }
}
