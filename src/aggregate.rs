//! Keyed union of issue sets coming from different Jira queries.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Record together with the labels of every source set it appeared in.
pub struct Sourced<T> {
    pub record: T,
    pub sources: Vec<&'static str>,
}

impl<T> Sourced<T> {
    pub fn has_source(&self, label: &str) -> bool {
        self.sources.iter().any(|s| *s == label)
    }
}

/// Union labeled record sets into one list ordered by key.
///
/// Sets are given in priority order: the first set a key appears in provides
/// the record's field values, later sets only add their label. A key repeated
/// within a single set is collapsed.
pub fn union_keyed<T, K, F>(sets: Vec<(&'static str, Vec<T>)>, key_of: F) -> Vec<Sourced<T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut merged: BTreeMap<K, Sourced<T>> = BTreeMap::new();

    for (label, records) in sets {
        for record in records {
            match merged.entry(key_of(&record)) {
                Entry::Vacant(slot) => {
                    slot.insert(Sourced {
                        record,
                        sources: vec![label],
                    });
                }
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    if !entry.sources.contains(&label) {
                        entry.sources.push(label);
                    }
                }
            }
        }
    }

    merged.into_values().collect()
}

/// Requested keys absent from the received set, sorted and deduplicated.
pub fn missing_keys(requested: &[String], received: &[String]) -> Vec<String> {
    let received: BTreeSet<&str> = received.iter().map(String::as_str).collect();

    requested
        .iter()
        .filter(|key| !received.contains(key.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Rec {
        id: i64,
        summary: &'static str,
    }

    fn rec(id: i64, summary: &'static str) -> Rec {
        Rec { id, summary }
    }

    #[test]
    fn union_prefers_the_first_source() {
        let merged = union_keyed(
            vec![
                ("sprint", vec![rec(2, "from sprint")]),
                ("comment", vec![rec(2, "from comment"), rec(5, "only comment")]),
            ],
            |r| r.id,
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].record.summary, "from sprint");
        assert_eq!(merged[0].sources, vec!["sprint", "comment"]);
        assert_eq!(merged[1].record.summary, "only comment");
        assert_eq!(merged[1].sources, vec!["comment"]);
    }

    #[test]
    fn union_orders_by_key() {
        let merged = union_keyed(
            vec![("a", vec![rec(30, ""), rec(10, "")]), ("b", vec![rec(20, "")])],
            |r| r.id,
        );

        let ids: Vec<i64> = merged.iter().map(|s| s.record.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn union_collapses_duplicates_within_one_set() {
        let merged = union_keyed(vec![("a", vec![rec(1, "first"), rec(1, "second")])], |r| r.id);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].record.summary, "first");
        assert_eq!(merged[0].sources, vec!["a"]);
    }

    #[test]
    fn has_source_checks_labels() {
        let merged = union_keyed(vec![("sprint", vec![rec(1, "")])], |r| r.id);

        assert!(merged[0].has_source("sprint"));
        assert!(!merged[0].has_source("comment"));
    }

    #[test]
    fn missing_keys_reports_sorted_difference() {
        let requested = vec![
            "AP-3".to_string(),
            "AP-1".to_string(),
            "AP-2".to_string(),
            "AP-3".to_string(),
        ];
        let received = vec!["AP-2".to_string()];

        assert_eq!(missing_keys(&requested, &received), vec!["AP-1", "AP-3"]);
    }

    #[test]
    fn missing_keys_empty_when_all_received() {
        let requested = vec!["AP-1".to_string()];
        let received = vec!["AP-1".to_string(), "AP-9".to_string()];

        assert!(missing_keys(&requested, &received).is_empty());
    }
}
