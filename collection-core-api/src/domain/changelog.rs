use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized field-name to rendered-value map of one record state. Values
/// are the canonical string forms the store itself round-trips.
pub type FieldSnapshot = BTreeMap<&'static str, Option<String>>;

/// One field's mutation, ready to be persisted as a change-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Compute the field-level diff between two snapshots.
///
/// A field produces a change only when present in both snapshots with
/// unequal values; fields absent from `after` were not submitted and count
/// as unchanged, not as nulled. No-op writes therefore produce no entries.
pub fn diff_snapshots(before: &FieldSnapshot, after: &FieldSnapshot) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for (field, new_value) in after {
        let old_value = match before.get(field) {
            Some(value) => value,
            None => continue,
        };
        if old_value != new_value {
            changes.push(FieldChange {
                field: field.to_string(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            });
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&'static str, Option<&str>)]) -> FieldSnapshot {
        pairs
            .iter()
            .map(|(field, value)| (*field, value.map(String::from)))
            .collect()
    }

    #[test]
    fn changed_field_produces_exactly_one_entry() {
        let before = snapshot(&[("disposition", Some("interested")), ("comment", None)]);
        let after = snapshot(&[("disposition", Some("converted")), ("comment", None)]);
        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "disposition");
        assert_eq!(changes[0].old_value.as_deref(), Some("interested"));
        assert_eq!(changes[0].new_value.as_deref(), Some("converted"));
    }

    #[test]
    fn same_value_produces_no_entry() {
        let before = snapshot(&[("disposition", Some("interested"))]);
        let after = snapshot(&[("disposition", Some("interested"))]);
        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn absent_field_is_unchanged_not_nulled() {
        let before = snapshot(&[("disposition", Some("interested")), ("comment", Some("call back"))]);
        let after = snapshot(&[("disposition", Some("converted"))]);
        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "disposition");
    }

    #[test]
    fn clearing_a_field_is_a_change() {
        let before = snapshot(&[("comment", Some("call back"))]);
        let after = snapshot(&[("comment", None)]);
        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old_value.as_deref(), Some("call back"));
        assert_eq!(changes[0].new_value, None);
    }
}
