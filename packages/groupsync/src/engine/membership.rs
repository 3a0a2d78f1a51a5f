//! Decides whether a record belongs to a group's dimension-value tuple.
//!
//! One evaluator, reused by both the connection patcher and the new-group
//! synthesizer — membership and synthesis must never normalize differently.

use super::descriptor::DimensionSpec;
use super::normalize::{normalize_str, normalize_value};
use super::types::FieldValue;
use smol_str::SmolStr;

/// `true` when the record's dimension values match the group's expected
/// tuple.
///
/// With no dimensions configured every record belongs (ungrouped case).
/// Expected values missing from the tuple (partial group key) act as
/// wildcards; a record missing a compared dimension's source value does not
/// belong.
pub fn belongs_to_group(
    record: &FieldValue,
    expected_values: &[SmolStr],
    specs: &[DimensionSpec],
) -> bool {
    if specs.is_empty() {
        return true;
    }

    for (i, spec) in specs.iter().enumerate() {
        let Some(expected) = expected_values.get(i) else {
            continue;
        };

        let Some(actual) = spec.resolve_value(record) else {
            return false;
        };

        let bucket = spec.bucket.as_ref();
        if normalize_value(actual, bucket) != normalize_str(expected, bucket) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod membership_tests {
    use super::*;
    use crate::engine::descriptor::{BucketConfig, Granularity};
    use serde_json::json;

    fn expected(values: &[&str]) -> Vec<SmolStr> {
        values.iter().map(|v| SmolStr::new(v)).collect()
    }

    #[test]
    fn test_no_dimensions_means_everyone_belongs() {
        let record: FieldValue = json!({ "id": "r1" }).into();
        assert!(belongs_to_group(&record, &[], &[]));
    }

    #[test]
    fn test_exact_value_match() {
        let specs = vec![DimensionSpec::new("country", None)];
        let record: FieldValue = json!({ "country": "US" }).into();

        assert!(belongs_to_group(&record, &expected(&["US"]), &specs));
        assert!(!belongs_to_group(&record, &expected(&["DE"]), &specs));
    }

    #[test]
    fn test_missing_source_value_does_not_belong() {
        let specs = vec![DimensionSpec::new("country", None)];
        let record: FieldValue = json!({ "city": "Berlin" }).into();
        assert!(!belongs_to_group(&record, &expected(&["US"]), &specs));
    }

    #[test]
    fn test_partial_group_key_is_wildcard() {
        let specs = vec![
            DimensionSpec::new("country", None),
            DimensionSpec::new("stage", None),
        ];
        let record: FieldValue = json!({ "country": "US", "stage": "open" }).into();

        // Only the first dimension is pinned; the second is unknown.
        assert!(belongs_to_group(&record, &expected(&["US"]), &specs));
        // But a pinned mismatch still fails.
        assert!(!belongs_to_group(&record, &expected(&["DE"]), &specs));
    }

    #[test]
    fn test_bucketed_dimension_compares_bucket_keys() {
        let specs = vec![DimensionSpec::new(
            "createdAt",
            Some(BucketConfig::Temporal {
                granularity: Granularity::Day,
            }),
        )];
        let record: FieldValue = json!({ "createdAt": "2024-03-05T23:00:00Z" }).into();

        assert!(belongs_to_group(&record, &expected(&["2024-03-05"]), &specs));
        assert!(!belongs_to_group(&record, &expected(&["2024-03-06"]), &specs));
    }

    #[test]
    fn test_both_sides_normalized_identically() {
        // Record carries a number, the cached tuple a string; both sides
        // normalize to "5".
        let specs = vec![DimensionSpec::new("priority", None)];
        let record: FieldValue = json!({ "priority": 5 }).into();
        assert!(belongs_to_group(&record, &expected(&["5"]), &specs));
    }

    #[test]
    fn test_relation_valued_dimension_matches_by_id() {
        let specs = vec![DimensionSpec::new("owner", None)];
        let record: FieldValue = json!({ "owner": { "id": "user-1", "name": "Ada" } }).into();
        assert!(belongs_to_group(&record, &expected(&["user-1"]), &specs));
    }

    #[test]
    fn test_foreign_key_fallback_in_membership() {
        let specs = vec![DimensionSpec::new("companyId", None)];
        let record: FieldValue = json!({ "company": { "id": "company-2" } }).into();
        assert!(belongs_to_group(&record, &expected(&["company-2"]), &specs));
    }

    #[test]
    fn test_compound_tuple_all_dimensions_must_pass() {
        let specs = vec![
            DimensionSpec::new("country", None),
            DimensionSpec::new("stage", None),
        ];
        let record: FieldValue = json!({ "country": "US", "stage": "open" }).into();

        assert!(belongs_to_group(&record, &expected(&["US", "open"]), &specs));
        assert!(!belongs_to_group(&record, &expected(&["US", "closed"]), &specs));
    }
}
