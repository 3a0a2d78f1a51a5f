use rustc_hash::FxHasher;
use smol_str::SmolStr;
use std::hash::BuildHasherDefault;

pub type FastMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FastHashSet<T> = std::collections::HashSet<T, BuildHasherDefault<FxHasher>>;

/// Stable record identifier; the record store resolves references by it.
pub type RecordId = SmolStr;

/// Separator for composite dimension keys. Normalized dimension values are
/// bucket keys, identifiers, or plain string casts, none of which contain it.
pub const COMPOSITE_KEY_SEPARATOR: char = '|';

/// Join a normalized dimension-value tuple into one composite key.
///
/// Keys for typical one- or two-dimension groups stay under SmolStr's
/// 23-byte inline limit, so membership checks against the pending-group map
/// don't allocate.
pub fn composite_key(values: &[SmolStr]) -> SmolStr {
    match values {
        [] => SmolStr::default(),
        [single] => single.clone(),
        _ => {
            let mut len = values.len() - 1;
            for v in values {
                len += v.len();
            }
            let mut buf = String::with_capacity(len);
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    buf.push(COMPOSITE_KEY_SEPARATOR);
                }
                buf.push_str(v);
            }
            SmolStr::new(buf)
        }
    }
}

#[cfg(test)]
mod composite_key_tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<SmolStr> {
        items.iter().map(|s| SmolStr::new(s)).collect()
    }

    #[test]
    fn test_empty_tuple() {
        assert_eq!(composite_key(&[]).as_str(), "");
    }

    #[test]
    fn test_single_value() {
        assert_eq!(composite_key(&values(&["US"])).as_str(), "US");
    }

    #[test]
    fn test_joins_with_separator() {
        assert_eq!(
            composite_key(&values(&["US", "2024-03", "open"])).as_str(),
            "US|2024-03|open"
        );
    }

    #[test]
    fn test_distinct_tuples_distinct_keys() {
        let a = composite_key(&values(&["US", "open"]));
        let b = composite_key(&values(&["US", "closed"]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_inline_storage_for_typical_keys() {
        // SmolStr inlines strings up to 23 bytes; a country + stage tuple
        // should not hit the heap.
        let key = composite_key(&values(&["US", "open"]));
        assert_eq!(key.as_str(), "US|open");
        assert!(!key.is_heap_allocated());

        // A tuple with a full day bucket still fits: "DE|2024-03-05" = 13.
        let day = composite_key(&values(&["DE", "2024-03-05"]));
        assert_eq!(day.len(), 13);
        assert!(!day.is_heap_allocated());
    }

    #[test]
    fn test_heap_allocation_past_inline_limit() {
        let key = composite_key(&values(&["organization", "2024-03-05T10:00"]));
        assert!(key.len() > 23);
        assert!(key.is_heap_allocated());
    }
}
