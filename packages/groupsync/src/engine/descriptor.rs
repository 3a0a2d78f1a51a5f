//! Grouped-query shape: root filter, grouping dimensions, entity naming.
//!
//! Dimension specs are parsed once per query from the cached query
//! variables; anything resolved here (bucket configs, proxy fields) stays
//! fixed for every maintenance pass against that query.

use super::normalize::resolve_nested_value;
use super::types::{FieldValue, Path};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use smol_str::SmolStr;

/// Temporal bucketing granularity for a grouping dimension.
///
/// Unrecognized granularity strings deserialize to `Unknown`, which
/// normalization treats as a plain string cast.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Day,
    Month,
    Year,
    DayOfTheWeek,
    MonthOfTheYear,
    #[serde(other)]
    Unknown,
}

/// Per-dimension bucketing configuration as it appears in query variables:
/// either a bare flag (group by raw value) or a temporal granularity.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(untagged)]
pub enum BucketConfig {
    Flag(bool),
    Temporal { granularity: Granularity },
}

/// Declared fallback lookup for foreign-key dimension fields: when the
/// primary field is absent on a record, read `{relation}.id` instead.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ProxyField {
    relation: SmolStr,
}

/// One grouping axis: a field plus an optional bucketing rule.
#[derive(Clone, Debug)]
pub struct DimensionSpec {
    pub field: Path,
    pub bucket: Option<BucketConfig>,
    proxy: Option<ProxyField>,
}

impl DimensionSpec {
    pub fn new(field_name: &str, bucket: Option<BucketConfig>) -> Self {
        Self {
            field: Path::new(field_name),
            bucket,
            proxy: proxy_for(field_name),
        }
    }

    pub fn field_name(&self) -> String {
        self.field.as_str()
    }

    /// The record's source value for this dimension: primary field lookup,
    /// then the declared relation-id fallback. Null counts as absent.
    pub fn resolve_value<'a>(&self, record: &'a FieldValue) -> Option<&'a FieldValue> {
        if let Some(value) = resolve_nested_value(Some(record), &self.field) {
            if !value.is_null() {
                return Some(value);
            }
        }

        let proxy = self.proxy.as_ref()?;
        let id = record.get(proxy.relation.as_str())?.get("id")?;
        (!id.is_null()).then_some(id)
    }
}

/// Single-segment field names ending in the `Id` convention get a proxy to
/// the relation object's identifier, resolved here once rather than by
/// suffix inspection on every record.
fn proxy_for(field_name: &str) -> Option<ProxyField> {
    if field_name.contains('.') {
        return None;
    }
    let base = field_name.strip_suffix("Id")?;
    if base.is_empty() {
        return None;
    }
    Some(ProxyField {
        relation: SmolStr::new(base),
    })
}

/// Parse the `groupBy` query variable: an ordered list of single-entry
/// objects `{ fieldName: bucketConfig }`. Entries that are not objects are
/// skipped rather than rejected.
pub fn parse_dimension_specs(group_by: Option<&Value>) -> Vec<DimensionSpec> {
    let Some(items) = group_by.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut specs = Vec::with_capacity(items.len());
    for item in items {
        let Some(obj) = item.as_object() else { continue };
        if let Some((name, config)) = obj.iter().next() {
            let bucket = match config {
                Value::Null => None,
                other => serde_json::from_value(other.clone()).ok(),
            };
            specs.push(DimensionSpec::new(name, bucket));
        }
    }
    specs
}

/// Root filter and grouping dimensions of one grouped query, recovered from
/// its cached query variables.
#[derive(Clone, Debug)]
pub struct QueryDescriptor {
    pub filter: Value,
    pub dimensions: Vec<DimensionSpec>,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            filter: json!({}),
            dimensions: Vec::new(),
        }
    }
}

impl QueryDescriptor {
    pub fn from_variables(variables: &Value) -> Self {
        Self {
            filter: variables.get("filter").cloned().unwrap_or_else(|| json!({})),
            dimensions: parse_dimension_specs(variables.get("groupBy")),
        }
    }
}

/// Entity naming for one object type, used for store-field keys and wire
/// typename tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub name_singular: SmolStr,
    pub name_plural: SmolStr,
}

impl ObjectDescriptor {
    pub fn new(name_singular: &str, name_plural: &str) -> Self {
        Self {
            name_singular: SmolStr::new(name_singular),
            name_plural: SmolStr::new(name_plural),
        }
    }

    /// The grouped query's field name in the cache store.
    pub fn group_by_field_name(&self) -> String {
        format!("{}GroupBy", self.name_plural)
    }
}
