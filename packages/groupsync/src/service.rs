//! Glue between raw cache-store payloads and the typed engine: store-field
//! key parsing, record ingestion prep, query registration, and the
//! raw-JSON maintenance entry point.

use crate::engine::cache::GroupedQuery;
use crate::engine::connection::GroupConnection;
use crate::engine::descriptor::{ObjectDescriptor, QueryDescriptor};
use crate::engine::hooks::{CursorEncoder, RecordFilter};
use crate::engine::maintain::{maintain_connections, MaintainContext};
use crate::engine::types::{FieldValue, MutationBatch};
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// A store-field key split into the query field name and its variables.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedStoreField {
    pub field_name: String,
    pub variables: Value,
}

/// Recover the original query variables from an opaque store-field key such
/// as `peopleGroupBy({"filter":{},"groupBy":[{"country":true}]})`. A bare
/// field name without an argument list parses to empty variables.
pub fn parse_store_field_name(store_field_name: &str) -> Result<ParsedStoreField> {
    let trimmed = store_field_name.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty store field name"));
    }

    match trimmed.split_once('(') {
        None => Ok(ParsedStoreField {
            field_name: trimmed.to_string(),
            variables: json!({}),
        }),
        Some((name, rest)) => {
            let args = rest
                .strip_suffix(')')
                .ok_or_else(|| anyhow!("unterminated argument list in store field name"))?;
            let variables = if args.is_empty() {
                json!({})
            } else {
                serde_json::from_str(args)
                    .map_err(|e| anyhow!("invalid store field arguments: {}", e))?
            };
            Ok(ParsedStoreField {
                field_name: name.to_string(),
                variables,
            })
        }
    }
}

pub mod ingest {
    use super::*;

    /// Prepare a raw record for ingestion: convert to the engine's value
    /// model and compute its content hash.
    #[instrument(skip(record))]
    pub fn prepare(record: Value) -> (FieldValue, String) {
        let mut hasher = blake3::Hasher::new();
        hash_value_recursive(&record, &mut hasher);
        let hash = hasher.finalize().to_hex().to_string();
        (FieldValue::from(record), hash)
    }

    /// Prepare a batch of records, in parallel where available.
    #[instrument(skip(records))]
    pub fn prepare_batch(records: Vec<Value>) -> Vec<(FieldValue, String)> {
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            use rayon::prelude::*;
            records.into_par_iter().map(prepare).collect()
        }

        #[cfg(any(target_arch = "wasm32", not(feature = "parallel")))]
        {
            records.into_iter().map(prepare).collect()
        }
    }

    // serde_json keeps object keys sorted, so iteration order — and with it
    // the hash — is deterministic for equal documents.
    fn hash_value_recursive(v: &Value, hasher: &mut blake3::Hasher) {
        match v {
            Value::Null => {
                hasher.update(&[0]);
            }
            Value::Bool(b) => {
                hasher.update(&[1]);
                hasher.update(&[*b as u8]);
            }
            Value::Number(n) => {
                hasher.update(&[2]);
                if let Some(f) = n.as_f64() {
                    hasher.update(&f.to_be_bytes());
                } else {
                    hasher.update(n.to_string().as_bytes());
                }
            }
            Value::String(s) => {
                hasher.update(&[3]);
                hasher.update(s.as_bytes());
            }
            Value::Array(arr) => {
                hasher.update(&[4]);
                for item in arr {
                    hash_value_recursive(item, hasher);
                }
            }
            Value::Object(obj) => {
                hasher.update(&[5]);
                for (k, v) in obj {
                    hasher.update(k.as_bytes());
                    hash_value_recursive(v, hasher);
                }
            }
        }
    }
}

pub mod view {
    use super::*;

    /// Parsed registration request for one grouped query.
    pub struct RegistrationData {
        pub id: String,
        pub object: ObjectDescriptor,
        pub descriptor: QueryDescriptor,
        pub connections: Vec<GroupConnection>,
    }

    impl RegistrationData {
        pub fn into_query(self) -> GroupedQuery {
            GroupedQuery::new(self.id, self.object, self.descriptor, self.connections)
        }
    }

    /// Prepare a raw registration request: entity naming, query variables
    /// (from the store-field key or given directly), and any initial
    /// cached connections.
    #[instrument(skip(config))]
    pub fn prepare_registration(config: Value) -> Result<RegistrationData> {
        let id = config
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing or invalid 'id'"))?
            .to_string();

        let name_singular = config
            .get("objectNameSingular")
            .or_else(|| config.get("object_name_singular"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing or invalid 'objectNameSingular'"))?;

        let name_plural = config
            .get("objectNamePlural")
            .or_else(|| config.get("object_name_plural"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing or invalid 'objectNamePlural'"))?;

        let object = ObjectDescriptor::new(name_singular, name_plural);

        let variables = match config
            .get("storeFieldName")
            .or_else(|| config.get("store_field_name"))
            .and_then(|v| v.as_str())
        {
            Some(name) => parse_store_field_name(name)?.variables,
            None => config
                .get("variables")
                .cloned()
                .ok_or_else(|| anyhow!("Missing 'storeFieldName' or 'variables'"))?,
        };
        let descriptor = QueryDescriptor::from_variables(&variables);

        let connections = match config.get("connections") {
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| anyhow!("Invalid cached connections: {}", e))?,
            None => Vec::new(),
        };

        Ok(RegistrationData {
            id,
            object,
            descriptor,
            connections,
        })
    }
}

/// Raw-JSON maintenance entry point, shaped like a cache store's
/// modify-field callback: given the store-field key and the cached field
/// value, return the replacement value.
///
/// Anything that is not an array of group connections comes back unchanged
/// — a no-op, not an error. A pass that changes nothing also returns the
/// input unchanged, so callers comparing values can skip invalidation.
#[instrument(skip(cached, batch, filter, cursors))]
pub fn maintain_cached_value(
    store_field_name: &str,
    object: &ObjectDescriptor,
    cached: &Value,
    batch: &MutationBatch,
    match_root_filter_on_create: bool,
    filter: &dyn RecordFilter,
    cursors: &dyn CursorEncoder,
) -> Value {
    let Ok(parsed) = parse_store_field_name(store_field_name) else {
        return cached.clone();
    };

    let Some(raw) = cached.as_array() else {
        return cached.clone();
    };

    let mut connections = Vec::with_capacity(raw.len());
    for item in raw {
        match serde_json::from_value::<GroupConnection>(item.clone()) {
            Ok(connection) => connections.push(Arc::new(connection)),
            Err(_) => return cached.clone(),
        }
    }

    let descriptor = QueryDescriptor::from_variables(&parsed.variables);
    let ctx = MaintainContext::new(&descriptor, object, filter, cursors, match_root_filter_on_create);
    let result = maintain_connections(&connections, batch, &ctx);

    if !result.changed {
        return cached.clone();
    }

    Value::Array(
        result
            .connections
            .iter()
            .map(|c| serde_json::to_value(c.as_ref()).unwrap_or(Value::Null))
            .collect(),
    )
}
