//! Canonical encoding for hashing and signing
//!
//! Two logically equal values must always hash and sign to the same bytes, so
//! every map is written with its keys sorted, recursively, with no
//! insignificant whitespace. This encoding exists solely for hashing and
//! signing; the wire uses MessagePack (consentry-types::codec).

use serde::Serialize;
use serde_json::Value;

use consentry_types::{ConsentryError, Result};

/// Render a JSON value in canonical form: recursively sorted object keys,
/// compact separators
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Canonical bytes of any serializable value
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value).map_err(|e| ConsentryError::MalformedRecord {
        message: format!("canonicalization failed: {}", e),
    })?;
    Ok(canonical_json(&value).into_bytes())
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Value::String handles JSON string escaping for the key
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Null, booleans, numbers and strings already render deterministically
        other => out.push_str(&other.to_string()),
    }
}
