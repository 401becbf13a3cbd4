//! SHA-256 hashing and the chain-link hash

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::canonical_bytes;
use consentry_types::{ConsentryError, Result};

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 hash and return as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Hash a value through the canonical encoding
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<String> {
    Ok(sha256_hex(&canonical_bytes(value)?))
}

/// Compute the hash linking a record to its predecessor
///
/// The record content gains a `prev_hash` field before canonicalization, so
/// the hash commits to the link as well as the content.
pub fn chain_hash<T: Serialize>(record: &T, prev_hash: &str) -> Result<String> {
    let value = serde_json::to_value(record).map_err(|e| ConsentryError::MalformedRecord {
        message: format!("record is not serializable: {}", e),
    })?;

    let mut content = match value {
        Value::Object(map) => map,
        _ => {
            return Err(ConsentryError::MalformedRecord {
                message: "chain hash input must be a map".to_string(),
            })
        }
    };
    content.insert("prev_hash".into(), Value::String(prev_hash.to_string()));

    hash_canonical(&Value::Object(content))
}
