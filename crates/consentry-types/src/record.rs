//! The hash-chained audit record
//!
//! An `AuditRecord` is the sole permanent system of record: prompts and
//! decisions may be garbage-collected once archived, the record persists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::EventId;

/// One entry in the append-only audit chain
///
/// `hash` covers `{id, timestamp, event_type, data?, signature?}` plus
/// `prev_hash`, so recomputing it from a stored record must reproduce it
/// exactly. Records are never mutated or removed after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: EventId,
    pub timestamp: i64,
    pub event_type: String,
    /// SHA-256 (lowercase hex) of this record's canonical content + prev_hash
    pub hash: String,
    /// Hash of the previous record, or the genesis value for record 0
    pub prev_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl AuditRecord {
    /// The portion of the record covered by `hash`, excluding `hash` and
    /// `prev_hash` themselves
    ///
    /// Absent optional fields are omitted, matching how the record was encoded
    /// when the hash was first computed.
    pub fn hashable_content(&self) -> Value {
        let mut content = serde_json::Map::new();
        content.insert("id".into(), Value::String(self.id.0.clone()));
        content.insert("timestamp".into(), Value::Number(self.timestamp.into()));
        content.insert("event_type".into(), Value::String(self.event_type.clone()));
        if let Some(data) = &self.data {
            content.insert("data".into(), data.clone());
        }
        if let Some(signature) = &self.signature {
            content.insert("signature".into(), Value::String(signature.clone()));
        }
        Value::Object(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AuditRecord {
        AuditRecord {
            id: EventId::from_string("r1"),
            timestamp: 1000,
            event_type: "decision".to_string(),
            hash: "deadbeef".to_string(),
            prev_hash: "0".repeat(64),
            data: Some(serde_json::json!({"prompt_id": "p1"})),
            signature: None,
        }
    }

    #[test]
    fn test_hashable_content_excludes_hashes() {
        let content = sample_record().hashable_content();
        let obj = content.as_object().unwrap();
        assert!(!obj.contains_key("hash"));
        assert!(!obj.contains_key("prev_hash"));
        assert!(obj.contains_key("id"));
        assert!(obj.contains_key("data"));
    }

    #[test]
    fn test_hashable_content_omits_absent_signature() {
        let content = sample_record().hashable_content();
        assert!(!content.as_object().unwrap().contains_key("signature"));
    }

    #[test]
    fn test_record_roundtrips_through_json() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
