//! Consentry Chain - Append-only hash-linked audit ledger
//!
//! Every admitted prompt outcome becomes an `AuditRecord` whose hash commits
//! to its content and to the hash of the record before it. Append is the only
//! mutating operation; no update or delete exists, so history cannot be
//! rewritten without detection.
//!
//! # Invariants
//!
//! 1. `record.hash` is reproducible from `{record minus hash, prev_hash}`
//! 2. `records[n].prev_hash == records[n-1].hash` for all n > 0
//! 3. Record 0 links to the fixed genesis hash
//! 4. A rejected event is never appended

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use consentry_crypto::{canonical_json, chain_hash, verify_base64, verify_decision};
use consentry_types::{
    AuditRecord, ConsentryError, DecisionEvent, EventId, Result, StatusEvent,
};

/// The fixed `prev_hash` of the first record in every chain
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Record types that must carry a signature to be considered valid
const SIGNED_EVENT_TYPES: &[&str] = &["decision"];

/// Outcome of walking a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainVerification {
    pub valid: bool,
    /// Index of the first record where a hash or linkage check failed
    pub broken_at: Option<usize>,
}

impl ChainVerification {
    fn valid() -> Self {
        Self {
            valid: true,
            broken_at: None,
        }
    }

    fn broken(at: usize) -> Self {
        Self {
            valid: false,
            broken_at: Some(at),
        }
    }

    /// Convert to a result, surfacing the break point as a typed error
    pub fn into_result(self) -> Result<()> {
        match self.broken_at {
            None => Ok(()),
            Some(at) => Err(ConsentryError::ChainBroken { at }),
        }
    }
}

/// The append-only audit chain
///
/// Thread-safe: appends serialize behind one write lock so two records can
/// never claim the same `prev_hash`. Clones share the same underlying chain.
#[derive(Clone, Default)]
pub struct AuditChain {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl AuditChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a record, linking it to the current chain head
    ///
    /// "Read last hash, compute new record, store" happens under a single
    /// lock acquisition.
    pub fn append(
        &self,
        event_type: impl Into<String>,
        data: Option<Value>,
        signature: Option<String>,
    ) -> Result<AuditRecord> {
        let event_type = event_type.into();
        let mut records = self.records.write();

        let prev_hash = records
            .last()
            .map(|r| r.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let mut record = AuditRecord {
            id: EventId::new(),
            timestamp: consentry_types::current_timestamp_ms(),
            event_type,
            hash: String::new(),
            prev_hash,
            data,
            signature,
        };
        record.hash = chain_hash(&record.hashable_content(), &record.prev_hash)?;

        records.push(record.clone());
        info!(
            record_id = %record.id,
            event_type = %record.event_type,
            height = records.len(),
            "audit record appended"
        );
        Ok(record)
    }

    /// Verify and append a signed decision
    ///
    /// The decision's signature is checked first; an invalid decision is a
    /// hard rejection and never touches the chain.
    pub fn append_decision(&self, event: &DecisionEvent) -> Result<AuditRecord> {
        event.validate()?;

        if !verify_decision(event) {
            warn!(decision_id = %event.id, "rejected decision with bad signature");
            return Err(ConsentryError::InvalidSignature {
                message: format!("decision {} failed verification", event.id),
            });
        }

        let data = serde_json::to_value(event).map_err(|e| ConsentryError::MalformedRecord {
            message: format!("decision is not serializable: {}", e),
        })?;
        self.append("decision", Some(data), Some(event.signature.clone()))
    }

    /// Append unsigned device telemetry
    pub fn append_status(&self, event: &StatusEvent) -> Result<AuditRecord> {
        let data = serde_json::to_value(event).map_err(|e| ConsentryError::MalformedRecord {
            message: format!("status is not serializable: {}", e),
        })?;
        self.append("status", Some(data), None)
    }

    /// Hash of the chain head, or the genesis hash for an empty chain
    pub fn last_hash(&self) -> String {
        self.records
            .read()
            .last()
            .map(|r| r.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string())
    }

    /// Number of records in the chain
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of the chain for external verification or export
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().clone()
    }

    /// Verify this chain's own records
    pub fn verify(&self) -> ChainVerification {
        verify_chain(&self.records.read())
    }
}

/// Walk a record sequence once, checking every hash and every link
///
/// Reports the first index where recomputing the record's hash disagrees with
/// the stored value, or where the link to the predecessor (genesis for record
/// 0) is broken. Records before the break remain trustworthy; records after
/// it are not.
pub fn verify_chain(records: &[AuditRecord]) -> ChainVerification {
    for (i, record) in records.iter().enumerate() {
        let expected_prev = if i == 0 {
            GENESIS_HASH
        } else {
            records[i - 1].hash.as_str()
        };
        if record.prev_hash != expected_prev {
            warn!(index = i, "chain linkage broken");
            return ChainVerification::broken(i);
        }

        match chain_hash(&record.hashable_content(), &record.prev_hash) {
            Ok(computed) if computed == record.hash => {}
            _ => {
                warn!(index = i, "record hash mismatch");
                return ChainVerification::broken(i);
            }
        }
    }

    ChainVerification::valid()
}

/// Verify a record's signature against the set of known signer keys
///
/// A missing signature is acceptable only for record types that are not
/// required to be signed (status telemetry). For signed types the record's
/// `data` must deserialize as a decision whose signer is known and whose
/// signature covers the canonical unsigned payload.
pub fn verify_record_signature(record: &AuditRecord, known_keys: &[String]) -> bool {
    let Some(signature) = &record.signature else {
        return !SIGNED_EVENT_TYPES.contains(&record.event_type.as_str());
    };

    let Some(data) = &record.data else {
        return false;
    };
    let Ok(event) = serde_json::from_value::<DecisionEvent>(data.clone()) else {
        return false;
    };

    if !known_keys.iter().any(|k| *k == event.signer_public_key) {
        return false;
    }

    verify_base64(
        canonical_json(&event.signing_payload()).as_bytes(),
        signature,
        &event.signer_public_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use consentry_crypto::{DecisionSigner, KeyPair};
    use consentry_types::{
        Component, DecisionKind, DeviceStatus, EventSource,
    };
    use serde_json::json;

    fn signer() -> DecisionSigner {
        DecisionSigner::new(KeyPair::generate())
    }

    fn sample_status() -> StatusEvent {
        StatusEvent {
            id: EventId::new(),
            timestamp: consentry_types::current_timestamp_ms(),
            source: EventSource::new(Component::Desktop, "s1"),
            status: DeviceStatus::Online,
            metrics: None,
            message: None,
        }
    }

    fn build_chain(len: usize) -> AuditChain {
        let chain = AuditChain::new();
        for i in 0..len {
            chain
                .append("status", Some(json!({"seq": i})), None)
                .unwrap();
        }
        chain
    }

    #[test]
    fn test_first_record_links_to_genesis() {
        let chain = build_chain(1);
        assert_eq!(chain.records()[0].prev_hash, GENESIS_HASH);
    }

    #[test]
    fn test_records_link_to_predecessor() {
        let chain = build_chain(3);
        let records = chain.records();
        assert_eq!(records[1].prev_hash, records[0].hash);
        assert_eq!(records[2].prev_hash, records[1].hash);
    }

    #[test]
    fn test_appended_chain_verifies() {
        let chain = build_chain(5);
        let result = chain.verify();
        assert!(result.valid);
        assert_eq!(result.broken_at, None);
    }

    #[test]
    fn test_empty_chain_verifies() {
        assert!(verify_chain(&[]).valid);
    }

    #[test]
    fn test_tampered_data_breaks_chain_at_index() {
        let mut records = build_chain(4).records();
        records[2].data = Some(json!({"seq": 99}));

        let result = verify_chain(&records);
        assert_eq!(result.broken_at, Some(2));
    }

    #[test]
    fn test_tampered_hash_breaks_chain_at_index() {
        let mut records = build_chain(4).records();
        records[1].hash = "f".repeat(64);

        let result = verify_chain(&records);
        assert_eq!(result.broken_at, Some(1));
    }

    #[test]
    fn test_tampered_prev_hash_breaks_chain_at_index() {
        let mut records = build_chain(4).records();
        records[3].prev_hash = "f".repeat(64);

        assert_eq!(verify_chain(&records).broken_at, Some(3));
    }

    #[test]
    fn test_tampered_timestamp_breaks_chain() {
        let mut records = build_chain(2).records();
        records[0].timestamp += 1;

        assert_eq!(verify_chain(&records).broken_at, Some(0));
    }

    #[test]
    fn test_removed_record_detected() {
        let mut records = build_chain(4).records();
        records.remove(1);

        assert_eq!(verify_chain(&records).broken_at, Some(1));
    }

    #[test]
    fn test_into_result_surfaces_break() {
        let mut records = build_chain(2).records();
        records[1].event_type = "forged".to_string();

        let result = verify_chain(&records).into_result();
        assert_eq!(result, Err(ConsentryError::ChainBroken { at: 1 }));
    }

    #[test]
    fn test_append_decision_records_signature() {
        let chain = AuditChain::new();
        let event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Approve,
            None,
            None,
        );

        let record = chain.append_decision(&event).unwrap();
        assert_eq!(record.event_type, "decision");
        assert_eq!(record.signature.as_deref(), Some(event.signature.as_str()));
        assert!(chain.verify().valid);
    }

    #[test]
    fn test_tampered_decision_never_appended() {
        let chain = AuditChain::new();
        let mut event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Reject,
            None,
            None,
        );
        event.decision = DecisionKind::Approve;

        let result = chain.append_decision(&event);
        assert!(matches!(
            result,
            Err(ConsentryError::InvalidSignature { .. })
        ));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_decision_record_signature_verifies_against_known_key() {
        let signer = signer();
        let chain = AuditChain::new();
        let event = signer.make_decision(
            EventId::from_string("p1"),
            DecisionKind::Approve,
            None,
            None,
        );
        let record = chain.append_decision(&event).unwrap();

        assert!(verify_record_signature(
            &record,
            &[signer.public_key_base64()]
        ));
        assert!(!verify_record_signature(
            &record,
            &[KeyPair::generate().public_key_base64()]
        ));
        assert!(!verify_record_signature(&record, &[]));
    }

    #[test]
    fn test_unsigned_status_record_is_acceptable() {
        let chain = AuditChain::new();
        let record = chain.append_status(&sample_status()).unwrap();

        assert!(record.signature.is_none());
        assert!(verify_record_signature(&record, &[]));
    }

    #[test]
    fn test_unsigned_decision_record_is_not_acceptable() {
        let record = AuditRecord {
            id: EventId::new(),
            timestamp: consentry_types::current_timestamp_ms(),
            event_type: "decision".to_string(),
            hash: "0".repeat(64),
            prev_hash: GENESIS_HASH.to_string(),
            data: Some(json!({"prompt_id": "p1"})),
            signature: None,
        };

        assert!(!verify_record_signature(&record, &[]));
    }

    #[test]
    fn test_concurrent_appends_never_fork() {
        let chain = AuditChain::new();
        let mut handles = Vec::new();

        for worker in 0..4 {
            let chain = chain.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    chain
                        .append("status", Some(json!({"worker": worker, "seq": i})), None)
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(chain.len(), 100);
        assert!(chain.verify().valid);
    }
}
