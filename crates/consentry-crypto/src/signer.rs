//! Decision signing
//!
//! Binds a human decision to a signer identity. The signature covers exactly
//! `{prompt_id, decision, timestamp, modifications?}` in canonical encoding,
//! so a verifier rebuilding that payload from the `DecisionEvent` obtains
//! byte-identical input.

use serde_json::Value;

use crate::canonical::canonical_json;
use crate::keys::KeyPair;
use crate::signature::{sign_base64, verify_base64};
use consentry_types::{
    decision_signing_payload, DecisionEvent, DecisionKind, EventId, Result,
};

/// Signs decisions on behalf of one provisioned approver identity
///
/// Key custody is out of scope: the pair is assumed already provisioned.
pub struct DecisionSigner {
    keypair: KeyPair,
}

impl DecisionSigner {
    /// Create a signer from an existing key pair
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Create a signer from a base64 secret key
    ///
    /// Malformed key material is a `KeyError` here, at construction, so a bad
    /// key can never silently produce an invalid signature later.
    pub fn from_secret_base64(secret: &str) -> Result<Self> {
        Ok(Self {
            keypair: KeyPair::from_secret_base64(secret)?,
        })
    }

    /// Sign the unsigned form of a decision, returning the base64 signature
    pub fn sign_decision(
        &self,
        prompt_id: &EventId,
        decision: DecisionKind,
        timestamp: i64,
        modifications: Option<&Value>,
    ) -> String {
        let payload = decision_signing_payload(prompt_id, decision, timestamp, modifications);
        sign_base64(canonical_json(&payload).as_bytes(), &self.keypair)
    }

    /// Build a complete, signed `DecisionEvent`
    pub fn make_decision(
        &self,
        prompt_id: EventId,
        decision: DecisionKind,
        modifications: Option<Value>,
        reason: Option<String>,
    ) -> DecisionEvent {
        let timestamp = consentry_types::current_timestamp_ms();
        let signature =
            self.sign_decision(&prompt_id, decision, timestamp, modifications.as_ref());

        DecisionEvent {
            id: EventId::new(),
            prompt_id,
            timestamp,
            decision,
            signature,
            signer_public_key: self.public_key_base64(),
            modifications,
            reason,
        }
    }

    /// The identity a verifier must check signatures against
    pub fn public_key_base64(&self) -> String {
        self.keypair.public_key_base64()
    }
}

/// Verify a `DecisionEvent`'s signature against its embedded public key
///
/// Fails closed on malformed signature or key material.
pub fn verify_decision(event: &DecisionEvent) -> bool {
    let payload = event.signing_payload();
    verify_base64(
        canonical_json(&payload).as_bytes(),
        &event.signature,
        &event.signer_public_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use serde_json::json;

    fn signer() -> DecisionSigner {
        DecisionSigner::new(KeyPair::generate())
    }

    #[test]
    fn test_signed_decision_verifies() {
        let event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Approve,
            None,
            None,
        );
        assert!(verify_decision(&event));
    }

    #[test]
    fn test_signature_is_64_bytes() {
        let event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Reject,
            None,
            Some("too risky".to_string()),
        );
        let bytes = BASE64.decode(event.signature).unwrap();
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn test_modifications_are_covered_by_signature() {
        let mut event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Modify,
            Some(json!({"command": "rm -rf /tmp/x/safe"})),
            None,
        );
        assert!(verify_decision(&event));

        event.modifications = Some(json!({"command": "rm -rf /"}));
        assert!(!verify_decision(&event));
    }

    #[test]
    fn test_tampered_decision_kind_fails() {
        let mut event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Reject,
            None,
            None,
        );
        event.decision = DecisionKind::Approve;
        assert!(!verify_decision(&event));
    }

    #[test]
    fn test_wrong_signer_key_fails() {
        let mut event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Approve,
            None,
            None,
        );
        event.signer_public_key = signer().public_key_base64();
        assert!(!verify_decision(&event));
    }

    #[test]
    fn test_malformed_secret_is_key_error() {
        let result = DecisionSigner::from_secret_base64("dG9vLXNob3J0");
        assert!(matches!(
            result,
            Err(consentry_types::ConsentryError::KeyError { .. })
        ));
    }

    #[test]
    fn test_reason_is_not_signed() {
        // `reason` is advisory metadata, outside the signed payload.
        let mut event = signer().make_decision(
            EventId::from_string("p1"),
            DecisionKind::Approve,
            None,
            Some("fine".to_string()),
        );
        event.reason = Some("changed later".to_string());
        assert!(verify_decision(&event));
    }
}
