//! MessagePack wire codec
//!
//! Events crossing a process boundary travel as self-describing MessagePack
//! (field names included). This is strictly a transport encoding: hashing and
//! signing use the canonical sorted-key encoding in consentry-crypto instead.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConsentryError, Result};

/// Encode a message as self-describing MessagePack
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(message).map_err(|e| ConsentryError::MalformedRecord {
        message: format!("encode failed: {}", e),
    })
}

/// Decode a message from MessagePack bytes
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| ConsentryError::MalformedRecord {
        message: format!("decode failed: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::*;

    #[test]
    fn test_prompt_roundtrip() {
        let prompt = PromptEvent::new(
            EventSource::new(Component::Agent, "s1"),
            ActionRequest::new(ActionType::Network, "curl https://example.com"),
            RiskLevel::Medium,
        );

        let bytes = encode(&prompt).unwrap();
        let back: PromptEvent = decode(&bytes).unwrap();
        assert_eq!(prompt, back);
    }

    #[test]
    fn test_decode_garbage_fails_typed() {
        let result: Result<PromptEvent> = decode(&[0xc1, 0x00, 0xff]);
        assert!(matches!(
            result,
            Err(ConsentryError::MalformedRecord { .. })
        ));
    }
}
