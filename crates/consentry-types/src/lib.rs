//! Consentry Types - Canonical event and audit types
//!
//! This crate contains all foundational types for the Consentry approval
//! protocol with zero dependencies on other consentry crates:
//!
//! - Event types (PromptEvent, DecisionEvent, StatusEvent)
//! - The hash-chained AuditRecord
//! - The unified error type
//! - The MessagePack wire codec
//!
//! # Architectural Invariants
//!
//! 1. A `PromptEvent` nonce never repeats for the lifetime of the system
//! 2. A `DecisionEvent` is immutable once signed
//! 3. An `AuditRecord` is immutable once appended — no update, no delete
//! 4. Wire encoding (MessagePack) and canonical encoding (sorted-key JSON,
//!    owned by consentry-crypto) are distinct and never conflated

pub mod codec;
pub mod error;
pub mod events;
pub mod record;

pub use codec::*;
pub use error::*;
pub use events::*;
pub use record::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;

/// Version of the Consentry protocol schema
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// Current time as epoch milliseconds
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a fresh random nonce (24 bytes, base64-encoded)
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 24];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_unique() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_ne!(a, b);
    }

    #[test]
    fn test_nonce_decodes_to_24_bytes() {
        let nonce = generate_nonce();
        let bytes = BASE64.decode(nonce).unwrap();
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn test_timestamp_is_epoch_ms() {
        let ts = current_timestamp_ms();
        // Sanity: after 2020-01-01 and before 2100-01-01, in milliseconds.
        assert!(ts > 1_577_836_800_000);
        assert!(ts < 4_102_444_800_000);
    }
}
