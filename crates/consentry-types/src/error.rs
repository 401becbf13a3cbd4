//! Error types for Consentry
//!
//! Every rejection in the core is a hard, typed failure. Nothing is retried
//! internally and a rejected event never reaches the audit chain.

use thiserror::Error;

/// Result type for Consentry operations
pub type Result<T> = std::result::Result<T, ConsentryError>;

/// Consentry error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsentryError {
    /// Signature did not verify, or key/signature material has the wrong shape
    #[error("Invalid signature: {message}")]
    InvalidSignature { message: String },

    /// Hash mismatch or prev_hash discontinuity found while walking the chain
    #[error("Audit chain broken at record {at}")]
    ChainBroken { at: usize },

    /// Nonce already seen within the retention window
    #[error("Replay detected: nonce {nonce} already seen")]
    ReplayDetected { nonce: String },

    /// Timestamp outside the allowed skew window (past or future)
    #[error("Stale timestamp {timestamp}: outside {max_age_ms}ms window")]
    StaleTimestamp { timestamp: i64, max_age_ms: i64 },

    /// Required field missing or wrong type
    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },

    /// Key material malformed (wrong length or not a valid curve point)
    #[error("Key error: {message}")]
    KeyError { message: String },
}

impl ConsentryError {
    /// Shorthand for a malformed-record error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }
}
