//! Consentry Guard - Replay and staleness protection
//!
//! Rejects prompts that are stale, future-dated, or resubmitted. The guard is
//! the single mutable cache in the core: a bounded window of recently seen
//! nonces behind one lock, with atomic check-and-insert so two concurrent
//! callers can never both admit the same nonce.
//!
//! A nonce older than the retention window is no longer tracked and could in
//! principle be replayed; the timestamp check already rejects it on age
//! grounds, which is why eviction is safe.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, warn};

use consentry_types::{ConsentryError, PromptEvent, Result};

/// Default maximum clock skew / nonce retention, in milliseconds
pub const DEFAULT_MAX_AGE_MS: i64 = 60_000;

/// Accept iff `timestamp` is within `max_age_ms` of now, in either direction
///
/// Future-dated and stale prompts are rejected symmetrically: clock-skew abuse
/// and replay of captured prompts are both age violations.
pub fn validate_timestamp(timestamp: i64, max_age_ms: i64) -> bool {
    let now = consentry_types::current_timestamp_ms();
    (now - timestamp).abs() <= max_age_ms
}

/// Tracks recently seen nonces and enforces the timestamp window
pub struct ReplayGuard {
    max_age_ms: i64,
    /// nonce -> first-seen time (epoch ms)
    seen: Mutex<HashMap<String, i64>>,
}

impl ReplayGuard {
    /// Create a guard with the default 60s window
    pub fn new() -> Self {
        Self::with_max_age(DEFAULT_MAX_AGE_MS)
    }

    /// Create a guard with a custom retention window
    pub fn with_max_age(max_age_ms: i64) -> Self {
        Self {
            max_age_ms,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Admit a nonce if it has not been seen within the retention window
    ///
    /// Check-and-insert happens under one lock acquisition. Expired nonces are
    /// evicted on the way in, which bounds memory to the admission rate times
    /// the window.
    pub fn admit(&self, nonce: &str) -> Result<()> {
        let now = consentry_types::current_timestamp_ms();
        let mut seen = self.seen.lock();

        seen.retain(|_, first_seen| now - *first_seen <= self.max_age_ms);

        if seen.contains_key(nonce) {
            warn!(nonce, "replay detected");
            return Err(ConsentryError::ReplayDetected {
                nonce: nonce.to_string(),
            });
        }

        seen.insert(nonce.to_string(), now);
        debug!(nonce, tracked = seen.len(), "nonce admitted");
        Ok(())
    }

    /// Full admission check for a prompt: schema, timestamp, then nonce
    ///
    /// A rejected prompt must never reach the audit chain; callers append only
    /// after this returns `Ok`.
    pub fn admit_prompt(&self, prompt: &PromptEvent) -> Result<()> {
        prompt.validate()?;

        if !validate_timestamp(prompt.timestamp, self.max_age_ms) {
            warn!(
                prompt_id = %prompt.id,
                timestamp = prompt.timestamp,
                "prompt outside timestamp window"
            );
            return Err(ConsentryError::StaleTimestamp {
                timestamp: prompt.timestamp,
                max_age_ms: self.max_age_ms,
            });
        }

        self.admit(&prompt.nonce)
    }

    /// Number of nonces currently tracked
    pub fn tracked(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new()
    }
}
