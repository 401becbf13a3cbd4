//! Ed25519 key pairs and base64 key encoding
//!
//! Keys crossing a boundary are base64 text. Binary form is 32 bytes for a
//! public key and 64 bytes for a secret key (seed followed by public key, the
//! layout collaborators exchange).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use consentry_types::{ConsentryError, Result};

/// Public key length in bytes
pub const PUBLIC_KEY_LEN: usize = 32;
/// Secret key length in bytes (seed + public key)
pub const SECRET_KEY_LEN: usize = 64;

/// A key pair for signing operations
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a new random key pair from the OS secure random source
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();

        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Create from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let verifying_key = signing_key.verifying_key();

        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Create from a base64 secret key (64-byte seed+public layout, or a bare
    /// 32-byte seed)
    ///
    /// A 64-byte key whose public half does not match its seed is rejected:
    /// signing with it would produce signatures that never verify.
    pub fn from_secret_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64.decode(encoded).map_err(|e| ConsentryError::KeyError {
            message: format!("secret key is not valid base64: {}", e),
        })?;

        if bytes.len() != 32 && bytes.len() != SECRET_KEY_LEN {
            return Err(ConsentryError::KeyError {
                message: format!("secret key must be 32 or 64 bytes, got {}", bytes.len()),
            });
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);

        let pair = Self::from_seed(&seed);

        if bytes.len() == SECRET_KEY_LEN && bytes[32..] != pair.verifying_key.to_bytes() {
            return Err(ConsentryError::KeyError {
                message: "secret key public half does not match seed".to_string(),
            });
        }

        Ok(pair)
    }

    /// Get the signing key (private - never expose!)
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Get the verifying key (public)
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Get the public key as base64
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.verifying_key.to_bytes())
    }

    /// Get the secret key as base64 (seed + public key, for secure storage only!)
    pub fn secret_key_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(SECRET_KEY_LEN);
        bytes.extend_from_slice(&self.signing_key.to_bytes());
        bytes.extend_from_slice(&self.verifying_key.to_bytes());
        BASE64.encode(bytes)
    }
}

/// Encode key bytes as base64
pub fn key_to_base64(key: &[u8]) -> String {
    BASE64.encode(key)
}

/// Decode base64 key material, checking it has a plausible key length
pub fn key_from_base64(encoded: &str) -> Result<Vec<u8>> {
    let bytes = BASE64.decode(encoded).map_err(|e| ConsentryError::KeyError {
        message: format!("key is not valid base64: {}", e),
    })?;

    if bytes.len() != PUBLIC_KEY_LEN && bytes.len() != SECRET_KEY_LEN {
        return Err(ConsentryError::KeyError {
            message: format!("key must be 32 or 64 bytes, got {}", bytes.len()),
        });
    }

    Ok(bytes)
}
