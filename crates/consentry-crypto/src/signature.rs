//! Detached Ed25519 signatures
//!
//! The caller canonicalizes the message before signing; these functions work
//! on exact byte sequences only.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature as Ed25519Signature, Signer, Verifier, VerifyingKey};

use crate::keys::KeyPair;

/// Sign a message, returning the detached 64-byte signature
pub fn sign(message: &[u8], keypair: &KeyPair) -> [u8; 64] {
    keypair.signing_key().sign(message).to_bytes()
}

/// Sign a message, returning the signature as base64
pub fn sign_base64(message: &[u8], keypair: &KeyPair) -> String {
    BASE64.encode(sign(message, keypair))
}

/// Verify a detached signature
///
/// Fails closed: wrong-length signatures or keys, or keys that are not valid
/// curve points, return `false` rather than erroring.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };

    let signature = Ed25519Signature::from_bytes(&sig_bytes);
    verifying_key.verify(message, &signature).is_ok()
}

/// Verify a base64 signature against a base64 public key
pub fn verify_base64(message: &[u8], signature: &str, public_key: &str) -> bool {
    let Ok(sig_bytes) = BASE64.decode(signature) else {
        return false;
    };
    let Ok(key_bytes) = BASE64.decode(public_key) else {
        return false;
    };

    verify(message, &sig_bytes, &key_bytes)
}
