//! Consentry Crypto - Cryptographic primitives for the approval chain
//!
//! This crate provides:
//! - Ed25519 key pairs with base64 text encoding
//! - Detached signatures over caller-canonicalized bytes
//! - SHA-256 hashing and the chain-link hash
//! - The canonical sorted-key encoding used for all hashing and signing
//! - Decision signing (binding a human decision to a signer identity)
//!
//! # Security Invariant
//!
//! Verification fails closed: malformed keys or signatures return `false`,
//! they never panic.

pub mod canonical;
pub mod hash;
pub mod keys;
pub mod signature;
pub mod signer;

pub use canonical::*;
pub use hash::*;
pub use keys::*;
pub use signature::*;
pub use signer::*;
