//! # Shared Crypto
//!
//! Cryptographic primitives used by block generation.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Header hashes, body proofs, stakeholder ids, key derivation |
//! | `signatures` | Ed25519 | Block signatures, delegation certificates, tx witnesses |
//!
//! Ed25519 signing is deterministic, so two generation runs over the same
//! keys and inputs produce bit-identical blocks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

pub use errors::CryptoError;
pub use hashing::{blake3_derive_key, blake3_hash, Blake3Hasher, Hash};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
