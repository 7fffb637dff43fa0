//! Cryptographic primitives and binary helpers for the STAS token engine.
//!
//! This crate provides the building blocks the upper layers sign and
//! serialize with:
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
//! - Chain hash type for transaction identification
//! - secp256k1 keys and low-S ECDSA signatures
//! - Variable-length integer encoding and little-endian reader/writer

pub mod chainhash;
pub mod ec;
pub mod hash;
pub mod util;

mod error;
pub use error::PrimitivesError;
