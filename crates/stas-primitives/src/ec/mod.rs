//! secp256k1 keys and ECDSA signatures.
//!
//! Thin wrappers around `k256` that fix the conventions transaction signing
//! relies on: compressed SEC1 public keys, RFC6979 nonces, low-S DER.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
