#![deny(missing_docs)]

//! STAS token SDK.
//!
//! Re-exports the engine crates for single-crate usage.

pub use stas_primitives as primitives;
pub use stas_script as script;
pub use stas_transaction as transaction;
pub use stas_tokens as tokens;
