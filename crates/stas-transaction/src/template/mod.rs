//! Script templates for standard outputs.

pub mod p2pkh;
