//! Engine configuration and protocol limits.

use serde::{Deserialize, Serialize};

/// Shortest allowed token symbol, in bytes.
pub const MIN_SYMBOL_SIZE: usize = 1;

/// Longest allowed token symbol, in bytes.
pub const MAX_SYMBOL_SIZE: usize = 128;

/// Satoshis in one coin.
pub const SATS_PER_BITCOIN: u64 = 100_000_000;

/// Default fee rate in satoshis per 1000 bytes.
pub const DEFAULT_FEE_RATE: u64 = 500;

/// Default minimum value of any output.
pub const DEFAULT_DUST_LIMIT: u64 = 1;

/// Most token outputs a split may produce.
pub const MAX_SPLIT_OUTPUTS: usize = 4;

/// Fee and dust settings applied to every operation.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fee rate in satoshis per 1000 bytes.
    pub fee_rate: u64,
    /// Minimum value of any output.
    pub dust_limit: u64,
}

impl EngineConfig {
    /// Fee for a transaction of `size` bytes, rounded up.
    pub fn fee_for_size(&self, size: usize) -> u64 {
        (size as u64).saturating_mul(self.fee_rate).div_ceil(1000)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fee_rate: DEFAULT_FEE_RATE,
            dust_limit: DEFAULT_DUST_LIMIT,
        }
    }
}
