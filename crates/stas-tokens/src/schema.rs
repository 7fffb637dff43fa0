//! Token schema carried by the contract commitment.

use serde::{Deserialize, Serialize};

use crate::config::{MAX_SYMBOL_SIZE, MIN_SYMBOL_SIZE};
use crate::error::TokenError;

/// Immutable metadata describing a token class.
///
/// Serialized as camelCase JSON inside the contract commitment script.
/// The token id is the hex public key hash of the issuer, which is also
/// the redemption hash embedded in every token script of the class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenSchema {
    /// Human-readable name of the token.
    pub name: String,
    /// Issuer public key hash, 40 hex characters.
    pub token_id: String,
    /// Protocol identifier, e.g. "STAS".
    pub protocol_id: String,
    /// Short symbol.
    pub symbol: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Image URL or data URI.
    #[serde(default)]
    pub image: String,
    /// Total supply in token units.
    pub total_supply: u64,
    /// Display decimals.
    #[serde(default)]
    pub decimals: u8,
    /// Satoshis backing each token unit.
    pub satoshis_per_token: u64,
    /// Application-defined properties.
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl TokenSchema {
    /// Check the schema against the protocol limits.
    pub fn validate(&self) -> Result<(), TokenError> {
        let symbol_len = self.symbol.len();
        if !(MIN_SYMBOL_SIZE..=MAX_SYMBOL_SIZE).contains(&symbol_len) {
            return Err(TokenError::InvalidSchema(format!(
                "symbol is {} bytes, must be {}..={}",
                symbol_len, MIN_SYMBOL_SIZE, MAX_SYMBOL_SIZE
            )));
        }
        if self.satoshis_per_token == 0 {
            return Err(TokenError::InvalidSchema(
                "satoshis per token must be at least 1".into(),
            ));
        }
        if self.total_supply == 0 {
            return Err(TokenError::InvalidSchema(
                "total supply must be at least 1".into(),
            ));
        }
        self.max_satoshis()?;
        self.issuer_hash()?;
        Ok(())
    }

    /// Satoshis backing the whole supply.
    pub fn max_satoshis(&self) -> Result<u64, TokenError> {
        self.total_supply
            .checked_mul(self.satoshis_per_token)
            .ok_or_else(|| {
                TokenError::InvalidSchema(format!(
                    "supply {} at {} satoshis per token overflows",
                    self.total_supply, self.satoshis_per_token
                ))
            })
    }

    /// The issuer public key hash decoded from the token id.
    pub fn issuer_hash(&self) -> Result<[u8; 20], TokenError> {
        let bytes = hex::decode(&self.token_id)
            .map_err(|e| TokenError::InvalidSchema(format!("token id: {e}")))?;
        <[u8; 20]>::try_from(bytes.as_slice()).map_err(|_| {
            TokenError::InvalidSchema(format!(
                "token id must be 40 hex characters, got {}",
                self.token_id.len()
            ))
        })
    }

    /// Serialize the schema to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TokenError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a schema from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
