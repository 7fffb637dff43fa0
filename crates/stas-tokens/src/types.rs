//! Common types for token operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use stas_primitives::chainhash::Hash;
use stas_script::{Address, Script};
use stas_transaction::{Transaction, TransactionError, TransactionOutput};

use crate::error::TokenError;

/// A spendable output: a token output or a plain P2PKH funding output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Id of the transaction holding the output (internal byte order).
    pub txid: Hash,
    /// Output index within that transaction.
    pub vout: u32,
    /// The output's locking script.
    pub locking_script: Script,
    /// The output's value.
    pub satoshis: u64,
}

impl Utxo {
    /// Describe output `vout` of a transaction the caller already holds.
    pub fn from_transaction(tx: &Transaction, vout: u32) -> Result<Self, TokenError> {
        let output = tx.outputs.get(vout as usize).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "output index {} out of range (tx has {} outputs)",
                vout,
                tx.outputs.len()
            ))
        })?;
        Ok(Utxo {
            txid: tx.tx_id(),
            vout,
            locking_script: output.locking_script.clone(),
            satoshis: output.satoshis,
        })
    }

    pub(crate) fn to_output(&self) -> TransactionOutput {
        TransactionOutput::new(self.satoshis, self.locking_script.clone())
    }
}

/// A token output together with the raw transaction that created it.
///
/// Merge unlocking scripts carry the counterpart input's source transaction,
/// so merges take these instead of bare [`Utxo`]s. Construction checks that
/// the raw bytes hash to the txid and contain the described output.
#[derive(Debug, Clone)]
pub struct SourcedUtxo {
    utxo: Utxo,
    source_tx: Vec<u8>,
}

impl SourcedUtxo {
    /// Pair a UTXO with the raw bytes of its source transaction.
    pub fn new(utxo: Utxo, source_tx: Vec<u8>) -> Result<Self, TokenError> {
        if Hash::double_sha256(&source_tx) != utxo.txid {
            return Err(TokenError::MalformedScript(format!(
                "source transaction does not hash to {}",
                utxo.txid
            )));
        }
        let tx = Transaction::from_bytes(&source_tx)?;
        match tx.outputs.get(utxo.vout as usize) {
            Some(output)
                if output.satoshis == utxo.satoshis
                    && output.locking_script == utxo.locking_script => {}
            _ => {
                return Err(TokenError::MalformedScript(format!(
                    "source transaction output {} does not match the utxo",
                    utxo.vout
                )))
            }
        }
        Ok(SourcedUtxo { utxo, source_tx })
    }

    /// Build from output `vout` of a transaction the caller already holds.
    pub fn from_transaction(tx: &Transaction, vout: u32) -> Result<Self, TokenError> {
        Self::new(Utxo::from_transaction(tx, vout)?, tx.to_bytes())
    }

    /// The spendable output.
    pub fn utxo(&self) -> &Utxo {
        &self.utxo
    }

    /// Raw bytes of the transaction that created the output.
    pub fn source_tx(&self) -> &[u8] {
        &self.source_tx
    }
}

/// A token destination.
#[derive(Debug, Clone)]
pub struct Destination {
    /// The recipient address.
    pub address: Address,
    /// Satoshi amount to send.
    pub satoshis: u64,
}

/// An issuance destination, optionally carrying per-output data.
#[derive(Debug, Clone)]
pub struct IssueDestination {
    /// The recipient address.
    pub address: Address,
    /// Satoshi amount to issue.
    pub satoshis: u64,
    /// Extra data pushed after the symbol in this output's token script.
    pub data: Option<Vec<u8>>,
}

/// The kind of token operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenOperation {
    /// Commit a token schema and its backing pool on chain.
    Contract,
    /// Mint token outputs from the contract pool.
    Issue,
    /// Move a whole token output to a new holder.
    Transfer,
    /// Divide a token output among several holders.
    Split,
    /// Combine two token outputs of one holder.
    Merge,
    /// Combine two token outputs and divide the result in two.
    MergeSplit,
    /// Pay a token output back to the issuer.
    Redeem,
    /// Redeem part of a token output and split the remainder.
    RedeemSplit,
    /// Exchange token outputs between two holders.
    Swap,
}

impl TokenOperation {
    /// Whether the operation pays value back to the issuer.
    pub fn is_redeem(self) -> bool {
        matches!(self, TokenOperation::Redeem | TokenOperation::RedeemSplit)
    }

    /// Whether the operation divides token value and so needs a splittable token.
    pub fn divides(self) -> bool {
        matches!(
            self,
            TokenOperation::Split | TokenOperation::MergeSplit | TokenOperation::RedeemSplit
        )
    }
}

impl fmt::Display for TokenOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenOperation::Contract => "contract",
            TokenOperation::Issue => "issue",
            TokenOperation::Transfer => "transfer",
            TokenOperation::Split => "split",
            TokenOperation::Merge => "merge",
            TokenOperation::MergeSplit => "merge-split",
            TokenOperation::Redeem => "redeem",
            TokenOperation::RedeemSplit => "redeem-split",
            TokenOperation::Swap => "swap",
        };
        f.write_str(name)
    }
}
