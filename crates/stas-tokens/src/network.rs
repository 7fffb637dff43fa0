//! Collaborator interfaces: where source transactions come from and where
//! finished transactions go.
//!
//! The engine itself never talks to a network. Callers implement these
//! traits over whatever node, indexer or broadcast service they use and
//! feed the results into the operation requests.

use stas_primitives::chainhash::Hash;
use stas_transaction::{Transaction, TransactionError};

use crate::error::TokenError;
use crate::types::{SourcedUtxo, Utxo};

/// Errors reported by collaborators.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The requested transaction is unknown to the source.
    #[error("transaction not found: {0}")]
    NotFound(String),

    /// The network refused a submitted transaction.
    #[error("rejected by network: {0}")]
    RejectedByNetwork(String),

    /// Fetched bytes do not parse as a transaction.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// A source of previously mined or accepted transactions.
pub trait ChainSource {
    /// Fetch the raw serialization of a transaction.
    fn fetch_raw_transaction(&self, txid: &Hash) -> Result<Vec<u8>, NetworkError>;

    /// Fetch and parse a transaction.
    fn fetch_transaction(&self, txid: &Hash) -> Result<Transaction, NetworkError> {
        let raw = self.fetch_raw_transaction(txid)?;
        Ok(Transaction::from_bytes(&raw)?)
    }
}

/// A sink for finished transactions.
pub trait Broadcaster {
    /// Submit a raw transaction, returning its txid on acceptance.
    ///
    /// # Returns
    /// `Err(NetworkError::RejectedByNetwork)` with the network's reason when
    /// the transaction is refused.
    fn submit(&self, raw_tx: &[u8]) -> Result<Hash, NetworkError>;
}

/// Look up output `vout` of `txid`.
pub fn fetch_utxo(source: &dyn ChainSource, txid: &Hash, vout: u32) -> Result<Utxo, TokenError> {
    let tx = source.fetch_transaction(txid)?;
    Utxo::from_transaction(&tx, vout)
}

/// Look up output `vout` of `txid` together with its raw source transaction,
/// as merges need.
pub fn fetch_sourced_utxo(
    source: &dyn ChainSource,
    txid: &Hash,
    vout: u32,
) -> Result<SourcedUtxo, TokenError> {
    let raw = source.fetch_raw_transaction(txid)?;
    let tx = Transaction::from_bytes(&raw)?;
    SourcedUtxo::new(Utxo::from_transaction(&tx, vout)?, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use stas_script::Script;
    use stas_transaction::{TransactionInput, TransactionOutput};

    struct Store(HashMap<Hash, Vec<u8>>);

    impl ChainSource for Store {
        fn fetch_raw_transaction(&self, txid: &Hash) -> Result<Vec<u8>, NetworkError> {
            self.0
                .get(txid)
                .cloned()
                .ok_or_else(|| NetworkError::NotFound(txid.to_string()))
        }
    }

    fn stored_tx() -> (Store, Transaction) {
        let mut tx = Transaction::new();
        tx.add_input(TransactionInput::new(Hash::new([0x07; 32]), 1));
        tx.add_output(TransactionOutput::new(1234, Script::p2pkh(&[0x33; 20])));
        let store = Store(HashMap::from([(tx.tx_id(), tx.to_bytes())]));
        (store, tx)
    }

    #[test]
    fn fetch_utxo_reads_the_output() {
        let (store, tx) = stored_tx();
        let utxo = fetch_utxo(&store, &tx.tx_id(), 0).unwrap();
        assert_eq!(utxo.txid, tx.tx_id());
        assert_eq!(utxo.satoshis, 1234);
        assert_eq!(utxo.locking_script, Script::p2pkh(&[0x33; 20]));
    }

    #[test]
    fn fetch_sourced_utxo_keeps_raw_bytes() {
        let (store, tx) = stored_tx();
        let sourced = fetch_sourced_utxo(&store, &tx.tx_id(), 0).unwrap();
        assert_eq!(sourced.source_tx(), &tx.to_bytes()[..]);
    }

    #[test]
    fn missing_transaction_and_output() {
        let (store, tx) = stored_tx();
        assert!(matches!(
            fetch_utxo(&store, &Hash::new([0xee; 32]), 0),
            Err(TokenError::Network(NetworkError::NotFound(_)))
        ));
        assert!(matches!(
            fetch_utxo(&store, &tx.tx_id(), 5),
            Err(TokenError::Transaction(_))
        ));
    }

    #[test]
    fn garbage_bytes_do_not_parse() {
        let txid = Hash::new([0x01; 32]);
        let store = Store(HashMap::from([(txid, vec![0x01, 0x02])]));
        assert!(matches!(
            store.fetch_transaction(&txid),
            Err(NetworkError::Transaction(_))
        ));
    }
}
