/// Transaction model, serialization and signature hashing.
///
/// Provides the Transaction type with inputs and outputs, binary/hex
/// serialization, transaction ids, the BIP-143 FORKID signature preimage,
/// and the P2PKH script template.

pub mod input;
pub mod output;
pub mod sighash;
pub mod template;
pub mod transaction;

mod error;
pub use error::TransactionError;
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use transaction::Transaction;
