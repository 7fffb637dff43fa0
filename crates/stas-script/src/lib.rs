/// Script construction and classification.
///
/// Provides the `Script` byte newtype, opcode constants, push-data and
/// script-number encoding, chunk decoding, and Base58Check P2PKH addresses.

pub mod address;
pub mod chunk;
pub mod num;
pub mod opcodes;
pub mod script;

mod error;
pub use address::{Address, Network};
pub use chunk::ScriptChunk;
pub use error::ScriptError;
pub use script::Script;
