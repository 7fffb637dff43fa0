//! Transaction input referencing a previous output.

use stas_primitives::chainhash::Hash;
use stas_primitives::util::{BsvReader, BsvWriter, VarInt};
use stas_script::Script;

use crate::output::TransactionOutput;
use crate::TransactionError;

/// Sequence number for a final input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A transaction input.
///
/// The output being spent is not part of the wire format, but signing needs
/// its value and locking script, so it can be attached with
/// `set_source_output`.
#[derive(Clone, Debug)]
pub struct TransactionInput {
    /// Id of the transaction holding the spent output (internal byte order).
    pub source_txid: Hash,

    /// Index of the spent output within that transaction.
    pub source_tx_out_index: u32,

    /// Sequence number.
    pub sequence_number: u32,

    /// The unlocking script, once signed.
    pub unlocking_script: Option<Script>,

    source_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// Create an unsigned input spending `source_txid:vout`.
    pub fn new(source_txid: Hash, vout: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index: vout,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: None,
            source_output: None,
        }
    }

    /// Read an input in wire format.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let txid: [u8; 32] = reader.read_array().map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {}", e))
        })?;

        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;

        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {}", e))
        })?;

        let script_bytes = reader.read_bytes(script_len.0 as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {}", e))
        })?;

        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        Ok(TransactionInput {
            source_txid: Hash::new(txid),
            source_tx_out_index,
            sequence_number,
            unlocking_script: (!script_bytes.is_empty()).then(|| Script::from_bytes(script_bytes)),
            source_output: None,
        })
    }

    /// Write the input in wire format. A missing unlocking script is
    /// written as an empty one.
    pub fn write_to(&self, writer: &mut BsvWriter) {
        writer.write_bytes(self.source_txid.as_bytes());
        writer.write_u32_le(self.source_tx_out_index);
        match &self.unlocking_script {
            Some(script) => writer.write_var_bytes(script.to_bytes()),
            None => writer.write_varint(VarInt(0)),
        }
        writer.write_u32_le(self.sequence_number);
    }

    /// Attach the output this input spends.
    pub fn set_source_output(&mut self, output: Option<TransactionOutput>) {
        self.source_output = output;
    }

    /// The output this input spends, if attached.
    pub fn source_tx_output(&self) -> Option<&TransactionOutput> {
        self.source_output.as_ref()
    }

    /// Value of the spent output, if attached.
    pub fn source_tx_satoshis(&self) -> Option<u64> {
        self.source_output.as_ref().map(|o| o.satoshis)
    }

    /// Locking script of the spent output, if attached.
    pub fn source_tx_script(&self) -> Option<&Script> {
        self.source_output.as_ref().map(|o| &o.locking_script)
    }
}
