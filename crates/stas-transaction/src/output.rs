//! Transaction output with satoshi value and locking script.

use stas_primitives::util::{BsvReader, BsvWriter, VarInt};
use stas_script::Script;

use crate::TransactionError;

/// A transaction output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Value in satoshis.
    pub satoshis: u64,

    /// The script that must be satisfied to spend this output.
    pub locking_script: Script,

    /// Whether this output returns leftover funding to the payer.
    /// Not serialized.
    pub change: bool,
}

impl TransactionOutput {
    /// Create an output paying `satoshis` to `locking_script`.
    pub fn new(satoshis: u64, locking_script: Script) -> Self {
        TransactionOutput {
            satoshis,
            locking_script,
            change: false,
        }
    }

    /// Create an output flagged as change.
    pub fn change(satoshis: u64, locking_script: Script) -> Self {
        TransactionOutput {
            satoshis,
            locking_script,
            change: true,
        }
    }

    /// Read an output in wire format.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshis: {}", e))
        })?;

        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {}", e))
        })?;

        let script_bytes = reader.read_bytes(script_len.0 as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading locking script: {}", e))
        })?;

        Ok(TransactionOutput::new(satoshis, Script::from_bytes(script_bytes)))
    }

    /// Write the output in wire format: value, script length, script.
    pub fn write_to(&self, writer: &mut BsvWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    /// Serialized size of this output in bytes.
    pub fn serialized_len(&self) -> usize {
        8 + VarInt::from(self.locking_script.len()).length() + self.locking_script.len()
    }
}
