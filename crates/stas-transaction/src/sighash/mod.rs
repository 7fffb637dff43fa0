//! Signature hash computation.
//!
//! Every token and funding input is signed over a BIP-143 style preimage
//! carrying the FORKID flag. Token covenants also push this preimage into
//! their unlocking script, so the raw preimage bytes are exposed as well as
//! their double-SHA256.
//!
//! See <https://github.com/bitcoin-sv/bitcoin-sv/blob/master/doc/abc/replay-protected-sighash.md#digest-algorithm>

use stas_primitives::hash::sha256d;
use stas_primitives::util::{BsvWriter, VarInt};

use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs.
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign no outputs.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Only commit to the signed input.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Replay-protection flag.
pub const SIGHASH_FORKID: u32 = 0x40;

/// ALL | FORKID, used for every input the token engine signs.
pub const SIGHASH_ALL_FORKID: u32 = SIGHASH_ALL | SIGHASH_FORKID;

/// Mask extracting the base type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// Preimage bytes that do not depend on the script code:
/// version, hashPrevouts, hashSequence, outpoint, value, nSequence,
/// hashOutputs, nLocktime, sighash type.
const PREIMAGE_FIXED_LEN: usize = 4 + 32 + 32 + 36 + 8 + 4 + 32 + 4 + 4;

/// Length of the preimage for a script code of `script_len` bytes.
pub fn preimage_len(script_len: usize) -> usize {
    PREIMAGE_FIXED_LEN + VarInt::from(script_len).length() + script_len
}

/// Double-SHA256 of the preimage: the 32-byte message signed by ECDSA.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `script_code` - Locking script of the output being spent.
/// * `sighash_type` - Combined flags, e.g. `SIGHASH_ALL_FORKID`.
/// * `satoshis` - Value of the output being spent.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, script_code, sighash_type, satoshis)?;
    Ok(sha256d(&preimage))
}

/// Build the preimage bytes for one input.
///
/// Layout:
/// 1. nVersion (4 bytes LE)
/// 2. hashPrevouts (32 bytes), zero under ANYONECANPAY
/// 3. hashSequence (32 bytes), zero under ANYONECANPAY, SINGLE or NONE
/// 4. outpoint (32 + 4 bytes)
/// 5. scriptCode (varint + script)
/// 6. value (8 bytes LE)
/// 7. nSequence (4 bytes LE)
/// 8. hashOutputs (32 bytes): all outputs, the matching output, or zero
/// 9. nLocktime (4 bytes LE)
/// 10. sighash type (4 bytes LE)
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<Vec<u8>, TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        ))
    })?;

    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;
    let base_type = sighash_type & SIGHASH_MASK;
    let commits_all_outputs = base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE;

    let hash_prevouts = if anyone_can_pay {
        [0u8; 32]
    } else {
        prevouts_hash(tx)
    };

    let hash_sequence = if !anyone_can_pay && commits_all_outputs {
        sequence_hash(tx)
    } else {
        [0u8; 32]
    };

    let hash_outputs = if commits_all_outputs {
        outputs_hash(tx, None)
    } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs.len() {
        outputs_hash(tx, Some(input_index))
    } else {
        [0u8; 32]
    };

    let mut writer = BsvWriter::with_capacity(preimage_len(script_code.len()));
    writer.write_u32_le(tx.version);
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    writer.write_bytes(input.source_txid.as_bytes());
    writer.write_u32_le(input.source_tx_out_index);
    writer.write_var_bytes(script_code);
    writer.write_u64_le(satoshis);
    writer.write_u32_le(input.sequence_number);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = BsvWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        writer.write_bytes(input.source_txid.as_bytes());
        writer.write_u32_le(input.source_tx_out_index);
    }
    sha256d(writer.as_bytes())
}

fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = BsvWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence_number);
    }
    sha256d(writer.as_bytes())
}

/// `None` hashes every output; `Some(n)` only output `n`.
fn outputs_hash(tx: &Transaction, only: Option<usize>) -> [u8; 32] {
    let mut writer = BsvWriter::new();
    match only {
        None => tx.outputs.iter().for_each(|o| o.write_to(&mut writer)),
        Some(n) => tx.outputs[n].write_to(&mut writer),
    }
    sha256d(writer.as_bytes())
}
