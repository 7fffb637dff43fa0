//! Script number encoding.
//!
//! Amounts, output indexes and piece counts inside unlocking scripts are
//! little-endian sign-magnitude integers using the fewest bytes possible.
//! Zero and one are written as the small-integer opcodes OP_0 and OP_1;
//! every other value is a data push.

use crate::opcodes::{OP_0, OP_1};
use crate::ScriptError;

/// Minimal little-endian sign-magnitude bytes for a non-negative value.
///
/// Zero encodes as the empty byte string.
pub fn encode_script_num(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    let mut v = value;
    while v > 0 {
        out.push((v & 0xff) as u8);
        v >>= 8;
    }
    if out.last().is_some_and(|b| b & 0x80 != 0) {
        out.push(0x00);
    }
    out
}

/// Decode a little-endian sign-magnitude script number of at most 8 bytes.
pub fn decode_script_num(bytes: &[u8]) -> Result<i64, ScriptError> {
    if bytes.len() > 8 {
        return Err(ScriptError::InvalidScript(format!(
            "script number of {} bytes is too long",
            bytes.len()
        )));
    }
    let Some((&last, _)) = bytes.split_last() else {
        return Ok(0);
    };
    let mut magnitude: u64 = 0;
    for (i, b) in bytes.iter().enumerate() {
        let b = if i == bytes.len() - 1 { b & 0x7f } else { *b };
        magnitude |= (b as u64) << (8 * i);
    }
    let magnitude = i64::try_from(magnitude)
        .map_err(|_| ScriptError::InvalidScript("script number out of range".to_string()))?;
    Ok(if last & 0x80 != 0 { -magnitude } else { magnitude })
}

/// Full script encoding of a value: the opcode for 0 or 1, else a push.
pub fn script_num_chunk(value: u64) -> Vec<u8> {
    match value {
        0 => vec![OP_0],
        1 => vec![OP_1],
        _ => {
            let body = encode_script_num(value);
            let mut out = Vec::with_capacity(body.len() + 1);
            out.push(body.len() as u8);
            out.extend_from_slice(&body);
            out
        }
    }
}
