//! Script chunk parsing and push encoding.
//!
//! A chunk is either an opcode or a data push with its payload. Token
//! scripts keep their metadata as a run of pushes after OP_RETURN, and
//! unlocking scripts are nothing but pushes, so the decoder here is strict:
//! a push that runs past the end of the script is an error, never a
//! truncated chunk.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The pushed bytes, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Return the pushed bytes, treating OP_0 as an empty push.
    pub fn push_bytes(&self) -> Option<&[u8]> {
        match (&self.data, self.op) {
            (Some(data), _) => Some(data.as_slice()),
            (None, OP_0) => Some(&[]),
            _ => None,
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// # Arguments
/// * `bytes` - The raw script bytes to decode.
///
/// # Returns
/// The parsed chunks, or `DataTooSmall` carrying the offset of the first
/// push whose length prefix or payload is truncated.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];
        let (header, length) = match op {
            OP_DATA_1..=OP_DATA_75 => (1, op as usize),
            OP_PUSHDATA1 => (2, read_len(bytes, pos, 1)?),
            OP_PUSHDATA2 => (3, read_len(bytes, pos, 2)?),
            OP_PUSHDATA4 => (5, read_len(bytes, pos, 4)?),
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                pos += 1;
                continue;
            }
        };
        let start = pos + header;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= bytes.len())
            .ok_or(ScriptError::DataTooSmall(pos))?;
        chunks.push(ScriptChunk {
            op,
            data: Some(bytes[start..end].to_vec()),
        });
        pos = end;
    }

    Ok(chunks)
}

fn read_len(bytes: &[u8], pos: usize, width: usize) -> Result<usize, ScriptError> {
    let field = bytes
        .get(pos + 1..pos + 1 + width)
        .ok_or(ScriptError::DataTooSmall(pos))?;
    let mut le = [0u8; 8];
    le[..width].copy_from_slice(field);
    Ok(u64::from_le_bytes(le) as usize)
}

/// Compute the minimal push prefix for a payload of the given length.
///
/// # Arguments
/// * `data_len` - The length of the data to be pushed.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` past the 4-byte length limit.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xFFFF_FFFF {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}
