//! Unlocking scripts for token and P2PKH inputs.
//!
//! A covenant input proves the shape of the spending transaction to the
//! script it unlocks, so ahead of the usual `<sig> <pubkey>` it pushes:
//!
//! ```text
//! (<amount> <pkh>)...          one pair per output, in order
//! <vout> <txid> | OP_0 OP_0    the funding outpoint, or none
//! <vout> <piece>... <count>    the other merge input's source tx, or OP_0
//! <preimage>                   the signature preimage of this input
//! ```
//!
//! Amounts, indexes and counts are minimal little-endian sign-magnitude
//! script numbers.

use stas_primitives::chainhash::Hash;
use stas_primitives::ec::PublicKey;
use stas_script::opcodes::OP_FALSE;
use stas_script::Script;
use stas_transaction::template::p2pkh;

use crate::error::TokenError;
use crate::script::template::BODY_OFFSET;
use crate::types::SourcedUtxo;

/// Upper bound on a DER signature plus its sighash byte.
pub const MAX_SIGNATURE_LEN: usize = 73;

/// One output as the covenant sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputHint {
    /// Output value.
    pub satoshis: u64,
    /// Public key hash the output pays.
    pub holder_hash: [u8; 20],
}

/// Outpoint of the funding input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingPointer {
    /// Output index of the funding UTXO.
    pub vout: u32,
    /// Transaction id of the funding UTXO (internal byte order).
    pub txid: Hash,
}

/// The counterpart input of a merge, cut into the pieces the covenant
/// reassembles around its own script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSegment {
    /// Output index of the counterpart token UTXO.
    pub vout: u32,
    /// Source transaction pieces, last piece first.
    pub pieces: Vec<Vec<u8>>,
}

impl MergeSegment {
    /// Cut the source transaction of `counterpart` around its token script.
    pub fn from_sourced(counterpart: &SourcedUtxo) -> Result<Self, TokenError> {
        let utxo = counterpart.utxo();
        Ok(MergeSegment {
            vout: utxo.vout,
            pieces: merge_pieces(counterpart.source_tx(), utxo.locking_script.to_bytes())?,
        })
    }
}

/// Split a raw transaction on every occurrence of a token script minus its
/// holder prefix, returning the pieces in reverse order.
pub fn merge_pieces(source_tx: &[u8], locking_script: &[u8]) -> Result<Vec<Vec<u8>>, TokenError> {
    let pattern = locking_script.get(BODY_OFFSET..).unwrap_or_default();
    if pattern.is_empty() {
        return Err(TokenError::MalformedScript(
            "merge input has no covenant body".into(),
        ));
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos + pattern.len() <= source_tx.len() {
        if &source_tx[pos..pos + pattern.len()] == pattern {
            pieces.push(source_tx[start..pos].to_vec());
            pos += pattern.len();
            start = pos;
        } else {
            pos += 1;
        }
    }
    if pieces.is_empty() {
        return Err(TokenError::MalformedScript(
            "source transaction does not contain the token script".into(),
        ));
    }
    pieces.push(source_tx[start..].to_vec());
    pieces.reverse();
    Ok(pieces)
}

/// Pushes a covenant input carries ahead of its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CovenantHint {
    /// Every output of the spending transaction, in order.
    pub outputs: Vec<OutputHint>,
    /// The funding outpoint; `None` in zero-fee mode.
    pub funding: Option<FundingPointer>,
    /// The counterpart of a merge.
    pub merge: Option<MergeSegment>,
    /// Signature preimage of the input being unlocked.
    pub preimage: Vec<u8>,
}

/// What an unlocking script carries besides signature and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockingHint {
    /// Plain P2PKH: nothing.
    PayToKeyHash,
    /// STAS covenant pushes.
    Covenant(CovenantHint),
}

/// Assemble an unlocking script: hint pushes, then signature, then the
/// compressed public key.
pub fn build_unlocking_script(
    signature: &[u8],
    public_key: &PublicKey,
    hint: &UnlockingHint,
) -> Result<Script, TokenError> {
    let hint = match hint {
        UnlockingHint::PayToKeyHash => return Ok(p2pkh::unlocking_script(signature, public_key)?),
        UnlockingHint::Covenant(hint) => hint,
    };
    let mut script = Script::new();
    for output in &hint.outputs {
        script.append_number(output.satoshis);
        script.append_push_data(&output.holder_hash)?;
    }
    match &hint.funding {
        Some(pointer) => {
            script.append_number(u64::from(pointer.vout));
            script.append_push_data(pointer.txid.as_bytes())?;
        }
        None => script.append_opcodes(&[OP_FALSE, OP_FALSE])?,
    }
    match &hint.merge {
        Some(segment) => {
            script.append_number(u64::from(segment.vout));
            for piece in &segment.pieces {
                script.append_push_data(piece)?;
            }
            script.append_number(segment.pieces.len() as u64);
        }
        None => script.append_opcodes(&[OP_FALSE])?,
    }
    script.append_push_data(&hint.preimage)?;
    script.append_push_data(signature)?;
    script.append_push_data(&public_key.to_compressed())?;
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stas_primitives::ec::PrivateKey;
    use stas_script::opcodes::{OP_0, OP_1};

    fn key() -> PublicKey {
        PrivateKey::from_hex("14b2c42482bbc5c76632f1b216421f6cebf27fd7909dbaefc17a5e3bcc4ad30a")
            .unwrap()
            .pub_key()
    }

    #[test]
    fn p2pkh_unlocking_is_sig_and_key() {
        let script = build_unlocking_script(&[0x30; 71], &key(), &UnlockingHint::PayToKeyHash).unwrap();
        let chunks = script.chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data.as_deref(), Some(&[0x30; 71][..]));
        assert_eq!(chunks[1].data.as_ref().map(Vec::len), Some(33));
        assert_eq!(script, p2pkh::unlocking_script(&[0x30; 71], &key()).unwrap());
    }

    #[test]
    fn covenant_push_order() {
        let hint = UnlockingHint::Covenant(CovenantHint {
            outputs: vec![
                OutputHint { satoshis: 7000, holder_hash: [0xaa; 20] },
                OutputHint { satoshis: 1, holder_hash: [0xbb; 20] },
            ],
            funding: Some(FundingPointer { vout: 2, txid: Hash::new([0x5a; 32]) }),
            merge: None,
            preimage: vec![0x01; 200],
        });
        let script = build_unlocking_script(&[0x30; 72], &key(), &hint).unwrap();
        let chunks = script.chunks().unwrap();
        assert_eq!(chunks.len(), 10);
        assert_eq!(chunks[0].data.as_deref(), Some(&[0x58, 0x1b][..]));
        assert_eq!(chunks[1].data.as_deref(), Some(&[0xaa; 20][..]));
        assert_eq!(chunks[2].op, OP_1);
        assert_eq!(chunks[3].data.as_deref(), Some(&[0xbb; 20][..]));
        assert_eq!(chunks[4].data.as_deref(), Some(&[0x02][..]));
        assert_eq!(chunks[5].data.as_deref(), Some(&[0x5a; 32][..]));
        assert_eq!(chunks[6].op, OP_0);
        assert_eq!(chunks[7].data.as_ref().map(Vec::len), Some(200));
        assert_eq!(chunks[8].data.as_ref().map(Vec::len), Some(72));
    }

    #[test]
    fn zero_fee_funding_pointer() {
        let hint = UnlockingHint::Covenant(CovenantHint {
            outputs: vec![OutputHint { satoshis: 10, holder_hash: [0xaa; 20] }],
            funding: None,
            merge: None,
            preimage: vec![0x01; 10],
        });
        let script = build_unlocking_script(&[0x30; 72], &key(), &hint).unwrap();
        let chunks = script.chunks().unwrap();
        assert_eq!(chunks[2].op, OP_0);
        assert_eq!(chunks[3].op, OP_0);
        assert_eq!(chunks[4].op, OP_0);
    }

    #[test]
    fn merge_segment_pushes() {
        let hint = UnlockingHint::Covenant(CovenantHint {
            outputs: vec![],
            funding: None,
            merge: Some(MergeSegment { vout: 1, pieces: vec![vec![1, 2], vec![3]] }),
            preimage: vec![0x01; 10],
        });
        let script = build_unlocking_script(&[0x30; 72], &key(), &hint).unwrap();
        let chunks = script.chunks().unwrap();
        // OP_0 OP_0 <vout> <piece> <piece> <count> <preimage> <sig> <key>
        assert_eq!(chunks.len(), 9);
        assert_eq!(chunks[2].op, OP_1);
        assert_eq!(chunks[3].data.as_deref(), Some(&[1, 2][..]));
        assert_eq!(chunks[4].data.as_deref(), Some(&[3][..]));
        assert_eq!(chunks[5].data.as_deref(), Some(&[2][..]));
    }

    #[test]
    fn pieces_split_and_reverse() {
        let mut script = vec![0u8; 3];
        script.extend_from_slice(&[0xaa; 20]);
        script.extend_from_slice(b"BODY");
        let raw: Vec<u8> = [&b"head"[..], &b"BODY"[..], &b"mid"[..], &b"BODY"[..], &b"tail"[..]].concat();
        let pieces = merge_pieces(&raw, &script).unwrap();
        assert_eq!(pieces, vec![b"tail".to_vec(), b"mid".to_vec(), b"head".to_vec()]);
    }

    #[test]
    fn pieces_require_the_script() {
        let mut script = vec![0u8; 23];
        script.extend_from_slice(b"BODY");
        assert!(merge_pieces(b"nothing here", &script).is_err());
        assert!(merge_pieces(b"BODY", &[0u8; 10]).is_err());
    }
}
