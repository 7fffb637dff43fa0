//! Pay-to-Public-Key-Hash (P2PKH) unlocking template.
//!
//! Unlocking: `<DER signature + sighash byte> <compressed pubkey>`.

use stas_primitives::ec::PublicKey;
use stas_script::Script;

use crate::TransactionError;

/// Assemble a P2PKH unlocking script from a finished signature.
///
/// # Arguments
/// * `signature` - DER signature with the sighash byte appended.
/// * `public_key` - The key whose hash the spent output is locked to.
pub fn unlocking_script(signature: &[u8], public_key: &PublicKey) -> Result<Script, TransactionError> {
    let mut script = Script::new();
    script.append_push_data(signature)?;
    script.append_push_data(&public_key.to_compressed())?;
    Ok(script)
}
