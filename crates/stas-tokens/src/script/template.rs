//! The STAS v2 covenant template and its byte layout.
//!
//! Layout of a token locking script:
//!
//! ```text
//! 0..3        OP_DUP OP_HASH160 OP_DATA_20
//! 3..23       holder public key hash
//! 23..1409    covenant body
//! 1409        OP_RETURN
//! 1410        OP_DATA_20
//! 1411..1431  issuer (redemption) public key hash
//! 1431..      data section: <flags> [<symbol> [<data>...]]
//! ```

use crate::error::TokenError;

/// Script prefix shared with P2PKH: OP_DUP OP_HASH160 OP_DATA_20.
pub const STAS_V2_PREFIX: [u8; 3] = [0x76, 0xa9, 0x14];

/// Offset of the holder public key hash.
pub const HOLDER_OFFSET: usize = 3;

/// Length of a public key hash.
pub const PKH_LEN: usize = 20;

/// Offset where the covenant body begins.
pub const BODY_OFFSET: usize = HOLDER_OFFSET + PKH_LEN;

/// Offset of the OP_RETURN separating code from data.
pub const OP_RETURN_OFFSET: usize = 1409;

/// Offset of the issuer public key hash.
pub const ISSUER_OFFSET: usize = 1411;

/// Length of the template before the data section.
pub const TEMPLATE_LEN: usize = ISSUER_OFFSET + PKH_LEN;

/// Flags byte of a splittable token.
pub const FLAG_SPLITTABLE: u8 = 0x00;

/// Flags byte of a token that must move whole.
pub const FLAG_NOT_SPLITTABLE: u8 = 0x01;

/// The template with zeroed holder and issuer hashes.
pub const STAS_V2_TEMPLATE_HEX: &str = concat!(
    "76a914",
    "0000000000000000000000000000000000000000",
    "88ac6976aa607f5f7f7c5e7f7c5d7f7c5c7f7c5b7f7c5a7f7c597f7c587f7c577f7c567f7c557f7c547f7c537f7c527f7c517f7c7e7e7e7e7e7e7e7e7e7e7e7e",
    "7e7e7e7c5f7f7c5e7f7c5d7f7c5c7f7c5b7f7c5a7f7c597f7c587f7c577f7c567f7c557f7c547f7c537f7c527f7c517f7c7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e",
    "7e01007e818b21414136d08c5ed2bf3ba048afe6dcaebafeffffffffffffffffffffffffffffff007d976e7c5296a06394677768827601249301307c7e230220",
    "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798027e7c7e7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f",
    "7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c",
    "8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c82",
    "76638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c8276638c687f7c7e7e",
    "7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e01417e21038ff83d8cf12121491609c4939dc11c4aa35503508fe432dc5a5c190560",
    "8b9218ad547f7701207f01207f7701247f517f7801007e8102fd00a063546752687f7801007e817f727e7b01177f777b557a766471567a577a786354807e7e67",
    "6d68aa880067765158a569765187645294567a5379587a7e7e78637c8c7c53797e577a7e6878637c8c7c53797e577a7e6878637c8c7c53797e577a7e6878637c",
    "8c7c53797e577a7e6878637c8c7c53797e577a7e6867567a6876aa587a7d54807e577a597a5a7a786354807e6f7e7eaa727c7e676d6e7eaa7c687b7eaa587a7d",
    "877663516752687c72879b69537a647500687c7b547f77517f7853a0916901247f77517f7c01007e817602fc00a06302fd00a063546752687f7c01007e816854",
    "937f77788c6301247f77517f7c01007e817602fc00a06302fd00a063546752687f7c01007e816854937f777852946301247f77517f7c01007e817602fc00a063",
    "02fd00a063546752687f7c01007e816854937f77686877517f7c52797d8b9f7c53a09b91697c76638c7c587f77517f7c01007e817602fc00a06302fd00a06354",
    "6752687f7c01007e81687f777c6876638c7c587f77517f7c01007e817602fc00a06302fd00a063546752687f7c01007e81687f777c6863587f77517f7c01007e",
    "817602fc00a06302fd00a063546752687f7c01007e81687f7768587f517f7801007e817602fc00a06302fd00a063546752687f7801007e81727e7b7b687f7553",
    "7f7c0376a9148801147f775379645579887567726881766968789263556753687a76026c057f7701147f8263517f7c766301007e817f7c6775006877686b5379",
    "92635379528763547a6b547a6b677c6b567a6b537a7c717c71716868547a587f7c81547a557964936755795187637c686b687c547f7701207f75748c7a766976",
    "5880748c7a76567a876457790376a9147e7c7e557967041976a9147c7e0288ac687e7e5579636c766976748c7a9d58807e6c0376a9147e748c7a7e6c7e7e676c",
    "766b8263828c007c80517e846864745aa0637c748c7a76697d937b7b58807e56790376a9147e748c7a7e55797e7e6868686c567a5187637500678263828c007c",
    "80517e846868647459a0637c748c7a76697d937b7b58807e55790376a9147e748c7a7e55797e7e687459a0637c748c7a76697d937b7b58807e55790376a9147e",
    "748c7a7e55797e7e68687c537a9d547963557958807e041976a91455797e0288ac7e7e68aa87726d77776a14",
    "0000000000000000000000000000000000000000",
);

/// Decode the template into a fresh buffer.
pub(crate) fn template_bytes() -> Result<Vec<u8>, TokenError> {
    let bytes = hex::decode(STAS_V2_TEMPLATE_HEX)
        .map_err(|e| TokenError::MalformedScript(format!("template decode error: {e}")))?;
    if bytes.len() != TEMPLATE_LEN {
        return Err(TokenError::MalformedScript(format!(
            "template is {} bytes, expected {}",
            bytes.len(),
            TEMPLATE_LEN
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stas_script::opcodes::{OP_DATA_20, OP_RETURN};

    #[test]
    fn template_layout() {
        let bytes = template_bytes().unwrap();
        assert_eq!(bytes.len(), 1431);
        assert_eq!(bytes[..3], STAS_V2_PREFIX);
        assert_eq!(bytes[HOLDER_OFFSET..BODY_OFFSET], [0u8; 20]);
        assert_eq!(bytes[OP_RETURN_OFFSET], OP_RETURN);
        assert_eq!(bytes[OP_RETURN_OFFSET + 1], OP_DATA_20);
        assert_eq!(bytes[ISSUER_OFFSET..TEMPLATE_LEN], [0u8; 20]);
    }

    #[test]
    fn body_starts_with_checksig_marker() {
        let bytes = template_bytes().unwrap();
        // OP_EQUALVERIFY OP_CHECKSIG OP_VERIFY OP_DUP OP_HASH256 OP_16
        assert_eq!(bytes[BODY_OFFSET..BODY_OFFSET + 6], [0x88, 0xac, 0x69, 0x76, 0xaa, 0x60]);
    }
}
