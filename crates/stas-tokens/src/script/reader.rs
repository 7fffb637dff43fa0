//! Strict recognizers for token, payout and contract scripts.

use stas_script::chunk::decode_script;
use stas_script::opcodes::OP_RETURN;
use stas_script::{Script, ScriptChunk};

use crate::error::TokenError;
use crate::schema::TokenSchema;
use crate::script::builder::{append_data_section, TokenAttributes};
use crate::script::template::*;
use stas_script::script::P2PKH_SCRIPT_LEN;

/// Fields recovered from a token locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTokenScript {
    /// Public key hash the output is locked to.
    pub holder_hash: [u8; 20],
    /// Issuer (redemption) public key hash.
    pub issuer_hash: [u8; 20],
    /// Whether the token may be divided.
    pub splittable: bool,
    /// Symbol, if the data section carries one.
    pub symbol: Option<String>,
    /// Data pushes after the symbol.
    pub data: Vec<Vec<u8>>,
    /// True for a redemption payout (plain P2PKH, holder == issuer).
    pub is_redeemable: bool,
}

impl ParsedTokenScript {
    /// The token class attributes, without the holder.
    pub fn attributes(&self) -> TokenAttributes {
        TokenAttributes {
            issuer_hash: self.issuer_hash,
            splittable: self.splittable,
            symbol: self.symbol.clone(),
            data: self.data.clone(),
        }
    }
}

/// Parse a token script or a redemption payout.
///
/// A P2PKH script is read as a payout: its hash is both holder and issuer.
/// Anything that is neither is `MalformedScript`.
pub fn parse_locking_script(bytes: &[u8]) -> Result<ParsedTokenScript, TokenError> {
    let script = Script::from_bytes(bytes);
    if script.is_p2pkh() {
        let pkh = script.public_key_hash()?;
        return Ok(ParsedTokenScript {
            holder_hash: pkh,
            issuer_hash: pkh,
            splittable: false,
            symbol: None,
            data: Vec::new(),
            is_redeemable: true,
        });
    }
    parse_token_script(bytes)
}

/// Parse a STAS token script; payouts and other scripts are rejected.
pub fn parse_token_script(bytes: &[u8]) -> Result<ParsedTokenScript, TokenError> {
    let template = template_bytes()?;
    if bytes.len() <= TEMPLATE_LEN
        || bytes[..HOLDER_OFFSET] != STAS_V2_PREFIX
        || bytes[BODY_OFFSET..ISSUER_OFFSET] != template[BODY_OFFSET..ISSUER_OFFSET]
    {
        return Err(TokenError::MalformedScript(
            "not a STAS token script".into(),
        ));
    }

    let mut holder_hash = [0u8; 20];
    holder_hash.copy_from_slice(&bytes[HOLDER_OFFSET..BODY_OFFSET]);
    let mut issuer_hash = [0u8; 20];
    issuer_hash.copy_from_slice(&bytes[ISSUER_OFFSET..TEMPLATE_LEN]);

    let attrs = parse_data_section(issuer_hash, &bytes[TEMPLATE_LEN..])?;
    Ok(ParsedTokenScript {
        holder_hash,
        issuer_hash,
        splittable: attrs.splittable,
        symbol: attrs.symbol,
        data: attrs.data,
        is_redeemable: false,
    })
}

/// Check whether bytes are a well-formed STAS token script.
pub fn is_token_script(bytes: &[u8]) -> bool {
    parse_token_script(bytes).is_ok()
}

fn parse_data_section(issuer_hash: [u8; 20], section: &[u8]) -> Result<TokenAttributes, TokenError> {
    let chunks = decode_script(section)
        .map_err(|e| TokenError::MalformedScript(format!("data section: {e}")))?;
    let mut pushes = chunks.iter().map(push_of);

    let splittable = match pushes.next() {
        Some(Ok([FLAG_SPLITTABLE])) => true,
        Some(Ok([FLAG_NOT_SPLITTABLE])) => false,
        Some(Ok(other)) => {
            return Err(TokenError::MalformedScript(format!(
                "flags must be one byte 00 or 01, got {}",
                hex::encode(other)
            )))
        }
        Some(Err(e)) => return Err(e),
        None => return Err(TokenError::MalformedScript("missing flags".into())),
    };

    let symbol = match pushes.next().transpose()? {
        Some([]) => None,
        Some(raw) => Some(
            String::from_utf8(raw.to_vec())
                .map_err(|_| TokenError::MalformedScript("symbol is not UTF-8".into()))?,
        ),
        None => None,
    };
    let data = pushes
        .map(|push| push.map(<[u8]>::to_vec))
        .collect::<Result<Vec<_>, _>>()?;

    let attrs = TokenAttributes {
        issuer_hash,
        splittable,
        symbol,
        data,
    };

    // Only the canonical encoding is accepted, so parse and build agree.
    let mut canonical = Script::new();
    append_data_section(&mut canonical, &attrs)
        .map_err(|e| TokenError::MalformedScript(format!("data section: {e}")))?;
    if canonical.to_bytes() != section {
        return Err(TokenError::MalformedScript(
            "data section is not minimally encoded".into(),
        ));
    }
    Ok(attrs)
}

fn push_of(chunk: &ScriptChunk) -> Result<&[u8], TokenError> {
    chunk.push_bytes().ok_or_else(|| {
        TokenError::MalformedScript(format!(
            "opcode 0x{:02x} in data section",
            chunk.op
        ))
    })
}

/// Parse a contract commitment into the issuer hash and the schema.
pub fn parse_contract_script(bytes: &[u8]) -> Result<([u8; 20], TokenSchema), TokenError> {
    if bytes.len() <= P2PKH_SCRIPT_LEN + 1 || bytes[P2PKH_SCRIPT_LEN] != OP_RETURN {
        return Err(TokenError::MalformedScript(
            "not a contract commitment".into(),
        ));
    }
    let issuer_hash = Script::from_bytes(&bytes[..P2PKH_SCRIPT_LEN])
        .public_key_hash()
        .map_err(|_| TokenError::MalformedScript("contract does not pay an issuer".into()))?;

    let chunks = decode_script(&bytes[P2PKH_SCRIPT_LEN + 1..])
        .map_err(|e| TokenError::MalformedScript(format!("contract data: {e}")))?;
    let payload = match chunks.as_slice() {
        [chunk] => push_of(chunk)?,
        _ => {
            return Err(TokenError::MalformedScript(
                "contract must carry exactly one schema push".into(),
            ))
        }
    };

    let schema = TokenSchema::from_bytes(payload)?;
    schema.validate()?;
    if schema.issuer_hash()? != issuer_hash {
        return Err(TokenError::InconsistentIssuer(format!(
            "schema token id {} does not match contract issuer {}",
            schema.token_id,
            hex::encode(issuer_hash)
        )));
    }
    Ok((issuer_hash, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::builder::{build_contract_script, build_locking_script};
    use crate::types::TokenOperation;

    const ISSUER: [u8; 20] = [0x22; 20];
    const HOLDER: [u8; 20] = [0x11; 20];

    fn token_script(splittable: bool) -> Vec<u8> {
        let attrs = TokenAttributes::new(ISSUER, splittable).with_symbol("TST");
        build_locking_script(&attrs, &HOLDER, TokenOperation::Issue)
            .unwrap()
            .into_bytes()
    }

    #[test]
    fn parse_token_fields() {
        let parsed = parse_locking_script(&token_script(true)).unwrap();
        assert_eq!(parsed.holder_hash, HOLDER);
        assert_eq!(parsed.issuer_hash, ISSUER);
        assert!(parsed.splittable);
        assert_eq!(parsed.symbol.as_deref(), Some("TST"));
        assert!(parsed.data.is_empty());
        assert!(!parsed.is_redeemable);

        let parsed = parse_token_script(&token_script(false)).unwrap();
        assert!(!parsed.splittable);
    }

    #[test]
    fn parse_payout() {
        let parsed = parse_locking_script(Script::p2pkh(&ISSUER).to_bytes()).unwrap();
        assert!(parsed.is_redeemable);
        assert_eq!(parsed.holder_hash, ISSUER);
        assert_eq!(parsed.issuer_hash, ISSUER);
        assert!(parse_token_script(Script::p2pkh(&ISSUER).to_bytes()).is_err());
    }

    #[test]
    fn reject_template_without_data() {
        let bytes = token_script(true);
        assert!(parse_token_script(&bytes[..TEMPLATE_LEN]).is_err());
    }

    #[test]
    fn reject_tampered_body() {
        let mut bytes = token_script(true);
        bytes[700] ^= 0xff;
        assert!(matches!(
            parse_locking_script(&bytes),
            Err(TokenError::MalformedScript(_))
        ));
        assert!(!is_token_script(&bytes));
    }

    #[test]
    fn reject_bad_flags() {
        let mut bytes = token_script(true);
        bytes[TEMPLATE_LEN + 1] = 0x02;
        assert!(parse_token_script(&bytes).is_err());

        let mut bytes = token_script(true);
        bytes.truncate(TEMPLATE_LEN);
        bytes.extend_from_slice(&[0x02, 0x00, 0x00]);
        assert!(parse_token_script(&bytes).is_err());
    }

    #[test]
    fn reject_truncated_push() {
        let mut bytes = token_script(true);
        bytes.truncate(TEMPLATE_LEN);
        bytes.extend_from_slice(&[0x01, 0x00, 0x05, b'a']);
        assert!(parse_token_script(&bytes).is_err());
    }

    #[test]
    fn reject_opcode_in_data() {
        let mut bytes = token_script(true);
        bytes.push(OP_RETURN);
        assert!(parse_token_script(&bytes).is_err());
    }

    #[test]
    fn reject_non_minimal_push() {
        let mut bytes = token_script(true);
        bytes.truncate(TEMPLATE_LEN);
        // OP_PUSHDATA1 used for a one-byte flags push
        bytes.extend_from_slice(&[0x4c, 0x01, 0x00]);
        assert!(parse_token_script(&bytes).is_err());
    }

    #[test]
    fn reject_other_scripts() {
        assert!(parse_locking_script(&[]).is_err());
        assert!(parse_locking_script(&[0x6a, 0x01, 0x00]).is_err());
        let mut near_p2pkh = Script::p2pkh(&ISSUER).into_bytes();
        near_p2pkh.push(0x00);
        assert!(parse_locking_script(&near_p2pkh).is_err());
    }

    #[test]
    fn contract_parse_rejects_garbage() {
        let mut bytes = Script::p2pkh(&ISSUER).into_bytes();
        bytes.push(OP_RETURN);
        let mut payload = Script::new();
        payload.append_push_data(b"not json").unwrap();
        bytes.extend_from_slice(payload.to_bytes());
        assert!(matches!(
            parse_contract_script(&bytes),
            Err(TokenError::Json(_))
        ));
        assert!(parse_contract_script(Script::p2pkh(&ISSUER).to_bytes()).is_err());
    }

    #[test]
    fn contract_parse_rejects_trailing_push() {
        let schema = crate::schema::tests::sample_schema(&ISSUER);
        let mut script = build_contract_script(&ISSUER, &schema).unwrap();
        script.append_push_data(b"extra").unwrap();
        assert!(parse_contract_script(script.to_bytes()).is_err());
    }
}
