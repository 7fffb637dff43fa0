//! Builders for token, payout and contract locking scripts.

use stas_script::opcodes::OP_RETURN;
use stas_script::Script;

use crate::config::{MAX_SYMBOL_SIZE, MIN_SYMBOL_SIZE};
use crate::error::TokenError;
use crate::schema::TokenSchema;
use crate::script::reader::ParsedTokenScript;
use crate::script::template::*;
use crate::types::TokenOperation;

/// Everything in a token script except the holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAttributes {
    /// Issuer (redemption) public key hash; identifies the token class.
    pub issuer_hash: [u8; 20],
    /// Whether the token may be divided.
    pub splittable: bool,
    /// Token symbol pushed after the flags.
    pub symbol: Option<String>,
    /// Extra data pushes after the symbol.
    pub data: Vec<Vec<u8>>,
}

impl TokenAttributes {
    /// Attributes with no symbol and no data.
    pub fn new(issuer_hash: [u8; 20], splittable: bool) -> Self {
        TokenAttributes {
            issuer_hash,
            splittable,
            symbol: None,
            data: Vec::new(),
        }
    }

    /// Set the symbol.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Append a data push.
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data.push(data);
        self
    }

    fn flags(&self) -> u8 {
        if self.splittable {
            FLAG_SPLITTABLE
        } else {
            FLAG_NOT_SPLITTABLE
        }
    }
}

/// Build the locking script a token output carries after `op`.
///
/// Continuation kinds produce the STAS template locked to `holder`. Redeem
/// kinds produce the issuer payout, a plain P2PKH whose holder must be the
/// issuer. `Contract` has no token script.
///
/// # Arguments
/// * `attrs` - Issuer, flags, symbol and data of the token class
/// * `holder` - Public key hash the output is locked to
/// * `op` - The operation producing the output
pub fn build_locking_script(
    attrs: &TokenAttributes,
    holder: &[u8; 20],
    op: TokenOperation,
) -> Result<Script, TokenError> {
    match op {
        TokenOperation::Contract => Err(TokenError::MalformedScript(
            "the contract commitment is not a token script".into(),
        )),
        _ if op.is_redeem() => {
            if holder != &attrs.issuer_hash {
                return Err(TokenError::InconsistentIssuer(format!(
                    "redemption payout to {} but issuer is {}",
                    hex::encode(holder),
                    hex::encode(attrs.issuer_hash)
                )));
            }
            Ok(Script::p2pkh(holder))
        }
        _ => build_stas_script(attrs, holder),
    }
}

/// Carry a consumed token script over to a new holder.
///
/// Issuer hash, flags, symbol and data are copied from `prior` unchanged.
pub fn continue_locking_script(
    prior: &ParsedTokenScript,
    new_holder: &[u8; 20],
    op: TokenOperation,
) -> Result<Script, TokenError> {
    if prior.is_redeemable {
        return Err(TokenError::MalformedScript(
            "a redemption payout no longer carries tokens".into(),
        ));
    }
    build_locking_script(&prior.attributes(), new_holder, op)
}

fn build_stas_script(attrs: &TokenAttributes, holder: &[u8; 20]) -> Result<Script, TokenError> {
    let mut bytes = template_bytes()?;
    bytes[HOLDER_OFFSET..BODY_OFFSET].copy_from_slice(holder);
    bytes[ISSUER_OFFSET..TEMPLATE_LEN].copy_from_slice(&attrs.issuer_hash);

    let mut script = Script::from(bytes);
    append_data_section(&mut script, attrs)?;
    Ok(script)
}

/// Append `<flags> [<symbol> [<data>...]]`.
///
/// A token with data but no symbol gets an empty symbol push so the data
/// never shifts into the symbol slot.
pub(crate) fn append_data_section(
    script: &mut Script,
    attrs: &TokenAttributes,
) -> Result<(), TokenError> {
    script.append_push_data(&[attrs.flags()])?;
    match &attrs.symbol {
        Some(symbol) => {
            if !(MIN_SYMBOL_SIZE..=MAX_SYMBOL_SIZE).contains(&symbol.len()) {
                return Err(TokenError::InvalidSchema(format!(
                    "symbol is {} bytes, must be {}..={}",
                    symbol.len(),
                    MIN_SYMBOL_SIZE,
                    MAX_SYMBOL_SIZE
                )));
            }
            script.append_push_data(symbol.as_bytes())?;
        }
        None if !attrs.data.is_empty() => script.append_push_data(&[])?,
        None => {}
    }
    for item in &attrs.data {
        script.append_push_data(item)?;
    }
    Ok(())
}

/// Build the contract commitment: P2PKH to the issuer, then
/// `OP_RETURN <schema JSON>`.
pub fn build_contract_script(
    issuer_hash: &[u8; 20],
    schema: &TokenSchema,
) -> Result<Script, TokenError> {
    schema.validate()?;
    if &schema.issuer_hash()? != issuer_hash {
        return Err(TokenError::InconsistentIssuer(format!(
            "schema token id {} does not match issuer {}",
            schema.token_id,
            hex::encode(issuer_hash)
        )));
    }
    let mut script = Script::p2pkh(issuer_hash);
    script.append_opcodes(&[OP_RETURN])?;
    script.append_push_data(&schema.to_bytes()?)?;
    Ok(script)
}
