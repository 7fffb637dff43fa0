//! STAS transaction factories.
//!
//! Pure functions that build complete, signed transactions for every token
//! operation after the contract: issue, transfer, split, merge,
//! merge-split, redeem, redeem-split and swap.
//!
//! All of them share one layout: token inputs first, the optional funding
//! input last; token outputs (and any redemption payout) first, the
//! optional funding change last. Without a funding UTXO the transaction is
//! built in zero-fee mode.

use stas_script::Address;
use stas_transaction::Transaction;

use crate::config::{EngineConfig, MAX_SPLIT_OUTPUTS};
use crate::error::TokenError;
use crate::factory::draft::{require_signer, Draft, UnlockKind};
use crate::script::builder::{build_locking_script, continue_locking_script, TokenAttributes};
use crate::script::reader::{parse_contract_script, parse_token_script, ParsedTokenScript};
use crate::script::unlocking::MergeSegment;
use crate::signer::InputSigner;
use crate::types::{Destination, IssueDestination, SourcedUtxo, TokenOperation, Utxo};
use crate::util::satoshis_to_tokens;
use crate::validate::checked_sum;

// -----------------------------------------------------------------------
// Request structs
// -----------------------------------------------------------------------

/// Request to issue tokens from a contract commitment.
pub struct IssueRequest<'a> {
    /// The contract commitment output.
    pub contract_utxo: Utxo,
    /// Signer for the contract output (the issuer).
    pub issuer: Option<&'a dyn InputSigner>,
    /// Token outputs to create; amounts must sum to the contract pool.
    pub destinations: Vec<IssueDestination>,
    /// Whether the issued tokens may be split later.
    pub splittable: bool,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Request to move a whole token output to a new holder.
pub struct TransferRequest<'a> {
    /// The token UTXO being transferred.
    pub token_utxo: Utxo,
    /// Signer for the token UTXO (its holder).
    pub owner: Option<&'a dyn InputSigner>,
    /// The new holder.
    pub destination: Address,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Request to split a token output among up to four holders.
pub struct SplitRequest<'a> {
    /// The token UTXO being split.
    pub token_utxo: Utxo,
    /// Signer for the token UTXO.
    pub owner: Option<&'a dyn InputSigner>,
    /// Split destinations; amounts must sum to the token value.
    pub destinations: Vec<Destination>,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Request to merge two token outputs of one holder.
pub struct MergeRequest<'a> {
    /// The two token UTXOs with their source transactions.
    pub token_utxos: [SourcedUtxo; 2],
    /// Signer for both token UTXOs.
    pub owner: Option<&'a dyn InputSigner>,
    /// Holder of the merged output.
    pub destination: Address,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Request to merge two token outputs and split the result in two.
pub struct MergeSplitRequest<'a> {
    /// The two token UTXOs with their source transactions.
    pub token_utxos: [SourcedUtxo; 2],
    /// Signer for both token UTXOs.
    pub owner: Option<&'a dyn InputSigner>,
    /// The two destinations; amounts must sum to the merged value.
    pub destinations: [Destination; 2],
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Request to pay a token output back to its issuer.
pub struct RedeemRequest<'a> {
    /// The token UTXO being redeemed.
    pub token_utxo: Utxo,
    /// Signer for the token UTXO.
    pub owner: Option<&'a dyn InputSigner>,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Request to redeem part of a token output and split the rest.
///
/// The redeemed amount is whatever the destinations leave of the token
/// value.
pub struct RedeemSplitRequest<'a> {
    /// The token UTXO being redeemed.
    pub token_utxo: Utxo,
    /// Signer for the token UTXO.
    pub owner: Option<&'a dyn InputSigner>,
    /// Token outputs for the remainder, at most three.
    pub destinations: Vec<Destination>,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Request to exchange token outputs between two holders of one token class.
pub struct SwapRequest<'a> {
    /// Token UTXO of the first holder.
    pub first: Utxo,
    /// Signer for the first token UTXO.
    pub first_owner: Option<&'a dyn InputSigner>,
    /// Token UTXO of the second holder.
    pub second: Utxo,
    /// Signer for the second token UTXO.
    pub second_owner: Option<&'a dyn InputSigner>,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

const COVENANT: UnlockKind = UnlockKind::Covenant { merge: None };

fn parse_token_utxo(utxo: &Utxo) -> Result<ParsedTokenScript, TokenError> {
    parse_token_script(utxo.locking_script.to_bytes())
}

fn check_splittable(token: &ParsedTokenScript, op: TokenOperation) -> Result<(), TokenError> {
    if op.divides() && !token.splittable {
        return Err(TokenError::NotSplittable);
    }
    Ok(())
}

/// Check a destination count and that every amount is positive.
fn check_destinations(destinations: &[Destination], max: usize) -> Result<(), TokenError> {
    if destinations.is_empty() || destinations.len() > max {
        return Err(TokenError::InvalidDestination(format!(
            "expected 1..={} destinations, got {}",
            max,
            destinations.len()
        )));
    }
    if let Some(dest) = destinations.iter().find(|dest| dest.satoshis == 0) {
        return Err(TokenError::InvalidAmount(format!(
            "zero amount for {}",
            dest.address
        )));
    }
    Ok(())
}

/// Both inputs of a merge must share issuer, data section and holder.
fn parse_merge_inputs(
    token_utxos: &[SourcedUtxo; 2],
) -> Result<(ParsedTokenScript, ParsedTokenScript), TokenError> {
    let first = parse_token_utxo(token_utxos[0].utxo())?;
    let second = parse_token_utxo(token_utxos[1].utxo())?;
    if first.issuer_hash != second.issuer_hash {
        return Err(TokenError::InconsistentIssuer(format!(
            "cannot merge tokens of {} with tokens of {}",
            hex::encode(first.issuer_hash),
            hex::encode(second.issuer_hash)
        )));
    }
    if first.attributes() != second.attributes() {
        return Err(TokenError::MalformedScript(
            "merged token utxos carry different data sections".into(),
        ));
    }
    if first.holder_hash != second.holder_hash {
        return Err(TokenError::HolderMismatch(
            "merged token utxos must share one holder".into(),
        ));
    }
    Ok((first, second))
}

/// Add both merge inputs, each carrying the other's source transaction.
fn add_merge_inputs(
    draft: &mut Draft<'_>,
    token_utxos: &[SourcedUtxo; 2],
    holder: &[u8; 20],
) -> Result<u64, TokenError> {
    let [first, second] = token_utxos;
    let first_kind = UnlockKind::Covenant {
        merge: Some(MergeSegment::from_sourced(second)?),
    };
    let second_kind = UnlockKind::Covenant {
        merge: Some(MergeSegment::from_sourced(first)?),
    };
    draft.add_owner_input(first.utxo(), first_kind, 0, holder, true)?;
    draft.add_owner_input(second.utxo(), second_kind, 0, holder, true)?;
    checked_sum([first.utxo().satoshis, second.utxo().satoshis])
}

// -----------------------------------------------------------------------
// Factory functions
// -----------------------------------------------------------------------

/// Build an issue transaction.
///
/// # Transaction structure
/// - Input 0: contract commitment (P2PKH part, signed by the issuer)
/// - Input 1: funding UTXO (P2PKH), if any
/// - Outputs 0..N-1: STAS token outputs to destinations
/// - Output N: funding change, if any
pub fn build_issue_tx(
    request: &IssueRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let issuer = require_signer(request.issuer, "issuer")?;
    let (issuer_hash, schema) = parse_contract_script(request.contract_utxo.locking_script.to_bytes())?;

    if request.destinations.is_empty() {
        return Err(TokenError::InvalidDestination(
            "at least one destination required".into(),
        ));
    }
    let mut units = 0u64;
    for dest in &request.destinations {
        if dest.satoshis == 0 {
            return Err(TokenError::InvalidAmount(format!(
                "zero amount for {}",
                dest.address
            )));
        }
        units = checked_sum([units, satoshis_to_tokens(dest.satoshis, schema.satoshis_per_token)?])?;
    }
    if units > schema.total_supply {
        return Err(TokenError::InvalidAmount(format!(
            "issuing {} tokens exceeds total supply {}",
            units, schema.total_supply
        )));
    }

    let mut draft = Draft::new(TokenOperation::Issue, vec![issuer])
        .with_supply_cap(schema.max_satoshis()?);
    draft.add_owner_input(
        &request.contract_utxo,
        UnlockKind::PayToKeyHash,
        0,
        &issuer_hash,
        true,
    )?;

    let attrs = TokenAttributes::new(issuer_hash, request.splittable).with_symbol(schema.symbol.clone());
    for dest in &request.destinations {
        let mut dest_attrs = attrs.clone();
        if let Some(data) = &dest.data {
            dest_attrs = dest_attrs.with_data(data.clone());
        }
        let script = build_locking_script(
            &dest_attrs,
            &dest.address.public_key_hash,
            TokenOperation::Issue,
        )?;
        draft.add_token_output(dest.satoshis, script)?;
    }

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

/// Build a transfer transaction.
///
/// # Transaction structure
/// - Input 0: token UTXO (covenant, signed by the holder)
/// - Input 1: funding UTXO (P2PKH), if any
/// - Output 0: STAS token output to the new holder
/// - Output 1: funding change, if any
pub fn build_transfer_tx(
    request: &TransferRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let owner = require_signer(request.owner, "token owner")?;
    let token = parse_token_utxo(&request.token_utxo)?;

    let mut draft = Draft::new(TokenOperation::Transfer, vec![owner]);
    draft.add_owner_input(&request.token_utxo, COVENANT, 0, &token.holder_hash, true)?;
    draft.add_token_output(
        request.token_utxo.satoshis,
        continue_locking_script(
            &token,
            &request.destination.public_key_hash,
            TokenOperation::Transfer,
        )?,
    )?;

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

/// Build a split transaction.
///
/// # Transaction structure
/// - Input 0: token UTXO (covenant)
/// - Input 1: funding UTXO (P2PKH), if any
/// - Outputs 0..N-1: STAS token outputs, 1 to 4
/// - Output N: funding change, if any
pub fn build_split_tx(
    request: &SplitRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let owner = require_signer(request.owner, "token owner")?;
    let token = parse_token_utxo(&request.token_utxo)?;
    check_splittable(&token, TokenOperation::Split)?;
    check_destinations(&request.destinations, MAX_SPLIT_OUTPUTS)?;

    let mut draft = Draft::new(TokenOperation::Split, vec![owner]);
    draft.add_owner_input(&request.token_utxo, COVENANT, 0, &token.holder_hash, true)?;
    for dest in &request.destinations {
        draft.add_token_output(
            dest.satoshis,
            continue_locking_script(&token, &dest.address.public_key_hash, TokenOperation::Split)?,
        )?;
    }

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

/// Build a merge transaction.
///
/// # Transaction structure
/// - Inputs 0-1: token UTXOs (covenant, each carrying the other's source tx)
/// - Input 2: funding UTXO (P2PKH), if any
/// - Output 0: merged STAS token output
/// - Output 1: funding change, if any
pub fn build_merge_tx(
    request: &MergeRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let owner = require_signer(request.owner, "token owner")?;
    let (token, _) = parse_merge_inputs(&request.token_utxos)?;

    let mut draft = Draft::new(TokenOperation::Merge, vec![owner]);
    let total = add_merge_inputs(&mut draft, &request.token_utxos, &token.holder_hash)?;
    draft.add_token_output(
        total,
        continue_locking_script(
            &token,
            &request.destination.public_key_hash,
            TokenOperation::Merge,
        )?,
    )?;

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

/// Build a merge-split transaction.
///
/// # Transaction structure
/// - Inputs 0-1: token UTXOs (covenant, each carrying the other's source tx)
/// - Input 2: funding UTXO (P2PKH), if any
/// - Outputs 0-1: STAS token outputs to the two destinations
/// - Output 2: funding change, if any
pub fn build_merge_split_tx(
    request: &MergeSplitRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let owner = require_signer(request.owner, "token owner")?;
    let (token, _) = parse_merge_inputs(&request.token_utxos)?;
    check_splittable(&token, TokenOperation::MergeSplit)?;
    check_destinations(&request.destinations, 2)?;

    let mut draft = Draft::new(TokenOperation::MergeSplit, vec![owner]);
    add_merge_inputs(&mut draft, &request.token_utxos, &token.holder_hash)?;
    for dest in &request.destinations {
        draft.add_token_output(
            dest.satoshis,
            continue_locking_script(
                &token,
                &dest.address.public_key_hash,
                TokenOperation::MergeSplit,
            )?,
        )?;
    }

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

/// Build a redeem transaction.
///
/// # Transaction structure
/// - Input 0: token UTXO (covenant)
/// - Input 1: funding UTXO (P2PKH), if any
/// - Output 0: P2PKH payout to the issuer, worth the token value
/// - Output 1: funding change, if any
pub fn build_redeem_tx(
    request: &RedeemRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let owner = require_signer(request.owner, "token owner")?;
    let token = parse_token_utxo(&request.token_utxo)?;

    let mut draft = Draft::new(TokenOperation::Redeem, vec![owner]);
    draft.add_owner_input(&request.token_utxo, COVENANT, 0, &token.holder_hash, true)?;
    draft.add_token_output(
        request.token_utxo.satoshis,
        continue_locking_script(&token, &token.issuer_hash, TokenOperation::Redeem)?,
    )?;

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

/// Build a redeem-split transaction.
///
/// # Transaction structure
/// - Input 0: token UTXO (covenant)
/// - Input 1: funding UTXO (P2PKH), if any
/// - Output 0: P2PKH payout to the issuer (token value minus destinations)
/// - Outputs 1..=N: STAS token outputs, 1 to 3
/// - Output N+1: funding change, if any
pub fn build_redeem_split_tx(
    request: &RedeemSplitRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let owner = require_signer(request.owner, "token owner")?;
    let token = parse_token_utxo(&request.token_utxo)?;
    check_splittable(&token, TokenOperation::RedeemSplit)?;
    check_destinations(&request.destinations, MAX_SPLIT_OUTPUTS - 1)?;

    let kept = checked_sum(request.destinations.iter().map(|dest| dest.satoshis))?;
    let redeemed = request
        .token_utxo
        .satoshis
        .checked_sub(kept)
        .filter(|redeemed| *redeemed > 0)
        .ok_or_else(|| {
            TokenError::InvalidAmount(format!(
                "destinations take {} of {} satoshis, leaving nothing to redeem",
                kept, request.token_utxo.satoshis
            ))
        })?;

    let mut draft = Draft::new(TokenOperation::RedeemSplit, vec![owner]);
    draft.add_owner_input(&request.token_utxo, COVENANT, 0, &token.holder_hash, true)?;
    draft.add_token_output(
        redeemed,
        continue_locking_script(&token, &token.issuer_hash, TokenOperation::RedeemSplit)?,
    )?;
    for dest in &request.destinations {
        draft.add_token_output(
            dest.satoshis,
            continue_locking_script(&token, &dest.address.public_key_hash, TokenOperation::Split)?,
        )?;
    }

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

/// Build a swap transaction.
///
/// # Transaction structure
/// - Input 0: first holder's token UTXO (covenant)
/// - Input 1: second holder's token UTXO (covenant)
/// - Input 2: funding UTXO (P2PKH), if any
/// - Output 0: first input's tokens to the second holder
/// - Output 1: second input's tokens to the first holder
/// - Output 2: funding change, if any
pub fn build_swap_tx(
    request: &SwapRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let first_owner = require_signer(request.first_owner, "first token owner")?;
    let second_owner = require_signer(request.second_owner, "second token owner")?;
    let first = parse_token_utxo(&request.first)?;
    let second = parse_token_utxo(&request.second)?;

    if first.issuer_hash != second.issuer_hash {
        return Err(TokenError::InconsistentIssuer(format!(
            "cannot swap tokens of {} for tokens of {}",
            hex::encode(first.issuer_hash),
            hex::encode(second.issuer_hash)
        )));
    }
    if first.holder_hash == second.holder_hash {
        return Err(TokenError::HolderMismatch(
            "swap needs two distinct holders".into(),
        ));
    }

    let mut draft = Draft::new(TokenOperation::Swap, vec![first_owner, second_owner]);
    draft.add_owner_input(&request.first, COVENANT, 0, &first.holder_hash, true)?;
    draft.add_owner_input(&request.second, COVENANT, 1, &second.holder_hash, true)?;
    draft.add_token_output(
        request.first.satoshis,
        continue_locking_script(&first, &second.holder_hash, TokenOperation::Swap)?,
    )?;
    draft.add_token_output(
        request.second.satoshis,
        continue_locking_script(&second, &first.holder_hash, TokenOperation::Swap)?,
    )?;

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}
