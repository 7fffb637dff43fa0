//! Fee, dust and token-value conservation checks.
//!
//! Run on every draft after composition and before signing. Any failure
//! aborts the operation.

use tracing::warn;

use stas_transaction::TransactionOutput;

use crate::config::EngineConfig;
use crate::error::TokenError;
use crate::factory::draft::Draft;
use crate::types::TokenOperation;

/// Reject any output worth less than `dust_limit`.
pub fn check_dust(outputs: &[TransactionOutput], dust_limit: u64) -> Result<(), TokenError> {
    match outputs
        .iter()
        .enumerate()
        .find(|(_, output)| output.satoshis < dust_limit)
    {
        Some((vout, output)) => Err(TokenError::DustOutput {
            vout,
            satoshis: output.satoshis,
            limit: dust_limit,
        }),
        None => Ok(()),
    }
}

/// Reject a fee below what the estimated size requires.
pub fn check_fee(required: u64, available: u64) -> Result<(), TokenError> {
    if available < required {
        return Err(TokenError::InsufficientFee {
            required,
            available,
        });
    }
    Ok(())
}

/// Check token value out against token value in for `operation`.
///
/// * Contract: the commitment stays within `supply_cap`.
/// * Issue: outputs equal the contract pool and stay within `supply_cap`.
/// * Swap: each output equals the input on the other side of the trade.
/// * Every other kind: outputs (payout included) sum to the inputs.
pub fn check_conservation(
    operation: TokenOperation,
    token_inputs: &[u64],
    token_outputs: &[u64],
    supply_cap: Option<u64>,
) -> Result<(), TokenError> {
    let total_in = checked_sum(token_inputs.iter().copied())?;
    let total_out = checked_sum(token_outputs.iter().copied())?;

    if let (TokenOperation::Contract | TokenOperation::Issue, Some(cap)) = (operation, supply_cap) {
        if total_out > cap {
            return Err(TokenError::ConservationViolation {
                expected: cap,
                actual: total_out,
            });
        }
    }

    match operation {
        TokenOperation::Contract => Ok(()),
        TokenOperation::Swap => match (token_inputs, token_outputs) {
            ([first_in, second_in], [first_out, second_out]) => {
                if first_out != first_in {
                    return Err(TokenError::ConservationViolation {
                        expected: *first_in,
                        actual: *first_out,
                    });
                }
                if second_out != second_in {
                    return Err(TokenError::ConservationViolation {
                        expected: *second_in,
                        actual: *second_out,
                    });
                }
                Ok(())
            }
            _ => Err(TokenError::ConservationViolation {
                expected: total_in,
                actual: total_out,
            }),
        },
        _ if total_out != total_in => Err(TokenError::ConservationViolation {
            expected: total_in,
            actual: total_out,
        }),
        _ => Ok(()),
    }
}

/// Sum satoshi values, failing on overflow.
pub(crate) fn checked_sum(values: impl IntoIterator<Item = u64>) -> Result<u64, TokenError> {
    values.into_iter().try_fold(0u64, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| TokenError::InvalidAmount("satoshi total overflows".into()))
    })
}

pub(crate) fn validate_draft(draft: &Draft<'_>, config: &EngineConfig) -> Result<(), TokenError> {
    let result = run_checks(draft, config);
    if let Err(e) = &result {
        warn!(operation = %draft.operation(), error = %e, "draft rejected");
    }
    result
}

fn run_checks(draft: &Draft<'_>, config: &EngineConfig) -> Result<(), TokenError> {
    check_dust(&draft.tx().outputs, config.dust_limit)?;
    if draft.is_funded() {
        let required = config.fee_for_size(draft.estimate_size()?);
        check_fee(required, draft.fee_paid()?)?;
    }
    check_conservation(
        draft.operation(),
        draft.token_inputs(),
        &draft.token_output_values(),
        draft.supply_cap(),
    )
}
