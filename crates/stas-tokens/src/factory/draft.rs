//! Unsigned transaction drafts shared by the operation builders.
//!
//! A draft records, next to the transaction itself, how each input will be
//! unlocked and by whom, and which values carry tokens. Fees are sized
//! against placeholder unlocking scripts built exactly like the real ones,
//! with a worst-case signature.

use tracing::{debug, warn};

use stas_script::Script;
use stas_transaction::sighash::preimage_len;
use stas_transaction::{Transaction, TransactionInput, TransactionOutput};

use crate::config::EngineConfig;
use crate::error::TokenError;
use crate::script::reader::parse_locking_script;
use crate::script::unlocking::{
    build_unlocking_script, CovenantHint, FundingPointer, MergeSegment, OutputHint,
    UnlockingHint, MAX_SIGNATURE_LEN,
};
use crate::signer::{sign_draft, InputSigner};
use crate::types::{TokenOperation, Utxo};
use crate::validate::validate_draft;

/// How an input is unlocked.
#[derive(Debug, Clone)]
pub(crate) enum UnlockKind {
    /// `<sig> <pubkey>`.
    PayToKeyHash,
    /// Covenant pushes, then `<sig> <pubkey>`.
    Covenant { merge: Option<MergeSegment> },
}

/// Who signs an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignerRole {
    /// Index into the draft's owner signers.
    Owner(usize),
    /// The fee funder.
    Funding,
}

#[derive(Debug, Clone)]
pub(crate) struct InputPlan {
    pub kind: UnlockKind,
    pub role: SignerRole,
}

pub(crate) struct Draft<'a> {
    operation: TokenOperation,
    tx: Transaction,
    plans: Vec<InputPlan>,
    owners: Vec<&'a dyn InputSigner>,
    funding_signer: Option<&'a dyn InputSigner>,
    token_inputs: Vec<u64>,
    token_outputs: usize,
    supply_cap: Option<u64>,
}

/// Unwrap a signer the caller was required to supply.
pub(crate) fn require_signer<'a>(
    signer: Option<&'a dyn InputSigner>,
    role: &str,
) -> Result<&'a dyn InputSigner, TokenError> {
    signer.ok_or_else(|| TokenError::MissingSigner(format!("no {} signer supplied", role)))
}

impl<'a> Draft<'a> {
    pub fn new(operation: TokenOperation, owners: Vec<&'a dyn InputSigner>) -> Self {
        Draft {
            operation,
            tx: Transaction::new(),
            plans: Vec::new(),
            owners,
            funding_signer: None,
            token_inputs: Vec::new(),
            token_outputs: 0,
            supply_cap: None,
        }
    }

    pub fn with_supply_cap(mut self, cap: u64) -> Self {
        self.supply_cap = Some(cap);
        self
    }

    // -------------------------------------------------------------------
    // Composition
    // -------------------------------------------------------------------

    /// Add an input signed by owner `owner`, whose key must hash to `holder`.
    ///
    /// `carries_tokens` adds the input's value to the token value consumed.
    pub fn add_owner_input(
        &mut self,
        utxo: &Utxo,
        kind: UnlockKind,
        owner: usize,
        holder: &[u8; 20],
        carries_tokens: bool,
    ) -> Result<(), TokenError> {
        let signer = self.signer_for(SignerRole::Owner(owner))?;
        let signer_hash = signer.public_key().hash160();
        if &signer_hash != holder {
            return Err(TokenError::HolderMismatch(format!(
                "signer {} cannot unlock input held by {}",
                hex::encode(signer_hash),
                hex::encode(holder)
            )));
        }
        self.push_input(
            utxo,
            InputPlan {
                kind,
                role: SignerRole::Owner(owner),
            },
        )?;
        if carries_tokens {
            self.token_inputs.push(utxo.satoshis);
        }
        Ok(())
    }

    /// Add a token-carrying output. Must precede every other output.
    pub fn add_token_output(&mut self, satoshis: u64, locking_script: Script) -> Result<(), TokenError> {
        if self.tx.outputs.len() != self.token_outputs {
            return Err(TokenError::InvalidDestination(
                "token outputs must come before change outputs".into(),
            ));
        }
        self.tx.add_output(TransactionOutput::new(satoshis, locking_script));
        self.token_outputs += 1;
        Ok(())
    }

    /// Add a non-token output, such as issuer change.
    pub fn add_output(&mut self, output: TransactionOutput) {
        self.tx.add_output(output);
    }

    /// Each outpoint may be spent once per transaction.
    fn push_input(&mut self, utxo: &Utxo, plan: InputPlan) -> Result<(), TokenError> {
        let spent_twice = self.tx.inputs.iter().any(|input| {
            input.source_txid == utxo.txid && input.source_tx_out_index == utxo.vout
        });
        if spent_twice {
            return Err(TokenError::InvalidAmount(format!(
                "outpoint {}:{} is spent more than once",
                utxo.txid, utxo.vout
            )));
        }
        let mut input = TransactionInput::new(utxo.txid, utxo.vout);
        input.set_source_output(Some(utxo.to_output()));
        self.tx.add_input(input);
        self.plans.push(plan);
        Ok(())
    }

    /// Add the funding input and its change output, sized for the fee.
    ///
    /// Without a funding UTXO the draft stays zero-fee.
    pub fn fund(
        &mut self,
        funding: Option<&Utxo>,
        funding_signer: Option<&'a dyn InputSigner>,
        config: &EngineConfig,
    ) -> Result<(), TokenError> {
        let (utxo, signer) = match (funding, funding_signer) {
            (Some(utxo), Some(signer)) => (utxo, signer),
            (Some(_), None) => {
                return Err(TokenError::MissingSigner(
                    "funding utxo supplied without a funding signer".into(),
                ))
            }
            (None, Some(_)) => {
                warn!(
                    operation = %self.operation,
                    "funding signer supplied without a funding utxo, building zero-fee"
                );
                return Ok(());
            }
            (None, None) => return Ok(()),
        };

        let funder = signer.public_key().hash160();
        let funding_hash = utxo.locking_script.public_key_hash().map_err(|_| {
            TokenError::MalformedScript("funding utxo is not P2PKH".into())
        })?;
        if funding_hash != funder {
            return Err(TokenError::HolderMismatch(format!(
                "funding signer {} cannot unlock funding utxo held by {}",
                hex::encode(funder),
                hex::encode(funding_hash)
            )));
        }

        self.push_input(
            utxo,
            InputPlan {
                kind: UnlockKind::PayToKeyHash,
                role: SignerRole::Funding,
            },
        )?;
        self.funding_signer = Some(signer);

        let available = self
            .tx
            .total_input_satoshis()?
            .saturating_sub(self.tx.total_output_satoshis());

        // Size with the largest change the fee could leave.
        self.tx
            .add_output(TransactionOutput::change(available, Script::p2pkh(&funder)));
        let required = config.fee_for_size(self.estimate_size()?);
        if available < required {
            return Err(TokenError::InsufficientFee {
                required,
                available,
            });
        }

        let change = available - required;
        if change < config.dust_limit.max(1) {
            self.tx.outputs.pop();
            debug!(change, "change below dust limit left to the fee");
        } else if let Some(output) = self.tx.outputs.last_mut() {
            output.satoshis = change;
        }
        Ok(())
    }

    /// Fund, validate and sign.
    pub fn complete(
        mut self,
        funding: Option<&Utxo>,
        funding_signer: Option<&'a dyn InputSigner>,
        config: &EngineConfig,
    ) -> Result<Transaction, TokenError> {
        self.fund(funding, funding_signer, config)?;
        let fee = self.fee_paid()?;
        debug!(
            operation = %self.operation,
            inputs = self.tx.inputs.len(),
            outputs = self.tx.outputs.len(),
            fee,
            zero_fee = !self.is_funded(),
            "composed token transaction"
        );
        validate_draft(&self, config)?;
        sign_draft(self)
    }

    // -------------------------------------------------------------------
    // Sizing
    // -------------------------------------------------------------------

    /// Upper bound on the signed size of the transaction.
    pub fn estimate_size(&self) -> Result<usize, TokenError> {
        let funding_index = self.funding_index();
        let mut probe = self.tx.clone();
        for (index, plan) in self.plans.iter().enumerate() {
            let signer = self.signer_for(plan.role)?;
            let hint = match &plan.kind {
                UnlockKind::PayToKeyHash => UnlockingHint::PayToKeyHash,
                UnlockKind::Covenant { merge } => {
                    let script_len = self.tx.inputs[index]
                        .source_tx_script()
                        .map(Script::len)
                        .unwrap_or_default();
                    UnlockingHint::Covenant(covenant_hint(
                        &self.tx,
                        funding_index,
                        merge.as_ref(),
                        vec![0u8; preimage_len(script_len)],
                    )?)
                }
            };
            probe.inputs[index].unlocking_script = Some(build_unlocking_script(
                &[0u8; MAX_SIGNATURE_LEN],
                &signer.public_key(),
                &hint,
            )?);
        }
        Ok(probe.size())
    }

    /// Input value minus output value.
    pub fn fee_paid(&self) -> Result<u64, TokenError> {
        let total_in = self.tx.total_input_satoshis()?;
        let total_out = self.tx.total_output_satoshis();
        total_in
            .checked_sub(total_out)
            .ok_or(TokenError::ConservationViolation {
                expected: total_in,
                actual: total_out,
            })
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    pub fn operation(&self) -> TokenOperation {
        self.operation
    }

    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn plans(&self) -> &[InputPlan] {
        &self.plans
    }

    pub fn funding_index(&self) -> Option<usize> {
        self.plans
            .iter()
            .position(|plan| plan.role == SignerRole::Funding)
    }

    pub fn is_funded(&self) -> bool {
        self.funding_index().is_some()
    }

    pub fn token_inputs(&self) -> &[u64] {
        &self.token_inputs
    }

    pub fn token_output_values(&self) -> Vec<u64> {
        self.tx.outputs[..self.token_outputs]
            .iter()
            .map(|output| output.satoshis)
            .collect()
    }

    pub fn supply_cap(&self) -> Option<u64> {
        self.supply_cap
    }

    pub fn signer_for(&self, role: SignerRole) -> Result<&'a dyn InputSigner, TokenError> {
        match role {
            SignerRole::Owner(index) => self.owners.get(index).copied().ok_or_else(|| {
                TokenError::MissingSigner(format!("no signer for token owner {}", index))
            }),
            SignerRole::Funding => self
                .funding_signer
                .ok_or_else(|| TokenError::MissingSigner("no funding signer".into())),
        }
    }
}

/// Covenant pushes for an input of `tx`, given its preimage.
pub(crate) fn covenant_hint(
    tx: &Transaction,
    funding_index: Option<usize>,
    merge: Option<&MergeSegment>,
    preimage: Vec<u8>,
) -> Result<CovenantHint, TokenError> {
    let outputs = tx
        .outputs
        .iter()
        .map(|output| {
            Ok(OutputHint {
                satoshis: output.satoshis,
                holder_hash: parse_locking_script(output.locking_script.to_bytes())?.holder_hash,
            })
        })
        .collect::<Result<Vec<_>, TokenError>>()?;

    let funding = match funding_index {
        Some(index) => {
            let input = tx.inputs.get(index).ok_or_else(|| {
                TokenError::MissingSigner(format!("funding input {} is missing", index))
            })?;
            Some(FundingPointer {
                vout: input.source_tx_out_index,
                txid: input.source_txid,
            })
        }
        None => None,
    };

    Ok(CovenantHint {
        outputs,
        funding,
        merge: merge.cloned(),
        preimage,
    })
}
